/// An error returned by the nullable entry points of [`AvlTree`](crate::AvlTree).
///
/// Validation happens before the tree is inspected, so a failed call leaves the tree unchanged.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("null keys are not allowed")]
    MissingKey,

    #[error("null values are not allowed")]
    MissingValue,
}
