//! Entry points for callers whose keys and values may be absent, such as records decoded from an
//! external format.
//!
//! Absent arguments are rejected with an [`Error`]. A duplicate insert or the removal of a
//! missing key is not an error and yields `Ok(false)`.

use core::borrow::Borrow;

use crate::{AvlTree, Error};

impl<K: Ord, V> AvlTree<K, V> {
    /// Looks up `key`, failing if it is absent.
    pub fn try_get<Q>(&self, key: Option<&Q>) -> Result<Option<&V>, Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let key = key.ok_or(Error::MissingKey)?;
        Ok(self.get(key))
    }

    /// Inserts a key-value pair, failing if either is absent.
    ///
    /// The key is checked before the value.
    pub fn try_insert(&mut self, key: Option<K>, value: Option<V>) -> Result<bool, Error> {
        let key = key.ok_or(Error::MissingKey)?;
        let value = value.ok_or(Error::MissingValue)?;
        Ok(self.insert(key, value))
    }

    /// Removes `key`, failing if it is absent.
    pub fn try_remove<Q>(&mut self, key: Option<&Q>) -> Result<bool, Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let key = key.ok_or(Error::MissingKey)?;
        Ok(self.remove(key))
    }
}
