use thiserror::Error;

/// Error returned by [`OrderedMap::get`] and [`OrderedMap::get_mut`]
/// when the requested key is not present.
///
/// [`OrderedMap::get`]: crate::OrderedMap::get
/// [`OrderedMap::get_mut`]: crate::OrderedMap::get_mut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("key not found")]
pub struct KeyNotFound;
