//! Library fixtures

/// Films with their directors and cast.
pub(crate) mod films;
