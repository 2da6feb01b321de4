//! Library tests and fixtures

pub(crate) mod fixtures;
mod validation_tests;
