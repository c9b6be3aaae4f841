//! Game implementations.

pub mod puzzle;
