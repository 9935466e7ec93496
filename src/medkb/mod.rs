//! Core `Medkb` type orchestrating the build and serve phases.

pub mod lifecycle;
pub mod retrieval;

pub use lifecycle::Medkb;
