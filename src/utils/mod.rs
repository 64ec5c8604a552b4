//! Utility modules

pub mod identity;

pub use identity::*;
