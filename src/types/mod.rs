//! Core value types shared by all features.
//!
//! This module contains the dynamic raw value type, the named value column returned
//! by decoding, and the monotonicity policy enum.

mod monotonicity;
mod value;

pub use monotonicity::Monotonicity;
pub use value::{Series, Value};
