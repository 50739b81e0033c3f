//! Utility modules for the feature library.
//!
//! This module contains the spread statistics and distinct-value helpers that
//! feature constructors use to derive their domains and scale statistics.

pub mod stats;

pub use stats::{median, median_abs_deviation, sorted_unique, GAUSSIAN_CONSISTENCY};
