//! # feature-domain - reversible encodings for tabular features
//!
//! feature-domain translates tabular feature values between their raw domain
//! representation (category labels, numbers) and a numeric encoding that search
//! and optimization procedures can work with, such as counterfactual generation
//! or robustness perturbation analysis.
//!
//! ## Overview
//!
//! Every feature is built once from a training sample, which fixes its legal
//! value domain and a scale statistic. After that it is immutable and offers:
//!
//! - **Encode / decode**: raw values to a numeric matrix and back, with round-trip guarantees
//! - **Allowed change**: a legality oracle for moving a value under a monotonicity policy
//! - **Scale statistic**: a robust spread measure used to normalize cross-feature distances
//!
//! The variants are [`Binary`](features::Binary), [`Categorical`](features::Categorical),
//! [`Ordinal`](features::Ordinal) and [`Continuous`](features::Continuous), all behind the
//! [`Feature`](features::Feature) trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use feature_domain::prelude::*;
//!
//! let training: Vec<Value> = vec!["no".into(), "yes".into(), "yes".into()];
//! let smoker = Binary::new(
//!     RawData::from(&training[..]),
//!     BinaryParams {
//!         name: Some("smoker".to_string()),
//!         monotone: Monotonicity::Increasing,
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//!
//! let encoded = smoker.encode(RawData::from(&training[..]), true, true).unwrap();
//! assert_eq!(encoded.column(0).to_vec(), vec![0.0, 1.0, 1.0]);
//!
//! assert!(smoker.allowed_change(&"no".into(), &"yes".into(), false).unwrap());
//! assert!(!smoker.allowed_change(&"yes".into(), &"no".into(), false).unwrap());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization of feature definitions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod features;
pub mod types;
pub mod utils;

#[cfg(feature = "serde")]
pub mod serialization;

/// Re-export of commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::features::{
        AnyFeature, Binary, BinaryParams, Categorical, CategoricalParams, Continuous,
        ContinuousParams, Feature, FeatureMeta, Ordinal, OrdinalParams, RawData,
    };
    pub use crate::types::{Monotonicity, Series, Value};

    #[cfg(feature = "serde")]
    pub use crate::serialization::{Serializable, SerializableFormat};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library.
pub mod error {
    use thiserror::Error;

    /// Main error type for feature operations.
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum FeatureError {
        /// A raw or encoded value lies outside the feature's legal domain.
        #[error("Incorrect value in feature '{feature}': values [{values}] are not one of {expected}")]
        Domain {
            /// Name of the feature that rejected the values.
            feature: String,
            /// The offending values, comma separated.
            values: String,
            /// Description of the legal domain.
            expected: String,
        },

        /// Input dimensionality is not supported.
        #[error("Unsupported input shape {actual:?}: expected {expected}")]
        Shape {
            /// Description of the accepted shapes.
            expected: String,
            /// The shape that was supplied.
            actual: Vec<usize>,
        },

        /// The training sample or parameters do not define a valid domain.
        #[error("Cannot construct feature '{feature}': {message}")]
        Construction {
            /// Name of the feature under construction.
            feature: String,
            /// Description of the error.
            message: String,
        },

        /// Invalid parameter value.
        #[error("Invalid parameter '{name}': {message}")]
        InvalidParameter {
            /// Name of the invalid parameter.
            name: &'static str,
            /// Description of the error.
            message: String,
        },

        /// Serialization error.
        #[cfg(feature = "serde")]
        #[error("Serialization error: {message}")]
        Serialization {
            /// Description of the serialization error.
            message: String,
        },
    }

    impl FeatureError {
        /// Builds a [`FeatureError::Domain`] from any displayable offending values.
        pub(crate) fn domain<I, D>(feature: &str, values: I, expected: impl Into<String>) -> Self
        where
            I: IntoIterator<Item = D>,
            D: std::fmt::Display,
        {
            let values = values
                .into_iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            FeatureError::Domain {
                feature: feature.to_string(),
                values,
                expected: expected.into(),
            }
        }

        /// Builds a [`FeatureError::Construction`].
        pub(crate) fn construction(feature: &str, message: impl Into<String>) -> Self {
            FeatureError::Construction {
                feature: feature.to_string(),
                message: message.into(),
            }
        }
    }

    /// Result type alias using FeatureError.
    pub type Result<T> = std::result::Result<T, FeatureError>;
}

pub use error::{FeatureError, Result};
