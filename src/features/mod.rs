//! Features: reversible encodings of tabular columns.
//!
//! Every feature is built from a training sample, which fixes its legal domain and
//! scale statistic, and then translates raw values to numeric matrices and back.
//! Search procedures query [`Feature::allowed_change`] before perturbing a value.
//!
//! # Available Features
//!
//! - [`Binary`]: Two-valued domain, one 0/1 column
//! - [`Categorical`]: Unordered domain, category index or one-hot columns
//! - [`Ordinal`]: Ordered domain, one (optionally normalized) rank column
//! - [`Continuous`]: Numeric interval, one (optionally min-max normalized) column
//! - [`AnyFeature`]: Closed union of the above
//!
//! # Example
//!
//! ```rust
//! use feature_domain::features::{Categorical, CategoricalParams, Feature, RawData};
//! use feature_domain::types::Value;
//!
//! let training: Vec<Value> = vec!["a".into(), "b".into(), "c".into()];
//! let feature = Categorical::new(RawData::from(&training), CategoricalParams::default()).unwrap();
//!
//! let encoded = feature.encode(RawData::from(&training), true, true).unwrap();
//! assert_eq!(encoded.shape(), &[3, feature.encoding_width(true)]);
//!
//! let decoded = feature.decode(encoded.view(), true, true, false).unwrap();
//! assert_eq!(decoded.values(), training.as_slice());
//! ```

mod any;
mod base;
mod binary;
mod categorical;
mod continuous;
mod ordinal;

pub use any::AnyFeature;
pub use base::{check_dims, Feature, FeatureMeta, RawData, DEFAULT_FEATURE_NAME};
pub use binary::{Binary, BinaryParams};
pub use categorical::{Categorical, CategoricalParams};
pub use continuous::{Continuous, ContinuousParams};
pub use ordinal::{Ordinal, OrdinalParams};
