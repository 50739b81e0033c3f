//! Byte and JSON encoding of frozen feature definitions.
//!
//! When the `serde` feature is enabled, every feature variant and [`AnyFeature`]
//! can be handed to another process as bytes. Loading goes through each variant's
//! validation: an empty or repeated domain, inverted or non-finite bounds, an
//! integral interval without integers, or a non-finite scale statistic is rejected
//! with [`FeatureError::Serialization`] instead of yielding a feature that breaks
//! its own invariants.
//!
//! # Example
//!
//! ```rust
//! use feature_domain::prelude::*;
//!
//! let training: Vec<Value> = vec!["no".into(), "yes".into()];
//! let feature: AnyFeature = Binary::new(RawData::from(&training), BinaryParams::default())
//!     .unwrap()
//!     .into();
//!
//! let bytes = feature.to_bytes(SerializableFormat::Binary).unwrap();
//! let restored = AnyFeature::from_bytes(&bytes, SerializableFormat::Binary).unwrap();
//! assert_eq!(restored, feature);
//! ```
//!
//! [`AnyFeature`]: crate::features::AnyFeature

use crate::error::{FeatureError, Result};
use crate::features::Feature;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;

/// Wire format for feature definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializableFormat {
    /// Compact bincode encoding (default).
    #[default]
    Binary,

    /// Human-readable JSON.
    Json,
}

fn serialization_error(action: &str, format: SerializableFormat, err: impl Display) -> FeatureError {
    FeatureError::Serialization {
        message: format!("{format:?} {action} failed: {err}"),
    }
}

/// Features that can be stored and reloaded.
pub trait Serializable: Feature + Serialize + DeserializeOwned + Sized {
    /// Encodes the feature definition.
    fn to_bytes(&self, format: SerializableFormat) -> Result<Vec<u8>> {
        let bytes = match format {
            SerializableFormat::Binary => bincode::serialize(self)
                .map_err(|e| serialization_error("serialization", format, e))?,
            SerializableFormat::Json => serde_json::to_vec_pretty(self)
                .map_err(|e| serialization_error("serialization", format, e))?,
        };
        log::trace!("stored feature '{}' in {} bytes", self.name(), bytes.len());
        Ok(bytes)
    }

    /// Decodes and validates a feature definition.
    fn from_bytes(bytes: &[u8], format: SerializableFormat) -> Result<Self> {
        let feature: Self = match format {
            SerializableFormat::Binary => bincode::deserialize(bytes)
                .map_err(|e| serialization_error("deserialization", format, e))?,
            SerializableFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| serialization_error("deserialization", format, e))?,
        };
        log::debug!(
            "loaded feature '{}' (scale={})",
            feature.name(),
            feature.scale_statistic()
        );
        Ok(feature)
    }
}

impl<T> Serializable for T where T: Feature + Serialize + DeserializeOwned {}
