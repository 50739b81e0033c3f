//! Ordinal feature implementation.
//!
//! Encodes ordered categories (e.g., low < medium < high) to a single rank column,
//! optionally normalized to `[0, 1]`. Monotonicity is checked on the rank.

use crate::error::{FeatureError, Result};
use crate::features::base::{
    check_dims, check_width, describe_domain, index_domain, into_series, reject_outside, Feature,
    FeatureMeta, RawData,
};
use crate::types::{Monotonicity, Series, Value};
use crate::utils::{median_abs_deviation, sorted_unique, GAUSSIAN_CONSISTENCY};
use ahash::AHashMap;
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute slack allowed when a denormalized rank is reconstructed from `[0, 1]`.
const RANK_TOLERANCE: f64 = 1e-9;

/// Parameters for creating an Ordinal feature.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrdinalParams {
    /// Ordered list of levels (first is lowest, last is highest).
    /// If `None`, the distinct training values are used in sorted order.
    pub value_names: Option<Vec<Value>>,

    /// Feature name. Falls back to the training column's label.
    pub name: Option<String>,

    /// Allowed direction of change along the level order.
    pub monotone: Monotonicity,

    /// Whether the value may change at all.
    pub modifiable: bool,
}

impl Default for OrdinalParams {
    fn default() -> Self {
        Self {
            value_names: None,
            name: None,
            monotone: Monotonicity::None,
            modifiable: true,
        }
    }
}

/// A feature over an ordered, finite domain.
///
/// # Example
///
/// ```rust
/// use feature_domain::features::{Feature, Ordinal, OrdinalParams, RawData};
/// use feature_domain::types::{Monotonicity, Value};
///
/// let training: Vec<Value> = vec!["low".into(), "high".into(), "medium".into()];
/// let level = Ordinal::new(
///     RawData::from(&training),
///     OrdinalParams {
///         value_names: Some(vec!["low".into(), "medium".into(), "high".into()]),
///         monotone: Monotonicity::Increasing,
///         ..Default::default()
///     },
/// )
/// .unwrap();
///
/// let encoded = level.encode(RawData::from(&training), true, false).unwrap();
/// assert_eq!(encoded.column(0).to_vec(), vec![0.0, 1.0, 0.5]);
///
/// assert!(level.allowed_change(&"low".into(), &"high".into(), false).unwrap());
/// assert!(!level.allowed_change(&"high".into(), &"medium".into(), false).unwrap());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "OrdinalState", into = "OrdinalState")
)]
pub struct Ordinal {
    meta: FeatureMeta,

    /// Levels from lowest to highest.
    levels: Vec<Value>,

    /// Mapping from level to rank.
    index: AHashMap<Value, usize>,

    /// Scaled median absolute deviation of the normalized training ranks.
    scale: f64,
}

impl Ordinal {
    /// Creates an Ordinal feature from a training sample.
    pub fn new(training: RawData<'_>, params: OrdinalParams) -> Result<Self> {
        let meta = FeatureMeta::resolve(params.name, &training, params.monotone, params.modifiable);
        let training = check_dims(training)?;
        meta.require_training(&training)?;

        let levels = params
            .value_names
            .unwrap_or_else(|| sorted_unique(training.iter()));
        let index = index_domain(meta.name(), &levels, "level")?;
        reject_outside(
            meta.name(),
            &training,
            |v| index.contains_key(v),
            || describe_domain(&levels),
        )?;

        let mut feature = Self {
            meta,
            levels,
            index,
            scale: 0.0,
        };
        let encoded = feature.encode_checked(&training, true, false)?;
        feature.scale = GAUSSIAN_CONSISTENCY * median_abs_deviation(encoded.column(0));

        log::debug!(
            "ordinal feature '{}': levels {} scale={}",
            feature.meta.name(),
            describe_domain(&feature.levels),
            feature.scale
        );

        Ok(feature)
    }

    /// Returns the number of levels.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Returns the levels from lowest to highest.
    pub fn levels(&self) -> &[Value] {
        &self.levels
    }

    /// Returns the rank of a level, if it exists.
    pub fn rank(&self, level: &Value) -> Option<usize> {
        self.index.get(level).copied()
    }

    /// Returns the mapping from level to rank.
    pub fn value_mapping(&self) -> AHashMap<Value, usize> {
        self.index.clone()
    }

    /// Divisor used for normalization; 1 for a single-level domain.
    fn span(&self) -> f64 {
        self.levels.len().saturating_sub(1).max(1) as f64
    }

    /// Reads a rank from one encoded number.
    fn read_rank(&self, encoded: f64, denormalize: bool, discretize: bool) -> Option<usize> {
        let last = (self.levels.len() - 1) as f64;
        let mut rank = if denormalize {
            encoded * self.span()
        } else {
            encoded
        };
        if discretize {
            rank = rank.round().clamp(0.0, last);
        } else if denormalize && (rank - rank.round()).abs() <= RANK_TOLERANCE {
            rank = rank.round();
        }
        (rank.is_finite() && rank.fract() == 0.0 && (0.0..=last).contains(&rank))
            .then_some(rank as usize)
    }
}

/// Serialized form of an [`Ordinal`]; the index is rebuilt and the level
/// order re-validated on load.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct OrdinalState {
    meta: FeatureMeta,
    levels: Vec<Value>,
    scale: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<OrdinalState> for Ordinal {
    type Error = FeatureError;

    fn try_from(state: OrdinalState) -> Result<Self> {
        let index = index_domain(state.meta.name(), &state.levels, "level")?;
        crate::features::base::check_scale(state.meta.name(), state.scale)?;
        Ok(Self {
            meta: state.meta,
            levels: state.levels,
            index,
            scale: state.scale,
        })
    }
}

#[cfg(feature = "serde")]
impl From<Ordinal> for OrdinalState {
    fn from(feature: Ordinal) -> Self {
        Self {
            meta: feature.meta,
            levels: feature.levels,
            scale: feature.scale,
        }
    }
}

impl PartialEq for Ordinal {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta && self.levels == other.levels && self.scale == other.scale
    }
}

impl Feature for Ordinal {
    fn meta(&self) -> &FeatureMeta {
        &self.meta
    }

    fn scale_statistic(&self) -> f64 {
        self.scale
    }

    fn encoding_width(&self, _one_hot: bool) -> usize {
        1
    }

    fn encode_checked(
        &self,
        values: &[Value],
        normalize: bool,
        _one_hot: bool,
    ) -> Result<Array2<f64>> {
        reject_outside(
            self.meta.name(),
            values,
            |v| self.index.contains_key(v),
            || describe_domain(&self.levels),
        )?;

        let divisor = if normalize { self.span() } else { 1.0 };
        Ok(Array2::from_shape_fn((values.len(), 1), |(i, _)| {
            self.index[&values[i]] as f64 / divisor
        }))
    }

    fn decode(
        &self,
        values: ArrayView2<'_, f64>,
        denormalize: bool,
        return_series: bool,
        discretize: bool,
    ) -> Result<Series> {
        check_width(&values, &[1])?;

        let mut decoded = Vec::with_capacity(values.nrows());
        let mut invalid = Vec::new();
        for &v in &values {
            match self.read_rank(v, denormalize, discretize) {
                Some(rank) => decoded.push(self.levels[rank].clone()),
                None => invalid.push(format!("{v:?}")),
            }
        }

        if !invalid.is_empty() {
            let expected = if denormalize {
                format!("normalized ranks k/{} in [0, 1]", self.span())
            } else {
                format!("ranks 0..{}", self.levels.len())
            };
            return Err(FeatureError::domain(self.meta.name(), invalid, expected));
        }

        Ok(into_series(self.meta.name(), decoded, return_series))
    }

    fn encode_value(&self, value: &Value) -> Result<f64> {
        self.rank(value)
            .map(|rank| rank as f64 / self.span())
            .ok_or_else(|| {
                FeatureError::domain(self.meta.name(), [value], describe_domain(&self.levels))
            })
    }

    fn validate_encoded(&self, encoded: f64) -> Result<f64> {
        self.read_rank(encoded, true, false)
            .map(|rank| rank as f64 / self.span())
            .ok_or_else(|| {
                FeatureError::domain(
                    self.meta.name(),
                    [format!("{encoded:?}")],
                    format!("normalized ranks k/{} in [0, 1]", self.span()),
                )
            })
    }
}
