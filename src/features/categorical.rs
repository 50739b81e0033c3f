//! Categorical feature implementation.
//!
//! A categorical feature has an unordered domain of `k` values. It encodes either
//! to a single column holding the category index, or to `k` one-hot columns.

use crate::error::{FeatureError, Result};
use crate::features::base::{
    check_dims, check_width, describe_domain, index_domain, into_series, reject_outside, Feature,
    FeatureMeta, RawData,
};
use crate::types::{Monotonicity, Series, Value};
use crate::utils::{sorted_unique, GAUSSIAN_CONSISTENCY};
use ahash::AHashMap;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for creating a Categorical feature.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoricalParams {
    /// Explicit list of categories. The order determines the one-hot column order.
    /// If `None`, the distinct training values are used in sorted order.
    pub value_names: Option<Vec<Value>>,

    /// Feature name. Falls back to the training column's label.
    pub name: Option<String>,

    /// Must be [`Monotonicity::None`]; an unordered domain has no direction.
    pub monotone: Monotonicity,

    /// Whether the value may change at all.
    pub modifiable: bool,
}

impl Default for CategoricalParams {
    fn default() -> Self {
        Self {
            value_names: None,
            name: None,
            monotone: Monotonicity::None,
            modifiable: true,
        }
    }
}

/// A feature over an unordered, finite domain.
///
/// # Example
///
/// ```rust
/// use feature_domain::features::{Categorical, CategoricalParams, Feature, RawData};
/// use feature_domain::types::Value;
///
/// let training: Vec<Value> = vec!["red".into(), "green".into(), "blue".into()];
/// let color = Categorical::new(RawData::from(&training), CategoricalParams::default()).unwrap();
///
/// assert_eq!(color.encoding_width(true), 3);
/// assert_eq!(color.encoding_width(false), 1);
///
/// let one_hot = color.encode(RawData::from(&training), true, true).unwrap();
/// // Sorted domain: blue, green, red
/// assert_eq!(one_hot.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "CategoricalState", into = "CategoricalState")
)]
pub struct Categorical {
    meta: FeatureMeta,

    /// Categories in encoding order.
    categories: Vec<Value>,

    /// Mapping from category to index.
    index: AHashMap<Value, usize>,

    /// Scaled mean per-column standard deviation of the one-hot training encoding.
    scale: f64,
}

impl Categorical {
    /// Creates a Categorical feature from a training sample.
    pub fn new(training: RawData<'_>, params: CategoricalParams) -> Result<Self> {
        let meta = FeatureMeta::resolve(params.name, &training, params.monotone, params.modifiable);
        let training = check_dims(training)?;
        meta.require_training(&training)?;

        check_unordered(&meta)?;

        let categories = params
            .value_names
            .unwrap_or_else(|| sorted_unique(training.iter()));
        let index = index_domain(meta.name(), &categories, "category")?;
        reject_outside(
            meta.name(),
            &training,
            |v| index.contains_key(v),
            || describe_domain(&categories),
        )?;

        let mut feature = Self {
            meta,
            categories,
            index,
            scale: 0.0,
        };
        let encoded = feature.encode_checked(&training, false, true)?;
        let spread = encoded.std_axis(Axis(0), 0.0).mean().unwrap_or(0.0);
        feature.scale = GAUSSIAN_CONSISTENCY * spread;

        log::debug!(
            "categorical feature '{}': {} categories {} scale={}",
            feature.meta.name(),
            feature.categories.len(),
            describe_domain(&feature.categories),
            feature.scale
        );

        Ok(feature)
    }

    /// Returns the number of categories.
    pub fn num_categories(&self) -> usize {
        self.categories.len()
    }

    /// Returns the categories in encoding order.
    pub fn categories(&self) -> &[Value] {
        &self.categories
    }

    /// Returns the index for a category, if it exists.
    pub fn category_index(&self, category: &Value) -> Option<usize> {
        self.index.get(category).copied()
    }

    /// Returns the mapping from category to index.
    pub fn value_mapping(&self) -> AHashMap<Value, usize> {
        self.index.clone()
    }

    fn lookup(&self, value: &Value) -> Result<usize> {
        self.category_index(value).ok_or_else(|| {
            FeatureError::domain(self.meta.name(), [value], describe_domain(&self.categories))
        })
    }

    /// Reads a category index from a single encoded number.
    fn read_index(&self, encoded: f64, discretize: bool) -> Option<usize> {
        let last = (self.categories.len() - 1) as f64;
        let idx = if discretize {
            encoded.round().clamp(0.0, last)
        } else {
            encoded
        };
        (idx.is_finite() && idx.fract() == 0.0 && (0.0..=last).contains(&idx))
            .then_some(idx as usize)
    }

    /// Reads a category index from a one-hot row.
    fn read_one_hot(row: ArrayView1<'_, f64>, discretize: bool) -> Option<usize> {
        if row.iter().any(|v| v.is_nan()) {
            return None;
        }
        if discretize {
            let mut best = 0;
            for (idx, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = idx;
                }
            }
            return Some(best);
        }
        let mut hot = None;
        for (idx, &v) in row.iter().enumerate() {
            if v == 1.0 {
                if hot.is_some() {
                    return None;
                }
                hot = Some(idx);
            } else if v != 0.0 {
                return None;
            }
        }
        hot
    }
}

/// Fails unless the monotonicity policy is NONE.
fn check_unordered(meta: &FeatureMeta) -> Result<()> {
    if meta.monotone() == Monotonicity::None {
        return Ok(());
    }
    Err(FeatureError::construction(
        meta.name(),
        format!(
            "categorical features are unordered, monotonicity must be NONE (got {})",
            meta.monotone()
        ),
    ))
}

/// Serialized form of a [`Categorical`]; the index is rebuilt and the domain
/// re-validated on load.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct CategoricalState {
    meta: FeatureMeta,
    categories: Vec<Value>,
    scale: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<CategoricalState> for Categorical {
    type Error = FeatureError;

    fn try_from(state: CategoricalState) -> Result<Self> {
        check_unordered(&state.meta)?;
        let index = index_domain(state.meta.name(), &state.categories, "category")?;
        crate::features::base::check_scale(state.meta.name(), state.scale)?;
        Ok(Self {
            meta: state.meta,
            categories: state.categories,
            index,
            scale: state.scale,
        })
    }
}

#[cfg(feature = "serde")]
impl From<Categorical> for CategoricalState {
    fn from(feature: Categorical) -> Self {
        Self {
            meta: feature.meta,
            categories: feature.categories,
            scale: feature.scale,
        }
    }
}

impl PartialEq for Categorical {
    fn eq(&self, other: &Self) -> bool {
        // index is derived from categories
        self.meta == other.meta && self.categories == other.categories && self.scale == other.scale
    }
}

impl Feature for Categorical {
    fn meta(&self) -> &FeatureMeta {
        &self.meta
    }

    fn scale_statistic(&self) -> f64 {
        self.scale
    }

    fn encoding_width(&self, one_hot: bool) -> usize {
        if one_hot {
            self.categories.len()
        } else {
            1
        }
    }

    fn encode_checked(
        &self,
        values: &[Value],
        _normalize: bool,
        one_hot: bool,
    ) -> Result<Array2<f64>> {
        reject_outside(
            self.meta.name(),
            values,
            |v| self.index.contains_key(v),
            || describe_domain(&self.categories),
        )?;

        let mut encoded = Array2::zeros((values.len(), self.encoding_width(one_hot)));
        for (row, value) in values.iter().enumerate() {
            let idx = self.lookup(value)?;
            if one_hot {
                encoded[[row, idx]] = 1.0;
            } else {
                encoded[[row, 0]] = idx as f64;
            }
        }
        Ok(encoded)
    }

    fn decode(
        &self,
        values: ArrayView2<'_, f64>,
        _denormalize: bool,
        return_series: bool,
        discretize: bool,
    ) -> Result<Series> {
        let k = self.categories.len();
        check_width(&values, &[1, k])?;

        let mut decoded = Vec::with_capacity(values.nrows());
        let mut invalid = Vec::new();
        for row in values.rows() {
            let idx = if k == 1 {
                // a single column is both the index and the one-hot form
                Self::read_one_hot(row, discretize).or_else(|| self.read_index(row[0], discretize))
            } else if row.len() == 1 {
                self.read_index(row[0], discretize)
            } else {
                Self::read_one_hot(row, discretize)
            };
            match idx {
                Some(idx) => decoded.push(self.categories[idx].clone()),
                None if row.len() == 1 => invalid.push(format!("{:?}", row[0])),
                None => invalid.push(format!("{:?}", row.to_vec())),
            }
        }

        if !invalid.is_empty() {
            let expected = if values.ncols() == 1 && k > 1 {
                format!("category indices 0..{k}")
            } else {
                format!("one-hot rows of width {k}")
            };
            return Err(FeatureError::domain(self.meta.name(), invalid, expected));
        }

        Ok(into_series(self.meta.name(), decoded, return_series))
    }

    fn encode_value(&self, value: &Value) -> Result<f64> {
        self.lookup(value).map(|idx| idx as f64)
    }

    fn validate_encoded(&self, encoded: f64) -> Result<f64> {
        self.read_index(encoded, false)
            .map(|idx| idx as f64)
            .ok_or_else(|| {
                FeatureError::domain(
                    self.meta.name(),
                    [format!("{encoded:?}")],
                    format!("category indices 0..{}", self.categories.len()),
                )
            })
    }
}
