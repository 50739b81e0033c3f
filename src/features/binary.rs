//! Binary feature implementation.
//!
//! A binary feature has a domain of exactly two values, encoded as a single
//! 0/1 column: the negative value maps to 0 and the positive value to 1.

use crate::error::{FeatureError, Result};
use crate::features::base::{
    check_dims, check_width, describe_domain, into_series, reject_outside, Feature, FeatureMeta,
    RawData,
};
use crate::types::{Monotonicity, Series, Value};
use crate::utils::{sorted_unique, GAUSSIAN_CONSISTENCY};
use ahash::AHashMap;
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for creating a Binary feature.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryParams {
    /// Explicit `[negative, positive]` domain.
    /// If `None`, the two distinct training values are used in sorted order.
    pub value_names: Option<[Value; 2]>,

    /// Feature name. Falls back to the training column's label.
    pub name: Option<String>,

    /// Allowed direction of change.
    pub monotone: Monotonicity,

    /// Whether the value may change at all.
    pub modifiable: bool,
}

impl Default for BinaryParams {
    fn default() -> Self {
        Self {
            value_names: None,
            name: None,
            monotone: Monotonicity::None,
            modifiable: true,
        }
    }
}

/// A feature over a two-valued domain.
///
/// # Example
///
/// ```rust
/// use feature_domain::features::{Binary, BinaryParams, Feature, RawData};
/// use feature_domain::types::Value;
///
/// let training: Vec<Value> = vec!["yes".into(), "no".into(), "no".into()];
/// let feature = Binary::new(RawData::from(&training), BinaryParams::default()).unwrap();
///
/// // Sorted order: "no" is negative, "yes" is positive
/// assert_eq!(feature.negative_value(), &Value::from("no"));
///
/// let encoded = feature.encode(RawData::from(&training), true, true).unwrap();
/// assert_eq!(encoded.column(0).to_vec(), vec![1.0, 0.0, 0.0]);
///
/// let decoded = feature.decode(encoded.view(), true, false, false).unwrap();
/// assert_eq!(decoded.values(), training.as_slice());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "BinaryState", into = "BinaryState")
)]
pub struct Binary {
    meta: FeatureMeta,

    /// Value encoded as 0.
    negative: Value,

    /// Value encoded as 1.
    positive: Value,

    /// Scaled standard deviation of the encoded training sample.
    scale: f64,
}

impl Binary {
    /// Creates a Binary feature from a training sample.
    pub fn new(training: RawData<'_>, params: BinaryParams) -> Result<Self> {
        let meta = FeatureMeta::resolve(params.name, &training, params.monotone, params.modifiable);
        let training = check_dims(training)?;
        meta.require_training(&training)?;

        let [negative, positive] = match params.value_names {
            Some(names) => {
                check_distinct(meta.name(), &names[0], &names[1])?;
                reject_outside(
                    meta.name(),
                    &training,
                    |v| names.contains(v),
                    || describe_domain(&names),
                )?;
                names
            }
            None => {
                let unique = sorted_unique(training.iter());
                match <[Value; 2]>::try_from(unique) {
                    Ok(names) => names,
                    Err(unique) => {
                        return Err(FeatureError::construction(
                            meta.name(),
                            format!(
                                "expected exactly 2 distinct values, found {}: {}",
                                unique.len(),
                                describe_domain(&unique)
                            ),
                        ))
                    }
                }
            }
        };

        let mut feature = Self {
            meta,
            negative,
            positive,
            scale: 0.0,
        };
        let encoded = feature.encode_checked(&training, false, false)?;
        feature.scale = GAUSSIAN_CONSISTENCY * encoded.column(0).std(0.0);

        log::debug!(
            "binary feature '{}': negative={} positive={} scale={}",
            feature.meta.name(),
            feature.negative,
            feature.positive,
            feature.scale
        );

        Ok(feature)
    }

    /// Returns the value encoded as 0.
    pub fn negative_value(&self) -> &Value {
        &self.negative
    }

    /// Returns the value encoded as 1.
    pub fn positive_value(&self) -> &Value {
        &self.positive
    }

    /// Returns the mapping `{negative: 0, positive: 1}`.
    pub fn value_mapping(&self) -> AHashMap<Value, usize> {
        let mut mapping = AHashMap::with_capacity(2);
        mapping.insert(self.negative.clone(), 0);
        mapping.insert(self.positive.clone(), 1);
        mapping
    }

    fn domain(&self) -> String {
        describe_domain(&[self.negative.clone(), self.positive.clone()])
    }
}

fn check_distinct(feature: &str, negative: &Value, positive: &Value) -> Result<()> {
    if negative == positive {
        return Err(FeatureError::construction(
            feature,
            format!("domain values must be distinct, got [{negative}, {positive}]"),
        ));
    }
    Ok(())
}

/// Serialized form of a [`Binary`], re-validated on load.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct BinaryState {
    meta: FeatureMeta,
    negative: Value,
    positive: Value,
    scale: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<BinaryState> for Binary {
    type Error = FeatureError;

    fn try_from(state: BinaryState) -> Result<Self> {
        check_distinct(state.meta.name(), &state.negative, &state.positive)?;
        crate::features::base::check_scale(state.meta.name(), state.scale)?;
        Ok(Self {
            meta: state.meta,
            negative: state.negative,
            positive: state.positive,
            scale: state.scale,
        })
    }
}

#[cfg(feature = "serde")]
impl From<Binary> for BinaryState {
    fn from(feature: Binary) -> Self {
        Self {
            meta: feature.meta,
            negative: feature.negative,
            positive: feature.positive,
            scale: feature.scale,
        }
    }
}

impl Feature for Binary {
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
        _normalize: bool,
        _one_hot: bool,
    ) -> Result<Array2<f64>> {
        reject_outside(
            self.meta.name(),
            values,
            |v| v == &self.positive || v == &self.negative,
            || self.domain(),
        )?;

        Ok(Array2::from_shape_fn((values.len(), 1), |(i, _)| {
            if values[i] == self.positive {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn decode(
        &self,
        values: ArrayView2<'_, f64>,
        _denormalize: bool,
        return_series: bool,
        _discretize: bool,
    ) -> Result<Series> {
        check_width(&values, &[1])?;

        let mut invalid: Vec<f64> = values
            .iter()
            .copied()
            .filter(|&v| v != 0.0 && v != 1.0)
            .collect();
        if !invalid.is_empty() {
            invalid.sort_by(f64::total_cmp);
            invalid.dedup();
            return Err(FeatureError::domain(
                self.meta.name(),
                invalid.iter().map(|v| format!("{v:?}")),
                "encoded values 0 or 1",
            ));
        }

        let decoded = values
            .iter()
            .map(|&v| {
                if v == 1.0 {
                    self.positive.clone()
                } else {
                    self.negative.clone()
                }
            })
            .collect();

        Ok(into_series(self.meta.name(), decoded, return_series))
    }

    fn encode_value(&self, value: &Value) -> Result<f64> {
        if value == &self.positive {
            Ok(1.0)
        } else if value == &self.negative {
            Ok(0.0)
        } else {
            Err(FeatureError::domain(self.meta.name(), [value], self.domain()))
        }
    }

    fn validate_encoded(&self, encoded: f64) -> Result<f64> {
        if encoded == 0.0 || encoded == 1.0 {
            Ok(encoded)
        } else {
            Err(FeatureError::domain(
                self.meta.name(),
                [format!("{encoded:?}")],
                "encoded values 0 or 1",
            ))
        }
    }

    fn allowed_encoded_change(&self, pre: f64, post: f64) -> bool {
        if !self.meta.modifiable() {
            return pre == post;
        }
        match self.meta.monotone() {
            Monotonicity::None => true,
            Monotonicity::Increasing => pre == 0.0 || post == 1.0,
            Monotonicity::Decreasing => pre == 1.0 || post == 0.0,
        }
    }
}
