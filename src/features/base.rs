//! Base feature trait, shared feature metadata and input shape checking.

use crate::error::{FeatureError, Result};
use crate::types::{Monotonicity, Series, Value};
use crate::utils::sorted_unique;
use ahash::AHashMap;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewD};
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name given to features constructed without an explicit or inherited name.
pub const DEFAULT_FEATURE_NAME: &str = "feature";

/// Raw input accepted by feature constructors and `encode`.
///
/// Inputs of several shapes are accepted and normalized to a flat column by
/// [`check_dims`] before any variant logic runs.
#[derive(Debug, Clone)]
pub enum RawData<'a> {
    /// A single value, treated as a column of length one.
    Scalar(&'a Value),
    /// A flat column of values.
    Flat(&'a [Value]),
    /// An array of values of any rank; only ranks 0, 1 and `(n, 1)` columns are accepted.
    Array(ArrayViewD<'a, Value>),
    /// A labelled column.
    Series(&'a Series),
}

impl<'a> RawData<'a> {
    /// Returns the column label carried by a [`RawData::Series`] input.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            RawData::Series(series) => series.name(),
            _ => None,
        }
    }

    /// Returns the shape of the input as supplied.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            RawData::Scalar(_) => Vec::new(),
            RawData::Flat(values) => vec![values.len()],
            RawData::Array(array) => array.shape().to_vec(),
            RawData::Series(series) => vec![series.len()],
        }
    }
}

impl<'a> From<&'a Value> for RawData<'a> {
    fn from(value: &'a Value) -> Self {
        RawData::Scalar(value)
    }
}

impl<'a> From<&'a [Value]> for RawData<'a> {
    fn from(values: &'a [Value]) -> Self {
        RawData::Flat(values)
    }
}

impl<'a> From<&'a Vec<Value>> for RawData<'a> {
    fn from(values: &'a Vec<Value>) -> Self {
        RawData::Flat(values.as_slice())
    }
}

impl<'a> From<&'a Series> for RawData<'a> {
    fn from(series: &'a Series) -> Self {
        RawData::Series(series)
    }
}

impl<'a> From<ArrayViewD<'a, Value>> for RawData<'a> {
    fn from(array: ArrayViewD<'a, Value>) -> Self {
        RawData::Array(array)
    }
}

impl<'a> From<ArrayView1<'a, Value>> for RawData<'a> {
    fn from(array: ArrayView1<'a, Value>) -> Self {
        RawData::Array(array.into_dyn())
    }
}

impl<'a> From<ArrayView2<'a, Value>> for RawData<'a> {
    fn from(array: ArrayView2<'a, Value>) -> Self {
        RawData::Array(array.into_dyn())
    }
}

/// Normalizes raw input to a flat column of values.
///
/// Scalars and rank-0 arrays become a column of length one, rank-1 inputs pass
/// through, and `(n, 1)` arrays are flattened. Any other shape is a
/// [`FeatureError::Shape`].
pub fn check_dims(data: RawData<'_>) -> Result<Cow<'_, [Value]>> {
    match data {
        RawData::Scalar(value) => Ok(Cow::Owned(vec![value.clone()])),
        RawData::Flat(values) => Ok(Cow::Borrowed(values)),
        RawData::Series(series) => Ok(Cow::Borrowed(series.values())),
        RawData::Array(array) => {
            let shape = array.shape().to_vec();
            match shape.as_slice() {
                [] | [_] => {}
                [rows, 1] => log::trace!("flattening ({rows}, 1) column for encoding"),
                _ => {
                    return Err(FeatureError::Shape {
                        expected: "a scalar, a flat column or an (n, 1) array".to_string(),
                        actual: shape,
                    })
                }
            }
            match array.to_slice() {
                Some(slice) => Ok(Cow::Borrowed(slice)),
                None => Ok(Cow::Owned(array.iter().cloned().collect())),
            }
        }
    }
}

/// Checks that an encoded matrix has one of the accepted column counts.
pub(crate) fn check_width(values: &ArrayView2<'_, f64>, widths: &[usize]) -> Result<()> {
    if widths.contains(&values.ncols()) {
        return Ok(());
    }
    let expected = widths
        .iter()
        .map(|w| format!("(n, {w})"))
        .collect::<Vec<_>>()
        .join(" or ");
    Err(FeatureError::Shape {
        expected,
        actual: values.shape().to_vec(),
    })
}

/// Formats a domain as `[a, b, c]` for error messages.
pub(crate) fn describe_domain(domain: &[Value]) -> String {
    let items = domain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{items}]")
}

/// Fails with a domain error listing every distinct value not accepted by `contains`.
pub(crate) fn reject_outside<F>(
    feature: &str,
    values: &[Value],
    contains: F,
    expected: impl FnOnce() -> String,
) -> Result<()>
where
    F: Fn(&Value) -> bool,
{
    let offending = sorted_unique(values.iter().filter(|v| !contains(v)));
    if offending.is_empty() {
        Ok(())
    } else {
        Err(FeatureError::domain(feature, offending, expected()))
    }
}

/// Builds the value-to-position map of a finite domain.
///
/// Fails with a construction error if the domain is empty or lists a value twice.
pub(crate) fn index_domain(
    feature: &str,
    domain: &[Value],
    kind: &str,
) -> Result<AHashMap<Value, usize>> {
    if domain.is_empty() {
        return Err(FeatureError::construction(
            feature,
            format!("must provide at least one {kind}"),
        ));
    }
    let mut index = AHashMap::with_capacity(domain.len());
    for (position, value) in domain.iter().enumerate() {
        if index.insert(value.clone(), position).is_some() {
            return Err(FeatureError::construction(
                feature,
                format!("duplicate {kind}: {value}"),
            ));
        }
    }
    Ok(index)
}

/// Fails unless a stored scale statistic is a finite, non-negative number.
#[cfg(feature = "serde")]
pub(crate) fn check_scale(feature: &str, scale: f64) -> Result<()> {
    if scale.is_finite() && scale >= 0.0 {
        Ok(())
    } else {
        Err(FeatureError::construction(
            feature,
            format!("scale statistic must be finite and non-negative, got {scale:?}"),
        ))
    }
}

/// Reads an encoded scalar given as a raw value.
pub(crate) fn numeric(feature: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| FeatureError::domain(feature, [value], "a numeric encoded value"))
}

/// Wraps decoded values as a labelled or bare series.
pub(crate) fn into_series(name: &str, values: Vec<Value>, return_series: bool) -> Series {
    if return_series {
        Series::new(name, values)
    } else {
        Series::unnamed(values)
    }
}

/// Metadata shared by every feature variant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureMeta {
    /// Feature name.
    name: String,

    /// Allowed direction of change.
    monotone: Monotonicity,

    /// Whether the value may change at all.
    modifiable: bool,
}

impl FeatureMeta {
    /// Creates feature metadata.
    pub fn new(name: impl Into<String>, monotone: Monotonicity, modifiable: bool) -> Self {
        Self {
            name: name.into(),
            monotone,
            modifiable,
        }
    }

    /// Resolves the feature name from an explicit name, the training column's
    /// label, or [`DEFAULT_FEATURE_NAME`], in that order.
    pub(crate) fn resolve(
        name: Option<String>,
        training: &RawData<'_>,
        monotone: Monotonicity,
        modifiable: bool,
    ) -> Self {
        let name = name
            .or_else(|| training.name().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_FEATURE_NAME.to_string());
        Self::new(name, monotone, modifiable)
    }

    /// Returns the feature name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the monotonicity policy.
    pub fn monotone(&self) -> Monotonicity {
        self.monotone
    }

    /// Returns whether the feature may change.
    pub fn modifiable(&self) -> bool {
        self.modifiable
    }

    /// Change legality over an ordered encoded scale.
    pub fn permits(&self, pre: f64, post: f64) -> bool {
        if self.modifiable {
            self.monotone.permits(pre, post)
        } else {
            pre == post
        }
    }

    /// Fails if a training sample is empty.
    pub(crate) fn require_training(&self, training: &[Value]) -> Result<()> {
        if training.is_empty() {
            return Err(FeatureError::construction(
                &self.name,
                "training sample is empty",
            ));
        }
        Ok(())
    }
}

/// Trait implemented by every feature variant.
///
/// A feature is built once from a training sample and is immutable afterwards;
/// every method is a pure function of its arguments and the construction-time state.
pub trait Feature {
    /// Returns the shared feature metadata.
    fn meta(&self) -> &FeatureMeta;

    /// Returns the feature name.
    fn name(&self) -> &str {
        self.meta().name()
    }

    /// Returns the monotonicity policy.
    fn monotone(&self) -> Monotonicity {
        self.meta().monotone()
    }

    /// Returns whether the feature may change.
    fn modifiable(&self) -> bool {
        self.meta().modifiable()
    }

    /// Robust spread of the encoded training sample, fixed at construction.
    fn scale_statistic(&self) -> f64;

    /// Number of numeric columns one encoded value occupies.
    fn encoding_width(&self, one_hot: bool) -> usize;

    /// Encodes raw values into an `(n, encoding_width(one_hot))` matrix.
    ///
    /// The input shape is normalized with [`check_dims`] before the variant logic
    /// in [`Feature::encode_checked`] runs.
    fn encode(&self, values: RawData<'_>, normalize: bool, one_hot: bool) -> Result<Array2<f64>> {
        let values = check_dims(values)?;
        self.encode_checked(&values, normalize, one_hot)
    }

    /// Encodes a flat, shape-checked column of raw values.
    fn encode_checked(&self, values: &[Value], normalize: bool, one_hot: bool)
        -> Result<Array2<f64>>;

    /// Decodes an encoded matrix back to raw values.
    ///
    /// With `return_series` the result carries the feature name as its label.
    fn decode(
        &self,
        values: ArrayView2<'_, f64>,
        denormalize: bool,
        return_series: bool,
        discretize: bool,
    ) -> Result<Series>;

    /// Encodes one raw value to the scalar `encode(.., normalize = true, one_hot = false)` yields.
    fn encode_value(&self, value: &Value) -> Result<f64>;

    /// Validates a scalar in the form produced by [`Feature::encode_value`].
    fn validate_encoded(&self, encoded: f64) -> Result<f64>;

    /// Whether moving from `pre` to `post` is legal under the feature's policy.
    ///
    /// With `encoded` the values are scalars as produced by [`Feature::encode_value`];
    /// otherwise they are raw values and are encoded first.
    fn allowed_change(&self, pre: &Value, post: &Value, encoded: bool) -> Result<bool> {
        let (pre, post) = if encoded {
            (
                self.validate_encoded(numeric(self.name(), pre)?)?,
                self.validate_encoded(numeric(self.name(), post)?)?,
            )
        } else {
            (self.encode_value(pre)?, self.encode_value(post)?)
        };
        Ok(self.allowed_encoded_change(pre, post))
    }

    /// Legality of a change between two validated encoded scalars.
    fn allowed_encoded_change(&self, pre: f64, post: f64) -> bool {
        self.meta().permits(pre, post)
    }
}
