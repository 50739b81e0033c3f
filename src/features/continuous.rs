//! Continuous feature implementation.
//!
//! A continuous feature takes numeric values in a closed interval `[lower, upper]`,
//! fixed at construction from explicit bounds or the training range. Values encode
//! to one column, optionally min-max normalized to `[0, 1]`.
//!
//! The domain holds a single numeric kind: `Int` values for integral features and
//! `Float` values otherwise, so decoding always yields the kind that was encoded.

use crate::error::{FeatureError, Result};
use crate::features::base::{
    check_dims, check_width, into_series, reject_outside, Feature, FeatureMeta, RawData,
};
use crate::types::{Monotonicity, Series, Value};
use crate::utils::{median_abs_deviation, GAUSSIAN_CONSISTENCY};
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most significant decimal digits needed to name any `f64` exactly.
const MAX_SIGNIFICANT_DIGITS: usize = 17;

/// Parameters for creating a Continuous feature.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContinuousParams {
    /// Explicit `(lower, upper)` bounds.
    /// If `None`, the training minimum and maximum are used.
    pub bounds: Option<(f64, f64)>,

    /// Whether the domain holds `Int` (true) or `Float` (false) values.
    /// If `None`, inferred from the training sample, which must then be of one kind.
    pub integral: Option<bool>,

    /// Feature name. Falls back to the training column's label.
    pub name: Option<String>,

    /// Allowed direction of change.
    pub monotone: Monotonicity,

    /// Whether the value may change at all.
    pub modifiable: bool,
}

impl Default for ContinuousParams {
    fn default() -> Self {
        Self {
            bounds: None,
            integral: None,
            name: None,
            monotone: Monotonicity::None,
            modifiable: true,
        }
    }
}

/// A numeric feature over a closed interval.
///
/// # Example
///
/// ```rust
/// use feature_domain::features::{Continuous, ContinuousParams, Feature, RawData};
/// use feature_domain::types::Value;
///
/// let training: Vec<Value> = vec![Value::Int(20), Value::Int(30), Value::Int(60)];
/// let age = Continuous::new(RawData::from(&training), ContinuousParams::default()).unwrap();
///
/// assert_eq!(age.bounds(), (20.0, 60.0));
/// let encoded = age.encode(RawData::from(&training), true, true).unwrap();
/// assert_eq!(encoded.column(0).to_vec(), vec![0.0, 0.25, 1.0]);
///
/// let decoded = age.decode(encoded.view(), true, false, false).unwrap();
/// assert_eq!(decoded.values(), training.as_slice());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "ContinuousState", into = "ContinuousState")
)]
pub struct Continuous {
    meta: FeatureMeta,

    /// Lower bound of the domain.
    lower: f64,

    /// Upper bound of the domain.
    upper: f64,

    /// Whether the domain holds `Int` values.
    integral: bool,

    /// Scaled median absolute deviation of the normalized training sample.
    scale: f64,
}

impl Continuous {
    /// Creates a Continuous feature from a training sample.
    pub fn new(training: RawData<'_>, params: ContinuousParams) -> Result<Self> {
        let meta = FeatureMeta::resolve(params.name, &training, params.monotone, params.modifiable);
        let training = check_dims(training)?;
        meta.require_training(&training)?;

        reject_outside(
            meta.name(),
            &training,
            |v| v.as_f64().is_some_and(f64::is_finite),
            || "finite numbers".to_string(),
        )?;

        let integral = match params.integral {
            Some(integral) => integral,
            None => {
                let ints = training.iter().filter(|v| matches!(v, Value::Int(_))).count();
                if ints > 0 && ints < training.len() {
                    return Err(FeatureError::construction(
                        meta.name(),
                        "training sample mixes Int and Float values, set `integral` to choose one",
                    ));
                }
                ints > 0
            }
        };

        let (lower, upper) = params.bounds.unwrap_or_else(|| {
            training
                .iter()
                .filter_map(Value::as_f64)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                    (lo.min(x), hi.max(x))
                })
        });
        check_bounds(meta.name(), lower, upper, integral)?;

        let mut feature = Self {
            meta,
            lower,
            upper,
            integral,
            scale: 0.0,
        };
        reject_outside(
            feature.meta.name(),
            &training,
            |v| feature.contains(v),
            || feature.domain(),
        )?;
        let encoded = feature.encode_checked(&training, true, false)?;
        feature.scale = GAUSSIAN_CONSISTENCY * median_abs_deviation(encoded.column(0));

        log::debug!(
            "continuous feature '{}': bounds [{}, {}] integral={} scale={}",
            feature.meta.name(),
            feature.lower,
            feature.upper,
            feature.integral,
            feature.scale
        );

        Ok(feature)
    }

    /// Returns the `(lower, upper)` bounds.
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// Returns whether the domain holds `Int` values.
    pub fn is_integral(&self) -> bool {
        self.integral
    }

    fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whole numbers inside the bounds, if there are any.
    fn integer_range(&self) -> Option<(f64, f64)> {
        integer_range(self.lower, self.upper)
    }

    fn normalize(&self, x: f64) -> f64 {
        if self.range() > 0.0 {
            (x - self.lower) / self.range()
        } else {
            0.0
        }
    }

    /// Inverse of [`Self::normalize`].
    ///
    /// Several floats can normalize to the same encoded value. Among them the one
    /// with the shortest decimal form is returned, so decimal data decodes exactly.
    fn denormalize(&self, encoded: f64) -> f64 {
        let estimate = (self.lower + encoded * self.range()).clamp(self.lower, self.upper);
        let Some((first, last)) = self.preimage(encoded) else {
            return estimate;
        };
        if first <= 0.0 && last >= 0.0 {
            return 0.0;
        }
        let middle = first + (last - first) / 2.0;
        (1..=MAX_SIGNIFICANT_DIGITS)
            .map(|digits| round_significant(middle, digits))
            .find(|x| (first..=last).contains(x))
            .unwrap_or(middle)
    }

    /// Smallest and largest float in the bounds that normalize to `encoded`.
    ///
    /// `normalize` is monotone, so both ends are found by bisection over the
    /// ordered float representation.
    fn preimage(&self, encoded: f64) -> Option<(f64, f64)> {
        let (low, high) = (float_key(self.lower), float_key(self.upper));
        if self.normalize(self.upper) < encoded || self.normalize(self.lower) > encoded {
            return None;
        }

        let (mut lo, mut hi) = (low, high);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.normalize(float_from_key(mid)) >= encoded {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        let first = float_from_key(lo);

        let (mut lo, mut hi) = (low, high);
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if self.normalize(float_from_key(mid)) <= encoded {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let last = float_from_key(lo);

        (first <= last).then_some((first, last))
    }

    fn domain(&self) -> String {
        let kind = if self.integral { "integers" } else { "floats" };
        format!("{kind} in [{:?}, {:?}]", self.lower, self.upper)
    }

    fn contains(&self, value: &Value) -> bool {
        let x = match (value, self.integral) {
            (Value::Int(v), true) => *v as f64,
            (Value::Float(v), false) => *v,
            _ => return false,
        };
        (self.lower..=self.upper).contains(&x)
    }

    /// Maps one encoded number back into the domain, or `None` if out of range.
    fn read(&self, encoded: f64, denormalize: bool, discretize: bool) -> Option<Value> {
        let x = if denormalize {
            if !(0.0..=1.0).contains(&encoded) {
                return None;
            }
            if self.integral {
                (self.lower + encoded * self.range()).clamp(self.lower, self.upper)
            } else {
                self.denormalize(encoded)
            }
        } else {
            if !(self.lower..=self.upper).contains(&encoded) {
                return None;
            }
            encoded
        };

        let whole = self
            .integer_range()
            .map(|(first, last)| x.round().clamp(first, last));
        match whole {
            Some(n) if self.integral => Some(Value::Int(n as i64)),
            // construction guarantees an integer range for integral features
            None if self.integral => None,
            Some(n) if discretize => Some(Value::Float(n)),
            _ => Some(Value::Float(x)),
        }
    }
}

/// Whole numbers inside `[lower, upper]`, if there are any.
fn integer_range(lower: f64, upper: f64) -> Option<(f64, f64)> {
    let (first, last) = (lower.ceil(), upper.floor());
    (first <= last).then_some((first, last))
}

fn check_bounds(feature: &str, lower: f64, upper: f64, integral: bool) -> Result<()> {
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(FeatureError::construction(
            feature,
            format!("invalid bounds [{lower}, {upper}]"),
        ));
    }
    if integral && integer_range(lower, upper).is_none() {
        return Err(FeatureError::construction(
            feature,
            format!("no integer lies within bounds [{lower}, {upper}]"),
        ));
    }
    Ok(())
}

/// Rounds to `digits` significant decimal digits, going through the decimal form.
fn round_significant(x: f64, digits: usize) -> f64 {
    format!("{:.*e}", digits.saturating_sub(1), x)
        .parse()
        .unwrap_or(x)
}

const SIGN_BIT: u64 = 1 << 63;

/// Maps a float to an integer key with the same ordering.
fn float_key(x: f64) -> u64 {
    let bits = x.to_bits();
    if bits & SIGN_BIT == 0 {
        bits | SIGN_BIT
    } else {
        !bits
    }
}

fn float_from_key(key: u64) -> f64 {
    if key & SIGN_BIT == 0 {
        f64::from_bits(!key)
    } else {
        f64::from_bits(key & !SIGN_BIT)
    }
}

/// Serialized form of a [`Continuous`], re-validated on load.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct ContinuousState {
    meta: FeatureMeta,
    lower: f64,
    upper: f64,
    integral: bool,
    scale: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<ContinuousState> for Continuous {
    type Error = FeatureError;

    fn try_from(state: ContinuousState) -> Result<Self> {
        check_bounds(state.meta.name(), state.lower, state.upper, state.integral)?;
        crate::features::base::check_scale(state.meta.name(), state.scale)?;
        Ok(Self {
            meta: state.meta,
            lower: state.lower,
            upper: state.upper,
            integral: state.integral,
            scale: state.scale,
        })
    }
}

#[cfg(feature = "serde")]
impl From<Continuous> for ContinuousState {
    fn from(feature: Continuous) -> Self {
        Self {
            meta: feature.meta,
            lower: feature.lower,
            upper: feature.upper,
            integral: feature.integral,
            scale: feature.scale,
        }
    }
}

impl Feature for Continuous {
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
        reject_outside(self.meta.name(), values, |v| self.contains(v), || self.domain())?;

        Ok(Array2::from_shape_fn((values.len(), 1), |(i, _)| {
            // membership checked above
            let x = values[i].as_f64().unwrap_or(self.lower);
            if normalize {
                self.normalize(x)
            } else {
                x
            }
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
            match self.read(v, denormalize, discretize) {
                Some(value) => decoded.push(value),
                None => invalid.push(format!("{v:?}")),
            }
        }

        if !invalid.is_empty() {
            let expected = if denormalize {
                "normalized values in [0.0, 1.0]".to_string()
            } else {
                self.domain()
            };
            return Err(FeatureError::domain(self.meta.name(), invalid, expected));
        }

        Ok(into_series(self.meta.name(), decoded, return_series))
    }

    fn encode_value(&self, value: &Value) -> Result<f64> {
        match value.as_f64() {
            Some(x) if self.contains(value) => Ok(self.normalize(x)),
            _ => Err(FeatureError::domain(self.meta.name(), [value], self.domain())),
        }
    }

    fn validate_encoded(&self, encoded: f64) -> Result<f64> {
        if (0.0..=1.0).contains(&encoded) {
            Ok(encoded)
        } else {
            Err(FeatureError::domain(
                self.meta.name(),
                [format!("{encoded:?}")],
                "normalized values in [0.0, 1.0]",
            ))
        }
    }
}
