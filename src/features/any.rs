//! Closed union over every feature variant.
//!
//! Table containers store one [`AnyFeature`] per column, which gives them
//! owned, comparable and (with `serde`) serializable feature definitions without
//! trait objects.

use crate::error::Result;
use crate::features::base::{Feature, FeatureMeta};
use crate::features::{Binary, Categorical, Continuous, Ordinal};
use crate::types::{Series, Value};
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Any feature variant.
///
/// Equality is structural: features of different variants are never equal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnyFeature {
    /// Two-valued feature.
    Binary(Binary),
    /// Unordered finite domain.
    Categorical(Categorical),
    /// Ordered finite domain.
    Ordinal(Ordinal),
    /// Numeric interval.
    Continuous(Continuous),
}

macro_rules! dispatch {
    ($self:ident, $f:ident => $body:expr) => {
        match $self {
            AnyFeature::Binary($f) => $body,
            AnyFeature::Categorical($f) => $body,
            AnyFeature::Ordinal($f) => $body,
            AnyFeature::Continuous($f) => $body,
        }
    };
}

impl AnyFeature {
    /// Short lowercase name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            AnyFeature::Binary(_) => "binary",
            AnyFeature::Categorical(_) => "categorical",
            AnyFeature::Ordinal(_) => "ordinal",
            AnyFeature::Continuous(_) => "continuous",
        }
    }
}

impl Feature for AnyFeature {
    fn meta(&self) -> &FeatureMeta {
        dispatch!(self, f => f.meta())
    }

    fn scale_statistic(&self) -> f64 {
        dispatch!(self, f => f.scale_statistic())
    }

    fn encoding_width(&self, one_hot: bool) -> usize {
        dispatch!(self, f => f.encoding_width(one_hot))
    }

    fn encode_checked(
        &self,
        values: &[Value],
        normalize: bool,
        one_hot: bool,
    ) -> Result<Array2<f64>> {
        dispatch!(self, f => f.encode_checked(values, normalize, one_hot))
    }

    fn decode(
        &self,
        values: ArrayView2<'_, f64>,
        denormalize: bool,
        return_series: bool,
        discretize: bool,
    ) -> Result<Series> {
        dispatch!(self, f => f.decode(values, denormalize, return_series, discretize))
    }

    fn encode_value(&self, value: &Value) -> Result<f64> {
        dispatch!(self, f => f.encode_value(value))
    }

    fn validate_encoded(&self, encoded: f64) -> Result<f64> {
        dispatch!(self, f => f.validate_encoded(encoded))
    }

    fn allowed_encoded_change(&self, pre: f64, post: f64) -> bool {
        dispatch!(self, f => f.allowed_encoded_change(pre, post))
    }
}

impl From<Binary> for AnyFeature {
    fn from(feature: Binary) -> Self {
        AnyFeature::Binary(feature)
    }
}

impl From<Categorical> for AnyFeature {
    fn from(feature: Categorical) -> Self {
        AnyFeature::Categorical(feature)
    }
}

impl From<Ordinal> for AnyFeature {
    fn from(feature: Ordinal) -> Self {
        AnyFeature::Ordinal(feature)
    }
}

impl From<Continuous> for AnyFeature {
    fn from(feature: Continuous) -> Self {
        AnyFeature::Continuous(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{BinaryParams, CategoricalParams, RawData};
    use crate::types::Monotonicity;

    fn training() -> Vec<Value> {
        vec!["no".into(), "yes".into(), "yes".into()]
    }

    #[test]
    fn test_delegation() {
        let binary = Binary::new(
            RawData::from(&training()),
            BinaryParams {
                monotone: Monotonicity::Increasing,
                ..Default::default()
            },
        )
        .unwrap();
        let any = AnyFeature::from(binary.clone());

        assert_eq!(any.kind(), "binary");
        assert_eq!(any.scale_statistic(), binary.scale_statistic());
        assert_eq!(
            any.encode(RawData::from(&training()), true, true).unwrap(),
            binary.encode(RawData::from(&training()), true, true).unwrap()
        );
        // the binary-specific change table is used
        assert!(!any
            .allowed_change(&"yes".into(), &"no".into(), false)
            .unwrap());
    }

    #[test]
    fn test_cross_variant_inequality() {
        let binary =
            Binary::new(RawData::from(&training()), BinaryParams::default()).unwrap();
        let categorical =
            Categorical::new(RawData::from(&training()), CategoricalParams::default()).unwrap();

        // same domain and scale, different variant
        assert!((binary.scale_statistic() - categorical.scale_statistic()).abs() < 1e-12);
        assert_ne!(AnyFeature::from(binary), AnyFeature::from(categorical));
    }

    #[test]
    fn test_boxed_trait_objects() {
        let features: Vec<Box<dyn Feature + Send + Sync>> = vec![
            Box::new(Binary::new(RawData::from(&training()), BinaryParams::default()).unwrap()),
            Box::new(
                Categorical::new(RawData::from(&training()), CategoricalParams::default())
                    .unwrap(),
            ),
        ];
        let widths: Vec<usize> = features.iter().map(|f| f.encoding_width(true)).collect();
        assert_eq!(widths, vec![1, 2]);
    }
}
