//! Behavioural and property-based tests for the feature family.
//!
//! These tests pin down the laws every feature must satisfy: round-trip
//! correctness, domain rejection, width consistency and the change-legality
//! rules under each monotonicity policy.
//!
//! Run with: `cargo test --test feature_properties`

use feature_domain::prelude::*;
use feature_domain::FeatureError;
use ndarray::arr2;
use proptest::prelude::*;

fn labels(names: &[&str]) -> Vec<Value> {
    names.iter().map(|&n| Value::from(n)).collect()
}

fn yes_no(monotone: Monotonicity, modifiable: bool) -> Binary {
    Binary::new(
        RawData::from(&labels(&["no", "yes", "yes", "no"])),
        BinaryParams {
            name: Some("approved".to_string()),
            monotone,
            modifiable,
            ..Default::default()
        },
    )
    .unwrap()
}

// =============================================================================
// BINARY SCENARIOS
// =============================================================================

mod binary_scenarios {
    use super::*;

    #[test]
    fn test_encode_scenario() {
        let f = yes_no(Monotonicity::None, true);
        let encoded = f
            .encode(RawData::from(&labels(&["no", "yes", "yes"])), true, true)
            .unwrap();
        assert_eq!(encoded, arr2(&[[0.0], [1.0], [1.0]]));
    }

    #[test]
    fn test_decode_scenario() {
        let f = yes_no(Monotonicity::None, true);
        let decoded = f
            .decode(arr2(&[[0.0], [1.0]]).view(), true, false, false)
            .unwrap();
        assert_eq!(decoded.values(), labels(&["no", "yes"]).as_slice());
    }

    #[test]
    fn test_unknown_value_scenario() {
        let f = yes_no(Monotonicity::None, true);
        let err = f
            .encode(RawData::from(&labels(&["maybe"])), true, true)
            .unwrap_err();
        assert!(matches!(err, FeatureError::Domain { .. }));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_increasing_scenario() {
        let f = yes_no(Monotonicity::Increasing, true);
        let (no, yes) = (Value::from("no"), Value::from("yes"));
        assert!(f.allowed_change(&no, &yes, false).unwrap());
        assert!(!f.allowed_change(&yes, &no, false).unwrap());
        assert!(f.allowed_change(&no, &no, false).unwrap());
    }

    #[test]
    fn test_not_modifiable_scenario() {
        let f = yes_no(Monotonicity::None, false);
        let (no, yes) = (Value::from("no"), Value::from("yes"));
        assert!(!f.allowed_change(&no, &yes, false).unwrap());
        assert!(f.allowed_change(&yes, &yes, false).unwrap());
    }

    #[test]
    fn test_width_scenario() {
        let f = yes_no(Monotonicity::None, true);
        assert_eq!(f.encoding_width(true), 1);
        assert_eq!(f.encoding_width(false), 1);
    }

    #[test]
    fn test_column_shaped_input() {
        let f = yes_no(Monotonicity::None, true);
        let column = arr2(&[[Value::from("yes")], [Value::from("no")]]);
        let encoded = f.encode(RawData::from(column.view()), true, true).unwrap();
        assert_eq!(encoded, arr2(&[[1.0], [0.0]]));

        let wide = arr2(&[[Value::from("yes"), Value::from("no")]]);
        assert!(matches!(
            f.encode(RawData::from(wide.view()), true, true),
            Err(FeatureError::Shape { .. })
        ));
    }

    #[test]
    fn test_name_from_series() {
        let series = Series::new("approved", labels(&["no", "yes"]));
        let inherited = Binary::new(RawData::from(&series), BinaryParams::default()).unwrap();
        assert_eq!(inherited.name(), "approved");

        let explicit = Binary::new(
            RawData::from(series.values()),
            BinaryParams {
                name: Some("approved".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(inherited, explicit);
    }

    #[test]
    fn test_shared_across_threads() {
        let feature = yes_no(Monotonicity::Increasing, true);
        let values = labels(&["no", "yes", "no"]);
        let (f, values) = (&feature, &values);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || f.encode(RawData::from(values), true, true).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), arr2(&[[0.0], [1.0], [0.0]]));
            }
        });
    }
}

// =============================================================================
// MIXED FEATURE TABLE
// =============================================================================

mod mixed_features {
    use super::*;

    fn table() -> Vec<AnyFeature> {
        let ages = vec![Value::Int(18), Value::Int(40), Value::Int(65)];
        let sizes = labels(&["s", "m", "l"]);
        let colors = labels(&["red", "green", "blue"]);

        vec![
            yes_no(Monotonicity::Increasing, true).into(),
            Continuous::new(
                RawData::from(&ages),
                ContinuousParams {
                    name: Some("age".to_string()),
                    monotone: Monotonicity::Increasing,
                    ..Default::default()
                },
            )
            .unwrap()
            .into(),
            Ordinal::new(
                RawData::from(&sizes),
                OrdinalParams {
                    value_names: Some(labels(&["s", "m", "l"])),
                    ..Default::default()
                },
            )
            .unwrap()
            .into(),
            Categorical::new(
                RawData::from(&colors),
                CategoricalParams {
                    modifiable: false,
                    ..Default::default()
                },
            )
            .unwrap()
            .into(),
        ]
    }

    #[test]
    fn test_total_width() {
        let features = table();
        let one_hot: usize = features.iter().map(|f| f.encoding_width(true)).sum();
        let compact: usize = features.iter().map(|f| f.encoding_width(false)).sum();
        assert_eq!(one_hot, 1 + 1 + 1 + 3);
        assert_eq!(compact, 4);
    }

    #[test]
    fn test_scale_statistics_non_negative() {
        for feature in table() {
            assert!(feature.scale_statistic() >= 0.0, "{}", feature.name());
        }
    }

    #[test]
    fn test_age_cannot_decrease() {
        let features = table();
        let age = &features[1];
        assert!(age
            .allowed_change(&Value::Int(30), &Value::Int(31), false)
            .unwrap());
        assert!(!age
            .allowed_change(&Value::Int(31), &Value::Int(30), false)
            .unwrap());
        assert!(age
            .allowed_change(&Value::Int(10), &Value::Int(30), false)
            .is_err());
    }

    #[test]
    fn test_rebuilt_table_is_equal() {
        assert_eq!(table(), table());
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// Builds a domain `c0..c{k}` and a training sample that covers every value.
fn categorical_sample(k: usize, picks: &[usize]) -> (Vec<Value>, Vec<Value>) {
    let domain: Vec<Value> = (0..k).map(|i| Value::from(format!("c{i}"))).collect();
    let mut training = domain.clone();
    training.extend(picks.iter().map(|&p| domain[p % k].clone()));
    (domain, training)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_binary_roundtrip(
        picks in proptest::collection::vec(any::<bool>(), 1..60),
        a in "[a-m]{1,4}",
        b in "[n-z]{1,4}",
    ) {
        let mut training = vec![Value::from(a.as_str()), Value::from(b.as_str())];
        training.extend(picks.iter().map(|&p| if p { Value::from(a.as_str()) } else { Value::from(b.as_str()) }));
        let f = Binary::new(RawData::from(&training), BinaryParams::default()).unwrap();

        let encoded = f.encode(RawData::from(&training), true, true).unwrap();
        prop_assert_eq!(encoded.ncols(), f.encoding_width(true));
        prop_assert_eq!(encoded.nrows(), training.len());

        let decoded = f.decode(encoded.view(), true, true, false).unwrap();
        prop_assert_eq!(decoded.values(), training.as_slice());
    }

    #[test]
    fn prop_binary_rejects_outside_values(unknown in "[0-9]{1,5}") {
        let f = yes_no(Monotonicity::None, true);
        let values = vec![Value::from("yes"), Value::from(unknown.as_str())];
        let is_domain_error = matches!(
            f.encode(RawData::from(&values), true, true),
            Err(FeatureError::Domain { .. })
        );
        prop_assert!(is_domain_error);
    }

    #[test]
    fn prop_binary_decode_rejects_non_binary(v in any::<f64>()) {
        prop_assume!(v != 0.0 && v != 1.0);
        let f = yes_no(Monotonicity::None, true);
        let is_domain_error = matches!(
            f.decode(arr2(&[[v]]).view(), true, true, false),
            Err(FeatureError::Domain { .. })
        );
        prop_assert!(is_domain_error);
    }

    #[test]
    fn prop_categorical_roundtrip(
        k in 1usize..8,
        picks in proptest::collection::vec(0usize..64, 0..40),
        one_hot in any::<bool>(),
    ) {
        let (_, training) = categorical_sample(k, &picks);
        let f = Categorical::new(RawData::from(&training), CategoricalParams::default()).unwrap();

        let encoded = f.encode(RawData::from(&training), true, one_hot).unwrap();
        prop_assert_eq!(encoded.ncols(), f.encoding_width(one_hot));

        let decoded = f.decode(encoded.view(), true, false, false).unwrap();
        prop_assert_eq!(decoded.values(), training.as_slice());
    }

    #[test]
    fn prop_ordinal_roundtrip(
        k in 1usize..12,
        picks in proptest::collection::vec(0usize..64, 0..40),
        normalize in any::<bool>(),
    ) {
        let (domain, training) = categorical_sample(k, &picks);
        let f = Ordinal::new(
            RawData::from(&training),
            OrdinalParams { value_names: Some(domain), ..Default::default() },
        )
        .unwrap();

        let encoded = f.encode(RawData::from(&training), normalize, false).unwrap();
        prop_assert_eq!(encoded.ncols(), 1);

        let decoded = f.decode(encoded.view(), normalize, false, false).unwrap();
        prop_assert_eq!(decoded.values(), training.as_slice());
    }

    #[test]
    fn prop_integral_continuous_roundtrip(
        values in proptest::collection::vec(-10_000i64..10_000, 1..50),
    ) {
        let training: Vec<Value> = values.iter().map(|&v| Value::Int(v)).collect();
        let f = Continuous::new(RawData::from(&training), ContinuousParams::default()).unwrap();

        for normalize in [true, false] {
            let encoded = f.encode(RawData::from(&training), normalize, true).unwrap();
            let decoded = f.decode(encoded.view(), normalize, false, false).unwrap();
            prop_assert_eq!(decoded.values(), training.as_slice());
        }
    }

    #[test]
    fn prop_float_continuous_raw_roundtrip(
        values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..50),
    ) {
        let training: Vec<Value> = values.iter().map(|&v| Value::Float(v)).collect();
        let f = Continuous::new(RawData::from(&training), ContinuousParams::default()).unwrap();

        let raw = f.encode(RawData::from(&training), false, true).unwrap();
        let decoded = f.decode(raw.view(), false, false, false).unwrap();
        prop_assert_eq!(decoded.values(), training.as_slice());

        // min-max scaling is many-to-one over arbitrary floats; decoding must
        // land on a value with exactly the same encoding
        let normalized = f.encode(RawData::from(&training), true, true).unwrap();
        prop_assert!(normalized.iter().all(|v| (0.0..=1.0).contains(v)));
        let decoded = f.decode(normalized.view(), true, false, false).unwrap();
        let reencoded = f.encode(RawData::from(decoded.values()), true, true).unwrap();
        prop_assert_eq!(reencoded, normalized);
    }

    #[test]
    fn prop_decimal_continuous_roundtrip(
        millis in proptest::collection::vec(-1_000_000_000i64..1_000_000_000, 1..50),
        with_zero in any::<bool>(),
    ) {
        let mut training: Vec<Value> = millis.iter().map(|&m| Value::Float(m as f64 / 1000.0)).collect();
        if with_zero {
            training.push(Value::Float(0.0));
        }
        let f = Continuous::new(RawData::from(&training), ContinuousParams::default()).unwrap();

        let encoded = f.encode(RawData::from(&training), true, true).unwrap();
        let decoded = f.decode(encoded.view(), true, false, false).unwrap();
        prop_assert_eq!(decoded.values(), training.as_slice());
    }

    #[test]
    fn prop_none_monotonicity_is_symmetric(
        k in 1usize..6,
        a in 0usize..6,
        b in 0usize..6,
    ) {
        let (domain, training) = categorical_sample(k, &[]);
        let (a, b) = (&domain[a % k], &domain[b % k]);

        let categorical = Categorical::new(RawData::from(&training), CategoricalParams::default()).unwrap();
        let ordinal = Ordinal::new(RawData::from(&training), OrdinalParams::default()).unwrap();

        for feature in [&categorical as &dyn Feature, &ordinal as &dyn Feature] {
            prop_assert!(feature.allowed_change(a, b, false).unwrap());
            prop_assert!(feature.allowed_change(b, a, false).unwrap());
        }
    }

    #[test]
    fn prop_not_modifiable_means_frozen(
        a in 0i64..100,
        b in 0i64..100,
        monotone in prop_oneof![
            Just(Monotonicity::None),
            Just(Monotonicity::Increasing),
            Just(Monotonicity::Decreasing),
        ],
    ) {
        let training = vec![Value::Int(0), Value::Int(99)];
        let continuous = Continuous::new(
            RawData::from(&training),
            ContinuousParams { monotone, modifiable: false, ..Default::default() },
        )
        .unwrap();
        let ordinal = Ordinal::new(
            RawData::from(&(0..100).map(Value::Int).collect::<Vec<_>>()),
            OrdinalParams { monotone, modifiable: false, ..Default::default() },
        )
        .unwrap();

        let (a, b) = (Value::Int(a), Value::Int(b));
        prop_assert_eq!(continuous.allowed_change(&a, &b, false).unwrap(), a == b);
        prop_assert_eq!(ordinal.allowed_change(&a, &b, false).unwrap(), a == b);
    }

    #[test]
    fn prop_increasing_matches_order(a in 0i64..20, b in 0i64..20) {
        let levels: Vec<Value> = (0..20).map(Value::Int).collect();
        let ordinal = Ordinal::new(
            RawData::from(&levels),
            OrdinalParams { monotone: Monotonicity::Increasing, ..Default::default() },
        )
        .unwrap();
        prop_assert_eq!(
            ordinal.allowed_change(&Value::Int(a), &Value::Int(b), false).unwrap(),
            b >= a
        );
    }

    #[test]
    fn prop_equality_tracks_every_field(
        picks in proptest::collection::vec(any::<bool>(), 1..30),
    ) {
        let mut training = labels(&["no", "yes"]);
        training.extend(picks.iter().map(|&p| Value::from(if p { "yes" } else { "no" })));
        let build = |name: &str, monotone: Monotonicity, modifiable: bool| {
            Binary::new(
                RawData::from(&training),
                BinaryParams { name: Some(name.to_string()), monotone, modifiable, ..Default::default() },
            )
            .unwrap()
        };

        let base = build("f", Monotonicity::None, true);
        let with_domain = |names: [&str; 2]| {
            Binary::new(
                RawData::from(&training),
                BinaryParams {
                    value_names: Some([Value::from(names[0]), Value::from(names[1])]),
                    name: Some("f".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
        };
        prop_assert_eq!(&base, &with_domain(["no", "yes"]));
        prop_assert_ne!(&base, &with_domain(["yes", "no"]));
        prop_assert_eq!(&base, &build("f", Monotonicity::None, true));
        prop_assert_ne!(&base, &build("g", Monotonicity::None, true));
        prop_assert_ne!(&base, &build("f", Monotonicity::Decreasing, true));
        prop_assert_ne!(&base, &build("f", Monotonicity::None, false));
    }
}
