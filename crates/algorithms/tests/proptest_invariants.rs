use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use thermocurve_algorithms::differentiation::{
    central_difference, dtg, electrochemical_derivative, five_point_stencil, DtgParams,
    ElectrochemicalParams,
};
use thermocurve_algorithms::smoothing::moving_average;
use thermocurve_core::{Curve, Error};

const ABS_TOL: f64 = 1e-7;
const REL_TOL: f64 = 1e-9;

fn relative_close(actual: f64, expected: f64) -> bool {
    let diff = (actual - expected).abs();
    diff <= ABS_TOL || diff <= REL_TOL * (1.0 + expected.abs())
}

fn curve_from(values: Vec<f64>) -> Curve {
    Curve::sampled(0.0, 1.0, values.len(), |x| values[x as usize])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn dtg_output_length_is_n_minus_two_h(
        values in prop::collection::vec(-1.0e3..1.0e3f64, 3..200),
        h in 1usize..100,
    ) {
        let curve = curve_from(values);
        let n = curve.len();
        let result = dtg(&curve, DtgParams { half_window: h, window_time: 1.0 });
        if n >= 2 * h + 1 {
            prop_assert_eq!(result.map(|c| c.len()), Ok(n - 2 * h));
        } else {
            prop_assert_eq!(result, Err(Error::InsufficientData { got: n, min: 2 * h + 1 }));
        }
    }

    #[test]
    fn electrochemical_output_length(
        values in prop::collection::vec(-1.0e3..1.0e3f64, 0..120),
        w in 2usize..40,
    ) {
        let curve = curve_from(values);
        let n = curve.len();
        let params = ElectrochemicalParams { window_size: w, norm_factor: None };
        match electrochemical_derivative(&curve, params) {
            Ok(out) => {
                prop_assert!(n >= w + 1);
                prop_assert_eq!(out.len(), n - 2 * (w / 2) + 1);
            }
            Err(e) => {
                prop_assert!(n < w + 1);
                prop_assert_eq!(e, Error::InsufficientData { got: n, min: w + 1 });
            }
        }
    }

    #[test]
    fn central_difference_exact_on_lines(
        a in -50.0..50.0f64,
        b in -1.0e3..1.0e3f64,
        x0 in -100.0..100.0f64,
        step in 0.01..10.0f64,
        n in 3usize..150,
    ) {
        let curve = Curve::sampled(x0, step, n, |x| a * x + b);
        let result = central_difference(&curve).unwrap();
        prop_assert_eq!(result.len(), n - 2);
        for &v in result.y() {
            prop_assert!(relative_close(v, a), "slope {} estimated as {}", a, v);
        }
    }

    #[test]
    fn five_point_exact_on_lines(
        a in -50.0..50.0f64,
        b in -1.0e3..1.0e3f64,
        step in 0.01..10.0f64,
        n in 5usize..150,
    ) {
        let curve = Curve::sampled(0.0, step, n, |x| a * x + b);
        let result = five_point_stencil(&curve).unwrap();
        prop_assert_eq!(result.len(), n - 4);
        for &v in result.y() {
            prop_assert!(relative_close(v, a), "slope {} estimated as {}", a, v);
        }
    }

    #[test]
    fn moving_average_preserves_length_and_bounds(
        values in prop::collection::vec(-1.0e3..1.0e3f64, 1..200),
        window in 1usize..50,
    ) {
        let smoothed = moving_average(&values, window).unwrap();
        prop_assert_eq!(smoothed.len(), values.len());

        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for &v in &smoothed {
            prop_assert!(v >= lo - ABS_TOL && v <= hi + ABS_TOL);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn dtg_nan_reaches_only_windows_containing_it(
        values in prop::collection::vec(-1.0e3..1.0e3f64, 5..150),
        h in 1usize..10,
        bad in any::<prop::sample::Index>(),
    ) {
        prop_assume!(values.len() >= 2 * h + 1);
        let k = bad.index(values.len());
        let mut values = values;
        values[k] = f64::NAN;
        let curve = curve_from(values);

        let out = dtg(&curve, DtgParams { half_window: h, window_time: 1.0 }).unwrap();
        for (j, v) in out.y().iter().enumerate() {
            let center = j + h;
            let touches = k != center && k + h >= center && k <= center + h;
            prop_assert_eq!(v.is_nan(), touches, "center {} bad {}", center, k);
        }
    }

    #[test]
    fn moving_average_nan_reaches_only_windows_containing_it(
        values in prop::collection::vec(-1.0e3..1.0e3f64, 1..150),
        window in 1usize..15,
        bad in any::<prop::sample::Index>(),
    ) {
        let k = bad.index(values.len());
        let mut values = values;
        values[k] = f64::NAN;
        let half = window / 2;

        let out = moving_average(&values, window).unwrap();
        for (i, v) in out.iter().enumerate() {
            let touches = k + half >= i && k <= i + half;
            prop_assert_eq!(v.is_nan(), touches, "index {} bad {}", i, k);
        }
    }
}
