//! Engine for the built-in catalogue.
//!
//! Dispatches on the descriptor name, reads parameters from the context and
//! calls the estimators in `thermocurve-algorithms`.

use thermocurve_algorithms::differentiation::{
    adaptive_dtg, central_difference, dtg, electrochemical_derivative, find_max_derivative_point,
    five_point_stencil, smoothed_derivative, AdaptiveParams, DtgParams, ElectrochemicalParams,
    SmoothedDerivativeParams,
};
use thermocurve_algorithms::extrema::{find_extrema, ExtremaParams};
use thermocurve_algorithms::smoothing::{smooth_curve, SmoothingParams};
use thermocurve_core::{Curve, Error, Result};
use tracing::info;

use crate::context::{
    ExecutionContext, INPUT_CURVE, POINTS, RESULT_CURVE, RESULT_DERIVATIVE, RESULT_EXTREMA,
    RESULT_HALF_WINDOW, RESULT_MAX_POINT, SELECTED_CURVE,
};
use crate::coordinator::AnalysisEngine;
use crate::descriptor::AlgorithmDescriptor;

/// Runs every algorithm of [`crate::builtin::builtin_descriptors`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngine;

impl AnalysisEngine for BuiltinEngine {
    fn run(&self, descriptor: &AlgorithmDescriptor, ctx: &ExecutionContext) -> Result<ExecutionContext> {
        info!(algorithm = %descriptor.name, "running built-in algorithm");

        let input = ctx.curve(INPUT_CURVE)?;
        let mut out = ExecutionContext::new();

        match descriptor.name.as_str() {
            "dtg" => {
                out.insert(RESULT_DERIVATIVE, dtg(input, dtg_params(ctx)?)?);
            }

            "electrochemical_derivative" => {
                let params = ElectrochemicalParams {
                    window_size: usize_param(ctx, "window_size", 10)?,
                    norm_factor: opt_f64_param(ctx, "norm_factor")?,
                };
                out.insert(RESULT_DERIVATIVE, electrochemical_derivative(input, params)?);
            }

            "central_difference" => {
                out.insert(RESULT_DERIVATIVE, central_difference(input)?);
            }

            "five_point_stencil" => {
                out.insert(RESULT_DERIVATIVE, five_point_stencil(input)?);
            }

            "adaptive_dtg" => {
                let defaults = AdaptiveParams::default();
                let (min_half_window, max_half_window) = match ctx.param_opt("window_range") {
                    Some(v) => {
                        let (lo, hi) = v.as_range().ok_or_else(|| type_error("window_range", "a range", v))?;
                        (half_window_from(lo)?, half_window_from(hi)?)
                    }
                    None => (defaults.min_half_window, defaults.max_half_window),
                };
                let result = adaptive_dtg(
                    input,
                    AdaptiveParams {
                        min_half_window,
                        max_half_window,
                        window_time: opt_f64_param(ctx, "window_time")?,
                    },
                )?;
                out.insert(RESULT_DERIVATIVE, result.curve);
                out.insert(RESULT_HALF_WINDOW, result.half_window);
            }

            "smoothed_derivative" => {
                let params = SmoothedDerivativeParams {
                    smooth_window: usize_param(ctx, "smooth_window", 5)?,
                };
                out.insert(RESULT_DERIVATIVE, smoothed_derivative(input, params)?);
            }

            "moving_average" => {
                let params = SmoothingParams {
                    window: usize_param(ctx, "window", 5)?,
                };
                out.insert(RESULT_CURVE, smooth_curve(input, params)?);
            }

            "dtg_extrema" => {
                let derivative = dtg(input, dtg_params(ctx)?)?;
                let threshold = opt_f64_param(ctx, "threshold")?.unwrap_or(ExtremaParams::default().threshold);
                let mut extrema = find_extrema(&derivative, ExtremaParams { threshold })?;

                let mode = match ctx.param_opt("mode") {
                    Some(v) => v.as_enum().ok_or_else(|| type_error("mode", "an option", v))?,
                    None => "both",
                };
                match mode {
                    "both" => {}
                    "peaks" => extrema.valleys.clear(),
                    "valleys" => extrema.peaks.clear(),
                    other => {
                        return Err(Error::validation(format!("unknown extrema mode `{}`", other)));
                    }
                }

                out.insert(RESULT_DERIVATIVE, derivative);
                out.insert(RESULT_EXTREMA, extrema);
            }

            "max_rate_in_range" => {
                let points = ctx.points(POINTS)?;
                if points.len() != 2 {
                    return Err(Error::validation(format!(
                        "range needs exactly two points, got {}",
                        points.len()
                    )));
                }
                let window = input.slice_x_range(points[0].x, points[1].x);
                let derivative = dtg(&window, dtg_params(ctx)?)?;
                let max = find_max_derivative_point(&derivative)
                    .ok_or_else(|| Error::Algorithm("derivative has no finite samples in range".into()))?;

                out.insert(RESULT_DERIVATIVE, derivative);
                out.insert(RESULT_MAX_POINT, max);
            }

            "blank_corrected_dtg" => {
                let corrected = subtract_blank(input, ctx.curve(SELECTED_CURVE)?)?;
                out.insert(RESULT_DERIVATIVE, dtg(&corrected, dtg_params(ctx)?)?);
            }

            other => {
                return Err(Error::NotFound {
                    name: other.to_string(),
                })
            }
        }

        Ok(out)
    }
}

/// DTG parameters, falling back to [`DtgParams::default`] for absent keys.
fn dtg_params(ctx: &ExecutionContext) -> Result<DtgParams> {
    let defaults = DtgParams::default();
    Ok(DtgParams {
        half_window: usize_param(ctx, "half_window", defaults.half_window)?,
        window_time: opt_f64_param(ctx, "window_time")?.unwrap_or(defaults.window_time),
    })
}

fn usize_param(ctx: &ExecutionContext, name: &str, default: usize) -> Result<usize> {
    match ctx.param_opt(name) {
        Some(v) => v.as_usize().ok_or_else(|| type_error(name, "a non-negative integer", v)),
        None => Ok(default),
    }
}

fn opt_f64_param(ctx: &ExecutionContext, name: &str) -> Result<Option<f64>> {
    ctx.param_opt(name)
        .map(|v| v.as_f64().ok_or_else(|| type_error(name, "a double", v)))
        .transpose()
}

fn half_window_from(v: f64) -> Result<usize> {
    if !(v >= 1.0) || !v.is_finite() {
        return Err(Error::validation(format!("window range bound {} must be >= 1", v)));
    }
    Ok(v.round() as usize)
}

fn type_error(name: &str, expected: &str, found: &crate::parameter::ParamValue) -> Error {
    Error::validation(format!("parameter `{}` must be {}, got {}", name, expected, found))
}

/// Point-wise `input − blank`; both curves must have the same length.
fn subtract_blank(input: &Curve, blank: &Curve) -> Result<Curve> {
    if input.len() != blank.len() {
        return Err(Error::validation(format!(
            "blank has {} samples, input has {}",
            blank.len(),
            input.len()
        )));
    }
    let y = input.y().iter().zip(blank.y()).map(|(a, b)| a - b).collect();
    input.with_y(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::default_registry;
    use crate::context::param_key;
    use crate::parameter::ParamValue;
    use thermocurve_core::Sample;

    fn ramp(n: usize) -> Curve {
        Curve::sampled(0.0, 1.0, n, |x| 2.0 * x)
    }

    fn context(curve: Curve, params: &[(&str, ParamValue)]) -> ExecutionContext {
        let mut ctx = ExecutionContext::with_input(curve);
        for (name, value) in params {
            ctx.insert(param_key(name), value.clone());
        }
        ctx
    }

    #[test]
    fn test_dtg_dispatch() {
        let registry = default_registry();
        let ctx = context(
            ramp(20),
            &[("half_window", ParamValue::Integer(2)), ("window_time", ParamValue::Double(1.0))],
        );
        let out = BuiltinEngine.run(registry.get("dtg").unwrap(), &ctx).unwrap();
        let d = out.curve(RESULT_DERIVATIVE).unwrap();
        assert_eq!(d.len(), 16);
        // slope 2, h = 2: window difference 2·h(h+1) = 12, divided by h
        assert!((d.y()[0] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_name() {
        let d = AlgorithmDescriptor::new("nope", "Nope", crate::descriptor::AlgoCategory::Derivative);
        let err = BuiltinEngine.run(&d, &context(ramp(10), &[])).unwrap_err();
        assert_eq!(err, Error::NotFound { name: "nope".into() });
    }

    #[test]
    fn test_missing_input_curve() {
        let registry = default_registry();
        let err = BuiltinEngine
            .run(registry.get("central_difference").unwrap(), &ExecutionContext::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_adaptive_reports_window() {
        let registry = default_registry();
        let ctx = context(ramp(50), &[("window_range", ParamValue::DoubleRange(2.0, 10.0))]);
        let out = BuiltinEngine.run(registry.get("adaptive_dtg").unwrap(), &ctx).unwrap();
        let h = *out.count(RESULT_HALF_WINDOW).unwrap();
        assert!((2..=10).contains(&h));
        assert_eq!(out.curve(RESULT_DERIVATIVE).unwrap().len(), 50 - 2 * h);
    }

    #[test]
    fn test_extrema_mode_filters() {
        let registry = default_registry();
        let wave = Curve::sampled(0.0, 0.1, 200, |x| x.sin());
        let ctx = context(
            wave,
            &[
                ("half_window", ParamValue::Integer(2)),
                ("threshold", ParamValue::Double(0.1)),
                ("mode", ParamValue::Enum("peaks".into())),
            ],
        );
        let out = BuiltinEngine.run(registry.get("dtg_extrema").unwrap(), &ctx).unwrap();
        let extrema = out.extrema(RESULT_EXTREMA).unwrap();
        assert!(!extrema.peaks.is_empty());
        assert!(extrema.valleys.is_empty());
    }

    #[test]
    fn test_max_rate_in_range() {
        let registry = default_registry();
        // Steepest descent of cos is at x = π/2
        let curve = Curve::sampled(0.0, 0.01, 400, |x| x.cos());
        let mut ctx = context(curve, &[("half_window", ParamValue::Integer(1))]);
        ctx.insert(POINTS, vec![Sample::new(2.5, 0.0), Sample::new(0.5, 0.0)]);

        let out = BuiltinEngine.run(registry.get("max_rate_in_range").unwrap(), &ctx).unwrap();
        let max = out.sample(RESULT_MAX_POINT).unwrap();
        assert!((max.x - std::f64::consts::FRAC_PI_2).abs() < 0.02, "x = {}", max.x);
        assert!(max.y < 0.0);
    }

    #[test]
    fn test_blank_correction() {
        let registry = default_registry();
        let mut ctx = context(Curve::sampled(0.0, 1.0, 30, |x| 3.0 * x + 1.0), &[]);
        ctx.insert(SELECTED_CURVE, Curve::sampled(0.0, 1.0, 30, |x| x + 1.0));

        let out = BuiltinEngine.run(registry.get("blank_corrected_dtg").unwrap(), &ctx).unwrap();
        // (3x + 1) − (x + 1) = 2x; default h = 5, window_time = 1 gives 2·(h + 1)
        for &v in out.curve(RESULT_DERIVATIVE).unwrap().y() {
            assert!((v - 12.0).abs() < 1e-9, "got {}", v);
        }

        ctx.insert(SELECTED_CURVE, Curve::sampled(0.0, 1.0, 29, |x| x));
        assert!(BuiltinEngine.run(registry.get("blank_corrected_dtg").unwrap(), &ctx).is_err());
    }
}
