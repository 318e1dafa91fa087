//! Built-in algorithm catalogue.
//!
//! Every entry reads `input.curve`, declares the keys it writes and an
//! `output` policy. [`crate::executor::BuiltinEngine`] implements them.

use crate::context::{
    INPUT_CURVE, RESULT_CURVE, RESULT_DERIVATIVE, RESULT_EXTREMA, RESULT_HALF_WINDOW, RESULT_MAX_POINT,
};
use crate::descriptor::{
    AlgoCategory, AlgorithmDescriptor, OutputPolicy, PointSelectionSpec, CURVE_HINT_KEY,
};
use crate::parameter::{DoubleConstraint, EnumOption, IntConstraint, ParamKind, ParamValue, ParameterDescriptor};
use crate::registry::DescriptorRegistry;

/// Helper: DTG half-window parameter.
fn param_half_window() -> ParameterDescriptor {
    ParameterDescriptor::integer("half_window", "Half window (samples)", IntConstraint::new(1, 200).with_step(1))
        .with_default(ParamValue::Integer(5))
}

/// Helper: DTG virtual step parameter.
fn param_window_time() -> ParameterDescriptor {
    ParameterDescriptor::double("window_time", "Window time", DoubleConstraint::new(1e-6, 1e6))
        .with_default(ParamValue::Double(1.0))
}

/// Helper: odd moving-average window.
fn param_odd_window(name: &str, label: &str) -> ParameterDescriptor {
    ParameterDescriptor::integer(name, label, IntConstraint::new(1, 101).with_step(2))
        .with_default(ParamValue::Integer(5))
}

/// Start of a catalogue entry: reads the input curve.
fn entry(name: &str, display_name: &str, category: AlgoCategory, description: &str) -> AlgorithmDescriptor {
    AlgorithmDescriptor::new(name, display_name, category)
        .with_description(description)
        .with_prerequisite(INPUT_CURVE)
}

/// Build the built-in catalogue.
pub fn builtin_descriptors() -> Vec<AlgorithmDescriptor> {
    vec![
        // ═══════════════════════════════════════════════════════
        // DERIVATIVE
        // ═══════════════════════════════════════════════════════
        entry("dtg", "DTG", AlgoCategory::Derivative, "Windowed central difference with a virtual time step")
            .with_parameter(param_half_window())
            .with_parameter(param_window_time())
            .with_produces(RESULT_DERIVATIVE)
            .with_output_policy(OutputPolicy::AppendCurve),
        entry(
            "electrochemical_derivative",
            "Electrochemical derivative",
            AlgoCategory::Derivative,
            "Asymmetric window difference with an empirical normalization factor",
        )
        .with_parameter(
            ParameterDescriptor::integer("window_size", "Window size (samples)", IntConstraint::new(2, 500))
                .with_default(ParamValue::Integer(10)),
        )
        // No default: an absent factor means (w − 1) / w for the chosen window.
        .with_parameter(ParameterDescriptor::double(
            "norm_factor",
            "Normalization factor",
            DoubleConstraint::new(0.0, 10.0),
        ))
        .with_produces(RESULT_DERIVATIVE)
        .with_output_policy(OutputPolicy::AppendCurve),
        entry(
            "central_difference",
            "Central difference",
            AlgoCategory::Derivative,
            "Second-order central difference on strictly increasing x",
        )
        .with_produces(RESULT_DERIVATIVE)
        .with_output_policy(OutputPolicy::AppendCurve),
        entry(
            "five_point_stencil",
            "Five-point stencil",
            AlgoCategory::Derivative,
            "Fourth-order five-point stencil on equally spaced x",
        )
        .with_produces(RESULT_DERIVATIVE)
        .with_output_policy(OutputPolicy::AppendCurve),
        entry(
            "adaptive_dtg",
            "Adaptive DTG",
            AlgoCategory::Derivative,
            "DTG with the half-window chosen from the estimated noise level",
        )
        .with_parameter(
            ParameterDescriptor::double_range(
                "window_range",
                "Half-window range (samples)",
                DoubleConstraint::new(1.0, 200.0),
            )
            .with_default(ParamValue::DoubleRange(1.0, 25.0)),
        )
        .with_parameter(ParameterDescriptor::double(
            "window_time",
            "Window time (blank = mean x step)",
            DoubleConstraint::new(1e-6, 1e6),
        ))
        .with_produces(RESULT_DERIVATIVE)
        .with_produces(RESULT_HALF_WINDOW)
        .with_output_policy(OutputPolicy::AppendCurve),
        entry(
            "smoothed_derivative",
            "Smoothed derivative",
            AlgoCategory::Derivative,
            "Moving-average smoothing followed by central difference",
        )
        .with_parameter(param_odd_window("smooth_window", "Smoothing window (samples)"))
        .with_produces(RESULT_DERIVATIVE)
        .with_output_policy(OutputPolicy::AppendCurve),
        entry(
            "blank_corrected_dtg",
            "Blank-corrected DTG",
            AlgoCategory::Derivative,
            "Subtract a blank run of equal length, then compute the DTG",
        )
        .with_parameter(param_half_window())
        .with_parameter(param_window_time())
        .with_curve_selection()
        .with_metadata(CURVE_HINT_KEY, "Select the blank (baseline) run")
        .with_produces(RESULT_DERIVATIVE)
        .with_output_policy(OutputPolicy::AppendCurve),
        // ═══════════════════════════════════════════════════════
        // SMOOTHING
        // ═══════════════════════════════════════════════════════
        entry("moving_average", "Moving average", AlgoCategory::Smoothing, "Centered moving average")
            .with_parameter(param_odd_window("window", "Window (samples)"))
            .with_produces(RESULT_CURVE)
            .with_output_policy(OutputPolicy::ReplaceCurve),
        // ═══════════════════════════════════════════════════════
        // FEATURES
        // ═══════════════════════════════════════════════════════
        entry(
            "dtg_extrema",
            "DTG peaks and valleys",
            AlgoCategory::Features,
            "DTG followed by thresholded peak/valley detection",
        )
        .with_parameter(param_half_window())
        .with_parameter(
            ParameterDescriptor::double(
                "threshold",
                "Relative threshold",
                DoubleConstraint::new(0.0, 1.0).with_step(0.01),
            )
            .with_default(ParamValue::Double(0.1)),
        )
        .with_parameter(
            ParameterDescriptor::new(
                "mode",
                "Report",
                ParamKind::Enum {
                    options: vec![
                        EnumOption::new("both", "Peaks and valleys"),
                        EnumOption::new("peaks", "Peaks only"),
                        EnumOption::new("valleys", "Valleys only"),
                    ],
                },
            )
            .with_default(ParamValue::Enum("both".into())),
        )
        .with_produces(RESULT_DERIVATIVE)
        .with_produces(RESULT_EXTREMA)
        .with_output_policy(OutputPolicy::AppendCurve),
        entry(
            "max_rate_in_range",
            "Maximum rate in range",
            AlgoCategory::Features,
            "DTG of the range between two picked points and its largest-magnitude sample",
        )
        .with_parameter(ParameterDescriptor::points_on_chart("range", "Range"))
        .with_parameter(param_half_window())
        .with_point_selection(PointSelectionSpec::exactly(2).with_hint("Pick the start and end of the range"))
        .with_interaction_order(["points", "parameters"])
        .with_produces(RESULT_DERIVATIVE)
        .with_produces(RESULT_MAX_POINT)
        .with_output_policy(OutputPolicy::AppendCurve),
    ]
}

/// Registry holding the built-in catalogue.
pub fn default_registry() -> DescriptorRegistry {
    let mut registry = DescriptorRegistry::new();
    for descriptor in builtin_descriptors() {
        registry.register(descriptor);
    }
    registry
}
