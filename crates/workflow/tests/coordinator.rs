//! Coordinator behaviour driven through providers and engines

use std::collections::HashMap;

use thermocurve_workflow::prelude::*;
use thermocurve_workflow::{AnalysisMessage, LogLevel};

fn points_only() -> AlgorithmDescriptor {
    AlgorithmDescriptor::new("two_points", "Two points", AlgoCategory::Features)
        .with_point_selection(PointSelectionSpec::exactly(2))
        .with_prerequisite(INPUT_CURVE)
}

fn no_output(_: &AlgorithmDescriptor, _: &ExecutionContext) -> Result<ExecutionContext> {
    Ok(ExecutionContext::new())
}

fn picks(n: usize) -> Vec<Sample> {
    (0..n).map(|i| Sample::new(i as f64, 0.0)).collect()
}

fn tg_curve() -> Curve {
    Curve::sampled(30.0, 1.0, 300, |t| 100.0 - 25.0 / (1.0 + (-(t - 180.0) / 10.0).exp()))
}

#[test]
fn registry_keeps_last_registration() {
    let mut registry = DescriptorRegistry::new();
    registry.register(AlgorithmDescriptor::new("dtg", "First", AlgoCategory::Derivative));
    assert!(registry.has("dtg"));
    registry.register(AlgorithmDescriptor::new("dtg", "Second", AlgoCategory::Derivative));
    assert!(registry.has("dtg"));
    assert_eq!(registry.get("dtg").unwrap().display_name, "Second");
}

#[test]
fn points_only_descriptor_runs_exactly_the_points_stage() {
    let d = points_only();

    let mut c = InteractionCoordinator::new(&d);
    assert_eq!(c.start(&ExecutionContext::new()).unwrap(), Some(InteractionStage::Points));
    assert_eq!(c.stages(), &[InteractionStage::Points]);
    assert_eq!(c.submit(StageInput::Points(picks(2))).unwrap(), None);
    c.execute(&no_output).unwrap();
    assert_eq!(c.state(), &CoordinatorState::Completed);

    for n in [1, 3] {
        let mut c = InteractionCoordinator::new(&d);
        c.start(&ExecutionContext::new()).unwrap();
        assert!(matches!(c.submit(StageInput::Points(picks(n))), Err(Error::Validation(_))));
        assert!(matches!(c.state(), CoordinatorState::Failed(_)));
    }
}

#[test]
fn provider_sees_stages_in_declared_order() {
    let d = AlgorithmDescriptor::new("ordered", "Ordered", AlgoCategory::Features)
        .with_parameter(
            ParameterDescriptor::new("label", "Label", thermocurve_workflow::ParamKind::String)
                .with_default(ParamValue::String("x".into())),
        )
        .with_point_selection(PointSelectionSpec::new(1, None))
        .with_curve_selection()
        .with_interaction_order(["curve", "points", "parameters"]);

    let mut seen = Vec::new();
    let mut provider = |request: &StageRequest| {
        seen.push(request.stage());
        Some(match request {
            StageRequest::Parameters(_) => StageInput::Parameters(HashMap::new()),
            StageRequest::Points(_) => StageInput::Points(picks(4)),
            StageRequest::Curve { .. } => {
                StageInput::Curve(vec![CurveChoice::new("blank", Curve::sampled(0.0, 1.0, 3, |x| x))])
            }
        })
    };

    let ctx = InteractionCoordinator::new(&d)
        .run(&mut provider, &no_output, &ExecutionContext::new())
        .unwrap();
    assert_eq!(
        seen,
        vec![InteractionStage::Curve, InteractionStage::Points, InteractionStage::Parameters]
    );
    assert_eq!(ctx.curve_ref(SELECTED_CURVE_ID).unwrap(), "blank");
    assert_eq!(ctx.curve(SELECTED_CURVE).unwrap().len(), 3);
    assert_eq!(ctx.points(POINTS).unwrap().len(), 4);
    assert_eq!(ctx.param("label").unwrap(), &ParamValue::String("x".into()));
}

#[test]
fn curve_stage_requires_exactly_one_choice() {
    let d = AlgorithmDescriptor::new("c", "C", AlgoCategory::Derivative).with_curve_selection();

    let mut c = InteractionCoordinator::new(&d);
    c.start(&ExecutionContext::new()).unwrap();
    assert!(c.submit(StageInput::Curve(vec![])).is_err());

    let two = vec![
        CurveChoice::new("a", Curve::new()),
        CurveChoice::new("b", Curve::new()),
    ];
    let mut c = InteractionCoordinator::new(&d);
    c.start(&ExecutionContext::new()).unwrap();
    assert!(c.submit(StageInput::Curve(two)).is_err());
}

#[test]
fn declining_a_stage_cancels() {
    let mut decline = |_: &StageRequest| -> Option<StageInput> { None };
    let mut c = InteractionCoordinator::new(&points_only());
    let err = c.run(&mut decline, &no_output, &ExecutionContext::new()).unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(matches!(c.state(), CoordinatorState::Failed(Error::Cancelled(_))));
}

#[test]
fn missing_declared_output_fails() {
    let d = AlgorithmDescriptor::new("m", "M", AlgoCategory::Derivative)
        .with_produces(RESULT_DERIVATIVE)
        .with_produces(RESULT_EXTREMA);
    let partial = |_: &AlgorithmDescriptor, _: &ExecutionContext| -> Result<ExecutionContext> {
        let mut out = ExecutionContext::new();
        out.insert(RESULT_DERIVATIVE, Curve::new());
        Ok(out)
    };

    let mut c = InteractionCoordinator::new(&d);
    c.start(&ExecutionContext::new()).unwrap();
    let err = c.execute(&partial).unwrap_err();
    assert!(matches!(err, Error::Algorithm(ref m) if m.contains("result.extrema")), "{}", err);
}

#[test]
fn undeclared_output_is_dropped() {
    let d = AlgorithmDescriptor::new("u", "U", AlgoCategory::Derivative).with_produces(RESULT_DERIVATIVE);
    let chatty = |_: &AlgorithmDescriptor, _: &ExecutionContext| -> Result<ExecutionContext> {
        let mut out = ExecutionContext::new();
        out.insert(RESULT_DERIVATIVE, Curve::new());
        out.insert("debug.scratch", 3usize);
        Ok(out)
    };

    let mut c = InteractionCoordinator::new(&d);
    c.start(&ExecutionContext::new()).unwrap();
    let ctx = c.execute(&chatty).unwrap();
    assert!(ctx.contains(RESULT_DERIVATIVE));
    assert!(!ctx.contains("debug.scratch"));
}

#[test]
fn only_declared_prerequisites_are_carried() {
    let d = AlgorithmDescriptor::new("p", "P", AlgoCategory::Derivative).with_prerequisite(INPUT_CURVE);
    let mut inbound = ExecutionContext::with_input(Curve::sampled(0.0, 1.0, 4, |x| x));
    inbound.insert("unrelated", 1usize);

    let mut c = InteractionCoordinator::new(&d);
    c.start(&inbound).unwrap();
    let ctx = c.execute(&no_output).unwrap();
    assert!(ctx.contains(INPUT_CURVE));
    assert!(!ctx.contains("unrelated"));
}

#[test]
fn builtin_dtg_through_coordinator() {
    let registry = default_registry();
    let d = registry.get("dtg").unwrap();

    let mut provider = |request: &StageRequest| match request {
        StageRequest::Parameters(params) => {
            assert_eq!(params.len(), 2);
            Some(StageInput::Parameters(HashMap::from([(
                "half_window".to_string(),
                ParamValue::Integer(3),
            )])))
        }
        _ => None,
    };

    let ctx = InteractionCoordinator::new(d)
        .run(&mut provider, &BuiltinEngine, &ExecutionContext::with_input(tg_curve()))
        .unwrap();
    assert_eq!(ctx.curve(RESULT_DERIVATIVE).unwrap().len(), 300 - 6);
    assert_eq!(ctx.param("window_time").unwrap(), &ParamValue::Double(1.0));
}

#[test]
fn builtin_max_rate_asks_points_first() {
    let registry = default_registry();
    let d = registry.get("max_rate_in_range").unwrap();

    let mut seen = Vec::new();
    let mut provider = |request: &StageRequest| {
        seen.push(request.stage());
        match request {
            StageRequest::Points(spec) => {
                assert_eq!(spec.min_count, 2);
                Some(StageInput::Points(vec![Sample::new(120.0, 0.0), Sample::new(240.0, 0.0)]))
            }
            StageRequest::Parameters(params) => {
                assert!(params.iter().all(|p| p.name != "range"));
                Some(StageInput::Parameters(HashMap::new()))
            }
            StageRequest::Curve { .. } => None,
        }
    };

    let ctx = InteractionCoordinator::new(d)
        .run(&mut provider, &BuiltinEngine, &ExecutionContext::with_input(tg_curve()))
        .unwrap();
    assert_eq!(seen, vec![InteractionStage::Points, InteractionStage::Parameters]);

    let max = ctx.sample(RESULT_MAX_POINT).unwrap();
    assert!((max.x - 180.0).abs() <= 1.0, "x = {}", max.x);
}

#[test]
fn builtin_electrochemical_norm_follows_window() {
    let registry = default_registry();
    let d = registry.get("electrochemical_derivative").unwrap();
    let line = Curve::sampled(0.0, 1.0, 40, |x| x);

    let run = |values: HashMap<String, ParamValue>| {
        let mut provider = move |_: &StageRequest| Some(StageInput::Parameters(values.clone()));
        InteractionCoordinator::new(d)
            .run(&mut provider, &BuiltinEngine, &ExecutionContext::with_input(line.clone()))
            .unwrap()
    };

    // w = 4 on a unit slope: half-window difference 4, scaled by 3/4
    let ctx = run(HashMap::from([("window_size".to_string(), ParamValue::Integer(4))]));
    assert!(!ctx.contains(&param_key("norm_factor")));
    for &v in ctx.curve(RESULT_DERIVATIVE).unwrap().y() {
        assert!((v - 3.0).abs() < 1e-12, "got {}", v);
    }

    let ctx = run(HashMap::from([
        ("window_size".to_string(), ParamValue::Integer(4)),
        ("norm_factor".to_string(), ParamValue::Double(1.0)),
    ]));
    for &v in ctx.curve(RESULT_DERIVATIVE).unwrap().y() {
        assert!((v - 4.0).abs() < 1e-12, "got {}", v);
    }
}

#[test]
fn builtin_invalid_parameter_is_rejected() {
    let registry = default_registry();
    let d = registry.get("moving_average").unwrap();
    let mut provider = |_: &StageRequest| {
        Some(StageInput::Parameters(HashMap::from([(
            "window".to_string(),
            ParamValue::Integer(4),
        )])))
    };

    let err = InteractionCoordinator::new(d)
        .run(&mut provider, &BuiltinEngine, &ExecutionContext::with_input(tg_curve()))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn every_builtin_runs_with_defaults() {
    let registry = default_registry();
    for name in registry.names() {
        let d = registry.get(name).unwrap();
        let mut provider = |request: &StageRequest| {
            Some(match request {
                StageRequest::Parameters(_) => StageInput::Parameters(HashMap::new()),
                StageRequest::Points(_) => {
                    StageInput::Points(vec![Sample::new(100.0, 0.0), Sample::new(260.0, 0.0)])
                }
                StageRequest::Curve { .. } => StageInput::Curve(vec![CurveChoice::new(
                    "blank",
                    tg_curve().map_y(|_| 0.5),
                )]),
            })
        };

        let ctx = InteractionCoordinator::new(d)
            .run(&mut provider, &BuiltinEngine, &ExecutionContext::with_input(tg_curve()))
            .unwrap_or_else(|e| panic!("{} failed: {}", name, e));
        for key in &d.produces {
            assert!(ctx.contains(key), "{} did not produce {}", name, key);
        }
    }
}

#[test]
fn channel_provider_end_to_end() {
    let registry = default_registry();
    let d = registry.get("dtg").unwrap().clone();
    let handle = spawn_coordination(d, BuiltinEngine, ExecutionContext::with_input(tg_curve()));

    let mut completed = false;
    let mut levels = Vec::new();
    while let Some(message) = handle.recv() {
        match message {
            AnalysisMessage::Request(StageRequest::Parameters(_)) => {
                let values = HashMap::from([("half_window".to_string(), ParamValue::Integer(4))]);
                handle.respond(Some(StageInput::Parameters(values))).unwrap();
            }
            AnalysisMessage::Request(other) => panic!("unexpected request {:?}", other),
            AnalysisMessage::Log(entry) => levels.push(entry.level),
            AnalysisMessage::Complete { context, .. } => {
                assert_eq!(context.curve(RESULT_DERIVATIVE).unwrap().len(), 300 - 8);
                completed = true;
            }
            AnalysisMessage::Error { message, .. } => panic!("coordination failed: {}", message),
        }
    }

    assert!(completed);
    assert_eq!(levels, vec![LogLevel::Info, LogLevel::Success]);
    assert!(handle.join().is_ok());
}

#[test]
fn channel_provider_cancel() {
    let registry = default_registry();
    let d = registry.get("moving_average").unwrap().clone();
    let handle = spawn_coordination(d, BuiltinEngine, ExecutionContext::with_input(tg_curve()));

    let mut errored = false;
    let mut last_level = None;
    while let Some(message) = handle.recv() {
        match message {
            AnalysisMessage::Request(_) => handle.cancel().unwrap(),
            AnalysisMessage::Error { .. } => errored = true,
            AnalysisMessage::Log(entry) => last_level = Some(entry.level),
            _ => {}
        }
    }

    assert!(errored);
    assert_eq!(last_level, Some(LogLevel::Warning));
    assert!(matches!(handle.join(), Err(Error::Cancelled(_))));
}

#[test]
fn channel_provider_reports_failure() {
    let registry = default_registry();
    let d = registry.get("moving_average").unwrap().clone();
    let handle = spawn_coordination(d, BuiltinEngine, ExecutionContext::with_input(tg_curve()));

    let mut failure = None;
    while let Some(message) = handle.recv() {
        match message {
            AnalysisMessage::Request(_) => {
                let values = HashMap::from([("window".to_string(), ParamValue::Integer(4))]);
                handle.respond(Some(StageInput::Parameters(values))).unwrap();
            }
            AnalysisMessage::Log(entry) if entry.level == LogLevel::Error => {
                failure = Some(entry.message);
            }
            _ => {}
        }
    }

    let message = failure.expect("an error log entry");
    assert!(message.contains("Moving average"), "{}", message);
    assert!(matches!(handle.join(), Err(Error::Validation(_))));
}
