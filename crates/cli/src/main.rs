//! Thermocurve CLI - derivative analysis of thermoanalytical curves

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use thermocurve_algorithms::batch::{derive_batch, num_threads, ProcessingMode};
use thermocurve_core::{Curve, Sample};
use thermocurve_workflow::prelude::*;
use thermocurve_workflow::{ContextValue, ParamKind};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "thermocurve")]
#[command(author, version, about = "Derivative analysis of thermoanalytical curves", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered algorithms
    List {
        /// Only show one category (derivative, smoothing, features)
        #[arg(short, long)]
        category: Option<AlgoCategory>,
    },
    /// Show parameters, stages and outputs of an algorithm
    Describe {
        /// Algorithm name
        name: String,
    },
    /// Run an algorithm on one curve
    Run {
        /// Algorithm name
        name: String,
        /// Input curve (JSON: {"x": [...], "y": [...]})
        input: PathBuf,
        /// Output curve
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Parameter value as name=value (repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
        /// Picked point as x,y (repeatable)
        #[arg(long = "point")]
        points: Vec<String>,
        /// Reference curve for the curve-selection stage
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Print the full result context as JSON
        #[arg(long)]
        dump_context: bool,
    },
    /// Run an algorithm over many curves in parallel
    Batch {
        /// Algorithm name
        name: String,
        /// Input curves
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,
        /// Parameter value as name=value (repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
        /// Picked point as x,y (repeatable)
        #[arg(long = "point")]
        points: Vec<String>,
        /// Reference curve for the curve-selection stage
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Number of worker threads (0 = all cores)
        #[arg(long, default_value = "0")]
        threads: usize,
    },
}

// ─── Scripted provider ──────────────────────────────────────────────────

/// Answers every interaction stage from command-line arguments.
#[derive(Clone)]
struct ScriptedProvider {
    values: HashMap<String, ParamValue>,
    points: Vec<Sample>,
    reference: Option<CurveChoice>,
}

impl ScriptedProvider {
    /// Parse `name=value` pairs against the descriptor's declared types.
    fn from_args(
        descriptor: &AlgorithmDescriptor,
        params: &[String],
        points: &[String],
        reference: Option<&Path>,
    ) -> Result<Self> {
        let mut values = HashMap::new();
        for raw in params {
            let (name, value) = raw
                .split_once('=')
                .with_context(|| format!("Parameter must be 'name=value', got: {}", raw))?;
            let name = name.trim();
            let param = descriptor
                .parameter(name)
                .with_context(|| format!("{} has no parameter '{}'", descriptor.name, name))?;
            let value = param
                .parse_value(value)
                .with_context(|| format!("Invalid value for '{}'", name))?;
            values.insert(name.to_string(), value);
        }

        let points = parse_points(points)?;

        let reference = match reference {
            Some(path) => {
                let id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "reference".to_string());
                Some(CurveChoice::new(id, read_curve(path)?))
            }
            None => None,
        };
        if descriptor.needs_curve_selection && reference.is_none() {
            anyhow::bail!("{} needs a reference curve; pass --reference", descriptor.name);
        }

        Ok(Self {
            values,
            points,
            reference,
        })
    }
}

impl InteractionProvider for ScriptedProvider {
    fn request(&mut self, request: &StageRequest) -> Option<StageInput> {
        debug!(stage = %request.stage(), "answering stage from arguments");
        match request {
            StageRequest::Parameters(_) => Some(StageInput::Parameters(self.values.clone())),
            StageRequest::Points(_) => Some(StageInput::Points(self.points.clone())),
            StageRequest::Curve { .. } => self.reference.clone().map(|c| StageInput::Curve(vec![c])),
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn progress(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn read_curve(path: &Path) -> Result<Curve> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let curve: Curve =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse curve {}", path.display()))?;
    debug!("Input {}: {} samples", path.display(), curve.len());
    Ok(curve)
}

fn write_curve(curve: &Curve, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(curve)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn parse_points(points: &[String]) -> Result<Vec<Sample>> {
    points
        .iter()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .with_context(|| format!("Point must be 'x,y', got: {}", pair))?;
            let x: f64 = x.trim().parse().context("Invalid x")?;
            let y: f64 = y.trim().parse().context("Invalid y")?;
            Ok(Sample::new(x, y))
        })
        .collect()
}

fn lookup<'a>(registry: &'a DescriptorRegistry, name: &str) -> Result<&'a AlgorithmDescriptor> {
    registry.get(name).with_context(|| {
        format!(
            "Unknown algorithm: {}. Known: {}",
            name,
            registry.names().join(", ")
        )
    })
}

/// Context key of the curve an invocation hands back, chosen by the output policy.
fn output_key(descriptor: &AlgorithmDescriptor) -> thermocurve_core::Result<&'static str> {
    Ok(match descriptor.output_policy()? {
        OutputPolicy::ReplaceCurve => RESULT_CURVE,
        OutputPolicy::AppendCurve => RESULT_DERIVATIVE,
    })
}

fn produced_curve<'a>(descriptor: &AlgorithmDescriptor, ctx: &'a ExecutionContext) -> Result<&'a Curve> {
    Ok(ctx.curve(output_key(descriptor)?)?)
}

fn describe_kind(kind: &ParamKind) -> String {
    match kind {
        ParamKind::Integer { constraint: Some(c) } if c.step > 0 => {
            format!("integer [{}, {}] step {}", c.min, c.max, c.step)
        }
        ParamKind::Integer { constraint: Some(c) } => format!("integer [{}, {}]", c.min, c.max),
        ParamKind::Double { constraint: Some(c) } | ParamKind::DoubleRange { constraint: Some(c) } => {
            let mut s = format!("{} [{}, {}]", kind.param_type(), c.min, c.max);
            if let Some(unit) = &c.unit {
                s.push(' ');
                s.push_str(unit);
            }
            s
        }
        ParamKind::Enum { options } => {
            let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
            format!("one of {}", values.join(" | "))
        }
        other => other.param_type().to_string(),
    }
}

fn print_summary(descriptor: &AlgorithmDescriptor, ctx: &ExecutionContext) {
    for key in &descriptor.produces {
        match ctx.get(key) {
            Some(ContextValue::Curve(c)) => {
                print!("  {}: {} samples", key, c.len());
                if let Some((lo, hi)) = c.y_range() {
                    print!(", y in [{:.6}, {:.6}]", lo, hi);
                }
                println!();
            }
            Some(ContextValue::Extrema(e)) => {
                println!("  {}: {} peaks, {} valleys", key, e.peaks.len(), e.valleys.len());
                for p in &e.peaks {
                    println!("    peak   x = {:.4}  value = {:.6}", p.x, p.value);
                }
                for v in &e.valleys {
                    println!("    valley x = {:.4}  value = {:.6}", v.x, v.value);
                }
            }
            Some(ContextValue::Sample(s)) => println!("  {}: x = {:.4}, y = {:.6}", key, s.x, s.y),
            Some(ContextValue::Count(n)) => println!("  {}: {}", key, n),
            Some(other) => println!("  {}: <{}>", key, other.kind_name()),
            None => {}
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let registry = default_registry();

    match cli.command {
        // ── List ─────────────────────────────────────────────────────
        Commands::List { category } => {
            let categories = match category {
                Some(c) => vec![c],
                None => AlgoCategory::ALL.to_vec(),
            };
            for category in categories {
                let entries = registry.by_category(category);
                if entries.is_empty() {
                    continue;
                }
                println!("{}:", category.name());
                for d in entries {
                    println!("  {:<28} {}", d.name, d.display_name);
                }
            }
        }

        // ── Describe ─────────────────────────────────────────────────
        Commands::Describe { name } => {
            let d = lookup(&registry, &name)?;
            println!("{} ({})", d.display_name, d.name);
            println!("Category: {}", d.category.name());
            if !d.description.is_empty() {
                println!("{}", d.description);
            }

            if !d.parameters.is_empty() {
                println!("\nParameters:");
                for p in &d.parameters {
                    let default = p
                        .default
                        .as_ref()
                        .map(|v| format!(" (default {})", v))
                        .unwrap_or_default();
                    let required = if p.required { " required" } else { "" };
                    println!(
                        "  {:<16} {}: {}{}{}",
                        p.name,
                        p.label,
                        describe_kind(&p.kind),
                        default,
                        required
                    );
                }
            }

            if let Some(spec) = &d.point_selection {
                let max = spec
                    .max_count
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "any".to_string());
                println!("\nPoints: {} to {}", spec.min_count, max);
                if !spec.hint.is_empty() {
                    println!("  {}", spec.hint);
                }
            }

            let stages: Vec<&str> = d.resolved_stages()?.iter().map(|s| s.as_str()).collect();
            println!("\nStages: {}", if stages.is_empty() { "none".to_string() } else { stages.join(" -> ") });
            println!("Reads: {}", d.prerequisites.join(", "));
            println!("Writes: {}", d.produces.join(", "));
            for (k, v) in &d.metadata {
                println!("Metadata {}: {}", k, v);
            }
        }

        // ── Run ──────────────────────────────────────────────────────
        Commands::Run {
            name,
            input,
            output,
            params,
            points,
            reference,
            dump_context,
        } => {
            let d = lookup(&registry, &name)?;
            let mut provider = ScriptedProvider::from_args(d, &params, &points, reference.as_deref())?;

            let pb = spinner("Reading curve...")?;
            let curve = read_curve(&input)?;
            pb.finish_and_clear();
            info!("Input: {} samples", curve.len());

            let start = Instant::now();
            let ctx = InteractionCoordinator::new(d)
                .run(&mut provider, &BuiltinEngine, &ExecutionContext::with_input(curve))
                .with_context(|| format!("Failed to run {}", name))?;
            let elapsed = start.elapsed();

            println!("{} finished", d.display_name);
            print_summary(d, &ctx);
            println!("  Processing time: {:.2?}", elapsed);

            if let Some(path) = output {
                write_curve(produced_curve(d, &ctx)?, &path)?;
                println!("Result saved to: {}", path.display());
            }
            if dump_context {
                println!("{}", serde_json::to_string_pretty(&ctx)?);
            }
        }

        // ── Batch ────────────────────────────────────────────────────
        Commands::Batch {
            name,
            inputs,
            out_dir,
            params,
            points,
            reference,
            threads,
        } => {
            let d = lookup(&registry, &name)?;
            let provider = ScriptedProvider::from_args(d, &params, &points, reference.as_deref())?;
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;

            let curves = inputs
                .iter()
                .map(|p| read_curve(p))
                .collect::<Result<Vec<_>>>()?;
            let mode = if threads == 0 {
                ProcessingMode::Parallel
            } else {
                ProcessingMode::ParallelWith(threads)
            };

            let key = output_key(d)?;
            info!("Processing {} curves on {} threads", curves.len(), num_threads(mode));
            let pb = progress(curves.len())?;
            pb.set_message(name.clone());
            let start = Instant::now();
            let results = derive_batch(&curves, mode, |curve| {
                let ctx = InteractionCoordinator::new(d).run(
                    &mut provider.clone(),
                    &BuiltinEngine,
                    &ExecutionContext::with_input(curve.clone()),
                );
                pb.inc(1);
                Ok(ctx?.curve(key)?.clone())
            })
            .context("Failed to set up batch")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let mut failed = 0;
            for (path, result) in inputs.iter().zip(results) {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "curve".to_string());
                match result {
                    Ok(curve) => {
                        let out = out_dir.join(format!("{}_{}.json", stem, name));
                        write_curve(&curve, &out)?;
                        info!("{} -> {}", path.display(), out.display());
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {}", path.display(), e);
                    }
                }
            }

            println!(
                "{}: {} of {} curves processed into {}",
                d.display_name,
                inputs.len() - failed,
                inputs.len(),
                out_dir.display()
            );
            println!("  Processing time: {:.2?}", elapsed);
            if failed > 0 {
                anyhow::bail!("{} curve(s) failed", failed);
            }
        }
    }

    Ok(())
}
