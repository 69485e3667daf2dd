//! CLI entry point for sgaudit.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, logging setup and
//! exit codes. All business logic lives in the `sgaudit-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use sgaudit_app::{
    CancelToken, CommandEvaluator, DirectorySink, EvalInput, SnapshotSupplier, exit_code,
    parse_report_json, run_eval, serialize_report,
};
use sgaudit_render::render_markdown;
use sgaudit_settings::{Overrides, ResolvedConfig, SgauditConfigV1};
use sgaudit_types::{PolicyPath, RunReport, Submission};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit code for usage and config file errors.
const EXIT_USAGE: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "sgaudit",
    version,
    about = "Policy-driven compliance evidence for cloud security groups"
)]
struct Cli {
    /// Path to sgaudit config TOML. A missing file means defaults.
    #[arg(long, default_value = "sgaudit.toml")]
    config: Utf8PathBuf,

    /// Log output format (written to stderr; filter with RUST_LOG).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate policies against every security group and publish evidence.
    Eval {
        /// Security group snapshot: a DescribeSecurityGroups JSON file, or a directory of
        /// `<region>.json` files.
        #[arg(long)]
        snapshot: Utf8PathBuf,

        /// Policy path to evaluate; repeat for several, evaluated in order.
        #[arg(long = "policy")]
        policies: Vec<String>,

        /// Override the region (otherwise from config, then AWS_REGION).
        #[arg(long)]
        region: Option<String>,

        /// Evaluate security groups in parallel.
        #[arg(long)]
        parallel: bool,

        /// Evaluator program; overrides the config's `evaluator` command.
        #[arg(long)]
        evaluator: Option<String>,

        /// Argument passed to `--evaluator`; repeat for several.
        #[arg(long = "evaluator-arg", allow_hyphen_values = true)]
        evaluator_args: Vec<String>,

        /// Kill an evaluator call after this many seconds (overrides `evaluator_timeout`).
        #[arg(long)]
        evaluator_timeout: Option<u64>,

        /// Directory receiving one `<stream-id>.json` per assessment result.
        #[arg(long, default_value = "artifacts/sgaudit/evidence")]
        evidence_out: Utf8PathBuf,

        /// Where to write the JSON run report.
        #[arg(long, default_value = "artifacts/sgaudit/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown summary alongside the JSON report.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown summary (if enabled).
        #[arg(long, default_value = "artifacts/sgaudit/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON run report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/sgaudit/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Print the JSON schema of a published document.
    Schema {
        #[arg(value_enum, default_value_t = SchemaKind::Submission)]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SchemaKind {
    Submission,
    Report,
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.cmd {
        Commands::Eval {
            ref snapshot,
            ref policies,
            ref region,
            parallel,
            ref evaluator,
            ref evaluator_args,
            evaluator_timeout,
            ref evidence_out,
            ref report_out,
            write_markdown,
            ref markdown_out,
        } => {
            let args = EvalArgs {
                snapshot,
                policies,
                region: region.clone(),
                parallel,
                evaluator: evaluator.as_deref(),
                evaluator_args,
                evaluator_timeout,
                evidence_out,
                report_out,
                markdown_out: write_markdown.then_some(markdown_out.as_path()),
            };
            cmd_eval(&cli.config, args)
        }
        Commands::Md { report, output } => cmd_md(report, output),
        Commands::Schema { kind } => cmd_schema(kind),
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    // A second install (e.g. from tests) is not an error worth failing the run for.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

struct EvalArgs<'a> {
    snapshot: &'a Utf8Path,
    policies: &'a [String],
    region: Option<String>,
    parallel: bool,
    evaluator: Option<&'a str>,
    evaluator_args: &'a [String],
    evaluator_timeout: Option<u64>,
    evidence_out: &'a Utf8Path,
    report_out: &'a Utf8Path,
    markdown_out: Option<&'a Utf8Path>,
}

fn cmd_eval(config_path: &Utf8Path, args: EvalArgs<'_>) -> anyhow::Result<()> {
    let (config, evaluator) = match load_config(config_path, &args) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!(
                config = %config_path,
                error = %format!("{err:#}"),
                "unable to load configuration"
            );
            eprintln!("sgaudit error: {err:#}");
            std::process::exit(EXIT_USAGE);
        }
    };

    let policies: Vec<PolicyPath> = args.policies.iter().map(PolicyPath::new).collect();
    let supplier = SnapshotSupplier::new(args.snapshot);
    let sink = DirectorySink::new(args.evidence_out);
    let cancel = CancelToken::new();

    let output = run_eval(EvalInput {
        policies: &policies,
        config: &config,
        supplier: &supplier,
        evaluator: &evaluator,
        sink: &sink,
        cancel: &cancel,
    });

    let written = (|| -> anyhow::Result<()> {
        write_report_file(args.report_out, &output.report).context("write report json")?;
        if let Some(md_path) = args.markdown_out {
            write_text_file(md_path, &render_markdown(&output.report)).context("write markdown")?;
        }
        Ok(())
    })();

    if let Some(err) = output.error() {
        eprintln!("sgaudit: evaluation finished with errors:\n{err}");
    }
    match written {
        Ok(()) => info!(
            report = %args.report_out,
            evidence = %args.evidence_out,
            "wrote run artifacts"
        ),
        Err(err) => {
            error!(error = %format!("{err:#}"), "unable to write run artifacts");
            eprintln!("sgaudit error: {err:#}");
            std::process::exit(1);
        }
    }

    let code = exit_code(output.status);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Read, parse and resolve the config file, then build the evaluator it names.
fn load_config(
    path: &Utf8Path,
    args: &EvalArgs<'_>,
) -> anyhow::Result<(ResolvedConfig, CommandEvaluator)> {
    let cfg = if path.exists() {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))?;
        sgaudit_settings::parse_config_toml(&text)
            .with_context(|| format!("parse config: {path}"))?
    } else {
        SgauditConfigV1::default()
    };

    let overrides = Overrides {
        region: args.region.clone(),
        parallel: args.parallel.then_some(true),
        evaluator_timeout: args.evaluator_timeout,
        env_region: std::env::var("AWS_REGION").ok().filter(|r| !r.is_empty()),
    };
    let resolved = sgaudit_settings::resolve_config(cfg, overrides).context("resolve config")?;

    let evaluator = match args.evaluator {
        Some(program) => CommandEvaluator::new(program, args.evaluator_args.to_vec()),
        None => CommandEvaluator::from_command(&resolved.evaluator).context(
            "no policy evaluator configured (set `evaluator` in the config or pass --evaluator)",
        )?,
    };
    let timeout = resolved.run.evaluator_timeout().context("evaluator timeout")?;

    Ok((resolved, evaluator.with_timeout(timeout)))
}

fn write_report_file(path: &Utf8Path, report: &RunReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    let data = serialize_report(report).context("serialize report")?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}

fn cmd_md(report_path: Utf8PathBuf, output: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    if let Some(out_path) = output {
        write_text_file(&out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}

fn cmd_schema(kind: SchemaKind) -> anyhow::Result<()> {
    let schema = match kind {
        SchemaKind::Submission => schemars::schema_for!(Submission),
        SchemaKind::Report => schemars::schema_for!(RunReport),
        SchemaKind::Config => schemars::schema_for!(SgauditConfigV1),
    };
    let text = serde_json::to_string_pretty(&schema).context("serialize schema")?;
    println!("{text}");
    Ok(())
}
