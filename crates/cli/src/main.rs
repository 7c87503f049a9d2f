//! Command-line document verification.
//!
//! Usage:
//!     docverify verify --pan pan.json --gst gst.json --udyam udyam.json
//!     docverify verify --gst gst.json --udyam udyam.json --format json --output report.json
//!     docverify rules --format json

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docverify_engine::{OutputFormat, VerificationConfig, VerificationEngine};
use docverify_model::Severity;
use docverify_report::ReportGenerator;

/// Exit code when the overall verification status is a failure.
const EXIT_VERIFICATION_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "docverify")]
#[command(about = "Cross-verify PAN, GST and Udyam extraction results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify extracted documents against each other
    Verify {
        /// PAN extraction output (JSON)
        #[arg(long)]
        pan: Option<PathBuf>,

        /// GST certificate extraction output (JSON)
        #[arg(long)]
        gst: Option<PathBuf>,

        /// Udyam certificate extraction output (JSON)
        #[arg(long)]
        udyam: Option<PathBuf>,

        /// Verification config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (json, console, both)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Write the JSON report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop at the first failing CRITICAL rule
        #[arg(long)]
        stop_on_critical: bool,

        /// Only run rules at or above this severity (INFO, WARNING, CRITICAL)
        #[arg(long)]
        min_severity: Option<Severity>,

        /// Rule id to skip (repeatable)
        #[arg(long = "disable", value_name = "RULE_ID")]
        disabled: Vec<String>,

        /// Omit rule details from console output
        #[arg(short, long)]
        quiet: bool,
    },

    /// List available verification rules
    Rules {
        /// Verification config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docverify=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            pan,
            gst,
            udyam,
            config,
            format,
            output,
            stop_on_critical,
            min_severity,
            disabled,
            quiet,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(format) = format {
                config.output_format = format;
            }
            if stop_on_critical {
                config.stop_on_critical_fail = true;
            }
            if min_severity.is_some() {
                config.severity_filter = min_severity;
            }
            for rule_id in disabled {
                config.disable_rule(rule_id);
            }
            if quiet {
                config.verbose = false;
            }

            run_verify(
                config,
                pan.as_deref(),
                gst.as_deref(),
                udyam.as_deref(),
                output.as_deref(),
            )
        }
        Commands::Rules { config, format } => {
            let config = load_config(config.as_deref())?;
            run_rules(config, &format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<VerificationConfig> {
    match path {
        Some(path) => VerificationConfig::load(path).context("could not load configuration"),
        None => Ok(VerificationConfig::default()),
    }
}

fn run_verify(
    config: VerificationConfig,
    pan: Option<&Path>,
    gst: Option<&Path>,
    udyam: Option<&Path>,
    output: Option<&Path>,
) -> Result<ExitCode> {
    if pan.is_none() && gst.is_none() && udyam.is_none() {
        bail!("nothing to verify: pass at least one of --pan, --gst or --udyam");
    }

    let format = config.output_format;
    let verbose = config.verbose;
    let engine = VerificationEngine::new(config)?;

    let report = engine
        .verify_from_files(pan, gst, udyam)
        .context("could not load documents")?;

    write_report(&report, format, verbose, output)?;

    if report.summary().overall_status.is_failure() {
        Ok(ExitCode::from(EXIT_VERIFICATION_FAILED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn write_report(
    report: &ReportGenerator,
    format: OutputFormat,
    verbose: bool,
    output: Option<&Path>,
) -> Result<()> {
    if format.includes_console() {
        println!("{}", report.to_console(verbose));
    }

    if format.includes_json() {
        let json = report.to_json()?;
        match output {
            Some(path) => {
                std::fs::write(path, json)
                    .with_context(|| format!("could not write report to {}", path.display()))?;
                tracing::info!(path = %path.display(), "JSON report saved");
            }
            None => println!("{json}"),
        }
    }

    Ok(())
}

fn run_rules(config: VerificationConfig, format: &str) -> Result<()> {
    let engine = VerificationEngine::new(config)?;
    let rules = engine.available_rules();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    for rule in &rules {
        let docs: Vec<&str> = rule.source_docs.iter().map(|d| d.label()).collect();
        let state = if rule.enabled { "" } else { " (disabled)" };
        println!(
            "{} [{}] {}{}",
            rule.rule_id,
            rule.severity,
            docs.join("+"),
            state
        );
        println!("    {}", rule.description);
    }

    println!("\nTotal: {} rules", rules.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_verify_flags() {
        let cli = Cli::try_parse_from([
            "docverify",
            "verify",
            "--gst",
            "gst.json",
            "--format",
            "json",
            "--min-severity",
            "warning",
            "--disable",
            "ENTITY_AGE_CHECK",
            "--disable",
            "PIN_MATCH_GST_UDYAM",
            "--stop-on-critical",
        ])
        .unwrap();

        let Commands::Verify {
            pan,
            gst,
            format,
            min_severity,
            disabled,
            stop_on_critical,
            quiet,
            ..
        } = cli.command
        else {
            panic!("expected verify command");
        };
        assert!(pan.is_none());
        assert_eq!(gst, Some(PathBuf::from("gst.json")));
        assert_eq!(format, Some(OutputFormat::Json));
        assert_eq!(min_severity, Some(Severity::Warning));
        assert_eq!(disabled, vec!["ENTITY_AGE_CHECK", "PIN_MATCH_GST_UDYAM"]);
        assert!(stop_on_critical);
        assert!(!quiet);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["docverify", "verify", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_verify_requires_a_document() {
        let err = run_verify(VerificationConfig::default(), None, None, None, None).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }
}
