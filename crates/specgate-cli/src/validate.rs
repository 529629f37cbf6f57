//! # Validate Subcommand
//!
//! Runs the gate over every entity in the given descriptor files, the way
//! the catalog would before ingestion, and prints a report.
//!
//! ```bash
//! specgate validate catalog-info.yaml apis/*.yaml
//! specgate --config specgate.yaml validate catalog-info.yaml --format json
//! ```
//!
//! Exit status is 0 when every entity passed or was skipped and 1 when
//! any entity was rejected.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use specgate_catalog::{GateConfig, SpecValidator, UnknownDialectPolicy};
use specgate_core::{Dialect, Finding, GateError, LogSink, TracingLogSink};

use crate::descriptor::{load_descriptors, LoadedEntity};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Catalog descriptor files (multi-document YAML).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Disposition of one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Validated with no blocking findings.
    Pass,
    /// Rejected by the gate.
    Fail,
    /// Not subject to validation.
    Skip,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntityReport {
    pub location: String,
    pub kind: String,
    pub name: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Finding>,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub entities: Vec<EntityReport>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Report {
    fn push(&mut self, entry: EntityReport) {
        match entry.outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::Skip => self.skipped += 1,
        }
        self.entities.push(entry);
    }

    pub fn exit_code(&self) -> u8 {
        u8::from(self.failed > 0)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entities {
            let _ = writeln!(
                out,
                "{}  {}/{}  ({})",
                entry.outcome.label(),
                entry.kind,
                entry.name,
                entry.location
            );
            if entry.violations.is_empty() {
                if let Some(error) = &entry.error {
                    let _ = writeln!(out, "      {error}");
                }
            }
            for violation in &entry.violations {
                let _ = writeln!(out, "      [{}] {violation}", violation.code);
            }
        }
        let _ = writeln!(
            out,
            "\n{} entities: {} passed, {} failed, {} skipped",
            self.entities.len(),
            self.passed,
            self.failed,
            self.skipped
        );
        out
    }
}

/// Whether the gate will run rules against this entity, as opposed to
/// passing it through.
fn is_gated(entity: &specgate_core::Entity, validator: &SpecValidator) -> bool {
    entity.is_kind(validator.gate_kind())
        && entity.spec_definition().is_some()
        && entity.spec_type().and_then(Dialect::from_type).is_some()
}

/// Validate loaded entities concurrently, one task per entity, and
/// assemble the report in input order.
pub async fn validate_entities(
    validator: Arc<SpecValidator>,
    log: Arc<dyn LogSink>,
    entities: Vec<LoadedEntity>,
) -> Result<Report> {
    let mut tasks = tokio::task::JoinSet::new();
    let total = entities.len();
    for (position, loaded) in entities.into_iter().enumerate() {
        let validator = Arc::clone(&validator);
        let log = Arc::clone(&log);
        tasks.spawn(async move {
            let gated = is_gated(&loaded.entity, &validator);
            let dialect = loaded.entity.spec_type().and_then(Dialect::from_type);
            let location = loaded.location();
            let kind = loaded.entity.kind.clone();
            let name = loaded.entity.display_name().to_string();
            let result = validator.validate(loaded.entity, log.as_ref()).await;

            let (outcome, error, violations) = match result {
                Ok(_) if gated => (Outcome::Pass, None, Vec::new()),
                Ok(_) => (Outcome::Skip, None, Vec::new()),
                Err(GateError::SpecValidation(e)) => {
                    let message = e.to_string();
                    (Outcome::Fail, Some(message), e.violations)
                }
                Err(e) => (Outcome::Fail, Some(e.to_string()), Vec::new()),
            };
            (
                position,
                EntityReport { location, kind, name, outcome, dialect, error, violations },
            )
        });
    }

    let mut slots: Vec<Option<EntityReport>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (position, entry) = joined.context("validation task failed")?;
        slots[position] = Some(entry);
    }

    let mut report = Report::default();
    for entry in slots.into_iter().flatten() {
        report.push(entry);
    }
    Ok(report)
}

/// Load every descriptor and validate the entities they contain.
pub fn build_report(paths: &[PathBuf], config: &GateConfig) -> Result<Report> {
    let mut entities = Vec::new();
    for path in paths {
        entities.extend(load_descriptors(path)?);
    }
    tracing::info!(
        files = paths.len(),
        entities = entities.len(),
        reject_unknown = config.unknown_dialect == UnknownDialectPolicy::Reject,
        "validating catalog descriptors"
    );

    let validator = Arc::new(
        config
            .build_validator()
            .context("failed to build validation rulesets")?,
    );
    let log: Arc<dyn LogSink> = Arc::new(TracingLogSink);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(validate_entities(validator, log, entities))
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &GateConfig) -> Result<u8> {
    let report = build_report(&args.paths, config)?;
    match args.format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(report.exit_code())
}
