//! # Rules Subcommand
//!
//! Lists the bundled rulesets with the severities in effect after the
//! config's overrides.
//!
//! ```bash
//! specgate rules
//! specgate --config specgate.yaml rules --dialect asyncapi
//! ```

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use specgate_catalog::GateConfig;
use specgate_core::Dialect;
use specgate_schema::RulesetBundle;

/// Arguments for the rules subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Only list rules for this dialect.
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Openapi,
    Asyncapi,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Openapi => Dialect::OpenApi,
            DialectArg::Asyncapi => Dialect::AsyncApi,
        }
    }
}

/// Render the rule listing for the selected dialects.
pub fn render_rules(bundle: &RulesetBundle, dialects: &[Dialect]) -> String {
    let mut out = String::new();
    for dialect in dialects {
        let rules = bundle.for_dialect(*dialect).describe();
        out.push_str(&format!("{dialect} rules ({}):\n", rules.len()));
        for rule in rules {
            let severity = rule
                .severity
                .map_or_else(|| "off".to_string(), |s| s.to_string());
            out.push_str(&format!(
                "  {:<45} {:<5}  {}\n",
                rule.code, severity, rule.description
            ));
        }
        out.push('\n');
    }
    out
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs, config: &GateConfig) -> Result<u8> {
    let bundle = config
        .build_bundle()
        .context("failed to build validation rulesets")?;
    let dialects: Vec<Dialect> = match args.dialect {
        Some(d) => vec![d.into()],
        None => Dialect::ALL.to_vec(),
    };
    print!("{}", render_rules(&bundle, &dialects));
    Ok(0)
}
