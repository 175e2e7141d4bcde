use colored::Colorize;
use serde::Serialize;

use crate::{
    advisor::{RuleReport, RuleType, Status},
    ast::StatementKind,
    error::ReviewError,
    parser::Engine,
    resource::SchemaResource
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Outcome of read-only validation for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub accepted:   bool,
    pub statements: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind:       Option<StatementKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line:       Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason:     Option<String>
}

impl Verdict {
    pub fn from_result(statements: usize, result: &Result<(), ReviewError>) -> Self {
        match result {
            Ok(()) => Self {
                accepted: true,
                statements,
                kind: None,
                line: None,
                reason: None
            },
            Err(err) => {
                let (kind, line) = match err {
                    ReviewError::Disallowed {
                        kind,
                        line
                    } => (Some(*kind), Some(*line)),
                    _ => (None, None)
                };
                Self {
                    accepted: false,
                    statements,
                    kind,
                    line,
                    reason: Some(err.to_string())
                }
            }
        }
    }
}

/// Registered rule for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEntry {
    pub engine:        Engine,
    pub rule:          RuleType,
    pub default_level: String
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(value).unwrap_or_default(),
        OutputFormat::Text => String::new()
    }
}

fn paint(text: &str, status: Status, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }
    match status {
        Status::Success => text.green().to_string(),
        Status::Warning => text.yellow().bold().to_string(),
        Status::Error => text.red().bold().to_string()
    }
}

/// Format rule reports based on output options
pub fn format_reports(reports: &[RuleReport], opts: &OutputOptions) -> String {
    if opts.format != OutputFormat::Text {
        return serialize(reports, opts.format);
    }

    let mut output = String::new();
    let header = "=== SQL Review ===";
    if opts.colored {
        output.push_str(&header.bold().to_string());
    } else {
        output.push_str(header);
    }
    output.push_str("\n\n");

    let mut findings = 0;
    for report in reports {
        for advice in report.advice.iter().filter(|a| !a.is_ok()) {
            findings += 1;
            let status = paint(&format!("[{}]", advice.status), advice.status, opts.colored);
            output.push_str(&format!(
                "{} {} (code {}) line {}\n  {}\n",
                status, advice.title, advice.code, advice.line, advice.content
            ));
        }
    }

    if findings == 0 {
        output.push_str(&paint("No issues found", Status::Success, opts.colored));
        output.push('\n');
    }

    let errors = count(reports, Status::Error);
    let warnings = count(reports, Status::Warning);
    output.push_str(&format!(
        "\nSummary: {} rule(s), {} error(s), {} warning(s)\n",
        reports.len(),
        errors,
        warnings
    ));
    output
}

fn count(reports: &[RuleReport], status: Status) -> usize {
    reports
        .iter()
        .flat_map(|r| &r.advice)
        .filter(|a| a.status == status)
        .count()
}

/// Format resources based on output options
pub fn format_resources(resources: &[SchemaResource], opts: &OutputOptions) -> String {
    if opts.format != OutputFormat::Text {
        return serialize(resources, opts.format);
    }
    let mut output = String::new();
    for resource in resources {
        output.push_str(&resource.to_string());
        output.push('\n');
    }
    output
}

/// Format a validation verdict based on output options
pub fn format_verdict(verdict: &Verdict, opts: &OutputOptions) -> String {
    if opts.format != OutputFormat::Text {
        return serialize(verdict, opts.format);
    }
    match &verdict.reason {
        None => format!(
            "{} {} statement(s) are read-only\n",
            paint("OK", Status::Success, opts.colored),
            verdict.statements
        ),
        Some(reason) => format!(
            "{} {}\n",
            paint("REJECTED", Status::Error, opts.colored),
            reason
        )
    }
}

/// Format registered rules based on output options
pub fn format_rules(entries: &[RuleEntry], opts: &OutputOptions) -> String {
    if opts.format != OutputFormat::Text {
        return serialize(entries, opts.format);
    }
    let mut output = String::new();
    for entry in entries {
        let engine = format!("{:<9}", entry.engine.as_str());
        let engine = if opts.colored {
            engine.cyan().to_string()
        } else {
            engine
        };
        output.push_str(&format!(
            "{} {:<42} {}\n",
            engine,
            entry.rule.as_str(),
            entry.default_level
        ));
    }
    output
}
