//! Type definitions for the advisor system.
//!
//! - [`Status`] - Advice outcome (Success, Warning, Error)
//! - [`Code`] - Stable numeric diagnostic codes
//! - [`RuleType`] - Identifiers of the review rules
//! - [`RuleLevel`] / [`RuleConfig`] - Per-rule configuration
//! - [`Advice`] / [`RuleReport`] - Check results

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};

use crate::{error::ReviewError, parser::Engine};

/// Outcome of a single advice.
///
/// Ordered from best to worst so the worst status of a report is its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Status {
    /// Nothing to report
    #[serde(rename = "SUCCESS")]
    Success,
    /// Finding that should be looked at (exit code 1)
    #[serde(rename = "WARN")]
    Warning,
    /// Finding that must be fixed (exit code 2)
    #[serde(rename = "ERROR")]
    Error
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR")
        }
    }
}

/// Numeric diagnostic code carried by every advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Code {
    Ok                            = 0,
    StatementNoWhere              = 202,
    StatementSelectAll            = 203,
    StatementLeadingWildcardLike  = 204,
    StatementDisallowCommit       = 206,
    NamingTableConventionMismatch = 301,
    TableNoPk                     = 601,
    InsertNotSpecifyColumn        = 1107
}

impl Code {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.as_u32())
    }
}

/// Review rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleType {
    StatementInsertMustSpecifyColumn,
    StatementRequireWhere,
    StatementNoSelectAll,
    StatementNoLeadingWildcardLike,
    StatementDisallowCommit,
    TableRequirePk,
    NamingTable
}

impl RuleType {
    pub const ALL: [RuleType; 7] = [
        RuleType::StatementInsertMustSpecifyColumn,
        RuleType::StatementRequireWhere,
        RuleType::StatementNoSelectAll,
        RuleType::StatementNoLeadingWildcardLike,
        RuleType::StatementDisallowCommit,
        RuleType::TableRequirePk,
        RuleType::NamingTable
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatementInsertMustSpecifyColumn => "statement.insert.must-specify-column",
            Self::StatementRequireWhere => "statement.where.require",
            Self::StatementNoSelectAll => "statement.select.no-select-all",
            Self::StatementNoLeadingWildcardLike => "statement.where.no-leading-wildcard-like",
            Self::StatementDisallowCommit => "statement.disallow-commit",
            Self::TableRequirePk => "table.require-pk",
            Self::NamingTable => "naming.table"
        }
    }

    /// Level used when no configuration names the rule.
    pub fn default_level(self) -> RuleLevel {
        match self {
            Self::StatementInsertMustSpecifyColumn | Self::StatementRequireWhere => {
                RuleLevel::Error
            }
            _ => RuleLevel::Warning
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown rule type: '{}'", s))
    }
}

impl Serialize for RuleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Configured strength of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Disabled,
    #[default]
    #[serde(alias = "warn", alias = "WARNING", alias = "Warning")]
    Warning,
    #[serde(alias = "ERROR", alias = "Error")]
    Error
}

impl RuleLevel {
    /// Status of findings at this level, `None` when the rule is off.
    pub fn status(self) -> Option<Status> {
        match self {
            Self::Disabled => None,
            Self::Warning => Some(Status::Warning),
            Self::Error => Some(Status::Error)
        }
    }
}

impl FromStr for RuleLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" | "off" => Ok(Self::Disabled),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "Unknown rule level: '{}'. Supported levels: disabled, warning, error.",
                s
            ))
        }
    }
}

impl fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error")
        }
    }
}

/// One rule as configured by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub level:     RuleLevel,
    /// Rule-specific options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload:   Option<serde_json::Value>
}

impl RuleConfig {
    pub fn new(rule_type: RuleType, level: RuleLevel) -> Self {
        Self {
            rule_type,
            level,
            payload: None
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Decode the payload into the rule's option type.
    ///
    /// A missing payload decodes to `T::default()`.
    pub fn payload_as<T>(&self) -> Result<T, ReviewError>
    where
        T: DeserializeOwned + Default
    {
        match &self.payload {
            None => Ok(T::default()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                ReviewError::InvalidPayload {
                    rule:    self.rule_type,
                    message: e.to_string()
                }
            })
        }
    }
}

/// A single finding, or the success sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub status:  Status,
    pub code:    Code,
    /// Rule type name of the producing rule, or "OK"
    pub title:   String,
    pub content: String,
    /// 1-based line in the reviewed input
    pub line:    usize
}

impl Advice {
    /// The sentinel appended when a rule found nothing.
    pub fn ok() -> Self {
        Self {
            status:  Status::Success,
            code:    Code::Ok,
            title:   "OK".to_string(),
            content: String::new(),
            line:    0
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Success && self.code == Code::Ok
    }
}

/// Advice of one rule over a whole input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub engine: Engine,
    pub rule:   RuleType,
    pub level:  RuleLevel,
    pub advice: Vec<Advice>
}

impl RuleReport {
    /// Worst status across the report's advice.
    pub fn status(&self) -> Status {
        self.advice
            .iter()
            .map(|a| a.status)
            .max()
            .unwrap_or(Status::Success)
    }

    pub fn finding_count(&self) -> usize {
        self.advice.iter().filter(|a| !a.is_ok()).count()
    }
}
