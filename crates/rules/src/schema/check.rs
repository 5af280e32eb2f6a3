//! Decoded rule types: one strongly-typed variant per rule type.
//!
//! A [`RawRule`] is decoded into a [`Rule`] once, when the catalog is loaded.
//! Evaluators then match on [`Check`] and never look at untyped params again.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleError};

use super::{RawRule, RuleType};

/// Fixed threshold for `sixMonthsInterval` rules.
pub const SIX_MONTHS_DAYS: i64 = 182;

/// A rule decoded into its typed form.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub field: String,
    pub rule_type: RuleType,
    pub message: String,
    pub check: Check,
}

/// Typed rule body.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Required,
    Unique(UniqueParams),
    TimeRange(TimeRangeParams),
    Duration(DurationParams),
    Frequency(FrequencyParams),
    /// Also carries `sixMonthsInterval` rules, with `days` fixed to [`SIX_MONTHS_DAYS`].
    DateInterval(DateIntervalParams),
    DateFormat(DateFormatParams),
    MinValue(MinValueParams),
    MedicalLevel(MedicalLevelParams),
    ProhibitedContent(ProhibitedContentParams),
    SameImplementer,
    /// Known rule type with no evaluator (`crossTaskValidation`). Never fires.
    Unsupported,
}

impl Check {
    /// Rules whose verdict depends on the whole dataset.
    pub fn is_cross_row(&self) -> bool {
        matches!(
            self,
            Check::Unique(_) | Check::Frequency(_) | Check::DateInterval(_) | Check::SameImplementer
        )
    }

    /// Rules evaluated against one row in isolation.
    pub fn is_single_row(&self) -> bool {
        !self.is_cross_row() && !matches!(self, Check::Unsupported)
    }
}

// ── Params ──────────────────────────────────────────────────────────

/// Granularity at which duplicate values collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UniqueScope {
    /// Same calendar day and same compound key.
    Day,
    /// Anywhere in the dataset. Any scope other than `day` lands here.
    #[default]
    Global,
}

impl From<String> for UniqueScope {
    fn from(s: String) -> Self {
        if s == "day" {
            UniqueScope::Day
        } else {
            UniqueScope::Global
        }
    }
}

impl From<UniqueScope> for String {
    fn from(s: UniqueScope) -> Self {
        match s {
            UniqueScope::Day => "day".to_string(),
            UniqueScope::Global => "global".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueParams {
    #[serde(default)]
    pub scope: UniqueScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeParams {
    pub start_hour: u32,
    pub end_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationParams {
    pub min_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyParams {
    pub max_per_day: usize,
    #[serde(default = "default_group_by")]
    pub group_by: String,
    #[serde(default)]
    pub count_by: Option<String>,
}

fn default_group_by() -> String {
    IMPLEMENTER.to_string()
}

/// `groupBy` value that resolves through the implementer alias chain.
pub const IMPLEMENTER: &str = "implementer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateIntervalParams {
    pub days: i64,
    pub group_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SixMonthsParams {
    group_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFormatParams {
    #[serde(default = "default_true")]
    pub allow_time_component: bool,
}

impl Default for DateFormatParams {
    fn default() -> Self {
        Self {
            allow_time_component: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinValueParams {
    #[serde(alias = "minValue", alias = "value")]
    pub min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalLevelParams {
    pub allowed_levels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProhibitedContentParams {
    pub prohibited_terms: Vec<String>,
}

// ── Decoding ────────────────────────────────────────────────────────

impl Rule {
    /// Decode a catalog rule into its typed form.
    ///
    /// Fails on an unknown `type` or on params that do not fit the type.
    pub fn decode(raw: &RawRule) -> Result<Rule> {
        let rule_type: RuleType = raw
            .rule_type
            .parse()
            .map_err(|_| RuleError::UnknownType {
                field: raw.field.clone(),
                rule_type: raw.rule_type.clone(),
            })?;

        let check = match rule_type {
            RuleType::Required => Check::Required,
            RuleType::Unique => Check::Unique(params_or_default(raw, rule_type)?),
            RuleType::TimeRange => Check::TimeRange(params(raw, rule_type)?),
            RuleType::Duration => Check::Duration(params(raw, rule_type)?),
            RuleType::Frequency => Check::Frequency(params(raw, rule_type)?),
            RuleType::DateInterval => Check::DateInterval(params(raw, rule_type)?),
            RuleType::SixMonthsInterval => {
                let p: SixMonthsParams = params(raw, rule_type)?;
                Check::DateInterval(DateIntervalParams {
                    days: SIX_MONTHS_DAYS,
                    group_by: p.group_by,
                })
            }
            RuleType::DateFormat => Check::DateFormat(params_or_default(raw, rule_type)?),
            RuleType::MinValue => Check::MinValue(params(raw, rule_type)?),
            RuleType::MedicalLevel => Check::MedicalLevel(params(raw, rule_type)?),
            RuleType::ProhibitedContent => Check::ProhibitedContent(params(raw, rule_type)?),
            RuleType::SameImplementer => Check::SameImplementer,
            RuleType::CrossTaskValidation => Check::Unsupported,
        };

        Ok(Rule {
            field: raw.field.clone(),
            rule_type,
            message: raw.message.clone(),
            check,
        })
    }
}

fn decode_error(raw: &RawRule, rule_type: RuleType, reason: impl Into<String>) -> RuleError {
    RuleError::Decode {
        field: raw.field.clone(),
        rule_type,
        reason: reason.into(),
    }
}

/// Deserialize required params.
fn params<T: DeserializeOwned>(raw: &RawRule, rule_type: RuleType) -> Result<T> {
    match &raw.params {
        None | Some(serde_yaml::Value::Null) => Err(decode_error(raw, rule_type, "missing params")),
        Some(v) => {
            serde_yaml::from_value(v.clone()).map_err(|e| decode_error(raw, rule_type, e.to_string()))
        }
    }
}

/// Deserialize optional params, falling back to the type's defaults.
fn params_or_default<T: DeserializeOwned + Default>(raw: &RawRule, rule_type: RuleType) -> Result<T> {
    match &raw.params {
        None | Some(serde_yaml::Value::Null) => Ok(T::default()),
        Some(v) => {
            serde_yaml::from_value(v.clone()).map_err(|e| decode_error(raw, rule_type, e.to_string()))
        }
    }
}
