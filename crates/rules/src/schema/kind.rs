//! Rule type enum: the closed set of checks a catalog may name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every rule type a task catalog may reference, keyed by its camelCase wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleType {
    Required,
    Unique,
    TimeRange,
    Duration,
    Frequency,
    DateInterval,
    DateFormat,
    MinValue,
    MedicalLevel,
    SixMonthsInterval,
    CrossTaskValidation,
    ProhibitedContent,
    SameImplementer,
}

impl RuleType {
    pub const ALL: [RuleType; 13] = [
        RuleType::Required,
        RuleType::Unique,
        RuleType::TimeRange,
        RuleType::Duration,
        RuleType::Frequency,
        RuleType::DateInterval,
        RuleType::DateFormat,
        RuleType::MinValue,
        RuleType::MedicalLevel,
        RuleType::SixMonthsInterval,
        RuleType::CrossTaskValidation,
        RuleType::ProhibitedContent,
        RuleType::SameImplementer,
    ];

    /// Wire name as it appears in catalogs and in `Violation::error_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Required => "required",
            RuleType::Unique => "unique",
            RuleType::TimeRange => "timeRange",
            RuleType::Duration => "duration",
            RuleType::Frequency => "frequency",
            RuleType::DateInterval => "dateInterval",
            RuleType::DateFormat => "dateFormat",
            RuleType::MinValue => "minValue",
            RuleType::MedicalLevel => "medicalLevel",
            RuleType::SixMonthsInterval => "sixMonthsInterval",
            RuleType::CrossTaskValidation => "crossTaskValidation",
            RuleType::ProhibitedContent => "prohibitedContent",
            RuleType::SameImplementer => "sameImplementer",
        }
    }

    /// All wire names, for "did you mean" suggestions.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RuleType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown rule type: '{}'", s))
    }
}
