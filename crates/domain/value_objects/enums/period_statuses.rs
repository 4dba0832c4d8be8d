use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Externally visible state of a subscription period. Never persisted; see
/// `status_projection::project`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Active,
    Paused,
    Canceled,
    Expired,
}

impl PeriodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodStatus::Active => "active",
            PeriodStatus::Paused => "paused",
            PeriodStatus::Canceled => "canceled",
            PeriodStatus::Expired => "expired",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "active" => Some(PeriodStatus::Active),
            "paused" => Some(PeriodStatus::Paused),
            "canceled" => Some(PeriodStatus::Canceled),
            "expired" => Some(PeriodStatus::Expired),
            _ => None,
        }
    }
}

impl Display for PeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
