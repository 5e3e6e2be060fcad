use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Request priority hint forwarded to the database with every query.
///
/// The service uses it to schedule CPU between competing requests; it is never enforced locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    /// No hint; the service applies its own default.
    #[default]
    Unspecified,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Returns the lowercase symbolic name used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Unspecified => "unspecified",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = ModelError;

    /// Parses `low`, `medium` or `high`, ignoring case and surrounding whitespace.
    ///
    /// `unspecified` is not accepted: an operator who passes a priority must pick a real one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ModelError::InvalidPriority(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
