use serde::{Deserialize, Serialize};

use crate::Priority;

/// A query as issued to the database: SQL text plus its priority hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub sql: String,
    #[serde(default)]
    pub priority: Priority,
}

impl Statement {
    pub fn new(sql: impl Into<String>, priority: Priority) -> Self {
        Self {
            sql: sql.into(),
            priority,
        }
    }
}
