use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Fully qualified identity of the target database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabasePath {
    project: String,
    instance: String,
    database: String,
}

impl DatabasePath {
    /// Build a path from its three identifiers.
    ///
    /// Identifiers are trimmed; an empty one is reported by name.
    pub fn new(
        project: impl Into<String>,
        instance: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let project = non_empty(project.into()).ok_or(ModelError::MissingProject)?;
        let instance = non_empty(instance.into()).ok_or(ModelError::MissingInstance)?;
        let database = non_empty(database.into()).ok_or(ModelError::MissingDatabase)?;

        Ok(Self {
            project,
            instance,
            database,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
