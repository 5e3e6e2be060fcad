use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One result row, columns in select-list order.
///
/// Values keep the service's JSON encoding (e.g. INT64 arrives as a string); the loader never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&Value> {
        self.0.get(column)
    }
}

#[cfg(test)]
mod tests {
    use super::Row;

    #[test]
    fn deserializes_from_json_array() {
        let row: Row = serde_json::from_str(r#"["1", null, true]"#).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.get(0).and_then(|v| v.as_str()), Some("1"));
        assert!(row.get(1).is_some_and(|v| v.is_null()));
        assert!(row.get(3).is_none());
    }
}
