use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Data snapshot of one bound object.
///
/// Reference fields only ever hold identifiers here, never resolved records, so an entry stays
/// serializable and independent of where it is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDataEntry {
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl ObjectDataEntry {
    pub fn new(data: Map<String, Value>, external_id: Option<String>) -> Self {
        ObjectDataEntry { data, external_id }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// A new snapshot with `partial` shallow-merged over the current data.
    pub fn merged(&self, partial: &Map<String, Value>) -> Self {
        let mut data = self.data.clone();
        for (field, value) in partial.iter() {
            data.insert(field.clone(), value.clone());
        }
        ObjectDataEntry {
            data,
            external_id: self.external_id.clone(),
        }
    }

    /// A new snapshot whose data is exactly `partial`. The external id is kept.
    pub fn replaced(&self, partial: &Map<String, Value>) -> Self {
        ObjectDataEntry {
            data: partial.clone(),
            external_id: self.external_id.clone(),
        }
    }

    pub fn updated(&self, partial: &Map<String, Value>, merge: bool) -> Self {
        if merge {
            self.merged(partial)
        } else {
            self.replaced(partial)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_vs_replace() {
        let entry = ObjectDataEntry::new(map(json!({ "a": 0, "b": 2 })), Some("x1".to_string()));

        let merged = entry.updated(&map(json!({ "a": 1 })), true);
        assert_eq!(merged.data, map(json!({ "a": 1, "b": 2 })));

        let replaced = entry.updated(&map(json!({ "a": 1 })), false);
        assert_eq!(replaced.data, map(json!({ "a": 1 })));
        assert_eq!(replaced.external_id.as_deref(), Some("x1"));

        // The source snapshot is untouched
        assert_eq!(entry.data, map(json!({ "a": 0, "b": 2 })));
    }
}
