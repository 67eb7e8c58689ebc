// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::consts::METADATA_CONTENT;

/// One unit of work as delivered by the transport.
///
/// ```json
/// {
///   "runId": "c6b1e7d2",
///   "dataInfo": { "content": "metadata", "identifier": "dataset-17" },
///   "config": { "scriptType": "embedded", "script": "fn transforming(obj) { obj }" },
///   "payload": "{\"title\": \"Trees\"}"
/// }
/// ```
///
/// Fields this stage does not interpret are kept in `extra` so a passthrough item
/// leaves as it arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_info: Option<Value>,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub payload: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkItem {
    /// The content descriptor, `None` when absent or JSON `null`.
    pub fn content(&self) -> Option<&Value> {
        self.data_info
            .as_ref()
            .and_then(|info| info.get("content"))
            .filter(|content| !content.is_null())
    }

    /// Whether this item goes through the transformation path.
    ///
    /// Items without a content descriptor, or whose descriptor is `"metadata"`, are
    /// transformed. Everything else passes through untouched.
    pub fn is_transformable(&self) -> bool {
        match self.content() {
            None => true,
            Some(Value::String(content)) => content == METADATA_CONTENT,
            Some(_) => false,
        }
    }

    /// Content descriptor rendered for log lines.
    pub fn content_label(&self) -> String {
        match self.content() {
            None => "absent".to_string(),
            Some(Value::String(content)) => content.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// A successful transformation result on its way downstream.
///
/// `extra` carries the inbound envelope fields the stage does not interpret, so
/// the result follows the same route the work item would have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedItem {
    pub run_id: String,
    pub payload: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_info: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(data_info: Option<Value>) -> WorkItem {
        WorkItem {
            run_id: "run-1".to_string(),
            data_info,
            config: json!({}),
            payload: "{}".to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_classification() {
        assert!(item(None).is_transformable());
        assert!(item(Some(json!({}))).is_transformable());
        assert!(item(Some(json!({"content": null}))).is_transformable());
        assert!(item(Some(json!({"content": "metadata"}))).is_transformable());

        assert!(!item(Some(json!({"content": "identifierList"}))).is_transformable());
        assert!(!item(Some(json!({"content": "Metadata"}))).is_transformable());
        assert!(!item(Some(json!({"content": 3}))).is_transformable());
    }

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let line = r#"{"runId":"r","dataInfo":{"content":"x"},"config":{},"payload":"p","pipe":{"segments":[]}}"#;
        let item: WorkItem = serde_json::from_str(line).unwrap();

        assert_eq!(item.run_id, "r");
        assert_eq!(item.extra.get("pipe"), Some(&json!({"segments": []})));

        let back: Value = serde_json::to_value(&item).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(line).unwrap());
    }

    #[test]
    fn test_missing_optional_fields() {
        let item: WorkItem = serde_json::from_str(r#"{"runId":"r"}"#).unwrap();

        assert!(item.data_info.is_none());
        assert_eq!(item.config, Value::Null);
        assert_eq!(item.payload, "");
        assert_eq!(item.content_label(), "absent");
    }

    #[test]
    fn test_transformed_item_wire_names() {
        let out = TransformedItem {
            run_id: "r".to_string(),
            payload: "{}".to_string(),
            mime_type: "text/turtle".to_string(),
            data_info: Some(json!({"content": "metadata"})),
            extra: Map::new(),
        };

        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"runId": "r", "payload": "{}", "mimeType": "text/turtle", "dataInfo": {"content": "metadata"}})
        );
    }
}
