//! Repaired JSON text into a [`GraphNode`] tree.
//!
//! Field handling is lenient: wrong types fall back to defaults instead of failing the
//! whole response, so partially-correct model output is salvaged. All coercion rules are
//! in [`coerce`]. Identity is never taken from the input: every node gets a fresh id.

use serde_json::Value;
use tracing::debug;

use crate::error::ExplorerError;
use crate::model::{GraphNode, NodeId};

/// Per-field coercion with defaults.
pub mod coerce {
    use serde_json::{Map, Value};

    /// String field; absent or non-string is `""`.
    pub fn string(obj: &Map<String, Value>, key: &str) -> String {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Array field; absent or non-array is empty.
    pub fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
        obj.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Array of strings; non-string entries and blank strings are dropped.
    pub fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
        array(obj, key)
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parses sanitized model output into a node tree.
///
/// Fails with [`ExplorerError::MalformedResponse`] when `json_text` is not valid JSON or
/// its top-level value is not an object.
pub fn parse(json_text: &str) -> Result<GraphNode, ExplorerError> {
    let value: Value = serde_json::from_str(json_text)?;
    let Value::Object(ref obj) = value else {
        return Err(ExplorerError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            kind(&value)
        )));
    };
    let node = node_from_object(obj);
    debug!(nodes = node.count(), "parsed graph model");
    Ok(node)
}

fn node_from_object(obj: &serde_json::Map<String, Value>) -> GraphNode {
    GraphNode {
        id: NodeId::generate(),
        title: coerce::string(obj, "title"),
        description: coerce::string(obj, "description"),
        url: coerce::string(obj, "url"),
        children: coerce::array(obj, "children")
            .iter()
            .filter_map(child_from_value)
            .collect(),
        prompts: coerce::string_list(obj, "prompts"),
        visible: true,
        loading: false,
    }
}

/// Objects recurse; a bare string becomes a title-only node; anything else is skipped.
fn child_from_value(value: &Value) -> Option<GraphNode> {
    match value {
        Value::Object(obj) => Some(node_from_object(obj)),
        Value::String(s) if !s.trim().is_empty() => Some(GraphNode::new(s.trim())),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
