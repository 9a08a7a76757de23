//! Argument validation against tool input schemas.
//!
//! Covers the JSON Schema subset the tool schemas use: `type`, `required`,
//! `properties`, `additionalProperties` (`false` or a schema), `enum`, `minimum`,
//! `maximum`, `minLength`, `minItems`, `maxItems`, `items` and `pattern`.
//! Unknown keywords are ignored.

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};

/// Validate `value` against `schema`. Errors name the offending field by its
/// dotted path (`categories[1]`, `records[0].id`).
pub fn validate(schema: &Value, value: &Value) -> ToolResult<()> {
    check(schema, value, "")
}

fn check(schema: &Value, value: &Value, path: &str) -> ToolResult<()> {
    let Some(schema) = schema.as_object() else {
        return Ok(());
    };

    if let Some(expected) = schema.get("type") {
        check_type(expected, value, path)?;
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let options: Vec<String> = allowed.iter().map(Value::to_string).collect();
            return Err(fail(path, format!("must be one of {}", options.join(", "))));
        }
    }

    match value {
        Value::Object(obj) => check_object(schema, obj, path),
        Value::Array(items) => check_array(schema, items, path),
        Value::String(s) => check_string(schema, s, path),
        Value::Number(_) => check_number(schema, value, path),
        _ => Ok(()),
    }
}

fn check_type(expected: &Value, value: &Value, path: &str) -> ToolResult<()> {
    let matches = |name: &str| match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        _ => true,
    };

    let ok = match expected {
        Value::String(name) => matches(name),
        Value::Array(names) => names.iter().filter_map(Value::as_str).any(matches),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(fail(path, format!("expected {}, got {}", type_label(expected), json_type(value))))
    }
}

fn check_object(schema: &Map<String, Value>, obj: &Map<String, Value>, path: &str) -> ToolResult<()> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(field) {
                return Err(fail(&join(path, field), "is required".to_string()));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let additional = schema.get("additionalProperties");

    for (key, item) in obj {
        match (properties.and_then(|p| p.get(key)), additional) {
            (Some(sub), _) => check(sub, item, &join(path, key))?,
            (None, Some(Value::Bool(false))) => {
                return Err(fail(&join(path, key), "is not a recognised parameter".to_string()));
            }
            (None, Some(sub @ Value::Object(_))) => check(sub, item, &join(path, key))?,
            _ => {}
        }
    }
    Ok(())
}

fn check_array(schema: &Map<String, Value>, items: &[Value], path: &str) -> ToolResult<()> {
    let len = items.len() as u64;
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if len < min {
            return Err(fail(path, format!("needs at least {min} item(s)")));
        }
    }
    if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
        if len > max {
            return Err(fail(path, format!("allows at most {max} item(s)")));
        }
    }
    if let Some(item_schema) = schema.get("items") {
        for (i, item) in items.iter().enumerate() {
            check(item_schema, item, &format!("{path}[{i}]"))?;
        }
    }
    Ok(())
}

fn check_string(schema: &Map<String, Value>, s: &str, path: &str) -> ToolResult<()> {
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if (s.chars().count() as u64) < min {
            return Err(fail(path, format!("must be at least {min} character(s)")));
        }
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        let re = Regex::new(pattern)
            .map_err(|e| ToolError::internal(format!("bad schema pattern for '{path}': {e}")))?;
        if !re.is_match(s) {
            return Err(fail(path, format!("must match {pattern}")));
        }
    }
    Ok(())
}

fn check_number(schema: &Map<String, Value>, value: &Value, path: &str) -> ToolResult<()> {
    let Some(n) = value.as_f64() else {
        return Ok(());
    };
    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
        if n < min {
            return Err(fail(path, format!("must be at least {min}")));
        }
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
        if n > max {
            return Err(fail(path, format!("must be at most {max}")));
        }
    }
    Ok(())
}

fn fail(path: &str, message: String) -> ToolError {
    let field = if path.is_empty() { "arguments" } else { path };
    ToolError::validation(field, message)
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() { key.to_string() } else { format!("{path}.{key}") }
}

fn type_label(expected: &Value) -> String {
    match expected {
        Value::Array(names) => {
            names.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" or ")
        }
        other => other.as_str().unwrap_or("?").to_string(),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
