//! Response schemas sent with every generation call, and the check that a
//! parsed response actually honours them before it is deserialised.

use serde_json::{json, Value};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

fn framing_activity() -> Value {
    json!({
        "type": "OBJECT",
        "properties": { "steps": string(), "duration": string() },
        "required": ["steps", "duration"]
    })
}

fn core_phase() -> Value {
    json!({
        "type": "OBJECT",
        "properties": { "type": string(), "steps": string(), "duration": string() },
        "required": ["type", "steps", "duration"]
    })
}

fn assessment_item() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "technique": string(),
            "instrument": string(),
            "rubric": string()
        },
        "required": ["technique", "instrument", "rubric"]
    })
}

pub fn topics() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "chapter": string(),
                "title": string(),
                "materials": string_list()
            },
            "required": ["chapter", "title", "materials"]
        }
    })
}

pub fn objectives() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "cp": string(),
            "tp": string_list(),
            "dimensions": string_list(),
            "suggestedMeetings": { "type": "INTEGER" },
            "suggestedPedagogy": string_list()
        },
        "required": ["cp", "tp", "dimensions", "suggestedMeetings", "suggestedPedagogy"]
    })
}

pub fn lesson_content() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "students": string(),
            "interdisciplinary": string(),
            "partnership": string(),
            "environment": string(),
            "digitalTools": string(),
            "summary": string(),
            "meetings": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "opening": framing_activity(),
                        "understand": core_phase(),
                        "apply": core_phase(),
                        "reflect": core_phase(),
                        "closing": framing_activity()
                    },
                    "required": ["opening", "understand", "apply", "reflect", "closing"]
                }
            },
            "assessments": {
                "type": "OBJECT",
                "properties": {
                    "initial": assessment_item(),
                    "process": assessment_item(),
                    "final": assessment_item()
                },
                "required": ["initial", "process", "final"]
            },
            "lkpd": string(),
            "formativeQuestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": string(),
                        "options": {
                            "type": "OBJECT",
                            "properties": {
                                "a": string(),
                                "b": string(),
                                "c": string(),
                                "d": string()
                            },
                            "required": ["a", "b", "c", "d"]
                        },
                        "answer": { "type": "STRING", "enum": ["a", "b", "c", "d"] }
                    },
                    "required": ["question", "options", "answer"]
                }
            }
        },
        "required": [
            "students",
            "interdisciplinary",
            "partnership",
            "environment",
            "digitalTools",
            "summary",
            "meetings",
            "assessments",
            "lkpd",
            "formativeQuestions"
        ]
    })
}

pub fn annual_program() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "material": string(),
                "hours": { "type": "INTEGER" },
                "semester": { "type": "INTEGER" }
            },
            "required": ["material", "hours", "semester"]
        }
    })
}

pub fn semester_program() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "material": string(),
                "hours": { "type": "INTEGER" },
                "weeks": string_list()
            },
            "required": ["material", "hours", "weeks"]
        }
    })
}

/// Check `value` against `schema`, returning the path of the first violation.
///
/// Understands the subset used above: OBJECT with `properties`/`required`,
/// ARRAY with `items`, STRING (optionally `enum`, compared case-insensitively),
/// INTEGER, NUMBER and BOOLEAN. Keys not declared in the schema are ignored.
pub fn check(value: &Value, schema: &Value) -> Result<(), String> {
    check_at(value, schema, "$")
}

fn check_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    let kind = schema["type"].as_str().unwrap_or_default();
    match kind {
        "OBJECT" => {
            let object = value
                .as_object()
                .ok_or_else(|| format!("{path}: expected object"))?;
            if let Some(required) = schema["required"].as_array() {
                for key in required.iter().filter_map(Value::as_str) {
                    if !object.contains_key(key) || object[key].is_null() {
                        return Err(format!("{path}.{key}: missing required field"));
                    }
                }
            }
            if let Some(properties) = schema["properties"].as_object() {
                for (key, property) in properties {
                    if let Some(child) = object.get(key).filter(|v| !v.is_null()) {
                        check_at(child, property, &format!("{path}.{key}"))?;
                    }
                }
            }
            Ok(())
        }
        "ARRAY" => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("{path}: expected array"))?;
            for (i, item) in items.iter().enumerate() {
                check_at(item, &schema["items"], &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        "STRING" => {
            let text = value
                .as_str()
                .ok_or_else(|| format!("{path}: expected string"))?;
            if let Some(allowed) = schema["enum"].as_array() {
                let ok = allowed
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|a| a.eq_ignore_ascii_case(text.trim()));
                if !ok {
                    return Err(format!("{path}: '{text}' is not an allowed value"));
                }
            }
            Ok(())
        }
        "INTEGER" => {
            if value.is_i64() || value.is_u64() {
                Ok(())
            } else {
                Err(format!("{path}: expected integer"))
            }
        }
        "NUMBER" => value
            .is_number()
            .then_some(())
            .ok_or_else(|| format!("{path}: expected number")),
        "BOOLEAN" => value
            .is_boolean()
            .then_some(())
            .ok_or_else(|| format!("{path}: expected boolean")),
        _ => Ok(()),
    }
}
