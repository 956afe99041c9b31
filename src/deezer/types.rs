use serde_json::Value;

use crate::error::LookupFailure;

/// Extract the first result's identifier from a decoded search response.
///
/// Works on a raw [`Value`] rather than a typed payload so that an empty
/// result list and a malformed one stay distinguishable.
pub fn parse_response(response: &Value) -> Result<String, LookupFailure> {
    let object = match response {
        Value::Object(object) => object,
        Value::Null => return Err(LookupFailure::NoResults),
        other => {
            return Err(LookupFailure::InvalidBody(format!(
                "expected a JSON object, got {}",
                kind_of(other)
            )))
        }
    };

    let first = match object.get("data") {
        None | Some(Value::Null) => return Err(LookupFailure::NoResults),
        Some(Value::Array(items)) => match items.first() {
            Some(first) => first,
            None => return Err(LookupFailure::NoResults),
        },
        Some(other) if is_blank(other) => return Err(LookupFailure::NoResults),
        Some(other) => {
            return Err(LookupFailure::MalformedRecord(format!(
                "data is {}, not a list",
                kind_of(other)
            )))
        }
    };

    let record = match first {
        Value::Object(record) => record,
        other => {
            return Err(LookupFailure::MalformedRecord(format!(
                "first result is {}, not an object",
                kind_of(other)
            )))
        }
    };

    tracing::debug!(
        "First result: {} by {}",
        record.get("title").and_then(serde_json::Value::as_str).unwrap_or("?"),
        record
            .get("artist")
            .and_then(|artist| artist.get("name"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("?")
    );

    // Deezer ids are numbers on the wire; string ids pass through as-is
    match record.get("id") {
        None | Some(Value::Null) => Err(LookupFailure::MissingIdentifier),
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(LookupFailure::MalformedRecord(format!(
            "id is {}",
            kind_of(other)
        ))),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Null => true,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
