use encwatch_core::{Progress, StatusMap};
use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("status body is not valid json: {0}")]
    Syntax(String),
    #[error("status body must be a json object, got {0}")]
    NotAnObject(&'static str),
    #[error("entry {name:?} has unsupported value type {found}")]
    UnsupportedValue { name: String, found: &'static str },
}

/// Decode a status body: a JSON object of item name -> percentage, where the
/// percentage is a string or a number.
pub fn decode_status(bytes: &[u8]) -> Result<StatusMap, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::Syntax(err.to_string()))?;
    let Value::Object(entries) = value else {
        return Err(DecodeError::NotAnObject(type_name(&value)));
    };

    entries
        .into_iter()
        .map(|(name, value)| {
            let progress = match &value {
                Value::String(text) => Progress::from_text(text),
                Value::Number(number) => match number.as_i64() {
                    Some(int) => Progress::from_integer(int),
                    None => Progress::from_float(number.as_f64().unwrap_or(f64::NAN)),
                },
                other => {
                    return Err(DecodeError::UnsupportedValue {
                        name,
                        found: type_name(other),
                    })
                }
            };
            Ok((name, progress))
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_strings_and_numbers() {
        let map = decode_status(br#"{"a.mp4": "100", "b.mp4": "42", "c.mkv": 7, "d.mkv": 12.5}"#)
            .unwrap();
        assert_eq!(map["a.mp4"], Progress::Complete);
        assert_eq!(map["b.mp4"], Progress::Percent(42));
        assert_eq!(map["c.mkv"], Progress::Percent(7));
        assert_eq!(map["d.mkv"], Progress::Percent(12));
    }

    #[test]
    fn empty_object_is_empty_map() {
        assert!(decode_status(b"{}").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_objects_and_nested_values() {
        assert_eq!(
            decode_status(b"[1, 2]"),
            Err(DecodeError::NotAnObject("array"))
        );
        assert_eq!(
            decode_status(br#"{"a": [1]}"#),
            Err(DecodeError::UnsupportedValue {
                name: "a".to_string(),
                found: "array"
            })
        );
        assert!(matches!(
            decode_status(b"{not json"),
            Err(DecodeError::Syntax(_))
        ));
    }
}
