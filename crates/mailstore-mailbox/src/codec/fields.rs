//! Path-tracking access to the fields of a JSON object.

use mailstore_core::error::{DecodeError, DecodeErrorKind};
use serde_json::{Map, Value};

/// Joins a field name onto a path.
pub(crate) fn child(path: &str, name: &str) -> String {
    format!("{path}.{name}")
}

/// Path of the `index`-th element of the array at `path`.
pub(crate) fn element(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// Reads a string value.
pub(crate) fn as_str<'a>(path: &str, value: &'a Value) -> Result<&'a str, DecodeError> {
    value
        .as_str()
        .ok_or_else(|| DecodeError::wrong_type(path, "string"))
}

/// Reads an integral number that fits in `u64`.
pub(crate) fn as_u64(path: &str, value: &Value) -> Result<u64, DecodeError> {
    match value {
        Value::Number(n) if n.is_u64() => n
            .as_u64()
            .ok_or_else(|| DecodeError::wrong_type(path, "integer")),
        Value::Number(n) if n.is_i64() => Err(DecodeError::malformed(
            path,
            format!("{n} must not be negative"),
        )),
        _ => Err(DecodeError::wrong_type(path, "integer")),
    }
}

/// Reads an integral number that fits in `i64`.
pub(crate) fn as_i64(path: &str, value: &Value) -> Result<i64, DecodeError> {
    match value {
        Value::Number(n) if n.is_i64() => n
            .as_i64()
            .ok_or_else(|| DecodeError::wrong_type(path, "integer")),
        Value::Number(n) if n.is_u64() => Err(DecodeError::malformed(
            path,
            format!("{n} does not fit a signed 64-bit integer"),
        )),
        _ => Err(DecodeError::wrong_type(path, "integer")),
    }
}

/// Reads an array.
pub(crate) fn as_array<'a>(path: &str, value: &'a Value) -> Result<&'a Vec<Value>, DecodeError> {
    value
        .as_array()
        .ok_or_else(|| DecodeError::wrong_type(path, "array"))
}

/// Reads an object.
pub(crate) fn as_object<'a>(
    path: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::wrong_type(path, "object"))
}

/// The fields of one JSON object, remembering where it sits in the document.
///
/// Absent fields and fields holding `null` are treated alike.
#[derive(Debug, Clone)]
pub(crate) struct Fields<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Wraps the object at `path`.
    pub(crate) fn of(path: impl Into<String>, value: &'a Value) -> Result<Self, DecodeError> {
        let path = path.into();
        let map = as_object(&path, value)?;
        Ok(Self { path, map })
    }

    /// Path of this object.
    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|value| !value.is_null())
    }

    /// Decodes a mandatory field with `decode`.
    pub(crate) fn required<T>(
        &self,
        name: &str,
        decode: impl FnOnce(&str, &'a Value) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        let path = child(&self.path, name);
        match self.get(name) {
            Some(value) => decode(&path, value),
            None => Err(DecodeError::new(path, DecodeErrorKind::MissingField)),
        }
    }

    /// Decodes an optional field with `decode`.
    pub(crate) fn optional<T>(
        &self,
        name: &str,
        decode: impl FnOnce(&str, &'a Value) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        let path = child(&self.path, name);
        self.get(name).map(|value| decode(&path, value)).transpose()
    }

    /// A mandatory string.
    pub(crate) fn string(&self, name: &str) -> Result<&'a str, DecodeError> {
        self.required(name, as_str)
    }

    /// An optional string.
    pub(crate) fn optional_string(&self, name: &str) -> Result<Option<&'a str>, DecodeError> {
        self.optional(name, as_str)
    }

    /// A mandatory non-negative integer.
    pub(crate) fn u64(&self, name: &str) -> Result<u64, DecodeError> {
        self.required(name, as_u64)
    }

    /// A mandatory signed integer.
    pub(crate) fn i64(&self, name: &str) -> Result<i64, DecodeError> {
        self.required(name, as_i64)
    }

    /// A mandatory boolean.
    pub(crate) fn bool(&self, name: &str) -> Result<bool, DecodeError> {
        self.required(name, as_bool)
    }

    /// An optional boolean, `false` when absent.
    pub(crate) fn flag(&self, name: &str) -> Result<bool, DecodeError> {
        Ok(self.optional(name, as_bool)?.unwrap_or(false))
    }

    /// A mandatory nested object.
    pub(crate) fn object(&self, name: &str) -> Result<Fields<'a>, DecodeError> {
        self.required(name, |path, value| Fields::of(path, value))
    }

    /// Iterates the entries of this object with their paths.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (String, &'a String, &'a Value)> + '_ {
        self.map
            .iter()
            .map(|(key, value)| (child(&self.path, key), key, value))
    }
}

fn as_bool(path: &str, value: &Value) -> Result<bool, DecodeError> {
    value
        .as_bool()
        .ok_or_else(|| DecodeError::wrong_type(path, "boolean"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_null_is_treated_as_absent() {
        let value = json!({"a": null});
        let fields = Fields::of("Doc", &value).unwrap();

        assert_eq!(fields.optional_string("a").unwrap(), None);
        assert_eq!(
            fields.string("a").unwrap_err(),
            DecodeError::missing("Doc.a")
        );
    }

    #[test]
    fn test_integers_reject_floats() {
        let value = json!({"n": 1.5, "m": -3});
        let fields = Fields::of("Doc", &value).unwrap();

        assert_eq!(
            fields.i64("n").unwrap_err(),
            DecodeError::wrong_type("Doc.n", "integer")
        );
        assert_eq!(fields.i64("m").unwrap(), -3);
        assert!(matches!(
            fields.u64("m").unwrap_err().kind,
            DecodeErrorKind::MalformedValue(_)
        ));
    }

    #[test]
    fn test_wrong_container_type() {
        let value = json!([1, 2]);

        assert_eq!(
            Fields::of("Doc", &value).unwrap_err(),
            DecodeError::wrong_type("Doc", "object")
        );
    }
}
