//! Field-level parsing of request bodies and query strings.
//!
//! Bodies are read as a JSON object and each field is pulled out by name, so
//! every failure names the field it came from. Absent fields come back as
//! `None`; nullable fields use `Option<Option<T>>` to tell absent from `null`.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::tagging::TagDescriptor;

pub const NAME_MAX_LEN: usize = 100;
pub const GEOGRAPHY_MAX_LEN: usize = 200;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";

#[derive(Debug, Default, Clone)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(Error::validation(
                "non_field_errors",
                "Invalid data. Expected a dictionary.",
            )),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Merges `other` over this set; keys present in both take `other`'s value.
    pub fn merge(&mut self, other: Fields) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Absent → `None`, `null` → `Some(None)`.
    fn raw(&self, key: &str) -> Option<Option<&Value>> {
        self.0
            .get(key)
            .map(|v| if v.is_null() { None } else { Some(v) })
    }

    fn non_null(&self, key: &str) -> Result<Option<&Value>> {
        match self.raw(key) {
            None => Ok(None),
            Some(None) => Err(Error::validation(key, NOT_NULL)),
            Some(Some(v)) => Ok(Some(v)),
        }
    }

    pub fn text(&self, key: &str, max_len: Option<usize>, allow_blank: bool) -> Result<Option<String>> {
        let Some(value) = self.non_null(key)? else {
            return Ok(None);
        };
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return Err(Error::validation(key, "Not a valid string.")),
        };

        if !allow_blank && text.is_empty() {
            return Err(Error::validation(key, NOT_BLANK));
        }
        if let Some(max) = max_len {
            if text.chars().count() > max {
                return Err(Error::validation(
                    key,
                    format!("Ensure this field has no more than {max} characters."),
                ));
            }
        }
        Ok(Some(text))
    }

    pub fn integer(&self, key: &str) -> Result<Option<i64>> {
        self.non_null(key)?
            .map(|v| parse_integer(key, v))
            .transpose()
    }

    pub fn nullable_integer(&self, key: &str) -> Result<Option<Option<i64>>> {
        self.raw(key)
            .map(|v| v.map(|v| parse_integer(key, v)).transpose())
            .transpose()
    }

    pub fn nullable_number(&self, key: &str) -> Result<Option<Option<f64>>> {
        self.raw(key)
            .map(|v| v.map(|v| parse_number(key, v)).transpose())
            .transpose()
    }

    pub fn boolean(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.non_null(key)? else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| Error::validation(key, "Must be a valid boolean."))
    }

    pub fn choice<T: FromStr<Err = String>>(&self, key: &str) -> Result<Option<T>> {
        self.non_null(key)?
            .map(|v| parse_choice(key, v))
            .transpose()
    }

    pub fn nullable_choice<T: FromStr<Err = String>>(&self, key: &str) -> Result<Option<Option<T>>> {
        self.raw(key)
            .map(|v| v.map(|v| parse_choice(key, v)).transpose())
            .transpose()
    }

    pub fn nullable_date(&self, key: &str) -> Result<Option<Option<NaiveDate>>> {
        self.raw(key)
            .map(|v| {
                v.map(|v| {
                    v.as_str()
                        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
                        .ok_or_else(|| {
                            Error::validation(
                                key,
                                "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
                            )
                        })
                })
                .transpose()
            })
            .transpose()
    }

    /// Reads a list of tag descriptors, `[{"name": ".."}, ..]`.
    pub fn tags(&self, key: &str) -> Result<Option<Vec<TagDescriptor>>> {
        let Some(value) = self.non_null(key)? else {
            return Ok(None);
        };
        // Multipart text parts carry the list as a JSON string
        let value = match value {
            Value::String(s) => serde_json::from_str::<Value>(s)
                .map_err(|_| Error::validation(key, "Expected a list of items."))?,
            v => v.clone(),
        };
        serde_json::from_value::<Vec<TagDescriptor>>(value)
            .map(Some)
            .map_err(|_| {
                Error::validation(key, "Expected a list of objects with a \"name\" field.")
            })
    }
}

fn parse_integer(key: &str, value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::validation(key, "A valid integer is required."))
}

fn parse_number(key: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed
        .filter(|n: &f64| n.is_finite())
        .ok_or_else(|| Error::validation(key, "A valid number is required."))
}

fn parse_choice<T: FromStr<Err = String>>(key: &str, value: &Value) -> Result<T> {
    match value {
        Value::String(s) => s.parse().map_err(|e| Error::validation(key, e)),
        _ => Err(Error::validation(key, "Not a valid choice.")),
    }
}

/// Unwraps a value that must be present on create.
pub fn require<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| Error::validation(key, REQUIRED))
}

/// Checks a closed integer range, inclusive on both ends.
pub fn check_range<T: PartialOrd + std::fmt::Display>(value: T, key: &str, min: T, max: T) -> Result<T> {
    if value < min || value > max {
        return Err(Error::validation(
            key,
            format!("Ensure this value is between {min} and {max}."),
        ));
    }
    Ok(value)
}

/// Parses a comma separated id list such as `1, 2,3`. Empty elements are skipped.
pub fn parse_id_list(raw: &str, key: &str) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = part.parse::<i64>().map_err(|_| {
            Error::validation(key, format!("\"{part}\" is not a valid integer id."))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Parses a `0`/`1` query flag. Absent means false.
pub fn parse_flag(raw: Option<&str>, key: &str) -> Result<bool> {
    match raw.map(str::trim) {
        None | Some("") | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(other) => Err(Error::validation(
            key,
            format!("\"{other}\" is not a valid value, expected 0 or 1."),
        )),
    }
}
