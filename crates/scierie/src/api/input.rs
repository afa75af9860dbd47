//! Request body and query helpers shared by the handlers.
//!
//! The web pages post numbers either as JSON numbers or as the raw text of
//! an `<input>`, so numeric fields accept both. A field counts as missing
//! when it is absent, null, an empty string, or the number zero.

use axum::extract::{FromRequest, FromRequestParts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::timestamp;

/// JSON body whose rejection is turned into a 400 `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Query string whose rejection is turned into a 400 `{"error": ...}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// `?id=` query string of the delete routes.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    /// Raw id text.
    pub id: Option<String>,
}

impl IdQuery {
    /// The id, or a missing-fields error carrying `message`.
    ///
    /// # Errors
    ///
    /// Returns a missing-fields error when absent and an invalid-input
    /// error when not an integer.
    pub fn require(&self, message: &str) -> Result<i64> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Err(Error::missing_fields(message)),
            Some(text) => parse_id(text),
        }
    }
}

/// Parse a row id taken from a path or query string.
///
/// # Errors
///
/// Returns an invalid-input error when `text` is not an integer.
pub fn parse_id(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| Error::invalid_input(format!("ID invalide : {text}")))
}

/// Deserialize a number sent as a JSON number or numeric string.
///
/// # Errors
///
/// Fails on non-numeric strings and on other JSON types.
pub fn number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.replace(',', ".")
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| serde::de::Error::custom(format!("nombre invalide : {s}")))
            }
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "nombre attendu, reçu : {other}"
        ))),
    }
}

/// Deserialize a row id sent as a JSON number or numeric string. Whole
/// floats such as `4.0` are accepted.
///
/// # Errors
///
/// Fails on values that are not whole numbers.
pub fn id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole))
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("ID invalide : {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("ID invalide : {s}")))
        }
        Some(other) => Err(serde::de::Error::custom(format!("ID invalide : {other}"))),
    }
}

/// Largest magnitude below which every whole `f64` is exact.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn whole(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_FLOAT).then(|| n as i64)
}

/// A text field that is present and non-empty.
#[must_use]
pub fn text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// A numeric field that is present and non-zero.
#[must_use]
pub fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|n| n.is_normal())
}

/// A row id that is present and non-zero.
#[must_use]
pub fn non_zero_id(value: Option<i64>) -> Option<i64> {
    value.filter(|n| *n != 0)
}

/// Parse a client date.
///
/// # Errors
///
/// Returns an invalid-input error for a malformed date.
pub fn date(value: &str) -> Result<DateTime<Utc>> {
    timestamp::parse_input(value)
        .ok_or_else(|| Error::invalid_input(format!("Date invalide : {value}")))
}

/// Parse an optional client date; empty means absent.
///
/// # Errors
///
/// Returns an invalid-input error for a malformed date.
pub fn optional_date(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    text(value).map(|v| date(&v)).transpose()
}
