//! Host Message Decoding
//!
//! Converts one host-supplied JSON object into a [`StoreRow`] using the SMS
//! provider's canonical column names.
//!
//! ## Host Message Fields
//!
//! - `address`: Recipient or sender (string)
//! - `body`: Message contents (string; numbers and booleans are coerced)
//! - `date`: Timestamp in milliseconds (integer or numeric string)
//! - `dateSent`: Send timestamp in milliseconds (integer or numeric string)
//! - `read`: Read flag, 0 or 1 (integer or numeric string)
//! - `kind`: Box discriminator (integer or numeric string)
//!
//! Unknown fields are ignored.

use crate::{BridgeError, Result};
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Lowest host API level whose SMS provider exposes the canonical columns
pub const SMS_SCHEMA_MIN_API_LEVEL: u32 = 19;

/// Canonical SMS provider column names
pub mod columns {
    pub const ADDRESS: &str = "address";
    pub const BODY: &str = "body";
    pub const DATE: &str = "date";
    pub const DATE_SENT: &str = "date_sent";
    pub const READ: &str = "read";
    /// Box code column, filled in by the store from the destination
    pub const TYPE: &str = "type";
}

/// One SMS record as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMessage {
    pub address: String,

    #[serde(deserialize_with = "deserialize_text")]
    pub body: String,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: i64,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date_sent: i64,

    #[serde(deserialize_with = "deserialize_small_int")]
    pub read: i32,

    #[serde(deserialize_with = "deserialize_small_int")]
    pub kind: i32,
}

impl HostMessage {
    /// Parse a host argument into a typed message
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::MalformedPayload` if the argument is not an
    /// object or any field is missing, null, or not coercible.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(BridgeError::malformed(format!(
                "expected a message object, got {}",
                json_type_name(value)
            )));
        }

        HostMessage::deserialize(value).map_err(|e| BridgeError::malformed(e.to_string()))
    }
}

/// Value stored in a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
}

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            ColumnValue::Text(text) => text.to_sql(),
            ColumnValue::Integer(value) => value.to_sql(),
        }
    }
}

/// A row ready for insertion into the SMS content store
///
/// The message `kind` rides along after decoding so the inserter can route
/// the row, but it is never part of [`StoreRow::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRow {
    pub address: String,
    pub body: String,
    pub date: i64,
    pub date_sent: i64,
    pub read: i32,
    kind: Option<i32>,
}

impl StoreRow {
    /// Decode a host argument into a row for a host at `api_level`
    ///
    /// # Errors
    ///
    /// - `BridgeError::Unsupported` below [`SMS_SCHEMA_MIN_API_LEVEL`]
    /// - `BridgeError::MalformedPayload` for any field problem
    pub fn decode(value: &Value, api_level: u32) -> Result<Self> {
        if api_level < SMS_SCHEMA_MIN_API_LEVEL {
            return Err(BridgeError::Unsupported(format!(
                "SMS provider columns require API level {}, host is {}",
                SMS_SCHEMA_MIN_API_LEVEL, api_level
            )));
        }

        HostMessage::from_value(value).map(StoreRow::from)
    }

    /// Routing kind, if it has not been taken yet
    pub fn kind(&self) -> Option<i32> {
        self.kind
    }

    /// Remove the routing kind from the row
    pub fn take_kind(&mut self) -> Option<i32> {
        self.kind.take()
    }

    /// Column/value pairs in provider column order
    pub fn columns(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            (columns::ADDRESS, ColumnValue::Text(self.address.clone())),
            (columns::BODY, ColumnValue::Text(self.body.clone())),
            (columns::DATE, ColumnValue::Integer(self.date)),
            (columns::DATE_SENT, ColumnValue::Integer(self.date_sent)),
            (columns::READ, ColumnValue::Integer(i64::from(self.read))),
        ]
    }
}

impl From<HostMessage> for StoreRow {
    fn from(message: HostMessage) -> Self {
        Self {
            address: message.address,
            body: message.body,
            date: message.date,
            date_sent: message.date_sent,
            read: message.read,
            kind: Some(message.kind),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text field that also accepts numbers and booleans in their textual form
fn deserialize_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::custom(format!(
            "expected text, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Millisecond timestamp given as an integer or as its decimal text
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::custom(format!("timestamp {} is not a 64-bit integer", n))),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| Error::custom(format!("timestamp '{}' is not numeric", s))),
        Value::Null => Err(Error::custom("timestamp is null")),
        other => Err(Error::custom(format!(
            "timestamp must be a number or string, got {}",
            json_type_name(&other)
        ))),
    }
}

fn deserialize_small_int<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| Error::custom(format!("{} is not a small integer", n))),
        Value::String(s) => s
            .parse::<i32>()
            .map_err(|_| Error::custom(format!("'{}' is not a small integer", s))),
        other => Err(Error::custom(format!(
            "expected an integer, got {}",
            json_type_name(&other)
        ))),
    }
}
