//! Host Channel Framing
//!
//! Calls and replies travel as newline-delimited JSON, one envelope per line.
//!
//! ## Call
//!
//! ```json
//! {"id": 7, "method": "insertMessage", "arguments": {"address": "+1", ...}}
//! ```
//!
//! ## Replies
//!
//! ```json
//! {"id": 7, "result": true}
//! {"id": 7, "error": {"code": "Could not insert message", "message": "", "details": {...}}}
//! {"id": 7, "notImplemented": true}
//! ```
//!
//! Batch outcomes are sent as a list of `[message, outcome]` pairs because
//! JSON object keys cannot hold arbitrary values.

use crate::{BridgeError, MethodCall, MethodCallHandler, Reply, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Default upper bound for one framed line
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Error code for lines that are not a valid call envelope
pub const ERROR_MALFORMED_CALL: &str = "Malformed call";

/// A method call as framed on the host channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCall {
    pub id: i64,
    pub method: String,

    #[serde(default)]
    pub arguments: Value,
}

impl HostCall {
    pub fn new(id: i64, method: impl Into<String>, arguments: Value) -> Self {
        Self {
            id,
            method: method.into(),
            arguments,
        }
    }

    /// Serialize to a newline-terminated JSON line
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Deserialize one line, with or without its `\n` / `\r\n` terminator
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidArguments` if the line is not a call
    /// envelope.
    ///
    /// ```
    /// use sms_bridge_protocol::HostCall;
    ///
    /// let call = HostCall::from_bytes(b"{\"id\":1,\"method\":\"insertMessages\",\"arguments\":[]}\r\n").unwrap();
    /// assert_eq!(call.method, "insertMessages");
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(strip_terminator(data))
            .map_err(|e| BridgeError::InvalidArguments(format!("Failed to parse call: {}", e)))
    }

    pub fn into_method_call(self) -> (i64, MethodCall) {
        (self.id, MethodCall::new(self.method, self.arguments))
    }
}

/// Structured error triple sent back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Value,
}

/// A reply as framed on the host channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostReply {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_implemented: bool,
}

impl HostReply {
    /// Frame a dispatcher reply for call `id`
    pub fn from_reply(id: i64, reply: Reply) -> Result<Self> {
        let mut framed = Self {
            id,
            result: None,
            error: None,
            not_implemented: false,
        };

        match reply {
            Reply::Success(value) => framed.result = Some(serde_json::to_value(value)?),
            Reply::Error {
                code,
                message,
                details,
            } => {
                framed.error = Some(ErrorBody {
                    code,
                    message,
                    details,
                })
            }
            Reply::NotImplemented => framed.not_implemented = true,
        }

        Ok(framed)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(strip_terminator(data))?)
    }
}

fn strip_terminator(data: &[u8]) -> &[u8] {
    data.strip_suffix(b"\r\n")
        .or_else(|| data.strip_suffix(b"\n"))
        .unwrap_or(data)
}

/// Best-effort `id` lookup in a line that failed to parse as a call
fn recover_id(data: &[u8]) -> Option<i64> {
    serde_json::from_slice::<Value>(strip_terminator(data))
        .ok()?
        .get("id")?
        .as_i64()
}

/// `id` of an envelope whose first key is `"id"`, read from a possibly
/// truncated prefix without parsing the rest of the line
fn leading_id(prefix: &[u8]) -> Option<i64> {
    let text = match std::str::from_utf8(prefix) {
        Ok(text) => text,
        Err(e) => std::str::from_utf8(&prefix[..e.valid_up_to()]).ok()?,
    };

    let rest = text
        .trim_start()
        .strip_prefix('{')?
        .trim_start()
        .strip_prefix("\"id\"")?
        .trim_start()
        .strip_prefix(':')?
        .trim_start();

    // The number must be terminated inside the prefix
    let end = rest.find(|c: char| !(c.is_ascii_digit() || c == '-'))?;
    rest[..end].parse().ok()
}

fn malformed_reply(id: Option<i64>, message: String) -> Option<HostReply> {
    match id {
        Some(id) => Some(HostReply {
            id,
            result: None,
            error: Some(ErrorBody {
                code: ERROR_MALFORMED_CALL.to_string(),
                message,
                details: Value::Null,
            }),
            not_implemented: false,
        }),
        None => {
            warn!("Dropping unframed line: {}", message);
            None
        }
    }
}

/// Reply for a line longer than `max_line_bytes`
///
/// Only `prefix`, the first bytes of the line, is inspected; the call id is
/// recovered when it is the envelope's first key.
pub fn oversized_line_reply(
    prefix: &[u8],
    line_len: usize,
    max_line_bytes: usize,
) -> Option<HostReply> {
    let prefix = &prefix[..prefix.len().min(max_line_bytes)];
    malformed_reply(
        leading_id(prefix),
        format!(
            "line of {} bytes exceeds limit of {}",
            line_len, max_line_bytes
        ),
    )
}

/// Handle one framed line and produce the reply to write back
///
/// Returns `None` for blank lines and for lines whose call id cannot be
/// recovered.
pub fn handle_line<H: MethodCallHandler>(
    handler: &H,
    line: &[u8],
    max_line_bytes: usize,
) -> Option<HostReply> {
    if strip_terminator(line).iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    if line.len() > max_line_bytes {
        return oversized_line_reply(line, line.len(), max_line_bytes);
    }

    let call = match HostCall::from_bytes(line) {
        Ok(call) => call,
        Err(e) => return malformed_reply(recover_id(line), e.to_string()),
    };

    let (id, call) = call.into_method_call();
    debug!("Host call {}: {}", id, call.method);

    let reply = handler.on_method_call(&call);
    debug!("Host call {} answered, success={}", id, reply.is_success());
    match HostReply::from_reply(id, reply) {
        Ok(framed) => Some(framed),
        Err(e) => {
            warn!("Failed to frame reply for call {}: {}", id, e);
            malformed_reply(Some(id), e.to_string())
        }
    }
}
