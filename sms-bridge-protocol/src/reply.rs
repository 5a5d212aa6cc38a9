//! Method Calls and Replies
//!
//! A host call names a method and carries one argument. Every call is
//! answered exactly once with a [`Reply`].

use crate::BatchOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named method invocation from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,

    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Value carried by a successful reply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyValue {
    Bool(bool),
    Outcomes(BatchOutcome),
}

/// Answer to a [`MethodCall`]
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(ReplyValue),
    Error {
        code: String,
        message: String,
        details: Value,
    },
    NotImplemented,
}

impl Reply {
    pub fn error(code: impl Into<String>, message: impl Into<String>, details: Value) -> Self {
        Reply::Error {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        Reply::Success(ReplyValue::Bool(value))
    }
}

impl From<BatchOutcome> for Reply {
    fn from(outcome: BatchOutcome) -> Self {
        Reply::Success(ReplyValue::Outcomes(outcome))
    }
}
