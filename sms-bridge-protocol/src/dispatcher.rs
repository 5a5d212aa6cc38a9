//! Host Method Dispatcher
//!
//! Routes named host calls to the insertion pipeline.
//!
//! ## Methods
//!
//! - `insertMessage`: one message object. Replies `true`, or an error with
//!   code `Could not insert message` whose details are the original argument.
//! - `insertMessages`: a list of message objects. Always replies with the
//!   per-message outcome mapping, failures included.
//!
//! Any other name is answered with `NotImplemented`.

use crate::store::ContentStore;
use crate::{BridgeError, MethodCall, Reply, SmsInserter};
use tracing::{debug, warn};

/// Method name for single-message insert
pub const METHOD_INSERT_MESSAGE: &str = "insertMessage";

/// Method name for batch insert
pub const METHOD_INSERT_MESSAGES: &str = "insertMessages";

/// Error code when `insertMessage` could not store its message
pub const ERROR_INSERT_FAILED: &str = "Could not insert message";

/// Error code when a method receives arguments of the wrong shape
pub const ERROR_INVALID_ARGUMENTS: &str = "Invalid arguments";

/// Handler for named calls arriving on the host channel
pub trait MethodCallHandler {
    fn on_method_call(&self, call: &MethodCall) -> Reply;
}

/// Listener the host notifies after a runtime permission request
///
/// Returns `true` when the listener consumed the result.
pub trait PermissionResultListener {
    fn on_request_permissions_result(
        &self,
        request_code: i32,
        permissions: &[String],
        grant_results: &[i32],
    ) -> bool;
}

/// Dispatches host calls to an [`SmsInserter`]
pub struct SmsDispatcher<S> {
    inserter: SmsInserter<S>,
}

impl<S: ContentStore> SmsDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self {
            inserter: SmsInserter::new(store),
        }
    }

    pub fn inserter(&self) -> &SmsInserter<S> {
        &self.inserter
    }

    fn insert_message(&self, call: &MethodCall) -> Reply {
        if self.inserter.insert_one(&call.arguments) {
            Reply::from(true)
        } else {
            Reply::error(ERROR_INSERT_FAILED, "", call.arguments.clone())
        }
    }

    fn insert_messages(&self, call: &MethodCall) -> Reply {
        let Some(messages) = call.arguments.as_array() else {
            let err = BridgeError::InvalidArguments(format!(
                "{} expects a list of messages",
                METHOD_INSERT_MESSAGES
            ));
            warn!("{}", err);
            return Reply::error(ERROR_INVALID_ARGUMENTS, err.to_string(), call.arguments.clone());
        };

        debug!(
            "{} called with: {} messages",
            METHOD_INSERT_MESSAGES,
            messages.len()
        );
        Reply::from(self.inserter.insert_many(messages))
    }
}

impl<S: ContentStore> MethodCallHandler for SmsDispatcher<S> {
    fn on_method_call(&self, call: &MethodCall) -> Reply {
        match call.method.as_str() {
            METHOD_INSERT_MESSAGE => self.insert_message(call),
            METHOD_INSERT_MESSAGES => self.insert_messages(call),
            other => {
                debug!("{}", BridgeError::UnknownMethod(other.to_string()));
                Reply::NotImplemented
            }
        }
    }
}

/// The host grants SMS access before calling in, so results are never ours
impl<S> PermissionResultListener for SmsDispatcher<S> {
    fn on_request_permissions_result(
        &self,
        _request_code: i32,
        _permissions: &[String],
        _grant_results: &[i32],
    ) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, MessageBox, ReplyValue};
    use serde_json::{json, Value};

    fn sent() -> Value {
        json!({
            "address": "+15551234",
            "body": "hi",
            "date": "1700000000000",
            "dateSent": "1700000000000",
            "read": 1,
            "kind": 0
        })
    }

    fn malformed() -> Value {
        json!({"address": "+1", "body": "x", "date": null, "dateSent": "0", "read": 0, "kind": 1})
    }

    #[test]
    fn test_insert_message_success() {
        let dispatcher = SmsDispatcher::new(MemoryStore::new());
        let reply = dispatcher.on_method_call(&MethodCall::new(METHOD_INSERT_MESSAGE, sent()));

        assert_eq!(reply, Reply::Success(ReplyValue::Bool(true)));
        assert_eq!(dispatcher.inserter().store().rows_in(MessageBox::Sent).len(), 1);
    }

    #[test]
    fn test_insert_message_failure_is_error_reply() {
        let dispatcher = SmsDispatcher::new(MemoryStore::new());
        let reply = dispatcher.on_method_call(&MethodCall::new(METHOD_INSERT_MESSAGE, malformed()));

        assert_eq!(
            reply,
            Reply::Error {
                code: "Could not insert message".to_string(),
                message: String::new(),
                details: malformed(),
            }
        );
        assert!(dispatcher.inserter().store().is_empty());
    }

    #[test]
    fn test_insert_messages_reports_failures_as_success() {
        let dispatcher = SmsDispatcher::new(MemoryStore::new());
        let reply = dispatcher.on_method_call(&MethodCall::new(
            METHOD_INSERT_MESSAGES,
            json!([sent(), malformed()]),
        ));

        let outcome = match reply {
            Reply::Success(ReplyValue::Outcomes(outcome)) => outcome,
            other => panic!("expected outcome mapping, got {:?}", other),
        };
        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.get(&sent()), Some(true));
        assert_eq!(outcome.get(&malformed()), Some(false));
    }

    #[test]
    fn test_insert_messages_rejects_non_list() {
        let dispatcher = SmsDispatcher::new(MemoryStore::new());
        let reply = dispatcher.on_method_call(&MethodCall::new(METHOD_INSERT_MESSAGES, sent()));

        match reply {
            Reply::Error { code, details, .. } => {
                assert_eq!(code, ERROR_INVALID_ARGUMENTS);
                assert_eq!(details, sent());
            }
            other => panic!("expected error reply, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_method() {
        let dispatcher = SmsDispatcher::new(MemoryStore::new());
        let reply = dispatcher.on_method_call(&MethodCall::new("deleteMessage", sent()));

        assert_eq!(reply, Reply::NotImplemented);
        assert!(dispatcher.inserter().store().is_empty());
    }

    #[test]
    fn test_permission_listener_never_consumes() {
        let dispatcher = SmsDispatcher::new(MemoryStore::new());
        assert!(!dispatcher.on_request_permissions_result(
            1,
            &["android.permission.READ_SMS".to_string()],
            &[0]
        ));
        assert!(!dispatcher.on_request_permissions_result(0, &[], &[]));
    }
}
