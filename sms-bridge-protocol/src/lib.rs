//! SMS Bridge Protocol Implementation
//!
//! This library accepts SMS records from a host UI runtime and writes them
//! into the system SMS content store, sorted into the sent, inbox, draft and
//! outbox containers.
//!
//! The pipeline runs strictly one way:
//!
//! ```text
//! host ─▶ SmsDispatcher ─▶ SmsInserter ─▶ StoreRow::decode ─▶ ContentStore
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sms_bridge_protocol::{MemoryStore, MethodCall, MethodCallHandler, Reply, SmsDispatcher};
//! use serde_json::json;
//!
//! let dispatcher = SmsDispatcher::new(MemoryStore::new());
//! let call = MethodCall::new(
//!     "insertMessage",
//!     json!({
//!         "address": "+15551234",
//!         "body": "hi",
//!         "date": "1700000000000",
//!         "dateSent": "1700000000000",
//!         "read": 1,
//!         "kind": 0
//!     }),
//! );
//!
//! assert_eq!(dispatcher.on_method_call(&call), Reply::from(true));
//! ```

pub mod channel;
pub mod dispatcher;
pub mod inserter;
pub mod message;
pub mod reply;
pub mod router;
pub mod store;

mod error;

pub use channel::{
    handle_line, ErrorBody, HostCall, HostReply, DEFAULT_MAX_LINE_BYTES, ERROR_MALFORMED_CALL,
};
pub use dispatcher::{
    MethodCallHandler, PermissionResultListener, SmsDispatcher, ERROR_INSERT_FAILED,
    ERROR_INVALID_ARGUMENTS, METHOD_INSERT_MESSAGE, METHOD_INSERT_MESSAGES,
};
pub use error::{BridgeError, Result};
pub use inserter::{BatchOutcome, SmsInserter};
pub use message::{ColumnValue, HostMessage, StoreRow, SMS_SCHEMA_MIN_API_LEVEL};
pub use reply::{MethodCall, Reply, ReplyValue};
pub use router::MessageBox;
pub use store::{ContentStore, MemoryStore, RowUri, SqliteSmsStore};
