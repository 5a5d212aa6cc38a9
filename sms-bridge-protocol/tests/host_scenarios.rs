//! Host Scenario Tests
//!
//! End-to-end calls through the dispatcher into a content store:
//! - Single inserts routed to sent and inbox
//! - Batches with malformed elements
//! - Error replies for failed single inserts
//! - Unknown methods and empty batches
//! - The same calls framed over the line channel into SQLite

use serde_json::{json, Value};
use sms_bridge_protocol::{
    handle_line, HostCall, MemoryStore, MessageBox, MethodCall, MethodCallHandler, Reply,
    ReplyValue, SmsDispatcher, SqliteSmsStore, DEFAULT_MAX_LINE_BYTES,
};
use tempfile::TempDir;

fn sent_payload() -> Value {
    json!({
        "address": "+15551234",
        "body": "hi",
        "date": "1700000000000",
        "dateSent": "1700000000000",
        "read": 1,
        "kind": 0
    })
}

fn null_date_payload() -> Value {
    json!({"address": "+1", "body": "x", "date": null, "dateSent": "0", "read": 0, "kind": 1})
}

fn call(method: &str, arguments: Value) -> MethodCall {
    MethodCall::new(method, arguments)
}

#[test]
fn test_single_sent_message() {
    let dispatcher = SmsDispatcher::new(MemoryStore::new());

    let reply = dispatcher.on_method_call(&call("insertMessage", sent_payload()));
    assert_eq!(reply, Reply::Success(ReplyValue::Bool(true)));

    let store = dispatcher.inserter().store();
    let sent = store.rows_in(MessageBox::Sent);
    assert_eq!(store.len(), 1);
    assert_eq!(sent.len(), 1);

    let row = &sent[0];
    assert_eq!(row.address, "+15551234");
    assert_eq!(row.body, "hi");
    assert_eq!(row.date, 1_700_000_000_000);
    assert_eq!(row.date_sent, 1_700_000_000_000);
    assert_eq!(row.read, 1);
    assert_eq!(row.kind(), None);
}

#[test]
fn test_single_unknown_kind_lands_in_inbox() {
    let dispatcher = SmsDispatcher::new(MemoryStore::new());
    let mut payload = sent_payload();
    payload["kind"] = json!(99);

    let reply = dispatcher.on_method_call(&call("insertMessage", payload));
    assert_eq!(reply, Reply::from(true));

    let store = dispatcher.inserter().store();
    assert_eq!(store.rows_in(MessageBox::Inbox).len(), 1);
    assert!(store.rows_in(MessageBox::Sent).is_empty());
}

#[test]
fn test_batch_with_one_malformed() {
    let dispatcher = SmsDispatcher::new(MemoryStore::new());
    let batch = json!([sent_payload(), null_date_payload()]);

    let reply = dispatcher.on_method_call(&call("insertMessages", batch));
    let outcome = match reply {
        Reply::Success(ReplyValue::Outcomes(outcome)) => outcome,
        other => panic!("expected outcome mapping, got {:?}", other),
    };

    assert_eq!(outcome.len(), 2);
    assert_eq!(outcome.get(&sent_payload()), Some(true));
    assert_eq!(outcome.get(&null_date_payload()), Some(false));

    let store = dispatcher.inserter().store();
    assert_eq!(store.len(), 1);
    assert_eq!(store.rows_in(MessageBox::Sent).len(), 1);
}

#[test]
fn test_single_failing_payload() {
    let dispatcher = SmsDispatcher::new(MemoryStore::new());

    let reply = dispatcher.on_method_call(&call("insertMessage", null_date_payload()));
    assert_eq!(
        reply,
        Reply::error("Could not insert message", "", null_date_payload())
    );
    assert!(dispatcher.inserter().store().is_empty());
}

#[test]
fn test_unknown_method() {
    let dispatcher = SmsDispatcher::new(MemoryStore::new());

    let reply = dispatcher.on_method_call(&call("deleteMessage", json!({"id": 1})));
    assert_eq!(reply, Reply::NotImplemented);
    assert!(dispatcher.inserter().store().is_empty());
}

#[test]
fn test_empty_batch() {
    let dispatcher = SmsDispatcher::new(MemoryStore::new());

    let reply = dispatcher.on_method_call(&call("insertMessages", json!([])));
    match reply {
        Reply::Success(ReplyValue::Outcomes(outcome)) => assert!(outcome.is_empty()),
        other => panic!("expected empty outcome mapping, got {:?}", other),
    }
    assert!(dispatcher.inserter().store().is_empty());
}

#[test]
fn test_batch_continues_after_store_refusal() {
    let dispatcher = SmsDispatcher::new(MemoryStore::new());
    dispatcher.inserter().store().set_refuse_inserts(true);

    let mut inbox = sent_payload();
    inbox["kind"] = json!(1);
    let reply = dispatcher.on_method_call(&call("insertMessages", json!([sent_payload(), inbox])));

    let Reply::Success(ReplyValue::Outcomes(outcome)) = reply else {
        panic!("expected outcome mapping");
    };
    let flags: Vec<bool> = outcome.iter().map(|(_, ok)| ok).collect();
    assert_eq!(flags, [false, false]);
}

#[test]
fn test_sub_floor_host_rejects_inserts() {
    let dispatcher = SmsDispatcher::new(MemoryStore::with_api_level(18));

    let reply = dispatcher.on_method_call(&call("insertMessage", sent_payload()));
    assert!(matches!(reply, Reply::Error { ref code, .. } if code == "Could not insert message"));
    assert!(dispatcher.inserter().store().is_empty());
}

#[test]
fn test_line_channel_into_sqlite() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("sms.db");
    let dispatcher = SmsDispatcher::new(SqliteSmsStore::open(&db_path, 34).unwrap());

    let line = HostCall::new(1, "insertMessages", json!([sent_payload(), null_date_payload()]))
        .to_bytes()
        .unwrap();
    let reply = handle_line(&dispatcher, &line, DEFAULT_MAX_LINE_BYTES).unwrap();
    assert_eq!(reply.id, 1);
    assert_eq!(
        reply.result,
        Some(json!([[sent_payload(), true], [null_date_payload(), false]]))
    );

    let line = HostCall::new(2, "insertMessage", null_date_payload())
        .to_bytes()
        .unwrap();
    let reply = handle_line(&dispatcher, &line, DEFAULT_MAX_LINE_BYTES).unwrap();
    let error = reply.error.unwrap();
    assert_eq!(error.code, "Could not insert message");
    assert_eq!(error.message, "");
    assert_eq!(error.details, null_date_payload());

    let line = HostCall::new(3, "deleteMessage", Value::Null)
        .to_bytes()
        .unwrap();
    let reply = handle_line(&dispatcher, &line, DEFAULT_MAX_LINE_BYTES).unwrap();
    assert!(reply.not_implemented);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM sms WHERE type = 2", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
