use std::path::PathBuf;

use serde_json::Value;
use taskpad::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    let err = Error::TaskNotFound("abc".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);

    let err = Error::InvalidArgument("bad input".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn exit_code_blocked() {
    let err = Error::LockFailed(PathBuf::from("/data/taskpad.lock"));
    assert_eq!(err.exit_code(), exit_codes::BLOCKED);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::storage_write("tasks", Error::OperationFailed("disk full".to_string()));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    assert!(err.to_string().contains("tasks"));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn storage_write_exposes_source() {
    let err = Error::storage_write("categories", Error::OperationFailed("boom".to_string()));
    let source = std::error::Error::source(&err).expect("source");
    assert!(source.to_string().contains("boom"));
}

#[test]
fn details_name_the_record_or_task() {
    let details = Error::storage_write("tasks", Error::OperationFailed("x".to_string()))
        .details()
        .expect("details");
    assert_eq!(details["record"], Value::String("tasks".to_string()));

    let details = Error::TaskNotFound("t-1".to_string())
        .details()
        .expect("details");
    assert_eq!(details["id"], Value::String("t-1".to_string()));
}

#[test]
fn json_error_includes_details() {
    let err = Error::TaskNotFound("t-9".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, "user_error");
    assert!(json.message.contains("Task not found"));
    let value = serde_json::to_value(&json).expect("json");
    assert_eq!(value["details"]["id"], "t-9");

    let json = JsonError::from(&Error::InvalidConfig("bad".to_string()));
    let value = serde_json::to_value(&json).expect("json");
    assert!(value.get("details").is_none());
}

#[test]
fn kinds_follow_exit_codes() {
    assert_eq!(Error::TaskNotFound("x".into()).kind(), "user_error");
    assert_eq!(Error::LockFailed("/tmp/taskpad.lock".into()).kind(), "blocked");
    assert_eq!(
        Error::storage_write("tasks", Error::OperationFailed("x".into())).kind(),
        "operation_failed"
    );
}
