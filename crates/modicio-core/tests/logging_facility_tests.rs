#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{fragment_of, todo_project_model};
use modicio_core::errors::{ExErrorKind, ModicioError};
use modicio_core::logging_facility::test_capture::init_test_capture;
use modicio_core::{evolve, log_op_end, log_op_error, log_op_start, slice_deep};
use modicio_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_end_carries_duration() {
    let capture = init_test_capture();
    let op_name = "modicio_log_op_end_unique_1";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[1].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "modicio_log_op_error_unique_2";

    let err = ModicioError::ClassNotFound {
        name: "Ghost".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 3);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(
        events[0].field("err_code"),
        Some(ExErrorKind::NotFound.code())
    );
}

#[test]
fn test_evolve_emits_start_and_end_for_its_fragment() {
    let capture = init_test_capture();
    let fragment = fragment_of(todo_project_model());

    let evolved = evolve(&fragment, "CREATE CLASS Logged", false).unwrap();

    let mine: Vec<_> = capture
        .events_for_op("evolve")
        .into_iter()
        .filter(|e| {
            let id = e.field("global_id");
            id == Some(fragment.global_id.as_str()) || id == Some(evolved.global_id.as_str())
        })
        .collect();
    assert!(mine.iter().any(|e| e.event.as_deref() == Some(EVENT_START)));
    let end = mine
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("end event");
    assert_eq!(end.field("statement_count"), Some("1"));
}

#[test]
fn test_failed_slice_logs_error_event() {
    let capture = init_test_capture();
    let model = todo_project_model();

    let err = slice_deep(&model, "modicio:NoSuchRootForLogging").unwrap_err();
    assert!(matches!(err, ModicioError::RootNotFound { .. }));

    let errors: Vec<_> = capture
        .events_for_op("slice_deep")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert!(!errors.is_empty());
}
