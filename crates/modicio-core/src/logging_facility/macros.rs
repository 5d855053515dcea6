//! Canonical logging macros

/// Log the start of an operation
///
/// ```
/// # use modicio_core::log_op_start;
/// log_op_start!("slice_deep");
/// log_op_start!("slice_deep", node_uri = "modicio:Todo");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::modicio_core_types::schema::EVENT_START,
        );
    }};
    ($op:expr, $($field:tt)*) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::modicio_core_types::schema::EVENT_START,
            $($field)*
        );
    }};
}

/// Log the successful end of an operation
///
/// ```
/// # use modicio_core::log_op_end;
/// log_op_end!("slice_deep", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::modicio_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    }};
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::modicio_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    }};
}

/// Log the failed end of an operation
///
/// Accepts anything convertible into `ExError`.
///
/// ```
/// # use modicio_core::{log_op_error, errors::ModicioError};
/// let err = ModicioError::RootNotFound { uri: "modicio:X".to_string() };
/// log_op_error!("slice_deep", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::modicio_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::modicio_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message(),
            $($field)*
        );
    }};
}

/// Run `$body` between start/end events, logging the error event on failure
///
/// `$body` must evaluate to a `Result` whose error converts into `ExError`.
///
/// ```
/// # use modicio_core::{logged_op, errors::ModicioError};
/// let r: Result<u32, ModicioError> = logged_op!("answer", { Ok::<u32, ModicioError>(42) });
/// assert_eq!(r, Ok(42));
/// ```
#[macro_export]
macro_rules! logged_op {
    ($op:expr, $body:block) => {{
        $crate::log_op_start!($op);
        let start = std::time::Instant::now();
        let result = $body;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => $crate::log_op_end!($op, duration_ms = duration_ms),
            Err(e) => $crate::log_op_error!($op, e.clone(), duration_ms = duration_ms),
        }
        result
    }};
}
