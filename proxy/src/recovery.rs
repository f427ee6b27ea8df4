//! Recovery boundary around the handler
//!
//! A panic inside the handler never reaches the server loop: the request is
//! answered with an empty `500` and the process keeps serving.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::backtrace::Backtrace;
use tower_http::catch_panic::CatchPanicLayer;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

pub fn recovery_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Recovered from handler panic: {}", panic_message(err.as_ref()));
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

/// Log every panic with its location and a call-stack snapshot.
///
/// The hook runs at the fault site, before unwinding reaches
/// [`recovery_layer`], so the captured stack is the one that panicked.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        tracing::error!("{}\nstack backtrace:\n{}", info, backtrace);
    }));
}
