use std::any::Any;
use std::backtrace::Backtrace;

/// Extracts a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Routes panics through `tracing` with a captured backtrace
///
/// Panics inside scan tasks are recovered at the task boundary; the hook
/// runs first, so the stack trace of the panic site ends up in the logs
/// next to the per-image failure.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let backtrace = Backtrace::force_capture();
        tracing::error!(
            location = %location,
            backtrace = %backtrace,
            "panic: {}",
            panic_message(info.payload())
        );
    }));
}
