//! Span macros and span-recording helpers

/// Span for one content-generation call.
///
/// ```rust
/// use scribe_observability::generation_span;
///
/// let span = generation_span!("summary");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! generation_span {
    ($operation:expr) => {
        tracing::info_span!(
            "generation.operation",
            operation = $operation,
            backend = tracing::field::Empty,
            fallback = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span for one chat exchange.
#[macro_export]
macro_rules! exchange_span {
    ($owner_id:expr, $session_id:expr) => {
        tracing::info_span!(
            "conversation.exchange",
            owner.id = $owner_id,
            session.id = $session_id,
            history.turns = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Mark the current span as failed and log the error.
pub fn record_error<E: std::fmt::Display + ?Sized>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", tracing::field::display(error));
    tracing::error!(error = %error, "operation failed");
}

/// Record `duration` in milliseconds under `key` on the current span.
pub fn record_duration(key: &str, duration: std::time::Duration) {
    tracing::Span::current().record(key, duration.as_millis() as u64);
}
