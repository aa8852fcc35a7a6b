//! Observability handle passed to the reconciler.

use std::fmt;

use tracing::span::EnteredSpan;

/// Structured key/value pairs attached to an event.
pub type Fields<'a> = &'a [(&'static str, String)];

/// Sink for reconciler events.
///
/// Callers must never put secrets in `message` or `fields`.
pub trait Telemetry {
    fn info(&self, message: &str, fields: Fields<'_>);
    fn debug(&self, message: &str, fields: Fields<'_>);
    fn error(&self, message: &str, fields: Fields<'_>);
    /// Open a span covering one phase. It closes when the guard drops.
    fn span(&self, phase: &'static str) -> SpanGuard;
}

/// Keeps a phase span entered while alive.
#[must_use = "the span closes as soon as the guard is dropped"]
pub struct SpanGuard {
    _entered: Option<EnteredSpan>,
}

impl SpanGuard {
    pub fn none() -> Self {
        Self { _entered: None }
    }

    pub fn entered(span: EnteredSpan) -> Self {
        Self {
            _entered: Some(span),
        }
    }
}

/// [`Telemetry`] backed by `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

/// Key/value pairs recorded as a single `context` field, so the message
/// stays a fixed string and JSON output keeps them apart.
struct Rendered<'a>(Fields<'a>);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

macro_rules! emit {
    ($level:ident, $message:expr, $fields:expr) => {
        if $fields.is_empty() {
            tracing::$level!("{}", $message);
        } else {
            tracing::$level!(context = %Rendered($fields), "{}", $message);
        }
    };
}

impl Telemetry for TracingTelemetry {
    fn info(&self, message: &str, fields: Fields<'_>) {
        emit!(info, message, fields);
    }

    fn debug(&self, message: &str, fields: Fields<'_>) {
        emit!(debug, message, fields);
    }

    fn error(&self, message: &str, fields: Fields<'_>) {
        emit!(error, message, fields);
    }

    fn span(&self, phase: &'static str) -> SpanGuard {
        SpanGuard::entered(tracing::info_span!("phase", phase).entered())
    }
}
