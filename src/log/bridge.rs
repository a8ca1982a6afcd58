//! `tracing` → pipeline bridge.
//!
//! Daemon diagnostics are written with `tracing`; this layer turns each event
//! into one pipeline line (`message key=value ...`) so it reaches the log
//! targets alongside lines emitted through the `log_*!` macros. Events raised
//! by the pipeline itself are skipped.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::log::{Level, Logger};

const PIPELINE_TARGET: &str = "concentrator_core::log";

/// Layer feeding `tracing` events into a [`Logger`].
#[derive(Debug, Clone)]
pub struct PipelineLayer {
    logger: Arc<Logger>,
}

impl PipelineLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for PipelineLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(PIPELINE_TARGET) {
            return;
        }

        let level = Level::from(metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.logger
            .emit(level, format_args!("{}\n", visitor.finish()));
    }
}

/// Renders the message first, then the remaining fields as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(mut self) -> String {
        if !self.fields.is_empty() {
            if !self.message.is_empty() {
                self.message.push(' ');
            }
            self.message.push_str(&self.fields);
        }
        self.message
    }

    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field, format_args!("{}", value));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push_field(field, format_args!("{}", value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field, format_args!("{:?}", value));
        }
    }
}
