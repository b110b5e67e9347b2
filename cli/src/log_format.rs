//! Event formatter for the log file: span ids plus the fields of every span in scope.
//!
//! A line looks like
//! `TIMESTAMP trace_id=1 span_id=2 INFO compile_run{run=run-1}:round{round=0}: target: message k=v`
//! so all rounds of one run can be grepped by `trace_id` or by `run`.

use std::fmt;

use tracing_core::Subscriber;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

pub struct TextWithSpanIds {
    timer: SystemTime,
    with_target: bool,
}

impl Default for TextWithSpanIds {
    fn default() -> Self {
        Self {
            timer: SystemTime,
            with_target: true,
        }
    }
}

impl TextWithSpanIds {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_target(mut self, on: bool) -> Self {
        self.with_target = on;
        self
    }
}

impl<S, N> FormatEvent<S, N> for TextWithSpanIds
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing_core::Event<'_>,
    ) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        let scope = ctx.event_scope();
        if let Some(leaf) = ctx.parent_span() {
            let root = leaf
                .scope()
                .from_root()
                .next()
                .map(|s| s.id().into_u64())
                .unwrap_or_else(|| leaf.id().into_u64());
            write!(writer, " trace_id={} span_id={}", root, leaf.id().into_u64())?;
        }
        write!(writer, " {}", event.metadata().level())?;

        if let Some(scope) = scope {
            write!(writer, " ")?;
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                write!(writer, ":")?;
            }
        }
        if self.with_target {
            write!(writer, " {}:", event.metadata().target())?;
        }
        write!(writer, " ")?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
