//! Plain-text event formatter that tags each line with its discovery trace.
//!
//! Every discovery runs inside one `discover` span, so the root span id works as a trace id:
//! all lines of one expansion share it, and concurrent expansions can be told apart in
//! `LOG_FILE`.

use std::fmt;

use tracing_core::Subscriber;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Output: `TIMESTAMP LEVEL trace_id=X spans=a>b target: fields` inside a span, otherwise
/// `TIMESTAMP LEVEL target: fields`.
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
        write!(writer, " {}", event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            let spans: Vec<_> = scope.from_root().collect();
            if let Some(root) = spans.first() {
                write!(writer, " trace_id={}", root.id().into_u64())?;
                let names: Vec<&str> = spans.iter().map(|s| s.name()).collect();
                write!(writer, " spans={}", names.join(">"))?;
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
