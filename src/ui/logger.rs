//! Console logging on top of `tracing`.
//!
//! Every event is printed on its own line, indented four spaces per
//! entered span, so `let _block = info_span!("bump").entered();` nests
//! everything logged until the guard is dropped. Debug, warn and error
//! lines carry a level prefix; follow-up lines logged with the
//! [`DETAIL`] target carry none.

use std::fmt;

use console::Style;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Target for un-prefixed lines following an error
pub const DETAIL: &str = "version_bumper::detail";

/// How much gets printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    #[default]
    Normal,
    Debug,
}

impl Verbosity {
    /// `EnvFilter` directive for this verbosity
    pub fn directive(self) -> String {
        let level = match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Debug => "debug",
        };
        format!("error,version_bumper={}", level)
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the command-line verbosity when set. Errors go to
/// stderr, everything else to stdout.
pub fn init(verbosity: Verbosity) {
    let filter = match std::env::var_os("RUST_LOG") {
        Some(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity.directive())),
        None => EnvFilter::new(verbosity.directive()),
    };
    let writer = std::io::stderr
        .with_max_level(Level::ERROR)
        .or_else(std::io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(IndentedFormat { ansi: true })
                .with_writer(writer),
        )
        .init();
}

/// One line per event: span-depth indentation, level prefix, message
pub struct IndentedFormat {
    ansi: bool,
}

impl IndentedFormat {
    /// Without colours, for non-terminal writers
    pub fn plain() -> Self {
        IndentedFormat { ansi: false }
    }
}

impl<S, N> FormatEvent<S, N> for IndentedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = MessageVisitor::default();
        event.record(&mut message);
        if message.0.trim().is_empty() {
            return Ok(());
        }

        let depth = ctx.event_scope().map(|scope| scope.count()).unwrap_or(0);
        let metadata = event.metadata();
        let (prefix, style) = if metadata.target() == DETAIL {
            ("", Style::new().yellow())
        } else {
            match *metadata.level() {
                Level::ERROR => ("ERROR: ", Style::new().red()),
                Level::WARN => ("WARN: ", Style::new().yellow()),
                Level::INFO => ("", Style::new()),
                _ => ("DEBUG: ", Style::new().dim()),
            }
        };

        let line = format!("{}{}", prefix, message.0);
        let indent = " ".repeat(depth * 4);
        if self.ansi {
            writeln!(writer, "{}{}", indent, style.apply_to(line))
        } else {
            writeln!(writer, "{}{}", indent, line)
        }
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
