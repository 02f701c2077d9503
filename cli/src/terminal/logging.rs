use std::fmt;

use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

use crate::commands::Commands;

/// Target used by [`crate::terminal::print`]; such events carry pre-rendered
/// text in `raw_msg` and are written without a level prefix.
pub const PRINT_TARGET: &str = "subconf::print";

const EDITOR_FILTER: &str = "error,subconf_core::editor=warn";

pub struct SubconfFormatter;

impl<S, N> FormatEvent<S, N> for SubconfFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        if meta.target() == PRINT_TARGET {
            let mut raw = RawMessage::default();
            event.record(&mut raw);
            return writeln!(writer, "{}", raw.0.unwrap_or_default());
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
            Level::TRACE => ("[ ]", |s| s.dimmed()),
            Level::DEBUG => ("[?]", |s| s.blue()),
            Level::INFO => ("[+]", |s| s.green().bold()),
            Level::WARN => ("[*]", |s| s.yellow().bold()),
            Level::ERROR => ("[-]", |s| s.red().bold()),
        };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[derive(Default)]
struct RawMessage(Option<String>);

impl Visit for RawMessage {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "raw_msg" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "raw_msg" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

/// Filter used when `RUST_LOG` is unset.
///
/// The editor runs in raw mode on the shared terminal, so it only reports
/// errors. Form-model warnings are the exception: they are raised while the
/// form is built, before the alternate screen is entered.
pub fn default_level(command: &Commands, quiet: u8) -> &'static str {
    match (command, quiet) {
        (Commands::Edit { .. }, _) => EDITOR_FILTER,
        (_, 0 | 1) => "info",
        _ => "warn",
    }
}

/// Installs the stderr subscriber. Stdout stays free for data: JSON from
/// `show`, update lines from `edit`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(SubconfFormatter)
        .with_writer(std::io::stderr)
        .try_init();
}
