//! Logging setup for binaries, benches and examples.
//!
//! Library code only emits through the `log` facade (plus `tracing` spans when
//! that feature is on). Programs pick a sink once at startup:
//! [`init_with_level`] for a plain stderr logger, or [`init_tracing`] for a
//! `tracing-subscriber` formatter.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

/// Filter used by [`init_tracing`] when `RUST_LOG` is unset or unparsable.
#[cfg(feature = "tracing")]
pub const DEFAULT_TRACE_FILTER: &str = "info,chroma_circles=debug,chroma_circles_ccl=debug";

/// Output layout for [`init_tracing`].
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceFormat {
    /// Human-readable lines with uptime stamps.
    #[default]
    Text,
    /// One flattened JSON object per event.
    Json,
}

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

/// Last path segment of a log target, e.g. `labeler` for
/// `chroma_circles_ccl::labeler`.
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let millis = self.started.elapsed().as_secs_f64() * 1e3;
        let _ = writeln!(
            std::io::stderr().lock(),
            "{millis:>9.2}ms {:<5} {}: {}",
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Route `log` records at or above `level` to stderr.
///
/// The first call wins; repeated calls return `Ok(())` without touching the
/// installed logger. Fails only when another `log` backend is already set.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a global `tracing` subscriber that also reports span close times,
/// so the per-stage `instrument` spans show up with their durations.
///
/// `RUST_LOG` overrides [`DEFAULT_TRACE_FILTER`]. Does nothing if a global
/// subscriber is already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(format: TraceFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACE_FILTER));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = match format {
        TraceFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        TraceFormat::Text => builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init(),
    };
}
