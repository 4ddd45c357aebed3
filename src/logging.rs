//! Tracing subscriber setup for the `boardsync` binary.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LoggingSection};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Pick the filter directive. `RUST_LOG` wins, then `--verbose`, then the
/// configured level.
pub fn filter_directive(logging: &LoggingSection, verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ if verbose => "debug".to_string(),
        _ => logging.level.clone(),
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the rolling log file on drop and must be held
/// for the life of the process.
pub fn init_tracing(logging: &LoggingSection, verbose: bool) -> Result<Option<WorkerGuard>> {
    let directive = filter_directive(logging, verbose, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    let mut layers: Vec<BoxedLayer> = vec![format_layer(logging.format, std::io::stderr, true)];

    let guard = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "boardsync.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(format_layer(logging.format, writer, false));
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_overrides_everything() {
        let logging = LoggingSection::default();
        let directive = filter_directive(&logging, true, Some("boardsync=trace".into()));
        assert_eq!(directive, "boardsync=trace");
    }

    #[test]
    fn test_verbose_beats_configured_level() {
        let logging = LoggingSection {
            level: "warn".into(),
            ..Default::default()
        };
        assert_eq!(filter_directive(&logging, true, None), "debug");
        assert_eq!(filter_directive(&logging, false, Some("  ".into())), "warn");
    }

    #[test]
    fn test_default_directive_parses() {
        let directive = filter_directive(&LoggingSection::default(), false, None);
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
