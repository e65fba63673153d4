// Logging for Courier
//
// A small layer over the `tracing` ecosystem. The runtime itself only emits
// events; installing a subscriber is left to the application (or the test
// suite) through one of the `init_*` functions below.
//
// ```rust
// use courier::logging;
//
// // INFO level, human-readable console output
// logging::init_default();
//
// logging::info!("runtime started");
// ```
//
// `RUST_LOG` directives are honoured on top of the configured level, e.g.
// `RUST_LOG=courier::thread=trace` shows every select wake.

use std::fs::OpenOptions;
use std::io;
use std::sync::{Mutex, Once};

use tracing::{Level, Subscriber};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the Courier logging setup
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

// Only the first initialization takes effect
static INIT: Once = Once::new();

fn env_filter(config: &LogConfig) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env().add_directive(config.level.into());
    if let Some(filters) = &config.target_filters {
        for directive in filters.split(',') {
            if let Ok(directive) = directive.trim().parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

fn console_layer<S>(config: &LogConfig) -> fmt::Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_file(config.show_file_line)
        .with_line_number(config.show_file_line)
        .with_thread_names(config.show_thread_info)
        .with_thread_ids(config.show_thread_info)
}

fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Initialize logging with the given configuration.
///
/// Safe to call multiple times; only the first call has any effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(&config));

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(registry.with(fmt::layer().json().flatten_event(true)))
        } else if config.show_time {
            Box::new(registry.with(console_layer(&config)))
        } else {
            Box::new(registry.with(console_layer(&config).without_time()))
        };

        set_global_subscriber(subscriber);
    });
}

/// Initialize logging to the console and, without colors, to `log_file`.
///
/// # Errors
/// Returns an error if the log file cannot be opened or created.
pub fn init_with_file(config: LogConfig, log_file: &str) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    INIT.call_once(|| {
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_thread_ids(true);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter(&config))
            .with(console_layer(&config))
            .with(file_layer);

        set_global_subscriber(subscriber);
    });

    Ok(())
}

/// INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// DEBUG level for everything, TRACE for the thread backend.
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        target_filters: Some("courier=debug,courier::thread=trace".to_string()),
        ..LogConfig::default()
    });
}

/// JSON output without file/line information.
pub fn init_production() {
    init(LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        ..LogConfig::default()
    });
}

/// Warnings and errors only, compact output for test runs.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        show_thread_info: false,
        show_time: false,
        ..LogConfig::default()
    });
}

/// Create a span for an actor's work.
///
/// ```rust
/// let span = courier::actor_span!(7u64, name = "worker");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! actor_span {
    ($actor_id:expr) => {
        $crate::logging::info_span!("actor", id = $actor_id)
    };
    ($actor_id:expr, $($fields:tt)*) => {
        $crate::logging::info_span!("actor", id = $actor_id, $($fields)*)
    };
}

/// Log actor lifecycle events (spawned, started, terminated).
///
/// ```rust
/// courier::log_lifecycle!(7u64, "terminated", tag = "exited");
/// ```
#[macro_export]
macro_rules! log_lifecycle {
    ($actor_id:expr, $event:expr) => {
        $crate::logging::debug!(actor_id = $actor_id, event = $event)
    };
    ($actor_id:expr, $event:expr, $($fields:tt)*) => {
        $crate::logging::debug!(actor_id = $actor_id, event = $event, $($fields)*)
    };
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, info_span, trace, warn};
