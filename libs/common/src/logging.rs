//! Unified logging module for the gateway services
//!
//! Console and daily rolling file output share one bracketed-level format.
//! HTTP access lines go to the `api_access` target and, when enabled, to a
//! separate `{YYYYMMDD}_{service}_api.log` file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use errors::{GatewayError, GatewayResult};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Target used by the HTTP access logger
pub const API_ACCESS_TARGET: &str = "api_access";

/// Environment variable overriding the log root
pub const LOG_DIR_ENV: &str = "GATEWAY_LOG_DIR";

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter producing `timestamp [LEVEL] message`
///
/// Example output: `2025-12-02T00:50:44.809Z [INFO] Connected to 10.0.0.5:502`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Worker guards must outlive the subscriber or buffered lines are lost
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

fn keep_guard(guard: WorkerGuard) {
    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
    match guards.lock() {
        Ok(mut slot) => slot.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }
}

// ============================================================================
// Log Root Directory Configuration
// ============================================================================

static LOG_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the log root directory
///
/// Priority:
/// 1. `GATEWAY_LOG_DIR` environment variable
/// 2. `config_dir` parameter
/// 3. Default value "logs"
pub fn init_log_root(config_dir: Option<&str>) {
    LOG_ROOT.get_or_init(|| {
        std::env::var(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(config_dir.unwrap_or("logs")))
    });
}

/// Get the log root directory, falling back to env or "logs"
pub fn get_log_root() -> PathBuf {
    LOG_ROOT.get().cloned().unwrap_or_else(|| {
        std::env::var(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"))
    })
}

// ============================================================================
// Daily rolling writer
// ============================================================================

struct RollingState {
    date: String,
    file: File,
}

/// Daily rolling file writer named `{YYYYMMDD}_{service}[_{suffix}].log`
#[derive(Clone)]
struct DailyRollingWriter {
    service_name: String,
    suffix: Option<&'static str>,
    log_dir: PathBuf,
    state: Arc<Mutex<RollingState>>,
}

impl DailyRollingWriter {
    fn new(
        service_name: impl Into<String>,
        suffix: Option<&'static str>,
        log_dir: PathBuf,
    ) -> std::io::Result<Self> {
        let service_name = service_name.into();
        fs::create_dir_all(&log_dir)?;

        let date = today();
        let file = open_append(&log_dir.join(file_name(&date, &service_name, suffix)))?;

        Ok(Self {
            service_name,
            suffix,
            log_dir,
            state: Arc::new(Mutex::new(RollingState { date, file })),
        })
    }

    fn with_current<R>(
        &self,
        f: impl FnOnce(&mut File) -> std::io::Result<R>,
    ) -> std::io::Result<R> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {}", e)))?;

        let date = today();
        let path = self
            .log_dir
            .join(file_name(&state.date, &self.service_name, self.suffix));

        // Roll over on date change, or recreate if the file was removed
        if state.date != date || !path.exists() {
            fs::create_dir_all(&self.log_dir)?;
            state.file = open_append(
                &self
                    .log_dir
                    .join(file_name(&date, &self.service_name, self.suffix)),
            )?;
            state.date = date;
        }

        f(&mut state.file)
    }
}

impl Write for DailyRollingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.with_current(|file| file.write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.with_current(|file| file.flush())
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

fn file_name(date: &str, service_name: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}_{}_{}.log", date, service_name, suffix),
        None => format!("{}_{}.log", date, service_name),
    }
}

fn open_append(path: &std::path::Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

// ============================================================================
// Subscriber setup
// ============================================================================

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name (e.g., "modbus-client", "status-api")
    pub service_name: String,
    /// Directory receiving the daily files
    pub log_dir: PathBuf,
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Mirror events to stdout
    pub console: bool,
    /// Write JSON lines instead of the bracketed text format
    pub enable_json: bool,
    /// Write `api_access` events to their own file
    pub enable_api_log: bool,
    /// Level for the `api_access` target
    pub api_log_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "gateway".to_string(),
            log_dir: get_log_root(),
            level: "info".to_string(),
            console: true,
            enable_json: false,
            enable_api_log: false,
            api_log_level: Level::INFO,
        }
    }
}

/// Build the filter directive string
///
/// An explicit `RUST_LOG` wins; `api_access` is appended unless it already
/// names that target.
fn filter_directives(rust_log: Option<&str>, config: &LogConfig) -> String {
    let api_level = if config.enable_api_log {
        config.api_log_level.as_str().to_lowercase()
    } else {
        "info".to_string()
    };

    match rust_log {
        Some(env) if env.contains(API_ACCESS_TARGET) => env.to_string(),
        Some(env) => format!("{},{}={}", env, API_ACCESS_TARGET, api_level),
        None => format!("{},{}={}", config.level, API_ACCESS_TARGET, api_level),
    }
}

/// Initialize logging system with configuration
pub fn init_with_config(config: LogConfig) -> GatewayResult<()> {
    fs::create_dir_all(&config.log_dir)?;

    let rust_log = std::env::var("RUST_LOG").ok();
    let directives = filter_directives(rust_log.as_deref(), &config);
    let env_filter = EnvFilter::try_new(&directives).map_err(|e| {
        GatewayError::Configuration(format!("Invalid log filter '{}': {}", directives, e))
    })?;

    let writer = DailyRollingWriter::new(config.service_name.clone(), None, config.log_dir.clone())?;
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    keep_guard(guard);

    let registry = tracing_subscriber::registry().with(env_filter);

    let console_layer = config.console.then(|| {
        fmt::layer()
            .with_ansi(true)
            .event_format(BracketedLevelFormat)
            .boxed()
    });

    // Business file layer excludes access lines when they have their own file
    let split_api = config.enable_api_log;
    let file_layer = if config.enable_json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_filter(filter::filter_fn(move |metadata| {
                !split_api || metadata.target() != API_ACCESS_TARGET
            }))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .event_format(BracketedLevelFormat)
            .with_filter(filter::filter_fn(move |metadata| {
                !split_api || metadata.target() != API_ACCESS_TARGET
            }))
            .boxed()
    };

    let api_file_layer = if config.enable_api_log {
        let api_writer = DailyRollingWriter::new(
            config.service_name.clone(),
            Some("api"),
            config.log_dir.clone(),
        )?;
        let (api_non_blocking, api_guard) = tracing_appender::non_blocking(api_writer);
        keep_guard(api_guard);

        Some(
            fmt::layer()
                .with_writer(api_non_blocking)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .with_filter(filter::filter_fn(|metadata| {
                    metadata.target() == API_ACCESS_TARGET
                }))
                .boxed(),
        )
    } else {
        None
    };

    registry
        .with(console_layer)
        .with(file_layer)
        .with(api_file_layer)
        .try_init()
        .map_err(|e| GatewayError::Configuration(format!("Failed to init logging: {}", e)))?;

    tracing::info!("Logging: {} @ {:?}", config.service_name, config.log_dir);
    Ok(())
}

// ============================================================================
// HTTP API Request Logging Middleware
// ============================================================================

/// HTTP request logger middleware
///
/// Logs method, path, status and duration of every request on the
/// `api_access` target. Server errors are logged at WARN.
///
/// Add before `.with_state()`:
/// ```rust,ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn(common::logging::http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use std::time::Instant;
    use tracing::{info, warn};

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            target: "api_access",
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        );
    } else {
        info!(
            target: "api_access",
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        );
    }

    response
}
