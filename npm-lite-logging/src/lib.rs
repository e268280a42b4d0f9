//! Global `tracing` subscriber setup for the npm-lite binaries.
//!
//! Settings come from the environment:
//!
//! - `LOG_LEVEL` - default filter directive when `RUST_LOG` is unset (`info`)
//! - `LOG_FORMAT` - `human` or `json` (`human`)
//! - `LOG_OUTPUT` - `console`, `file`, `both` or `none` (`console`)
//! - `LOG_FILE_PATH` - file written when the output includes `file`
//!   (`/tmp/npm-lite.log`, rotated daily)
//!
//! Console output goes to stderr, leaving stdout to command output.

use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Directive, fmt::MakeWriter, prelude::*, registry, EnvFilter, Layer, Registry,
};

const DEFAULT_LOG_FILE: &str = "/tmp/npm-lite.log";

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

/// Where events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

impl LogOutput {
    fn uses_console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn uses_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file_path: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Human,
            output: LogOutput::Console,
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl LogSettings {
    /// Reads `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT` and `LOG_FILE_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Unknown values fall back
    /// to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Human,
        };

        let output = match lookup("LOG_OUTPUT").as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            Some("none") => LogOutput::None,
            _ => LogOutput::Console,
        };

        Self {
            level: lookup("LOG_LEVEL")
                .filter(|level| !level.trim().is_empty())
                .unwrap_or(defaults.level),
            format,
            output,
            file_path: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.level));

        ["tokio=warn", "hyper=warn", "tower_http=info"]
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(filter, |filter, directive| filter.add_directive(directive))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn fmt_layer<W>(writer: W, format: LogFormat) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Human => layer.boxed(),
    }
}

/// Initializes the global tracing subscriber from the environment.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(&LogSettings::from_env())
}

/// Initializes the global tracing subscriber from explicit settings.
pub fn init_with(settings: &LogSettings) -> Option<WorkerGuard> {
    let mut guard: Option<WorkerGuard> = None;

    let file_writer = if settings.output.uses_file() {
        let log_dir = settings
            .file_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("/tmp"));
        let log_filename = settings
            .file_path
            .file_name()
            .unwrap_or("npm-lite.log".as_ref());

        let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);
        Some(non_blocking)
    } else {
        None
    };

    let output_layer: Option<BoxedLayer> = match (settings.output.uses_console(), file_writer) {
        (true, Some(file)) => Some(fmt_layer(
            MakeTee {
                make_a: io::stderr,
                make_b: file,
            },
            settings.format,
        )),
        (true, None) => Some(fmt_layer(io::stderr, settings.format)),
        (false, Some(file)) => Some(fmt_layer(file, settings.format)),
        (false, None) => None,
    };

    registry()
        .with(output_layer)
        .with(settings.env_filter())
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(settings_from(&[]), LogSettings::default());
    }

    #[test]
    fn test_json_file_output() {
        let settings = settings_from(&[
            ("LOG_FORMAT", "json"),
            ("LOG_OUTPUT", "both"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FILE_PATH", "/var/log/registry.log"),
        ]);

        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.output, LogOutput::Both);
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.file_path, PathBuf::from("/var/log/registry.log"));
        assert!(settings.output.uses_console());
        assert!(settings.output.uses_file());
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let settings = settings_from(&[("LOG_FORMAT", "xml"), ("LOG_OUTPUT", "syslog")]);
        assert_eq!(settings.format, LogFormat::Human);
        assert_eq!(settings.output, LogOutput::Console);
    }

    #[test]
    fn test_blank_level_uses_default() {
        let settings = settings_from(&[("LOG_LEVEL", "  ")]);
        assert_eq!(settings.level, "info");
    }
}
