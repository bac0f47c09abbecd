use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::{OwoColorize, Stream, Style};
use std::io::Write;

/// Environment variable holding the log level (`error`, `warn`, `info`,
/// `debug`, `trace` or `off`).
pub const LOG_ENV: &str = "TERM_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = level_tag(record.level());
        let _ = writeln!(std::io::stderr().lock(), "[{}] {}", tag, record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Error => Style::new().red().bold(),
        Level::Warn => Style::new().yellow().bold(),
        Level::Info => Style::new().green(),
        Level::Debug => Style::new().blue(),
        Level::Trace => Style::new().dimmed(),
    }
}

/// The lowercase level name, colored only when stderr is a terminal.
fn level_tag(level: Level) -> String {
    let name = level.as_str().to_lowercase();
    name.if_supports_color(Stream::Stderr, |text| text.style(level_style(level)))
        .to_string()
}

pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

/// Installs the stderr logger at the level named by `TERM_LOG`, or `warn`.
pub fn init_logger() -> LevelFilter {
    let configured = std::env::var(LOG_ENV).ok();
    init_logger_with(configured.as_deref())
}

pub fn init_logger_with(level: Option<&str>) -> LevelFilter {
    let level = level.and_then(parse_level).unwrap_or(LevelFilter::Warn);
    // a logger that's already installed keeps its level
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
    level
}

#[test]
fn level_names_parse() {
    assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
    assert_eq!(parse_level(" INFO "), Some(LevelFilter::Info));
    assert_eq!(parse_level("off"), Some(LevelFilter::Off));
    assert_eq!(parse_level("loud"), None);
}

#[test]
fn unknown_level_falls_back_to_warn() {
    assert_eq!(init_logger_with(Some("loud")), LevelFilter::Warn);
}

#[test]
fn tags_are_plain_unless_colors_are_supported() {
    owo_colors::set_override(false);
    assert_eq!(level_tag(Level::Error), "error");
    assert_eq!(level_tag(Level::Trace), "trace");

    owo_colors::set_override(true);
    let colored = level_tag(Level::Warn);
    assert!(colored.contains('\x1b'));
    assert!(colored.contains("warn"));
    owo_colors::unset_override();
}
