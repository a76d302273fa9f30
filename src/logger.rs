//! Tag-based console logger for the analysis pipeline.
//!
//! Provides standard levels (Error/Warning/Info/Debug) with per-tag
//! prefixes and colored output. Call [`init`] once at startup; debug
//! output is off unless enabled there.

use chrono::Utc;
use colored::Colorize;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::RwLock;

/// Subsystem tag attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Api,
    Cache,
    Collector,
    Normalizer,
    Resolver,
    Scoring,
    Correlation,
    Analyzer,
}

impl LogTag {
    fn label(&self) -> &'static str {
        match self {
            LogTag::Api => "API",
            LogTag::Cache => "CACHE",
            LogTag::Collector => "COLLECT",
            LogTag::Normalizer => "NORMALIZE",
            LogTag::Resolver => "RESOLVE",
            LogTag::Scoring => "SCORING",
            LogTag::Correlation => "CORRELATE",
            LogTag::Analyzer => "ANALYZER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

struct LoggerConfig {
    max_level: LogLevel,
}

static CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| {
    RwLock::new(LoggerConfig {
        max_level: LogLevel::Info,
    })
});

/// Initialize the logger. Call once at startup before any logging.
pub fn init(debug: bool) {
    let mut cfg = CONFIG.write().unwrap();
    cfg.max_level = if debug {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
}

fn enabled(level: LogLevel) -> bool {
    level <= CONFIG.read().unwrap().max_level
}

fn emit(tag: LogTag, level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }

    let timestamp = Utc::now().format("%H:%M:%S").to_string();
    let prefix = format!("[{}]", timestamp).dimmed();
    let tag_str = tag.label();

    match level {
        LogLevel::Error => println!(
            "{} {} {} {}",
            "✖".red().bold(),
            tag_str.red().bold(),
            prefix,
            message.red()
        ),
        LogLevel::Warning => println!(
            "{} {} {} {}",
            "⚠".yellow().bold(),
            tag_str.yellow().bold(),
            prefix,
            message.yellow()
        ),
        LogLevel::Info => println!(
            "{} {} {} {}",
            "ℹ".blue().bold(),
            tag_str.cyan().bold(),
            prefix,
            message
        ),
        LogLevel::Debug => println!(
            "{} {} {} {}",
            "·".purple().bold(),
            tag_str.purple(),
            prefix,
            message.dimmed()
        ),
    }
    let _ = io::stdout().flush();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    emit(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    emit(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    emit(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (only shown when init(true) was called)
pub fn debug(tag: LogTag, message: &str) {
    emit(tag, LogLevel::Debug, message);
}
