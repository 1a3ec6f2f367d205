#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use eyre::{Context, Result};
use log::LevelFilter;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::{io::Write, str::FromStr};

use super::{Configuration, LogConfig};
use super::constants::{LOG_FILE_PREFIX, LOG_FILE_TIMESTAMP_FORMAT};

pub fn load_configuration(config_path: &str) -> Result<Configuration> {
    let config =
        std::fs::read_to_string(config_path).wrap_err(format!("reading {}", config_path))?;
    let config: Configuration = toml::from_str(&config).wrap_err("parsing configuration")?;
    Ok(config)
}

/// init_logger opens a new timestamped file inside the log directory and
/// routes every log record into it. Returns the path of the opened file.
pub fn init_logger(config: &LogConfig) -> Result<PathBuf> {
    let dir = resolve_path(&config.dir).wrap_err(format!("resolving log dir {}", config.dir))?;
    std::fs::create_dir_all(&dir).wrap_err(format!("creating directory {}", dir))?;

    let path = Path::new(&dir).join(log_file_name(Local::now()));
    let log_file = Box::new(
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .wrap_err(format!("opening log file {}", path.display()))?,
    );

    let raw_level = config.level.as_deref().unwrap_or("info");
    let log_level = LevelFilter::from_str(raw_level)?;

    let mut builder = env_logger::Builder::new();

    for filter in config.filters.as_deref().unwrap_or_default() {
        let module_level = LevelFilter::from_str(filter.level.as_deref().unwrap_or(raw_level))
            .unwrap_or(log_level);
        builder.filter(filter.module.as_deref(), module_level);
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}/{}:{} {} [{}] - {}",
                record.module_path().unwrap_or("unknown"),
                basename(record.file().unwrap_or("unknown")),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(log_file))
        .filter(None, log_level)
        .try_init()?;
    Ok(path)
}

pub fn log_file_name<Tz: TimeZone>(timestamp: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}{}.log",
        LOG_FILE_PREFIX,
        timestamp.format(LOG_FILE_TIMESTAMP_FORMAT)
    )
}

/// Extracts the timestamp embedded by [`log_file_name`]. Returns None for
/// files which were not created by the logger.
pub fn parse_log_file_name(name: &str) -> Option<NaiveDateTime> {
    let raw = name.strip_prefix(LOG_FILE_PREFIX)?.strip_suffix(".log")?;
    NaiveDateTime::parse_from_str(raw, LOG_FILE_TIMESTAMP_FORMAT).ok()
}

/// sweep_logs deletes log files in `dir` whose embedded timestamp is older
/// than `retention_hours` before `now`. Returns the number of removed files.
/// A missing directory is not an error.
pub fn sweep_logs(dir: &Path, retention_hours: u64, now: NaiveDateTime) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = now - chrono::Duration::hours(retention_hours as i64);
    let mut removed = 0;
    for entry in std::fs::read_dir(dir).wrap_err(format!("reading {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let created = match name.to_str().and_then(parse_log_file_name) {
            Some(created) => created,
            None => continue,
        };

        if created >= cutoff {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(_) => removed += 1,
            Err(err) => log::warn!("Failed to remove {}: {}", entry.path().display(), err),
        }
    }
    Ok(removed)
}

pub fn basename(path: &str) -> String {
    path.split('/').last().unwrap_or(path).to_string()
}

/// resolve_path resolves the input path to an absolute path. If the
/// input path contains environment variables, it will expand them to their
/// values.
pub fn resolve_path(path: &str) -> Result<String> {
    let re = Regex::new(r"\$\{?([A-Za-z_]+)\}?").wrap_err("compiling regex")?;

    let mut ret = String::new();
    let mut last_pos = 0;

    for cap in re.captures_iter(path) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        ret.push_str(&path[last_pos..full_match.start()]);
        let var_value = std::env::var(var_name.as_str()).unwrap_or_default();
        ret.push_str(&var_value);
        last_pos = full_match.end();
    }
    ret.push_str(&path[last_pos..]);

    // Resolve the path to an absolute path
    let path = std::path::absolute(ret.as_str()).wrap_err(format!("resolving path {}", ret))?;
    Ok(path.to_string_lossy().to_string())
}

/// lookup_config_path trys to look up the config path at:
/// * $XDG_CONFIG_HOME/gemchat/config.toml
/// * $HOME/.config/gemchat/config.toml
/// * $HOME/.gemchat.toml
pub fn lookup_config_path() -> Option<String> {
    let paths = &[
        format!("{}/gemchat/config.toml", env_or_current("XDG_CONFIG_HOME")),
        format!("{}/.config/gemchat/config.toml", env_or_current("HOME")),
        format!("{}/.gemchat.toml", env_or_current("HOME")),
    ];

    for path in paths {
        if std::path::Path::new(path).exists() {
            return Some(path.to_string());
        }
    }
    None
}

fn env_or_current(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| ".".to_string())
}
