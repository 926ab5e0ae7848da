use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub session_name: String,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5555".into(),
            session_name: "sandbox".into(),
            verbose: false,
        }
    }
}

/// Command-line values; anything set here wins over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub session_name: Option<String>,
    pub verbose: bool,
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    session_name: Option<String>,
    verbose: Option<bool>,
}

impl Settings {
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(port) = overrides.port {
            self.bind_addr = format!("0.0.0.0:{port}");
        }
        if let Some(bind_addr) = &overrides.bind_addr {
            self.bind_addr = bind_addr.clone();
        }
        if let Some(session_name) = &overrides.session_name {
            self.session_name = session_name.clone();
        }
        self.verbose |= overrides.verbose;
        self
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Defaults, then the config file, then `APP__*` environment variables.
/// An explicit `config_path` must exist; the default `server.toml` is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_PATH) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_PATH}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.session_name {
        settings.session_name = v;
    }
    if let Some(v) = file_cfg.verbose {
        settings.verbose = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = var("SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = var("APP__SESSION_NAME") {
        settings.session_name = v;
    }

    if let Some(v) = var("APP__VERBOSE") {
        settings.verbose =
            parse_flag(&v).with_context(|| format!("APP__VERBOSE must be a boolean, got '{v}'"))?;
    }

    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
