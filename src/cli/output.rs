use std::io::IsTerminal;

use serde::Serialize;

use clustercost::core::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// `--json` wins, then `--format`, then the configured default.
    pub fn resolve(json_flag: bool, format_flag: Option<&str>, settings: &Settings) -> Self {
        if json_flag {
            return Self::Json;
        }
        match format_flag.unwrap_or(settings.default_format.as_str()) {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
    pub verbose: bool,
}

impl OutputOptions {
    pub fn to_json<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

/// `--no-color` and `color = "never"` always win; `color = "always"` forces
/// color even when piped. Otherwise color follows `NO_COLOR` and the TTY.
pub fn detect_color(color_flag: bool, settings: &Settings) -> bool {
    if !color_flag {
        return false;
    }
    match settings.color.as_str() {
        "never" => false,
        "always" => true,
        _ => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    }
}
