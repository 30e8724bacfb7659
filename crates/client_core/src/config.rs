use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use url::Url;

use crate::employee_form::DEFAULT_EMAIL_DOMAIN;

pub const DEFAULT_CONFIG_FILE: &str = "employee_desk.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub required_email_domain: String,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".into(),
            required_email_domain: DEFAULT_EMAIL_DOMAIN.into(),
            request_timeout_secs: 10,
            log_filter: "info".into(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults, then the config file (if present), then the environment.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if config_path.is_none() && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

/// Applies a flat `key = "value"` table.
pub fn apply_file(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    let text = |key: &str| -> Option<String> {
        match file_cfg.get(key)? {
            toml::Value::String(v) => Some(v.clone()),
            other => Some(other.to_string()),
        }
    };

    if let Some(v) = text("api_base_url") {
        settings.api_base_url = v;
    }
    if let Some(v) = text("email_domain") {
        settings.required_email_domain = v;
    }
    if let Some(v) = text("request_timeout_secs") {
        settings.request_timeout_secs = v
            .parse()
            .with_context(|| format!("request_timeout_secs must be a whole number, got '{v}'"))?;
    }
    if let Some(v) = text("log_filter") {
        settings.log_filter = v;
    }
    Ok(())
}

pub fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("EMPLOYEE_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__EMAIL_DOMAIN") {
        settings.required_email_domain = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = lookup("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

/// Trims whitespace and trailing slashes and insists on an http(s) URL.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(ClientSettings::default().api_base_url);
    }

    let parsed = Url::parse(trimmed)
        .with_context(|| format!("employee service url '{trimmed}' is not a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "employee service url '{trimmed}' must use http or https, not '{}'",
            parsed.scheme()
        );
    }
    Ok(trimmed.to_string())
}
