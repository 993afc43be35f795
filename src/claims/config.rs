// SPDX-License-Identifier: MIT

//! Runtime configuration read from the environment

use crate::adk::error::{AssistantError, Result};
use std::env;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/claims";
pub const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub mistral_api_key: Option<String>,
    /// Always ends in `/` so endpoint paths can be joined onto it
    pub mistral_base_url: Url,
    pub model: String,
    pub temperature: f32,
    pub max_iterations: u32,
    pub ohip_guidance: bool,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset and blank values take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base = get("MISTRAL_BASE_URL").unwrap_or_else(|| DEFAULT_MISTRAL_BASE_URL.to_string());

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            mistral_api_key: get("MISTRAL_API_KEY"),
            mistral_base_url: base_url(&base)?,
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or(&get, "LLM_TEMPERATURE", 0.2)?,
            max_iterations: parse_or(&get, "AGENT_MAX_ITERATIONS", 10)?,
            ohip_guidance: parse_flag(get("OHIP_GUIDANCE").as_deref())?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 4000)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AssistantError::config(format!("{}={:?}: {}", key, raw, e))),
    }
}

fn parse_flag(raw: Option<&str>) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(AssistantError::config(format!(
            "OHIP_GUIDANCE must be true or false, got {:?}",
            other
        ))),
    }
}

fn base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| AssistantError::config(format!("MISTRAL_BASE_URL: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.database_max_connections, 5);
        assert!(cfg.mistral_api_key.is_none());
        assert_eq!(cfg.mistral_base_url.as_str(), "https://api.mistral.ai/v1/");
        assert_eq!(cfg.model, "mistral-large-latest");
        assert_eq!(cfg.temperature, 0.2);
        assert_eq!(cfg.max_iterations, 10);
        assert!(!cfg.ohip_guidance);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:4000");
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("MISTRAL_API_KEY", "k"),
            ("OHIP_GUIDANCE", "TRUE"),
            ("MISTRAL_BASE_URL", "http://localhost:9000/v1/"),
            ("LLM_MODEL", " "),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.mistral_api_key.as_deref(), Some("k"));
        assert!(cfg.ohip_guidance);
        assert_eq!(cfg.mistral_base_url.as_str(), "http://localhost:9000/v1/");
        assert_eq!(cfg.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(AssistantError::Config(_))
        ));
        assert!(config(&[("OHIP_GUIDANCE", "maybe")]).is_err());
        assert!(config(&[("MISTRAL_BASE_URL", "not a url")]).is_err());
    }
}
