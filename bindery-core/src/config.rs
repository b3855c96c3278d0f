// Adapter configuration

use crate::Error;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Wire shape of the response envelope. One shape is used per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStyle {
    /// `{"success":bool,"data"?:any,"error"?:{...}}`
    #[default]
    #[serde(alias = "success")]
    SuccessFlag,
    /// `{"code":int,"msg"?:string,"data"?:any}`
    #[serde(alias = "code")]
    CodeMessage,
}

impl FromStr for EnvelopeStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" | "success_flag" => Ok(EnvelopeStyle::SuccessFlag),
            "code" | "code_message" => Ok(EnvelopeStyle::CodeMessage),
            other => Err(Error::Config(format!("unknown envelope style: {}", other))),
        }
    }
}

/// Adapter configuration.
///
/// # Environment Variables
///
/// - `BINDERY_ENVELOPE`: `success` or `code`
/// - `BINDERY_SUCCESS_CODE`: code for successful responses in the `code` style
/// - `BINDERY_FAILURE_CODE`: code for errors without a numeric code
/// - `BINDERY_LOG_BODY`: include the request body in failure logs
/// - `BINDERY_MAX_LOGGED_BODY`: truncate logged bodies to this many bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub envelope: EnvelopeStyle,
    pub success_code: i64,
    pub failure_code: i64,
    pub log_request_body: bool,
    pub max_logged_body: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            envelope: EnvelopeStyle::SuccessFlag,
            success_code: 0,
            failure_code: 1,
            log_request_body: true,
            max_logged_body: 4096,
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `BINDERY_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `BINDERY_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup("BINDERY_ENVELOPE") {
            config.envelope = value.parse()?;
        }
        if let Some(value) = lookup("BINDERY_SUCCESS_CODE") {
            config.success_code = parse_var("BINDERY_SUCCESS_CODE", &value)?;
        }
        if let Some(value) = lookup("BINDERY_FAILURE_CODE") {
            config.failure_code = parse_var("BINDERY_FAILURE_CODE", &value)?;
        }
        if let Some(value) = lookup("BINDERY_LOG_BODY") {
            config.log_request_body = parse_bool("BINDERY_LOG_BODY", &value)?;
        }
        if let Some(value) = lookup("BINDERY_MAX_LOGGED_BODY") {
            config.max_logged_body = parse_var("BINDERY_MAX_LOGGED_BODY", &value)?;
        }
        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config(format!("TOML parse error: {}", e)))
    }

    pub fn with_envelope(mut self, envelope: EnvelopeStyle) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_codes(mut self, success_code: i64, failure_code: i64) -> Self {
        self.success_code = success_code;
        self.failure_code = failure_code;
        self
    }

    pub fn with_request_body_logging(mut self, enabled: bool, max_bytes: usize) -> Self {
        self.log_request_body = enabled;
        self.max_logged_body = max_bytes;
        self
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, Error>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{}={:?}: {}", key, value, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{}={:?}: expected a boolean", key, value))),
    }
}
