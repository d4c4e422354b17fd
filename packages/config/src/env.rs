// ABOUTME: Typed readers for environment variables
// ABOUTME: Parses booleans and integers with validation errors naming the offending variable

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid boolean value for {0}: {1}. Must be 'true' or 'false'")]
    InvalidBoolean(String, String),

    #[error("Invalid integer value for {0}: {1}")]
    InvalidInteger(String, String),

    #[error("Invalid value for {0}: {1}. Must be one of: {2}")]
    InvalidEnum(String, String, String),

    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Read a variable, treating unset and blank values alike
pub fn var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

/// Read a variable verbatim, for values such as keys where whitespace is significant.
/// Only an empty value counts as unset.
pub fn raw_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

pub fn parse_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean(
            name.to_string(),
            value.to_string(),
        )),
    }
}

/// Boolean variable with a default for the unset case
pub fn bool_or(name: &str, default: bool) -> ConfigResult<bool> {
    match var(name) {
        Some(value) => parse_bool(name, &value),
        None => {
            debug!("{} not set, using default {}", name, default);
            Ok(default)
        }
    }
}

/// Numeric variable with a default for the unset case
pub fn number_or<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: FromStr,
{
    match var(name) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidInteger(name.to_string(), value)),
        None => Ok(default),
    }
}
