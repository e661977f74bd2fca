use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use quarry_application::DEFAULT_MAX_QUERY_DEPTH;
use quarry_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub schema_path: String,
    pub max_depth: usize,
    pub cors_allowed_origin: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_port(value.as_str()))
            .transpose()?
            .unwrap_or(3001);

        let schema_path = required_non_empty_env("SCHEMA_PATH")?;

        let max_depth = env::var("QUERY_MAX_DEPTH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_max_depth(value.as_str()))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_QUERY_DEPTH);

        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_host,
            api_port,
            schema_path,
            max_depth,
            cors_allowed_origin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_port(value: &str) -> Result<u16, AppError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|error| AppError::Validation(format!("invalid API_PORT '{value}': {error}")))
}

fn parse_max_depth(value: &str) -> Result<usize, AppError> {
    match value.trim().parse::<usize>() {
        Ok(depth) if depth > 0 => Ok(depth),
        _ => Err(AppError::Validation(format!(
            "QUERY_MAX_DEPTH must be a positive integer, got '{value}'"
        ))),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, parse_max_depth, parse_port};

    #[test]
    fn max_depth_must_be_positive() {
        assert_eq!(parse_max_depth(" 8 ").ok(), Some(8));
        assert!(parse_max_depth("0").is_err());
        assert!(parse_max_depth("deep").is_err());
    }

    #[test]
    fn api_port_must_be_a_valid_port() {
        assert_eq!(parse_port("8080").ok(), Some(8080));
        assert!(parse_port("http").is_err());
        assert!(parse_port("70000").is_err());
    }

    #[test]
    fn socket_address_rejects_host_names() {
        let config = ApiConfig {
            api_host: "localhost".to_owned(),
            api_port: 3001,
            schema_path: "schemas".to_owned(),
            max_depth: 32,
            cors_allowed_origin: None,
        };
        assert!(config.socket_address().is_err());

        let config = ApiConfig {
            api_host: "0.0.0.0".to_owned(),
            ..config
        };
        assert_eq!(
            config.socket_address().map(|address| address.port()).ok(),
            Some(3001)
        );
    }
}
