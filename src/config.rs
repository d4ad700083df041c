use crate::client::CaseClient;
use crate::forms::{FormDecoder, DEFAULT_MAX_FIELDS};
use axum::http::{header::LOCATION, StatusCode};
use axum::response::{IntoResponse, Response};
use std::env;
use std::sync::Arc;

const DEFAULT_PORT: u16 = 8888;
const DEFAULT_SIRIUS_URL: &str = "http://localhost:9001";
const DEFAULT_WEB_DIR: &str = "web";

/// An enumeration of errors that may occur while reading configuration
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Settings read from the environment at start-up
///
/// # Fields
/// - `port` - Port the server listens on
/// - `prefix` - Path the site is mounted under, empty for the root
/// - `sirius_url` - Base URL of the case-management API
/// - `sirius_public_url` - Base URL users are sent to for sign-in
/// - `web_dir` - Directory holding the `static` assets
/// - `form_max_fields` - Most name/value pairs accepted in one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub prefix: String,
    pub sirius_url: String,
    pub sirius_public_url: String,
    pub web_dir: String,
    pub form_max_fields: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            prefix: String::new(),
            sirius_url: DEFAULT_SIRIUS_URL.to_string(),
            sirius_public_url: DEFAULT_SIRIUS_URL.to_string(),
            web_dir: DEFAULT_WEB_DIR.to_string(),
            form_max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl Settings {
    /// Reads the settings from environment variables.
    ///
    /// # Errors
    /// Returns a `ConfigError` when `PORT` or `FORM_MAX_FIELDS` is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the settings through `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let defaults = Settings::default();

        let sirius_url = get("SIRIUS_URL").unwrap_or(defaults.sirius_url);
        let sirius_public_url = get("SIRIUS_PUBLIC_URL").unwrap_or_else(|| sirius_url.clone());

        Ok(Self {
            port: number("PORT", get("PORT"), defaults.port)?,
            prefix: get("PREFIX").unwrap_or(defaults.prefix),
            sirius_url,
            sirius_public_url,
            web_dir: get("WEB_DIR").unwrap_or(defaults.web_dir),
            form_max_fields: number(
                "FORM_MAX_FIELDS",
                get("FORM_MAX_FIELDS"),
                defaults.form_max_fields,
            )?,
        })
    }
}

fn number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

/// The application state
///
/// Built once at start-up and shared read-only between requests.
///
/// # Fields
/// - `settings` - The settings the server was started with
/// - `client` - The case-management API
/// - `decoder` - Decoder for query strings and posted forms
pub struct AppState {
    pub settings: Settings,
    pub client: Arc<dyn CaseClient>,
    pub decoder: FormDecoder,
}

impl AppState {
    pub fn new(settings: Settings, client: Arc<dyn CaseClient>) -> Self {
        let decoder = FormDecoder::new(settings.form_max_fields);

        Self {
            settings,
            client,
            decoder,
        }
    }

    /// A `302 Found` to a page of this site.
    pub fn redirect(&self, to: &str) -> Response {
        (StatusCode::FOUND, [(LOCATION, format!("{}{}", self.settings.prefix, to))]).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.port, 8888);
        assert_eq!(settings.sirius_public_url, "http://localhost:9001");
    }

    #[test]
    fn test_public_url_follows_sirius_url() {
        let settings =
            Settings::from_lookup(lookup(&[("SIRIUS_URL", "http://sirius"), ("PREFIX", "/lpa")]))
                .unwrap();

        assert_eq!(settings.sirius_public_url, "http://sirius");
        assert_eq!(settings.prefix, "/lpa");

        let split = Settings::from_lookup(lookup(&[
            ("SIRIUS_URL", "http://sirius"),
            ("SIRIUS_PUBLIC_URL", "https://sirius.example"),
        ]))
        .unwrap();

        assert_eq!(split.sirius_public_url, "https://sirius.example");
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(
            Settings::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidNumber {
                name: "PORT",
                value: "eighty".to_string()
            })
        );
        assert!(Settings::from_lookup(lookup(&[("FORM_MAX_FIELDS", "-1")])).is_err());
        let settings = Settings::from_lookup(lookup(&[("FORM_MAX_FIELDS", "20")])).unwrap();
        assert_eq!(settings.form_max_fields, 20);
    }
}
