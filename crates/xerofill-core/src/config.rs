use crate::{Error, Result, credentials};
use std::collections::HashMap;

pub const KEY_EMAIL: &str = "XERO_EMAIL";
pub const KEY_PASSWORD: &str = "XERO_PASSWORD";
pub const KEY_CREDENTIALS: &str = "XERO_CREDENTIALS";
pub const KEY_DEFAULT_PROJECT: &str = "DEFAULT_PROJECT";
pub const KEY_DEFAULT_TASK: &str = "DEFAULT_TASK";

/// Run configuration, loaded once and immutable for the session.
#[derive(Debug, Clone)]
pub struct Config {
    pub email: String,
    pub password: String,
    pub default_project: String,
    pub default_task: String,
}

impl Config {
    /// Build a configuration from a key-value source.
    ///
    /// If `XERO_CREDENTIALS` is present it is decoded and expanded into
    /// `XERO_EMAIL`/`XERO_PASSWORD`, taking precedence over explicit values.
    /// Empty values count as missing.
    pub fn from_map(mut values: HashMap<String, String>) -> Result<Self> {
        if let Some(blob) = values.get(KEY_CREDENTIALS) {
            let creds = credentials::decode(blob)?;
            values.insert(KEY_EMAIL.to_string(), creds.email);
            values.insert(KEY_PASSWORD.to_string(), creds.password);
        }

        let take = |key: &'static str| -> Result<String> {
            values
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or(Error::MissingKey(key))
        };

        Ok(Self {
            email: take(KEY_EMAIL)?,
            password: take(KEY_PASSWORD)?,
            default_project: take(KEY_DEFAULT_PROJECT)?,
            default_task: take(KEY_DEFAULT_TASK)?,
        })
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;

    fn base_map() -> HashMap<String, String> {
        HashMap::from([
            (KEY_EMAIL.to_string(), "me@example.com".to_string()),
            (KEY_PASSWORD.to_string(), "s3cret".to_string()),
            (KEY_DEFAULT_PROJECT.to_string(), "Internal".to_string()),
            (KEY_DEFAULT_TASK.to_string(), "Development".to_string()),
        ])
    }

    #[test]
    fn test_config_from_map() {
        let config = Config::from_map(base_map()).unwrap();

        assert_eq!(config.email, "me@example.com");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.default_project, "Internal");
        assert_eq!(config.default_task, "Development");
    }

    #[test]
    fn test_config_missing_key() {
        let mut values = base_map();
        values.remove(KEY_DEFAULT_TASK);

        let result = Config::from_map(values);

        assert!(matches!(result, Err(Error::MissingKey(KEY_DEFAULT_TASK))));
    }

    #[test]
    fn test_config_empty_value_counts_as_missing() {
        let mut values = base_map();
        values.insert(KEY_PASSWORD.to_string(), String::new());

        let result = Config::from_map(values);

        assert!(matches!(result, Err(Error::MissingKey(KEY_PASSWORD))));
    }

    #[test]
    fn test_config_expands_credentials_blob() {
        let blob = crate::credentials::encode(&Credentials {
            email: "blob@example.com".to_string(),
            password: "blob-pass".to_string(),
        });

        let mut values = HashMap::from([
            (KEY_CREDENTIALS.to_string(), blob),
            (KEY_DEFAULT_PROJECT.to_string(), "Internal".to_string()),
            (KEY_DEFAULT_TASK.to_string(), "Development".to_string()),
        ]);
        let config = Config::from_map(values.clone()).unwrap();

        assert_eq!(config.email, "blob@example.com");
        assert_eq!(config.password, "blob-pass");

        // Blob wins over explicit values when both are present
        values.insert(KEY_EMAIL.to_string(), "other@example.com".to_string());
        values.insert(KEY_PASSWORD.to_string(), "other".to_string());
        let config = Config::from_map(values).unwrap();

        assert_eq!(config.email, "blob@example.com");
        assert_eq!(config.password, "blob-pass");
    }

    #[test]
    fn test_config_rejects_bad_credentials_blob() {
        let mut values = base_map();
        values.insert(KEY_CREDENTIALS.to_string(), "%%%".to_string());

        assert!(Config::from_map(values).is_err());
    }
}
