//! Fixture sizes and password tiers for one seeding run.
//!
//! A run is configured from defaults, optionally overlaid by a JSON file in
//! which every field may be omitted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Plaintext password per account tier; each tier is hashed once per run.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordTiers {
    pub admin: String,
    pub customer: String,
    pub tradesperson: String,
}

impl std::fmt::Debug for PasswordTiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordTiers { .. }")
    }
}

impl Default for PasswordTiers {
    fn default() -> Self {
        Self {
            admin: "admin123".to_string(),
            customer: "user123".to_string(),
            tradesperson: "tukang123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    pub admins: usize,
    pub tradespeople: usize,
    pub customers: usize,
    pub applications: usize,
    pub products: usize,
    pub orders: usize,
    pub payroll_entries: usize,
    /// Leading payroll entries left unpaid.
    pub pending_payroll_entries: usize,
    pub chat_threads: usize,
    pub notifications: usize,
    /// Products placed in the first customer's cart.
    pub cart_items: usize,
    pub passwords: PasswordTiers,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admins: 3,
            tradespeople: 10,
            customers: 20,
            applications: 5,
            products: 15,
            orders: 10,
            payroll_entries: 8,
            pending_payroll_entries: 3,
            chat_threads: 3,
            notifications: 10,
            cart_items: 5,
            passwords: PasswordTiers::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl SeedConfig {
    /// Loads a JSON config; omitted fields keep their defaults.
    ///
    /// # Errors
    /// - The file cannot be read.
    /// - The content is not a JSON object of known fields.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SeedConfig};

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"{ "orders": 4, "passwords": { "admin": "rahasia" } }"#,
        )
        .unwrap();

        let config = SeedConfig::from_json_file(&path).unwrap();
        assert_eq!(config.orders, 4);
        assert_eq!(config.customers, 20);
        assert_eq!(config.passwords.admin, "rahasia");
        assert_eq!(config.passwords.customer, "user123");
    }

    #[test]
    fn unknown_fields_and_missing_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{ "ordrs": 4 }"#).unwrap();

        assert!(matches!(
            SeedConfig::from_json_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            SeedConfig::from_json_file(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn debug_output_hides_passwords() {
        let rendered = format!("{:?}", SeedConfig::default());
        assert!(!rendered.contains("admin123"));
    }
}
