//! Vault configuration loading.
//!
//! Loads configuration from a TOML file with support for environment
//! variable expansion in string values. Variables use `$VAR` or `${VAR}`
//! syntax; unresolved references are left as-is.
//!
//! # Example Configuration
//!
//! ```toml
//! signing_secret = "$VAULT_SIGNING_SECRET"
//!
//! [handler]
//! name = "acme-pay"
//! card_networks = ["VISA", "MASTERCARD"]
//! tokenization_mode = "network_token"
//! token_ttl_seconds = 900
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to the configuration file (default: `vault.toml`)
//! - Secrets referenced by `$VAR` in the config file
//!
//! The signing secret is validated at load time: a missing or too-short
//! secret is a fatal startup condition, never a per-request error.

use serde::Deserialize;
use std::fmt;

use ucp_pay::binding::{SecretError, SigningSecret};
use ucp_pay::config::HandlerConfig;

/// Top-level vault configuration.
#[derive(Clone, Deserialize)]
pub struct VaultConfig {
    /// Handler policy and capability configuration.
    #[serde(default)]
    pub handler: HandlerConfig,

    /// HMAC signing secret for checkout-binding tokens. Supports `$VAR` /
    /// `${VAR}` environment expansion.
    pub signing_secret: String,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("handler", &self.handler)
            .field("signing_secret", &"[redacted]")
            .finish()
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file `{path}`: {source}")]
    Io {
        /// The path that failed to load.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file could not be parsed.
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The signing secret is unusable.
    #[error(transparent)]
    Secret(#[from] SecretError),
}

impl VaultConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `vault.toml` in the current directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or
    /// if the signing secret fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "vault.toml".to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file path, expanding `$VAR` /
    /// `${VAR}` references from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or
    /// if the signing secret fails validation.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = toml::from_str(&expand_env(&content))?;
        // Fail at startup, not on the first request.
        config.signing_secret()?;
        Ok(config)
    }

    /// Resolves the configured signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Secret`] for secrets under the minimum
    /// length.
    pub fn signing_secret(&self) -> Result<SigningSecret, ConfigError> {
        Ok(SigningSecret::new(self.signing_secret.as_bytes())?)
    }
}

/// Expands `$VAR` and `${VAR}` references from the process environment.
/// Unresolved or malformed references are left as-is.
fn expand_env(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        rest = &rest[dollar + 1..];

        let (braced, name, tail) = if let Some(inner) = rest.strip_prefix('{') {
            match inner.find('}') {
                Some(close) => (true, &inner[..close], &inner[close + 1..]),
                None => {
                    // Unclosed brace: keep the text literally.
                    out.push_str("${");
                    out.push_str(inner);
                    return out;
                }
            }
        } else {
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            (false, &rest[..end], &rest[end..])
        };

        if name.is_empty() {
            out.push('$');
            if braced {
                out.push_str("{}");
            }
        } else if let Ok(value) = std::env::var(name) {
            out.push_str(&value);
        } else {
            out.push('$');
            if braced {
                out.push('{');
                out.push_str(name);
                out.push('}');
            } else {
                out.push_str(name);
            }
        }
        rest = tail;
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucp_pay::card::CardBrand;
    use ucp_pay::config::TokenizationMode;

    #[test]
    fn expands_known_variables_in_both_syntaxes() {
        // PATH is always present in a test environment.
        let path = std::env::var("PATH").unwrap();
        assert_eq!(expand_env("pre $PATH post"), format!("pre {path} post"));
        assert_eq!(expand_env("pre ${PATH} post"), format!("pre {path} post"));
    }

    #[test]
    fn leaves_unknown_and_malformed_references_alone() {
        assert_eq!(
            expand_env("${UCP_DEFINITELY_NOT_SET_XYZ}"),
            "${UCP_DEFINITELY_NOT_SET_XYZ}"
        );
        assert_eq!(
            expand_env("$UCP_DEFINITELY_NOT_SET_XYZ"),
            "$UCP_DEFINITELY_NOT_SET_XYZ"
        );
        assert_eq!(expand_env("literal $ sign"), "literal $ sign");
        assert_eq!(expand_env("trailing $"), "trailing $");
        assert_eq!(expand_env("unclosed ${BRACE"), "unclosed ${BRACE");
    }

    #[test]
    fn parses_a_full_config_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("ucp-pay-vault-config-test.toml");
        std::fs::write(
            &path,
            r#"
signing_secret = "an-adequately-long-test-secret!!"

[handler]
name = "acme-pay"
card_networks = ["VISA"]
tokenization_mode = "pan"
token_ttl_seconds = 300
"#,
        )
        .unwrap();

        let config = VaultConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.handler.name, "acme-pay");
        assert_eq!(config.handler.card_networks, vec![CardBrand::Visa]);
        assert_eq!(config.handler.tokenization_mode, TokenizationMode::Pan);
        assert_eq!(config.handler.token_ttl_seconds, 300);
        assert!(config.signing_secret().is_ok());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn short_secret_fails_at_load_time() {
        let dir = std::env::temp_dir();
        let path = dir.join("ucp-pay-vault-short-secret-test.toml");
        std::fs::write(&path, "signing_secret = \"short\"\n").unwrap();

        let err = VaultConfig::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Secret(_)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = VaultConfig::load_from("/nonexistent/vault.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let config = VaultConfig {
            handler: HandlerConfig::default(),
            signing_secret: "an-adequately-long-test-secret!!".to_owned(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("an-adequately-long-test-secret!!"));
        assert!(rendered.contains("[redacted]"));
    }
}
