// Secure storage for API keys
//
// Keys are stored in ~/.ideaforge/secrets.toml (global only, not project-level)
// This file should be automatically gitignored

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Secrets stored in ~/.ideaforge/secrets.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    /// API keys indexed by provider ID (e.g., "openai" -> "sk-...")
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

impl SecretsConfig {
    /// Get the secrets file path (~/.ideaforge/secrets.toml)
    pub fn get_secrets_path() -> Option<PathBuf> {
        crate::utils::ideaforge_dir().map(|p| p.join("secrets.toml"))
    }

    /// Load secrets from disk
    pub fn load() -> Result<Self> {
        let path = Self::get_secrets_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read secrets file '{}': {}", path.display(), e))?;

        let config: SecretsConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse secrets file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save secrets to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::get_secrets_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!(
                        "Failed to create secrets directory '{}': {}",
                        parent.display(),
                        e
                    )
                })?;
            }
        }

        // Serialize to TOML
        let contents = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize secrets: {}", e))?;

        // Write to file with restrictive permissions
        fs::write(&path, contents)
            .map_err(|e| anyhow!("Failed to write secrets file '{}': {}", path.display(), e))?;

        // Set file permissions to 600 (owner read/write only) on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, permissions).map_err(|e| {
                anyhow!(
                    "Failed to set permissions on secrets file '{}': {}",
                    path.display(),
                    e
                )
            })?;
        }

        log::info!("Saved secrets to: {}", path.display());
        Ok(())
    }

    /// Get a provider's API key
    pub fn get_key(&self, provider_id: &str) -> Option<&String> {
        self.api_keys.get(provider_id)
    }

    /// Set a provider's API key
    pub fn set_key(&mut self, provider_id: &str, key: &str) {
        self.api_keys
            .insert(provider_id.to_string(), key.to_string());
    }

    /// Delete a provider's API key
    pub fn delete_key(&mut self, provider_id: &str) -> bool {
        self.api_keys.remove(provider_id).is_some()
    }

    /// Check if a provider has a key configured
    pub fn has_key(&self, provider_id: &str) -> bool {
        self.api_keys.contains_key(provider_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_config_default() {
        let config = SecretsConfig::default();
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn test_set_and_get_key() {
        let mut config = SecretsConfig::default();
        config.set_key("openai", "test-key");
        assert_eq!(config.get_key("openai"), Some(&"test-key".to_string()));
        assert!(config.has_key("openai"));
        assert!(!config.has_key("anthropic"));
    }

    #[test]
    fn test_delete_key() {
        let mut config = SecretsConfig::default();
        config.set_key("openai", "test-key");
        assert!(config.delete_key("openai"));
        assert!(!config.has_key("openai"));
        assert!(!config.delete_key("openai")); // Already deleted
    }

    #[test]
    fn test_serialization() {
        let mut config = SecretsConfig::default();
        config.set_key("openai", "sk-12345");
        config.set_key("openrouter", "or-67890");

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("openai"));
        assert!(toml_str.contains("sk-12345"));

        let parsed: SecretsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.get_key("openai"), Some(&"sk-12345".to_string()));
        assert_eq!(parsed.get_key("openrouter"), Some(&"or-67890".to_string()));
    }
}
