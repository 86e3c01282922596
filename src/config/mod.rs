// Configuration: CLI/env settings and the on-disk secrets fallback

pub mod secrets;

pub use secrets::SecretsConfig;

use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Provider ID looked up in the secrets file when no key is passed
/// via `--api-key` or `OPENAI_API_KEY`.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Default database location (~/.ideaforge/ideaforge.db), falling back to
/// the working directory when no home directory can be determined.
pub fn default_db_path() -> PathBuf {
    match crate::utils::ideaforge_dir() {
        Some(dir) => dir.join("ideaforge.db"),
        None => PathBuf::from("ideaforge.db"),
    }
}

/// Resolve the API key for the LLM backend.
///
/// Precedence: the explicit flag/env value wins, then the `api_keys` map in
/// the secrets file. Returns an error when neither yields a usable key; the
/// server refuses to start rather than failing on the first LLM call.
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String> {
    if let Some(key) = non_blank(explicit) {
        return Ok(key);
    }

    // The secrets file is only consulted when the flag and env are absent.
    let secrets = SecretsConfig::load()?;
    if let Some(key) = non_blank(secrets.get_key(DEFAULT_PROVIDER).map(String::as_str)) {
        return Ok(key);
    }

    let path = SecretsConfig::get_secrets_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.ideaforge/secrets.toml".to_string());
    Err(anyhow!(
        "No API key configured. Pass --api-key, set OPENAI_API_KEY, or add an '{}' entry to {}",
        DEFAULT_PROVIDER,
        path
    ))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
