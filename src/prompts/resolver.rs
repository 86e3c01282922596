// Prompt resolution with cascading lookup
//
// Resolution order:
// 1. Override - admin-managed pairs stored in the database
// 2. Builtin - compiled-in default pairs

use crate::prompts::builtin;
use crate::prompts::PromptError;
use log::debug;
use std::collections::HashMap;

/// Where a prompt pair was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    /// Stored override (managed through the templates API)
    Override,
    /// Built-in pair (compiled into the application)
    Builtin,
}

impl PromptSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptSource::Override => "override",
            PromptSource::Builtin => "builtin",
        }
    }
}

/// A resolved system/user pair, ready to render
#[derive(Debug, Clone)]
pub struct ResolvedPrompt {
    pub name: String,
    pub system: String,
    pub user: String,
    pub source: PromptSource,
}

/// Prompt resolver with cascading lookup. Overrides are loaded up front
/// (one database read) so resolution itself never touches storage.
pub struct PromptResolver {
    overrides: HashMap<String, (String, String)>,
    cache: HashMap<String, ResolvedPrompt>,
    use_cache: bool,
}

impl PromptResolver {
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            cache: HashMap::new(),
            use_cache: true,
        }
    }

    /// Supply stored overrides as name -> (system, user)
    pub fn with_overrides(mut self, overrides: HashMap<String, (String, String)>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Enable or disable caching
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Resolve a prompt pair by name: override first, then builtin
    pub fn resolve(&mut self, name: &str) -> Result<ResolvedPrompt, PromptError> {
        if self.use_cache {
            if let Some(cached) = self.cache.get(name) {
                debug!(
                    "Prompt '{}' resolved from cache (source: {:?})",
                    name, cached.source
                );
                return Ok(cached.clone());
            }
        }

        if let Some((system, user)) = self.overrides.get(name) {
            debug!("Prompt '{}' resolved from stored override", name);
            let resolved = ResolvedPrompt {
                name: name.to_string(),
                system: system.clone(),
                user: user.clone(),
                source: PromptSource::Override,
            };
            if self.use_cache {
                self.cache.insert(name.to_string(), resolved.clone());
            }
            return Ok(resolved);
        }

        if let Some(pair) = builtin::get_builtin_pair(name) {
            debug!("Prompt '{}' resolved from builtin pairs", name);
            let resolved = ResolvedPrompt {
                name: name.to_string(),
                system: pair.system.to_string(),
                user: pair.user.to_string(),
                source: PromptSource::Builtin,
            };
            if self.use_cache {
                self.cache.insert(name.to_string(), resolved.clone());
            }
            return Ok(resolved);
        }

        debug!("Prompt '{}' not found in any location", name);
        Err(PromptError::UnknownPrompt(name.to_string()))
    }

    /// Check if a prompt exists in any location
    pub fn exists(&self, name: &str) -> bool {
        self.overrides.contains_key(name) || builtin::is_builtin_name(name)
    }

    /// Clear the cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// List all available prompts in resolution-order priority, overrides
    /// winning over builtins of the same name
    pub fn list_all(&self) -> Vec<(String, PromptSource)> {
        let mut prompts = Vec::new();
        let mut seen = std::collections::HashSet::new();

        let mut override_names: Vec<&String> = self.overrides.keys().collect();
        override_names.sort();
        for name in override_names {
            if seen.insert(name.clone()) {
                prompts.push((name.clone(), PromptSource::Override));
            }
        }

        for name in builtin::list_builtin_prompts() {
            if seen.insert(name.to_string()) {
                prompts.push((name.to_string(), PromptSource::Builtin));
            }
        }

        prompts
    }
}

impl Default for PromptResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn override_map(name: &str) -> HashMap<String, (String, String)> {
        let mut map = HashMap::new();
        map.insert(
            name.to_string(),
            ("Custom system".to_string(), "Custom user".to_string()),
        );
        map
    }

    #[test]
    fn test_falls_back_to_builtin() {
        let mut resolver = PromptResolver::new();

        let prompt = resolver.resolve(builtin::SECTION_PROBLEM).unwrap();
        assert_eq!(prompt.source, PromptSource::Builtin);
        assert!(prompt.user.contains("idea.title"));
    }

    #[test]
    fn test_override_wins_over_builtin() {
        let mut resolver =
            PromptResolver::new().with_overrides(override_map(builtin::SECTION_PROBLEM));

        let prompt = resolver.resolve(builtin::SECTION_PROBLEM).unwrap();
        assert_eq!(prompt.source, PromptSource::Override);
        assert_eq!(prompt.system, "Custom system");
        assert_eq!(prompt.user, "Custom user");
    }

    #[test]
    fn test_returns_error_for_unknown_prompt() {
        let mut resolver = PromptResolver::new();

        let result = resolver.resolve("nonexistent_prompt");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("nonexistent_prompt"));
    }

    #[test]
    fn test_caches_resolved_prompts() {
        let mut resolver = PromptResolver::new().with_caching(true);

        let first = resolver.resolve(builtin::PILLAR_SCORING).unwrap();
        assert_eq!(first.source, PromptSource::Builtin);

        // Overrides added after a cached resolve are not seen until the
        // cache is cleared
        resolver.overrides = override_map(builtin::PILLAR_SCORING);
        let second = resolver.resolve(builtin::PILLAR_SCORING).unwrap();
        assert_eq!(second.source, PromptSource::Builtin);

        resolver.clear_cache();
        let third = resolver.resolve(builtin::PILLAR_SCORING).unwrap();
        assert_eq!(third.source, PromptSource::Override);
    }

    #[test]
    fn test_exists() {
        let resolver = PromptResolver::new().with_overrides(override_map("custom_only"));

        assert!(resolver.exists(builtin::SECTION_MARKET));
        assert!(resolver.exists("custom_only"));
        assert!(!resolver.exists("nonexistent"));
    }

    #[test]
    fn test_list_all_includes_source() {
        let resolver =
            PromptResolver::new().with_overrides(override_map(builtin::SECTION_PROBLEM));

        let prompts = resolver.list_all();

        let overridden = prompts
            .iter()
            .find(|(name, _)| name == builtin::SECTION_PROBLEM);
        assert_eq!(overridden.unwrap().1, PromptSource::Override);

        let built_in = prompts
            .iter()
            .find(|(name, _)| name == builtin::PILLAR_SCORING);
        assert_eq!(built_in.unwrap().1, PromptSource::Builtin);

        // No duplicates for overridden names
        let problem_entries = prompts
            .iter()
            .filter(|(name, _)| name == builtin::SECTION_PROBLEM)
            .count();
        assert_eq!(problem_entries, 1);
    }
}
