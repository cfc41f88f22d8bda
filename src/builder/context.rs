//! Compile options.

use std::fmt;
use std::sync::Arc;

use crate::compact::CompactionPolicy;

/// Decides which constraint paths take part in a compile.
pub trait PathFilter: Send + Sync {
    /// Returns true if the node at `path` (and its subtree) is compiled.
    fn accept(&self, path: &str) -> bool;
}

/// Accepts every path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPathFilter;

impl PathFilter for NoopPathFilter {
    fn accept(&self, _path: &str) -> bool {
        true
    }
}

/// Rejects every path starting with one of the given prefixes.
#[derive(Clone, Debug, Default)]
pub struct ExcludePathFilter {
    prefixes: Vec<String>,
}

impl ExcludePathFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl PathFilter for ExcludePathFilter {
    fn accept(&self, path: &str) -> bool {
        !self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Options of a single compile.
#[derive(Clone)]
pub struct BuilderContext {
    /// Language of names and labels; defaults to the template language.
    pub default_language: Option<String>,
    /// Languages collected into the localized maps.
    pub languages: Vec<String>,
    /// Language reported by the compiled template, overriding the default.
    pub context_language: Option<String>,
    /// Collect localized descriptions as well as names.
    pub add_descriptions: bool,
    pub filter: Arc<dyn PathFilter>,
    pub policy: CompactionPolicy,
    /// AQL path of the subtree to compile instead of the whole template.
    pub from: Option<String>,
}

impl BuilderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context_language(mut self, language: impl Into<String>) -> Self {
        self.context_language = Some(language.into());
        self
    }

    pub fn with_descriptions(mut self, add_descriptions: bool) -> Self {
        self.add_descriptions = add_descriptions;
        self
    }

    pub fn with_filter(mut self, filter: impl PathFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_policy(mut self, policy: CompactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_from(mut self, path: impl Into<String>) -> Self {
        self.from = Some(path.into());
        self
    }

    /// The default language, falling back to `template_language`.
    pub fn resolve_language<'a>(&'a self, template_language: &'a str) -> &'a str {
        self.default_language
            .as_deref()
            .filter(|language| !language.trim().is_empty())
            .unwrap_or(template_language)
    }

    /// The default language followed by the additional languages, without
    /// duplicates.
    pub fn all_languages(&self, template_language: &str) -> Vec<String> {
        let mut languages = vec![self.resolve_language(template_language).to_string()];
        for language in &self.languages {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }
        languages
    }
}

impl Default for BuilderContext {
    fn default() -> Self {
        Self {
            default_language: None,
            languages: Vec::new(),
            context_language: None,
            add_descriptions: true,
            filter: Arc::new(NoopPathFilter),
            policy: CompactionPolicy::default(),
            from: None,
        }
    }
}

impl fmt::Debug for BuilderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderContext")
            .field("default_language", &self.default_language)
            .field("languages", &self.languages)
            .field("context_language", &self.context_language)
            .field("add_descriptions", &self.add_descriptions)
            .field("policy", &self.policy)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}
