//! Per-compile id deduplication.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{BuilderError, Result};

/// Makes base ids unique within a parent scope.
///
/// One instance belongs to exactly one compile and is dropped with it.
pub trait IdDeduplicator {
    /// Return `base` if it is unused under `scope`, otherwise a suffixed
    /// variant. The returned id is recorded as used.
    fn unique_id(&mut self, scope: &str, base: &str) -> Result<String>;
}

/// Chooses the suffix appended to a colliding base id.
pub trait SuffixStrategy {
    /// A suffix for `base`, given the ids already used in its scope. The
    /// result is checked again by the caller.
    fn suffix(&self, used: &FxHashSet<String>, base: &str) -> String;
}

/// Smallest unused integer suffix starting at 2, up to a fixed bound.
#[derive(Clone, Copy, Debug)]
pub struct NumericSuffix {
    pub max: u32,
}

impl NumericSuffix {
    pub const DEFAULT_MAX: u32 = 100;
}

impl Default for NumericSuffix {
    fn default() -> Self {
        Self {
            max: Self::DEFAULT_MAX,
        }
    }
}

impl SuffixStrategy for NumericSuffix {
    fn suffix(&self, used: &FxHashSet<String>, base: &str) -> String {
        let mut i = 2;
        while i < self.max && used.contains(&format!("{base}{i}")) {
            i += 1;
        }
        i.to_string()
    }
}

/// Registry of used ids per scope, disambiguated with a [`SuffixStrategy`].
#[derive(Debug, Default)]
pub struct SuffixIdDeduplicator<S> {
    strategy: S,
    ids: FxHashMap<String, FxHashSet<String>>,
}

/// The default deduplicator: `foo`, `foo2`, `foo3`, ...
pub type NumericSuffixDeduplicator = SuffixIdDeduplicator<NumericSuffix>;

impl<S: SuffixStrategy> SuffixIdDeduplicator<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            ids: FxHashMap::default(),
        }
    }
}

impl<S: SuffixStrategy> IdDeduplicator for SuffixIdDeduplicator<S> {
    fn unique_id(&mut self, scope: &str, base: &str) -> Result<String> {
        let used = self.ids.entry(scope.to_string()).or_default();
        if !used.contains(base) {
            used.insert(base.to_string());
            return Ok(base.to_string());
        }

        let candidate = format!("{base}{}", self.strategy.suffix(used, base));
        if used.contains(&candidate) {
            return Err(BuilderError::id_space_exhausted(format!("{scope}{base}")));
        }
        tracing::trace!("deduplicated id {scope}{base} -> {candidate}");
        used.insert(candidate.clone());
        Ok(candidate)
    }
}
