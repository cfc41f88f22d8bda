//! Integer ranges used for occurrences, cardinalities and validation.

/// A closed integer range where either bound may be absent.
///
/// An absent `max` on an occurrence range means "unbounded"; when two
/// ranges are combined during compaction an absent bound means "no
/// information" instead (see [`IntegerRange::tighten_with`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntegerRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl IntegerRange {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    /// `min..max` with both bounds present.
    pub fn bounded(min: i32, max: i32) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// `min..*`.
    pub fn unbounded(min: i32) -> Self {
        Self::new(Some(min), None)
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn is_fixed(&self) -> bool {
        self.min.is_some() && self.min == self.max
    }

    /// True when more than one instance may exist.
    pub fn is_repeating(&self) -> bool {
        self.max.is_none_or(|max| max > 1)
    }

    /// The upper bound as written to interchange formats: `-1` when unbounded.
    pub fn json_max(&self) -> i32 {
        self.max.unwrap_or(-1)
    }

    /// Narrow this range with bounds inherited from a collapsed wrapper.
    ///
    /// The wrapper's minimum wins when this range has none or a smaller one;
    /// the wrapper's maximum wins when this range has none or a larger one.
    pub fn tighten_with(&mut self, outer: &IntegerRange) {
        match (self.min, outer.min) {
            (None, outer_min) => self.min = outer_min,
            (Some(min), Some(outer_min)) if outer_min > min => self.min = Some(outer_min),
            _ => {}
        }
        match (self.max, outer.max) {
            (None, outer_max) => self.max = outer_max,
            (Some(max), Some(outer_max)) if outer_max < max => self.max = Some(outer_max),
            _ => {}
        }
    }
}

impl std::fmt::Display for IntegerRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{min}..{max}"),
            (Some(min), None) => write!(f, "{min}..*"),
            (None, Some(max)) => write!(f, "?..{max}"),
            (None, None) => write!(f, "?..*"),
        }
    }
}
