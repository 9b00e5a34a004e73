//! Per-attribute brush state
//!
//! Each attribute carries at most one [`AxisFilter`]: an optional numeric
//! range and a tri-state missing-value mode. Range brushes are only
//! accepted on attributes with a numeric scale; the missing-value toggle
//! works on any known attribute.
//!
//! A freshly drawn range brush implicitly excludes missing values
//! (`RequireValue`). That implicit mode is dropped again when the range is
//! cleared, while a mode the user picked explicitly survives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{AttributeKind, EntityStore};

/// How a filter treats records whose value is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingMode {
    /// Missing values pass
    #[default]
    None,
    /// Only records with a value pass
    RequireValue,
    /// Only records without a value pass
    RequireMissing,
}

impl MissingMode {
    /// Rotate: None -> RequireValue -> RequireMissing -> None
    pub fn cycle(self) -> Self {
        match self {
            MissingMode::None => MissingMode::RequireValue,
            MissingMode::RequireValue => MissingMode::RequireMissing,
            MissingMode::RequireMissing => MissingMode::None,
        }
    }
}

/// Filter state for one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisFilter {
    /// Inclusive numeric range, `low <= high`
    pub range: Option<(f64, f64)>,
    pub missing_mode: MissingMode,
    /// The mode was set as a side effect of creating the range
    implicit_mode: bool,
}

impl AxisFilter {
    /// Check whether the filter constrains anything
    pub fn is_active(&self) -> bool {
        self.range.is_some() || self.missing_mode != MissingMode::None
    }

    /// Check whether the missing mode came from the range brush
    pub fn is_mode_implicit(&self) -> bool {
        self.implicit_mode
    }

    /// Test one value
    ///
    /// `number` is the value's numeric coercion (only consulted when a
    /// range is set); `present` says whether the record has a value at all.
    pub fn accepts(&self, present: bool, number: Option<f64>) -> bool {
        let has_value = match self.range {
            Some(_) => number.is_some(),
            None => present,
        };

        if !has_value {
            return self.missing_mode != MissingMode::RequireValue;
        }

        if self.missing_mode == MissingMode::RequireMissing {
            return false;
        }

        match (self.range, number) {
            (Some((low, high)), Some(v)) => low <= v && v <= high,
            _ => true,
        }
    }
}

/// The set of filters, one per attribute at most
#[derive(Debug, Clone, Default)]
pub struct AxisFilterSet {
    /// Known attributes and whether they have a numeric scale
    kinds: BTreeMap<String, AttributeKind>,
    filters: BTreeMap<String, AxisFilter>,
}

impl AxisFilterSet {
    /// Create an empty filter set for the attributes of a store
    pub fn for_store(store: &EntityStore) -> Self {
        Self::new(
            store
                .attributes()
                .values()
                .map(|s| (s.name.clone(), s.kind)),
        )
    }

    /// Create an empty filter set from attribute kinds
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = (S, AttributeKind)>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(|(n, k)| (n.into(), k)).collect(),
            filters: BTreeMap::new(),
        }
    }

    /// Replace the range constraint for an attribute
    ///
    /// Returns `false` (and changes nothing) for unknown or non-numeric
    /// attributes and for non-finite bounds.
    pub fn set_range(&mut self, attribute: &str, low: f64, high: f64) -> bool {
        if self.kinds.get(attribute) != Some(&AttributeKind::Numeric) {
            tracing::debug!(attribute, "Ignoring range on attribute without numeric scale");
            return false;
        }
        if !low.is_finite() || !high.is_finite() {
            tracing::debug!(attribute, low, high, "Ignoring non-finite range");
            return false;
        }

        let range = if low <= high { (low, high) } else { (high, low) };

        match self.filters.get_mut(attribute) {
            Some(filter) => filter.range = Some(range),
            None => {
                self.filters.insert(
                    attribute.to_string(),
                    AxisFilter {
                        range: Some(range),
                        missing_mode: MissingMode::RequireValue,
                        implicit_mode: true,
                    },
                );
            }
        }
        true
    }

    /// Remove the range constraint for an attribute
    ///
    /// Returns `true` if a range was removed.
    pub fn clear_range(&mut self, attribute: &str) -> bool {
        let Some(filter) = self.filters.get_mut(attribute) else {
            return false;
        };
        if filter.range.take().is_none() {
            return false;
        }

        if filter.implicit_mode && filter.missing_mode == MissingMode::RequireValue {
            filter.missing_mode = MissingMode::None;
        }
        filter.implicit_mode = false;

        if !filter.is_active() {
            self.filters.remove(attribute);
        }
        true
    }

    /// Advance the missing-value mode of an attribute
    ///
    /// Returns the new mode, or `None` if the attribute is unknown.
    pub fn cycle_missing_mode(&mut self, attribute: &str) -> Option<MissingMode> {
        if !self.kinds.contains_key(attribute) {
            tracing::debug!(attribute, "Ignoring missing-mode toggle on unknown attribute");
            return None;
        }

        let filter = self
            .filters
            .entry(attribute.to_string())
            .or_insert(AxisFilter {
                range: None,
                missing_mode: MissingMode::None,
                implicit_mode: false,
            });
        filter.missing_mode = filter.missing_mode.cycle();
        filter.implicit_mode = false;
        let mode = filter.missing_mode;

        if !filter.is_active() {
            self.filters.remove(attribute);
        }
        Some(mode)
    }

    /// Remove every filter
    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    /// Filter for one attribute
    pub fn get(&self, attribute: &str) -> Option<&AxisFilter> {
        self.filters.get(attribute)
    }

    /// Missing mode for one attribute (None when unfiltered)
    pub fn missing_mode(&self, attribute: &str) -> MissingMode {
        self.get(attribute)
            .map(|f| f.missing_mode)
            .unwrap_or_default()
    }

    /// Active filters in attribute order
    pub fn active(&self) -> impl Iterator<Item = (&str, &AxisFilter)> {
        self.filters
            .iter()
            .filter(|(_, f)| f.is_active())
            .map(|(name, f)| (name.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> AxisFilterSet {
        AxisFilterSet::new([
            ("mass", AttributeKind::Numeric),
            ("method", AttributeKind::Categorical),
        ])
    }

    #[test]
    fn test_new_range_requires_value() {
        let mut set = filters();
        assert!(set.set_range("mass", 0.0, 10.0));

        let filter = set.get("mass").unwrap();
        assert_eq!(filter.range, Some((0.0, 10.0)));
        assert_eq!(filter.missing_mode, MissingMode::RequireValue);
        assert!(filter.is_mode_implicit());
    }

    #[test]
    fn test_range_replacement_keeps_mode() {
        let mut set = filters();
        set.set_range("mass", 0.0, 10.0);
        set.cycle_missing_mode("mass"); // RequireValue -> RequireMissing
        set.set_range("mass", 2.0, 3.0);

        let filter = set.get("mass").unwrap();
        assert_eq!(filter.range, Some((2.0, 3.0)));
        assert_eq!(filter.missing_mode, MissingMode::RequireMissing);
    }

    #[test]
    fn test_reversed_bounds_are_normalized() {
        let mut set = filters();
        set.set_range("mass", 10.0, 0.0);
        assert_eq!(set.get("mass").unwrap().range, Some((0.0, 10.0)));
    }

    #[test]
    fn test_range_on_categorical_ignored() {
        let mut set = filters();
        assert!(!set.set_range("method", 0.0, 1.0));
        assert!(!set.set_range("unknown", 0.0, 1.0));
        assert!(!set.set_range("mass", f64::NAN, 1.0));
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear_range_drops_implicit_mode() {
        let mut set = filters();
        set.set_range("mass", 0.0, 10.0);
        assert!(set.clear_range("mass"));
        assert!(set.get("mass").is_none());
    }

    #[test]
    fn test_clear_range_keeps_explicit_mode() {
        let mut set = filters();
        set.cycle_missing_mode("mass"); // explicit RequireValue
        set.set_range("mass", 0.0, 10.0);
        set.clear_range("mass");

        let filter = set.get("mass").unwrap();
        assert_eq!(filter.range, None);
        assert_eq!(filter.missing_mode, MissingMode::RequireValue);
    }

    #[test]
    fn test_clear_range_without_range() {
        let mut set = filters();
        assert!(!set.clear_range("mass"));
        set.cycle_missing_mode("method");
        assert!(!set.clear_range("method"));
        assert_eq!(set.missing_mode("method"), MissingMode::RequireValue);
    }

    #[test]
    fn test_cycle_missing_mode() {
        let mut set = filters();
        assert_eq!(set.cycle_missing_mode("method"), Some(MissingMode::RequireValue));
        assert_eq!(set.cycle_missing_mode("method"), Some(MissingMode::RequireMissing));
        assert_eq!(set.cycle_missing_mode("method"), Some(MissingMode::None));
        assert!(set.get("method").is_none());
        assert_eq!(set.cycle_missing_mode("unknown"), None);
    }

    #[test]
    fn test_cycle_on_ranged_axis_keeps_filter() {
        let mut set = filters();
        set.set_range("mass", 0.0, 10.0);
        set.cycle_missing_mode("mass"); // RequireMissing
        set.cycle_missing_mode("mass"); // None, range still set

        let filter = set.get("mass").unwrap();
        assert_eq!(filter.missing_mode, MissingMode::None);
        assert!(filter.is_active());
    }

    #[test]
    fn test_clear_all() {
        let mut set = filters();
        set.set_range("mass", 0.0, 10.0);
        set.cycle_missing_mode("method");
        set.clear_all();
        assert!(set.is_empty());
        assert_eq!(set.active().count(), 0);
    }

    #[test]
    fn test_accepts() {
        let ranged = AxisFilter {
            range: Some((0.0, 10.0)),
            missing_mode: MissingMode::None,
            implicit_mode: false,
        };
        assert!(ranged.accepts(true, Some(5.0)));
        assert!(!ranged.accepts(true, Some(12.0)));
        assert!(ranged.accepts(false, None));
        // Non-numeric text on a ranged axis reads as missing
        assert!(ranged.accepts(true, None));
    }
}
