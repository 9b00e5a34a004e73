//! Combining per-attribute filters into a selected-id set
//!
//! A record is selected iff it passes every active filter. With no active
//! filter every visible record is selected. The selection is always
//! recomputed from scratch; cost is O(records x filtered attributes).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::filter::AxisFilterSet;
use crate::store::{EntityId, Record};

/// Result of one selection pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    selected: BTreeSet<EntityId>,
    /// Number of records the pass ran over
    visible: usize,
    /// Whether any filter was active
    filtered: bool,
}

impl Selection {
    /// Check whether a record is selected
    pub fn contains(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> &BTreeSet<EntityId> {
        &self.selected
    }

    /// Selected ids as a vector
    pub fn to_vec(&self) -> Vec<EntityId> {
        self.selected.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Number of records considered
    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Whether at least one filter was active
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }
}

/// Compute the selection for a set of records
pub fn compute<'a, I>(records: I, filters: &AxisFilterSet) -> Selection
where
    I: IntoIterator<Item = &'a Record>,
{
    let active: Vec<_> = filters.active().collect();
    let mut selected = BTreeSet::new();
    let mut visible = 0;

    for record in records {
        visible += 1;
        let passes = active.iter().all(|(attribute, filter)| {
            let value = record.get(attribute);
            filter.accepts(value.has_value(), value.as_number())
        });
        if passes {
            selected.insert(record.id);
        }
    }

    tracing::debug!(
        visible,
        selected = selected.len(),
        filters = active.len(),
        "Recomputed selection"
    );

    Selection {
        selected,
        visible,
        filtered: !active.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MissingMode;
    use crate::store::EntityStore;
    use crate::value::Value;

    fn store() -> EntityStore {
        EntityStore::new(vec![
            Record::new(1).with("mass", 5.0),
            Record::new(2).with("mass", Value::Missing),
            Record::new(3).with("mass", 12.0),
        ])
        .unwrap()
    }

    fn ids(selection: &Selection) -> Vec<EntityId> {
        selection.to_vec()
    }

    #[test]
    fn test_no_filters_selects_all() {
        let store = store();
        let filters = AxisFilterSet::for_store(&store);
        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![1, 2, 3]);
        assert!(!selection.is_filtered());
        assert_eq!(selection.visible(), 3);
    }

    #[test]
    fn test_fresh_range_excludes_missing() {
        let store = store();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.set_range("mass", 0.0, 10.0);

        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![1]);
    }

    #[test]
    fn test_range_with_mode_cycled_to_none_keeps_missing() {
        let store = store();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.set_range("mass", 0.0, 10.0);
        filters.cycle_missing_mode("mass"); // RequireMissing
        filters.cycle_missing_mode("mass"); // None
        assert_eq!(filters.missing_mode("mass"), MissingMode::None);

        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![1, 2]);
    }

    #[test]
    fn test_require_missing_without_range() {
        let store = store();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.cycle_missing_mode("mass");
        filters.cycle_missing_mode("mass");
        assert_eq!(filters.missing_mode("mass"), MissingMode::RequireMissing);

        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![2]);
    }

    #[test]
    fn test_require_missing_beats_range() {
        let store = store();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.set_range("mass", 0.0, 10.0);
        filters.cycle_missing_mode("mass"); // RequireMissing

        // Record 1 is inside the range but has a value
        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![2]);
    }

    #[test]
    fn test_require_value_without_range() {
        let store = store();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.cycle_missing_mode("mass");

        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![1, 3]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let store = EntityStore::new(vec![
            Record::new(1).with("mass", 5.0).with("method", "Transit"),
            Record::new(2).with("mass", 6.0),
            Record::new(3).with("mass", 50.0).with("method", "Imaging"),
        ])
        .unwrap();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.set_range("mass", 0.0, 10.0);
        filters.cycle_missing_mode("method"); // RequireValue

        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![1]);
    }

    #[test]
    fn test_missing_elsewhere_passes_require_missing() {
        let store = EntityStore::new(vec![
            Record::new(1).with("mass", Value::Missing).with("radius", 1.0),
            Record::new(2).with("mass", Value::Missing).with("radius", 9.0),
            Record::new(3).with("mass", 3.0).with("radius", 1.0),
        ])
        .unwrap();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.cycle_missing_mode("mass");
        filters.cycle_missing_mode("mass");
        filters.set_range("radius", 0.0, 2.0);

        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![1]);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let store = store();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.set_range("mass", 4.0, 20.0);

        let first = compute(store.records(), &filters);
        let second = compute(store.records(), &filters);
        assert_eq!(first, second);
    }

    #[test]
    fn test_clear_all_restores_everything() {
        let store = store();
        let mut filters = AxisFilterSet::for_store(&store);
        filters.set_range("mass", 0.0, 1.0);
        filters.clear_all();

        let selection = compute(store.records(), &filters);
        assert_eq!(selection.len(), store.len());
    }

    #[test]
    fn test_blank_text_is_missing_for_filters_and_summary() {
        let store = EntityStore::new(vec![
            Record::new(1).with("method", "Transit"),
            Record::new(2).with("method", "  "),
            Record::new(3).with("method", Value::Missing),
        ])
        .unwrap();
        let summary = store.attribute("method").unwrap();
        assert_eq!((summary.present, summary.missing), (1, 2));

        let mut filters = AxisFilterSet::for_store(&store);
        filters.cycle_missing_mode("method"); // RequireValue
        assert_eq!(ids(&compute(store.records(), &filters)), vec![1]);

        filters.cycle_missing_mode("method"); // RequireMissing
        let selection = compute(store.records(), &filters);
        assert_eq!(ids(&selection), vec![2, 3]);
        assert_eq!(selection.len(), summary.missing);
    }
}
