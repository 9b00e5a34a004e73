//! Display ordering for ranked lists
//!
//! Values fall into three classes that always sort in the same order,
//! whatever the direction: numbers, then non-numeric text, then missing.
//! Numbers follow the requested direction. Text compares case-insensitively
//! with the direction flipped, so that toggling a column feels the same for
//! text and numeric columns.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::store::{EntityId, EntityStore};
use crate::value::Value;

enum SortKey {
    Number(f64),
    Text(String),
    Missing,
}

impl SortKey {
    fn of(value: &Value) -> Self {
        if let Some(n) = value.as_number() {
            return SortKey::Number(n);
        }
        match value {
            Value::Text(s) => SortKey::Text(s.to_lowercase()),
            _ => SortKey::Missing,
        }
    }

    fn class(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Missing => 2,
        }
    }
}

/// Compare two values for display
pub fn compare_for_display(a: &Value, b: &Value, ascending: bool) -> Ordering {
    let (ka, kb) = (SortKey::of(a), SortKey::of(b));

    match (&ka, &kb) {
        (SortKey::Number(x), SortKey::Number(y)) => {
            let ord = x.total_cmp(y);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (SortKey::Text(x), SortKey::Text(y)) => {
            let ord = x.cmp(y);
            if ascending {
                ord.reverse()
            } else {
                ord
            }
        }
        _ => ka.class().cmp(&kb.class()),
    }
}

/// Order ids by one attribute (stable; ids missing from the store go last)
pub fn sort_for_display(
    store: &EntityStore,
    ids: impl IntoIterator<Item = EntityId>,
    attribute: &str,
    ascending: bool,
) -> Vec<EntityId> {
    let mut rows: Vec<(EntityId, &Value)> = ids
        .into_iter()
        .map(|id| {
            let value = store
                .get(id)
                .map(|r| r.get(attribute))
                .unwrap_or(&Value::Missing);
            (id, value)
        })
        .collect();

    rows.sort_by(|(_, a), (_, b)| compare_for_display(a, b, ascending));
    rows.into_iter().map(|(id, _)| id).collect()
}

/// Sort state of a table header row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSort {
    pub column: String,
    pub ascending: bool,
}

impl TableSort {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Header click: a new column starts descending, the same column toggles
    pub fn click(&mut self, column: &str) {
        if self.column == column {
            self.ascending = !self.ascending;
        } else {
            self.column = column.to_string();
            self.ascending = false;
        }
    }

    /// Apply to a list of ids
    pub fn apply(&self, store: &EntityStore, ids: impl IntoIterator<Item = EntityId>) -> Vec<EntityId> {
        sort_for_display(store, ids, &self.column, self.ascending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;

    fn sorted(values: &[Value], ascending: bool) -> Vec<Value> {
        let mut v = values.to_vec();
        v.sort_by(|a, b| compare_for_display(a, b, ascending));
        v
    }

    #[test]
    fn test_numbers_follow_direction() {
        let values = [Value::Number(5.0), Value::text("1"), Value::Number(3.0)];
        assert_eq!(
            sorted(&values, true),
            vec![Value::text("1"), Value::Number(3.0), Value::Number(5.0)]
        );
        assert_eq!(
            sorted(&values, false),
            vec![Value::Number(5.0), Value::Number(3.0), Value::text("1")]
        );
    }

    #[test]
    fn test_non_numeric_last_in_both_directions() {
        let values = [
            Value::Number(5.0),
            Value::text("B"),
            Value::text("n/a"),
            Value::Number(1.0),
        ];

        let asc = sorted(&values, true);
        assert_eq!(&asc[..2], &[Value::Number(1.0), Value::Number(5.0)]);
        assert!(asc[2..].iter().all(|v| !v.is_numeric()));

        let desc = sorted(&values, false);
        assert_eq!(&desc[..2], &[Value::Number(5.0), Value::Number(1.0)]);
        assert!(desc[2..].iter().all(|v| !v.is_numeric()));
    }

    #[test]
    fn test_text_direction_is_flipped() {
        let values = [Value::text("beta"), Value::text("Alpha"), Value::text("gamma")];
        assert_eq!(
            sorted(&values, false),
            vec![Value::text("Alpha"), Value::text("beta"), Value::text("gamma")]
        );
        assert_eq!(
            sorted(&values, true),
            vec![Value::text("gamma"), Value::text("beta"), Value::text("Alpha")]
        );
    }

    #[test]
    fn test_missing_sorts_after_text() {
        let values = [Value::Missing, Value::text("x"), Value::Number(2.0)];
        for ascending in [true, false] {
            assert_eq!(
                sorted(&values, ascending),
                vec![Value::Number(2.0), Value::text("x"), Value::Missing]
            );
        }
    }

    #[test]
    fn test_sort_is_idempotent() {
        let values = [
            Value::text("b"),
            Value::Number(2.0),
            Value::Missing,
            Value::text("B"),
            Value::Number(2.0),
        ];
        let once = sorted(&values, true);
        let twice = sorted(&once, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_for_display() {
        let store = EntityStore::new(vec![
            Record::new(10).with("tsm", 40.0),
            Record::new(11),
            Record::new(12).with("tsm", 90.0),
        ])
        .unwrap();

        assert_eq!(sort_for_display(&store, store.ids(), "tsm", false), vec![12, 10, 11]);
        assert_eq!(sort_for_display(&store, store.ids(), "tsm", true), vec![10, 12, 11]);
    }

    #[test]
    fn test_table_sort_click() {
        let mut sort = TableSort::new("name");
        assert!(!sort.ascending);

        sort.click("name");
        assert!(sort.ascending);

        sort.click("tsm");
        assert_eq!(sort.column, "tsm");
        assert!(!sort.ascending);
    }
}
