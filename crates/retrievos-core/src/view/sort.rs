// ── Device sort comparator ──

use std::cmp::Ordering;
use std::sync::Arc;

use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};

use crate::model::{Column, Device, FieldValue};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// `+1` / `-1`, the persisted form.
    pub fn signum(self) -> i8 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }

    pub fn from_signum(n: i64) -> Self {
        if n < 0 { Self::Descending } else { Self::Ascending }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Ascending => ord,
            Self::Descending => ord.reverse(),
        }
    }
}

/// Sort state: an optional key and a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<Column>,
    pub direction: Direction,
}

impl SortState {
    pub fn by(key: Column, direction: Direction) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Header-click semantics: the same key flips direction, a new key
    /// starts ascending.
    pub fn toggle(&mut self, key: Column) {
        if self.key == Some(key) {
            self.direction = self.direction.flip();
        } else {
            self.key = Some(key);
            self.direction = Direction::Ascending;
        }
    }

    /// Stable in-place sort. With no key, order is left untouched.
    pub fn sort(&self, rows: &mut [Arc<Device>]) {
        if self.key.is_some() {
            rows.sort_by(|a, b| compare(a, b, self));
        }
    }
}

/// Compare two devices under a sort state.
///
/// Two numeric values compare numerically. Two text values go through a
/// root-locale collator, then by exact text so distinct strings never tie.
/// Missing values read as the empty string. In a column that mixes the two,
/// empty sorts first, then numbers, then text, which keeps the order total.
/// Equal values yield `Equal`, leaving order to the stable sort.
pub fn compare(a: &Device, b: &Device, sort: &SortState) -> Ordering {
    let Some(key) = sort.key else {
        return Ordering::Equal;
    };
    let (va, vb) = (a.column(key), b.column(key));
    sort.direction.apply(compare_values(&va, &vb))
}

fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) if b.as_text().is_empty() => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) if a.as_text().is_empty() => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(&a.as_text(), &b.as_text()),
    }
}

thread_local! {
    static COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        Collator::try_new(&Default::default(), options).ok()
    };
}

fn compare_text(x: &str, y: &str) -> Ordering {
    if x == y {
        return Ordering::Equal;
    }
    COLLATOR
        .with(|collator| match collator {
            Some(c) => c.compare(x, y),
            None => x.to_lowercase().cmp(&y.to_lowercase()),
        })
        .then_with(|| x.cmp(y))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    fn device(value: Value) -> Arc<Device> {
        let Value::Object(map) = value else {
            panic!("fixture must be an object")
        };
        Arc::new(Device::from_record(map))
    }

    fn hosts(rows: &[Arc<Device>]) -> Vec<&str> {
        rows.iter().map(|d| d.host()).collect()
    }

    fn fixtures() -> Vec<Arc<Device>> {
        vec![
            device(json!({"host": "b-sw", "model": "C9300", "connected_count": 12,
                          "cve_counts": {"Critical": 1, "High": 5}})),
            device(json!({"host": "a-sw", "model": "c9200", "connected_count": 4,
                          "cve_counts": {"Critical": 3}})),
            device(json!({"host": "D-sw", "connected_count": null,
                          "cve_counts": {"Critical": 1, "High": 2}})),
            device(json!({"host": "c-sw", "model": "C9300", "connected_count": 30})),
        ]
    }

    #[test]
    fn no_key_preserves_input_order() {
        let mut rows = fixtures();
        SortState::default().sort(&mut rows);
        assert_eq!(hosts(&rows), vec!["b-sw", "a-sw", "D-sw", "c-sw"]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let mut rows = fixtures();
        SortState::by(Column::Host, Direction::Ascending).sort(&mut rows);
        assert_eq!(hosts(&rows), vec!["a-sw", "b-sw", "c-sw", "D-sw"]);
    }

    #[test]
    fn text_sort_follows_collation_order() {
        let mut rows: Vec<_> = ["zeta", "élan", "sw1", "sw_1", "a", "A"]
            .into_iter()
            .map(|h| device(json!({ "host": h })))
            .collect();
        SortState::by(Column::Host, Direction::Ascending).sort(&mut rows);
        assert_eq!(hosts(&rows), vec!["a", "A", "élan", "sw_1", "sw1", "zeta"]);
    }

    #[test]
    fn derived_cve_keys_sort_numerically_and_stably() {
        let mut rows = fixtures();
        SortState::by(Column::CveCritical, Direction::Descending).sort(&mut rows);
        // b-sw and D-sw tie on 1 and keep their input order
        assert_eq!(hosts(&rows), vec!["a-sw", "b-sw", "D-sw", "c-sw"]);

        SortState::by(Column::CveHigh, Direction::Ascending).sort(&mut rows);
        assert_eq!(hosts(&rows), vec!["a-sw", "c-sw", "D-sw", "b-sw"]);
    }

    #[test]
    fn missing_number_sorts_as_empty_text() {
        let mut rows = fixtures();
        SortState::by(Column::ConnectedCount, Direction::Ascending).sort(&mut rows);
        assert_eq!(hosts(&rows), vec!["D-sw", "a-sw", "b-sw", "c-sw"]);
    }

    #[test]
    fn numbers_compare_by_value_not_text() {
        let mut rows = vec![
            device(json!({"host": "x", "total_interfaces": 10})),
            device(json!({"host": "y", "total_interfaces": 9})),
            device(json!({"host": "z", "total_interfaces": 100})),
        ];
        SortState::by(Column::TotalInterfaces, Direction::Ascending).sort(&mut rows);
        assert_eq!(hosts(&rows), vec!["y", "x", "z"]);
    }

    #[test]
    fn mixed_columns_order_empty_numbers_then_text() {
        let mut rows = vec![
            device(json!({"host": "t", "cpu_usage": "1a"})),
            device(json!({"host": "n10", "cpu_usage": 10})),
            device(json!({"host": "e"})),
            device(json!({"host": "n9", "cpu_usage": 9})),
        ];
        SortState::by(Column::CpuUsage, Direction::Ascending).sort(&mut rows);
        assert_eq!(hosts(&rows), vec!["e", "n9", "n10", "t"]);
    }

    #[test]
    fn toggle_flips_same_key_and_resets_on_new_key() {
        let mut sort = SortState::default();
        sort.toggle(Column::Model);
        assert_eq!(sort, SortState::by(Column::Model, Direction::Ascending));
        sort.toggle(Column::Model);
        assert_eq!(sort.direction, Direction::Descending);
        sort.toggle(Column::Host);
        assert_eq!(sort, SortState::by(Column::Host, Direction::Ascending));
    }

    #[test]
    fn resorting_is_a_no_op() {
        for key in [Column::Host, Column::Model, Column::CveCritical, Column::ConnectedCount] {
            for dir in [Direction::Ascending, Direction::Descending] {
                let sort = SortState::by(key, dir);
                let mut once = fixtures();
                sort.sort(&mut once);
                let mut twice = once.clone();
                sort.sort(&mut twice);
                assert_eq!(hosts(&once), hosts(&twice), "{key} {dir:?}");
            }
        }
    }

    #[test]
    fn reverse_direction_reverses_distinct_values() {
        let mut asc = fixtures();
        SortState::by(Column::Host, Direction::Ascending).sort(&mut asc);
        let mut desc = fixtures();
        SortState::by(Column::Host, Direction::Descending).sort(&mut desc);
        let mut reversed = hosts(&asc);
        reversed.reverse();
        assert_eq!(hosts(&desc), reversed);
    }

    #[test]
    fn reverse_direction_keeps_ties_in_input_order() {
        let mut desc = fixtures();
        SortState::by(Column::Model, Direction::Descending).sort(&mut desc);
        // b-sw and c-sw share "C9300"; stable sort keeps b before c
        let pos = |h: &str| desc.iter().position(|d| d.host() == h).unwrap();
        assert!(pos("b-sw") < pos("c-sw"));
    }
}
