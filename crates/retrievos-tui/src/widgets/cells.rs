//! Text for table cells and detail rows.

use retrievos_core::{Column, Device, Direction, FieldValue, SortState};

/// Placeholder for missing values.
pub const EMPTY: &str = "─";

/// Cell text for a device column; missing values show as `─`.
pub fn cell_text(device: &Device, column: Column) -> String {
    or_empty(&device.column(column))
}

/// Header label with the sort arrow when `column` is the active key.
pub fn header_label(column: Column, sort: &SortState) -> String {
    match sort.key {
        Some(key) if key == column => {
            let arrow = match sort.direction {
                Direction::Ascending => '▲',
                Direction::Descending => '▼',
            };
            format!("{} {arrow}", column.label())
        }
        _ => column.label().to_owned(),
    }
}

/// Text for an optional scalar, with `─` when absent.
pub fn or_empty(value: &FieldValue<'_>) -> String {
    let text = value.as_text();
    if text.is_empty() {
        EMPTY.to_owned()
    } else {
        text.into_owned()
    }
}

/// Columns shown in the device table. Condensed mode drops the wide ones.
pub fn table_columns(condensed: bool) -> &'static [Column] {
    if condensed {
        &[
            Column::Host,
            Column::Model,
            Column::CurrentVersion,
            Column::RecommendedVersion,
            Column::CveCritical,
            Column::CveHigh,
        ]
    } else {
        &[
            Column::Host,
            Column::Model,
            Column::CurrentVersion,
            Column::RecommendedVersion,
            Column::ReleaseDesignation,
            Column::Recommendation,
            Column::CpuUsage,
            Column::CveCritical,
            Column::CveHigh,
            Column::CveMedium,
            Column::CveLow,
        ]
    }
}

/// Unicode bar of `value` scaled against `max` over `width` cells.
pub fn bar(value: u64, max: u64, width: u16) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cells = (u128::from(value) * u128::from(width)).div_ceil(u128::from(max));
    "█".repeat(usize::try_from(cells).unwrap_or(usize::MAX).min(usize::from(width)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn device(value: serde_json::Value) -> Device {
        let serde_json::Value::Object(map) = value else {
            panic!("fixture must be an object")
        };
        Device::from_record(map)
    }

    #[test]
    fn missing_fields_render_as_placeholder() {
        let d = device(json!({"host": "sw1", "model": null}));
        assert_eq!(cell_text(&d, Column::Host), "sw1");
        assert_eq!(cell_text(&d, Column::Model), EMPTY);
        assert_eq!(cell_text(&d, Column::CveCritical), "0");
    }

    #[test]
    fn numbers_and_strings_render_verbatim() {
        let d = device(json!({"host": "sw1", "cpu_usage": 12.5, "uptime": "3d"}));
        assert_eq!(cell_text(&d, Column::CpuUsage), "12.5");
        assert_eq!(cell_text(&d, Column::Uptime), "3d");
    }

    #[test]
    fn header_marks_active_sort() {
        let sort = SortState::by(Column::CveHigh, Direction::Descending);
        assert_eq!(header_label(Column::CveHigh, &sort), "High ▼");
        assert_eq!(header_label(Column::Host, &sort), "Host");
    }

    #[test]
    fn condensed_is_a_subset() {
        let full = table_columns(false);
        for col in table_columns(true) {
            assert!(full.contains(col));
        }
        assert_eq!(table_columns(true)[0], Column::Host);
    }

    #[test]
    fn bar_scales_and_rounds_up() {
        assert_eq!(bar(0, 10, 20), "");
        assert_eq!(bar(10, 10, 20).chars().count(), 20);
        assert_eq!(bar(1, 100, 20).chars().count(), 1);
        assert_eq!(bar(5, 0, 20), "");
    }
}
