// ── JSON export ──
//
// A pretty-printed array of the device objects exactly as received.

use std::sync::Arc;

use crate::error::CoreError;
use crate::model::Device;

pub fn to_json(rows: &[Arc<Device>]) -> Result<String, CoreError> {
    let records: Vec<_> = rows.iter().map(|d| d.record()).collect();
    serde_json::to_string_pretty(&records)
        .map_err(|e| CoreError::Internal(format!("JSON export failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::convert::device_snapshot;

    #[test]
    fn exports_records_verbatim_in_row_order() {
        let raw = vec![
            json!({"host": "b", "zeta": null, "cve_counts": {"High": 1}, "alpha": [1]}),
            json!({"host": "a", "custom": {"nested": true}}),
        ];
        let rows = device_snapshot(
            raw.iter()
                .map(|v| v.as_object().unwrap().clone())
                .collect(),
        );

        let doc = to_json(&rows).unwrap();
        assert!(doc.contains("\n  {"), "pretty-printed");
        let back: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(back, Value::Array(raw));
        // field order is preserved as received
        assert!(doc.find("\"zeta\"").unwrap() < doc.find("\"alpha\"").unwrap());
    }
}
