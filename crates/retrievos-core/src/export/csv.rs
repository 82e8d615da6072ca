// ── CSV codec ──
//
// Fixed 18-column layout, one record per device. Fields are quoted only
// when they need it. Missing values are empty. Rows end in `\n` and the
// final one is trimmed, so there is no trailing newline.

use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::error::CoreError;
use crate::model::{Column, Device};

/// Serialize rows in the given order.
pub fn to_csv(rows: &[Arc<Device>]) -> Result<String, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(Column::iter().map(|c| c.to_string()))
        .map_err(csv_error)?;
    for device in rows {
        writer
            .write_record(Column::iter().map(|c| device.column(c).as_text().into_owned()))
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV export failed: {}", e.error())))?;
    let mut doc = String::from_utf8(bytes)
        .map_err(|e| CoreError::Internal(format!("CSV export failed: {e}")))?;
    if doc.ends_with('\n') {
        doc.pop();
    }
    Ok(doc)
}

fn csv_error(e: csv::Error) -> CoreError {
    CoreError::Internal(format!("CSV export failed: {e}"))
}
