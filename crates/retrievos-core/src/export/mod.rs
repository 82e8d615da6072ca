// ── Export pipeline ──
//
// Serializes the last rendered rows into a named artifact. Whether an
// export may run at all is the gate's call, not ours.

pub mod csv;
pub mod gate;
pub mod json;

use std::sync::Arc;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

use crate::error::CoreError;
use crate::model::Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Csv => "text/csv;charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// Where an accepted export goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportDelivery {
    /// Write a file.
    #[default]
    Save,
    /// Show in-app without writing anything.
    Preview,
}

/// A serialized export, ready to be written or shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub delivery: ExportDelivery,
    pub content: String,
    pub rows: usize,
}

impl ExportArtifact {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// `devices_{batch}.{ext}`, or `devices_latest.{ext}` with no batch.
pub fn file_name(batch: Option<&str>, format: ExportFormat) -> String {
    let stem = batch.filter(|b| !b.is_empty()).unwrap_or("latest");
    format!("devices_{stem}.{}", format.extension())
}

/// Serialize `rows` in their current order.
pub fn build(
    rows: &[Arc<Device>],
    batch: Option<&str>,
    format: ExportFormat,
    delivery: ExportDelivery,
) -> Result<ExportArtifact, CoreError> {
    let content = match format {
        ExportFormat::Csv => csv::to_csv(rows)?,
        ExportFormat::Json => json::to_json(rows)?,
    };
    Ok(ExportArtifact {
        file_name: file_name(batch, format),
        format,
        delivery,
        content,
        rows: rows.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_batch() {
        assert_eq!(file_name(Some("2024-01-01"), ExportFormat::Csv), "devices_2024-01-01.csv");
        assert_eq!(file_name(None, ExportFormat::Json), "devices_latest.json");
        assert_eq!(file_name(Some(""), ExportFormat::Csv), "devices_latest.csv");
    }

    #[test]
    fn build_empty_json_is_empty_array() {
        let artifact = build(&[], None, ExportFormat::Json, ExportDelivery::Preview).unwrap();
        assert_eq!(artifact.content, "[]");
        assert_eq!(artifact.rows, 0);
        assert_eq!(artifact.mime(), "application/json");
    }
}
