// ── Domain model ──

pub mod cve;
pub mod designation;
pub mod device;
pub mod log;
pub mod recommendation;
pub mod trend;

pub use cve::{CveDetail, CveEntry, CveLookup};
pub use designation::Designation;
pub use device::{Column, CveCounts, Device, FieldValue, Severity, SeveritySet};
pub use log::LogLine;
pub use recommendation::RecommendationClass;
pub use trend::TrendPoint;
