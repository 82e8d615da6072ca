// ── Device domain types ──

use std::borrow::Cow;
use std::fmt;

use retrievos_api::types::DeviceRecord;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

use super::recommendation::RecommendationClass;

// ── Severity ─────────────────────────────────────────────────────────

/// CVE impact bucket. Declaration order is display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    EnumCount,
)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A set of severities, stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeveritySet(u8);

impl SeveritySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b1111)
    }

    pub fn contains(self, severity: Severity) -> bool {
        self.0 & severity.bit() != 0
    }

    pub fn insert(&mut self, severity: Severity) {
        self.0 |= severity.bit();
    }

    pub fn remove(&mut self, severity: Severity) {
        self.0 &= !severity.bit();
    }

    pub fn toggle(&mut self, severity: Severity) {
        self.0 ^= severity.bit();
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_full(self) -> bool {
        self.len() == Severity::COUNT
    }

    pub fn iter(self) -> impl Iterator<Item = Severity> {
        Severity::iter().filter(move |s| self.contains(*s))
    }
}

impl Default for SeveritySet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for SeveritySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Severity> for SeveritySet {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        let mut set = Self::empty();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

impl Serialize for SeveritySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for s in self.iter() {
            seq.serialize_element(&s)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SeveritySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = SeveritySet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of severity names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SeveritySet, A::Error> {
                let mut set = SeveritySet::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let sev = name
                        .parse::<Severity>()
                        .map_err(|_| de::Error::unknown_variant(&name, &["Critical", "High", "Medium", "Low"]))?;
                    set.insert(sev);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(SetVisitor)
    }
}

// ── CVE counts ───────────────────────────────────────────────────────

/// Per-severity CVE counts. Missing or malformed entries read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CveCounts([u32; Severity::COUNT]);

impl CveCounts {
    pub fn new(critical: u32, high: u32, medium: u32, low: u32) -> Self {
        Self([critical, high, medium, low])
    }

    /// Read a `cve_counts` object. Anything that is not a non-negative
    /// number counts as 0.
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut counts = Self::default();
        if let Some(Value::Object(map)) = value {
            for sev in Severity::iter() {
                counts.0[sev as usize] = map.get(sev.as_ref()).map_or(0, count_from_value);
            }
        }
        counts
    }

    pub fn get(&self, severity: Severity) -> u32 {
        self.0[severity as usize]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Severity, u32)> + '_ {
        Severity::iter().map(|s| (s, self.get(s)))
    }

    /// True if any severity in `set` has a non-zero count.
    pub fn any_in(&self, set: SeveritySet) -> bool {
        set.iter().any(|s| self.get(s) > 0)
    }
}

impl std::ops::AddAssign for CveCounts {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a = a.saturating_add(b);
        }
    }
}

fn count_from_value(value: &Value) -> u32 {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f.trunc() as u64))
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

// ── Field values ─────────────────────────────────────────────────────

/// A scalar read out of a device record, borrowed where possible.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Absent or `null`.
    Missing,
    Text(&'a str),
    Number(&'a serde_json::Number),
    Count(u32),
    Bool(bool),
    /// Arrays and objects; rendered as compact JSON.
    Other(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(s)) => Self::Text(s),
            Some(Value::Number(n)) => Self::Number(n),
            Some(Value::Bool(b)) => Self::Bool(*b),
            Some(other) => Self::Other(other),
        }
    }

    /// Numeric view, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Count(c) => Some(f64::from(*c)),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Count(_))
    }

    /// Text rendering; missing values render as the empty string.
    pub fn as_text(&self) -> Cow<'a, str> {
        match self {
            Self::Missing => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(*s),
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Count(c) => Cow::Owned(c.to_string()),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Other(v) => Cow::Owned(v.to_string()),
        }
    }
}

// ── Columns ──────────────────────────────────────────────────────────

/// The exported columns, in export order. Also the set of sort keys.
///
/// `cve_*` columns are derived from `cve_counts`; every other column reads
/// the device field of the same name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    EnumCount,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    Host,
    AliasName,
    Model,
    Platform,
    CurrentVersion,
    RecommendedVersion,
    ReleaseDesignation,
    Recommendation,
    CpuUsage,
    ConnectedCount,
    TotalInterfaces,
    CveCritical,
    CveHigh,
    CveMedium,
    CveLow,
    Uptime,
    EndOfLife,
    FinalUrl,
}

impl Column {
    /// The severity a derived `cve_*` column reads, if any.
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::CveCritical => Some(Severity::Critical),
            Self::CveHigh => Some(Severity::High),
            Self::CveMedium => Some(Severity::Medium),
            Self::CveLow => Some(Severity::Low),
            _ => None,
        }
    }

    /// Short header for narrow table layouts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Host => "Host",
            Self::AliasName => "Alias",
            Self::Model => "Model",
            Self::Platform => "Platform",
            Self::CurrentVersion => "Version",
            Self::RecommendedVersion => "Recommended",
            Self::ReleaseDesignation => "Desig",
            Self::Recommendation => "Recommendation",
            Self::CpuUsage => "CPU",
            Self::ConnectedCount => "Conn",
            Self::TotalInterfaces => "Ifaces",
            Self::CveCritical => "Crit",
            Self::CveHigh => "High",
            Self::CveMedium => "Med",
            Self::CveLow => "Low",
            Self::Uptime => "Uptime",
            Self::EndOfLife => "EoL",
            Self::FinalUrl => "URL",
        }
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// One device row of a batch.
///
/// The original record is kept untouched so JSON export reproduces it
/// exactly; the fields the view model needs are parsed once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    host: String,
    cve_counts: CveCounts,
    upgrade_recommended: bool,
    record: DeviceRecord,
}

impl Device {
    pub fn from_record(record: DeviceRecord) -> Self {
        let host = match record.get("host") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let cve_counts = CveCounts::from_value(record.get("cve_counts"));
        let upgrade_recommended = match record.get("upgrade_recommended") {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            _ => false,
        };

        Self {
            host,
            cve_counts,
            upgrade_recommended,
            record,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn cve_counts(&self) -> &CveCounts {
        &self.cve_counts
    }

    pub fn upgrade_recommended(&self) -> bool {
        self.upgrade_recommended
    }

    /// The record exactly as received.
    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }

    /// Raw field by name.
    pub fn field(&self, name: &str) -> FieldValue<'_> {
        FieldValue::from_value(self.record.get(name))
    }

    /// Field as text, empty when absent.
    pub fn text(&self, name: &str) -> Cow<'_, str> {
        self.field(name).as_text()
    }

    /// Value of an export column.
    pub fn column(&self, column: Column) -> FieldValue<'_> {
        match column.severity() {
            Some(sev) => FieldValue::Count(self.cve_counts.get(sev)),
            None => self.field(column.as_ref()),
        }
    }

    pub fn model(&self) -> Cow<'_, str> {
        self.text("model")
    }

    pub fn recommendation(&self) -> Cow<'_, str> {
        self.text("recommendation")
    }

    pub fn release_designation(&self) -> Option<Cow<'_, str>> {
        let code = self.text("release_designation");
        (!code.is_empty()).then_some(code)
    }

    pub fn recommendation_class(&self) -> RecommendationClass {
        RecommendationClass::classify(&self.recommendation())
    }

    /// Per-severity counts in display order.
    pub fn severity_histogram(&self) -> Vec<(Severity, u32)> {
        self.cve_counts.iter().collect()
    }
}
