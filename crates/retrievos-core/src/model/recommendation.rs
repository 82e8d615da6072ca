// ── Recommendation classification ──
//
// Free-text recommendations map onto a badge class through an ordered
// list of substring rules; the first match wins.

use serde::Serialize;
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RecommendationClass {
    /// Upgrade advised (obligatory, critical or suggested).
    Upgrade,
    /// Already on the recommended release.
    NoChange,
    /// Text matched no rule. Rendered without styling.
    Unclassified,
}

const RULES: &[(&str, RecommendationClass)] = &[
    ("obligatory", RecommendationClass::Upgrade),
    ("critical", RecommendationClass::Upgrade),
    ("suggested", RecommendationClass::Upgrade),
    ("same", RecommendationClass::NoChange),
];

impl RecommendationClass {
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        RULES
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map_or(Self::Unclassified, |&(_, class)| class)
    }
}
