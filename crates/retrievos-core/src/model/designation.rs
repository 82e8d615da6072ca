// ── Release designation dictionary ──
//
// Static lookup of vendor release-maturity codes.

use serde::Serialize;

/// Human-readable meaning of a release designation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Designation {
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

const DESIGNATIONS: &[Designation] = &[
    Designation {
        code: "DF",
        title: "Deferral (DF)",
        description: "Announces removal of affected IOS image(s) from Cisco offerings and \
                      introduces replacement image(s). Customers are strongly urged to migrate \
                      to the replacement image(s).",
    },
    Designation {
        code: "ED",
        title: "Early Deployment (ED)",
        description: "Releases that provide new features and new platform support in addition \
                      to bug fixes. Variants include CTED, STED, SMED, and XED.",
    },
    Designation {
        code: "MD",
        title: "Maintenance Deployment (MD)",
        description: "Provides bug fix support and ongoing software maintenance.",
    },
    Designation {
        code: "GD",
        title: "General Deployment (GD)",
        description: "Major IOS release milestone for broad deployment based on field \
                      experience and feedback. Note: GD is not applied to future 12.4 \
                      maintenance releases/rebuilds.",
    },
    Designation {
        code: "LD",
        title: "Limited Deployment (LD)",
        description: "Phase between initial FCS and General Deployment (GD) milestones for a \
                      Major IOS release. Note: LD is not applied to future 12.4 maintenance \
                      releases/rebuilds.",
    },
    Designation {
        code: "F",
        title: "F (NX-OS)",
        description: "NX-OS release that provides new features and new platform support in \
                      addition to bug fixes.",
    },
    Designation {
        code: "M",
        title: "M (NX-OS)",
        description: "NX-OS release that provides bug fix support or PSIRT fixes as part of \
                      ongoing maintenance.",
    },
];

impl Designation {
    /// Look up a code, ignoring case and surrounding whitespace.
    pub fn lookup(code: &str) -> Option<&'static Designation> {
        let code = code.trim();
        DESIGNATIONS
            .iter()
            .find(|d| d.code.eq_ignore_ascii_case(code))
    }

    pub fn all() -> &'static [Designation] {
        DESIGNATIONS
    }

    /// Text shown for a code: the description, or a "no details" line.
    pub fn notice(code: &str) -> String {
        match Self::lookup(code) {
            Some(d) => format!("{}: {}", d.title, d.description),
            None => format!("No details available for: {}", code.trim().to_uppercase()),
        }
    }
}
