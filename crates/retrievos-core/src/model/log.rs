// ── Pipeline log lines ──

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static WARN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bWARN(ING)?\b").expect("static regex is valid"));

/// One line of a batch log, flagged when it carries a warning marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub text: String,
    pub warning: bool,
}

impl LogLine {
    /// Split a log on `\n` / `\r\n` and flag warning lines.
    pub fn parse(log: &str) -> Vec<LogLine> {
        log.split('\n')
            .map(|line| {
                let text = line.strip_suffix('\r').unwrap_or(line);
                LogLine {
                    warning: WARN_RE.is_match(text),
                    text: text.to_owned(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_and_warning_are_flagged() {
        let lines = LogLine::parse("INFO ok\r\nWARN slow\nwarning: retry\nWARNED nothing\n");
        let flags: Vec<_> = lines.iter().map(|l| l.warning).collect();
        assert_eq!(flags, vec![false, true, true, false, false]);
        assert_eq!(lines[0].text, "INFO ok");
    }

    #[test]
    fn empty_log_is_one_blank_line() {
        assert_eq!(
            LogLine::parse(""),
            vec![LogLine {
                text: String::new(),
                warning: false
            }]
        );
    }
}
