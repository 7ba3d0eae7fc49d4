//! Structured parsing of raw CLI output via TextFSM templates.
//!
//! Pure functions over the text a session collected: template source in,
//! ordered records out. Kept separate from the orchestrator so callers can
//! parse lazily, re-parse with different templates, or skip parsing
//! entirely.

use std::collections::HashMap;
use std::path::Path;

use textfsm_rust::Template;

use crate::error::ParseError;

/// One parsed record: field name to value.
pub type Record = HashMap<String, String>;

/// Parse raw output against a template given as a string.
pub fn parse_template_str(template: &str, raw: &str) -> Result<Vec<Record>, ParseError> {
    let template = Template::parse_str(template).map_err(|e| ParseError::InvalidTemplate {
        message: e.to_string(),
    })?;

    let mut parser = template.parser();
    parser
        .parse_text_to_dicts(raw)
        .map_err(|e| ParseError::ParseFailed {
            message: e.to_string(),
        })
}

/// Parse raw output against a template file.
///
/// Fails with [`ParseError::TemplateNotFound`] if the file does not exist.
pub fn parse_template_file(path: &Path, raw: &str) -> Result<Vec<Record>, ParseError> {
    if !path.exists() {
        return Err(ParseError::TemplateNotFound {
            path: path.to_path_buf(),
        });
    }

    let source = std::fs::read_to_string(path).map_err(|e| ParseError::TemplateRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_template_str(&source, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPTIME_TEMPLATE: &str = "\
Value HOSTNAME (\\S+)
Value UPTIME (.+)

Start
  ^${HOSTNAME} uptime is ${UPTIME} -> Record
";

    #[test]
    fn test_parse_template_str() {
        let raw = "lab-sw1 uptime is 4 weeks, 2 days\n";
        let records = parse_template_str(UPTIME_TEMPLATE, raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["HOSTNAME"], "lab-sw1");
        assert_eq!(records[0]["UPTIME"], "4 weeks, 2 days");
    }

    #[test]
    fn test_no_match_yields_no_records() {
        let records = parse_template_str(UPTIME_TEMPLATE, "nothing relevant\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_template_file() {
        let err = parse_template_file(Path::new("/nonexistent/template.textfsm"), "x")
            .unwrap_err();
        assert!(matches!(err, ParseError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_invalid_template_source() {
        let err = parse_template_str("not a template at all", "x").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTemplate { .. }));
    }
}
