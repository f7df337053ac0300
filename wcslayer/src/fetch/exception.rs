//! OWS service exception reports.
//!
//! A coverage server that refuses a request answers with a structured
//! XML exception report instead of raster data. Parsing returns a
//! `Result` with two meanings for the caller: `Ok` is a definitive
//! application-level refusal (stop retrying), `Err` means the payload is
//! not a well-formed report and should be treated as transport
//! corruption (retry).

use std::fmt;

use thiserror::Error;

/// Failures to interpret a payload as an exception report.
#[derive(Debug, Error)]
pub enum ExceptionParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element '{0}' is not an exception report")]
    NotAReport(String),
}

/// One exception entry inside a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceException {
    /// Machine-readable exception code, e.g. `InvalidParameterValue`.
    pub code: Option<String>,
    /// Parameter the exception refers to.
    pub locator: Option<String>,
    /// Human-readable messages.
    pub texts: Vec<String>,
}

impl fmt::Display for ServiceException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "{}", code)?;
        } else {
            write!(f, "UnknownException")?;
        }
        if let Some(locator) = &self.locator {
            write!(f, " (locator: {})", locator)?;
        }
        if !self.texts.is_empty() {
            write!(f, ": {}", self.texts.join("; "))?;
        }
        Ok(())
    }
}

/// A parsed OWS exception report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionReport {
    pub exceptions: Vec<ServiceException>,
}

impl ExceptionReport {
    /// Parses an XML payload as an exception report.
    ///
    /// Namespace prefixes are ignored; the root element's local name
    /// must be `ExceptionReport`.
    pub fn parse(xml: &str) -> Result<Self, ExceptionParseError> {
        let document = roxmltree::Document::parse(xml)?;
        let root = document.root_element();
        if root.tag_name().name() != "ExceptionReport" {
            return Err(ExceptionParseError::NotAReport(
                root.tag_name().name().to_string(),
            ));
        }

        let exceptions = root
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == "Exception")
            .map(|node| ServiceException {
                code: node.attribute("exceptionCode").map(str::to_string),
                locator: node.attribute("locator").map(str::to_string),
                texts: node
                    .children()
                    .filter(|child| {
                        child.is_element() && child.tag_name().name() == "ExceptionText"
                    })
                    .filter_map(|child| child.text())
                    .map(|text| text.trim().to_string())
                    .collect(),
            })
            .collect();

        Ok(Self { exceptions })
    }
}

impl fmt::Display for ExceptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exceptions.is_empty() {
            return write!(f, "service exception report (no details)");
        }
        let rendered: Vec<String> = self.exceptions.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", rendered.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/2.0" version="2.0.1">
  <ows:Exception exceptionCode="InvalidParameterValue" locator="coverageId">
    <ows:ExceptionText>Coverage 'nope' is not offered.</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#;

    #[test]
    fn test_parse_valid_report() {
        let report = ExceptionReport::parse(REPORT).unwrap();
        assert_eq!(report.exceptions.len(), 1);
        let exception = &report.exceptions[0];
        assert_eq!(exception.code.as_deref(), Some("InvalidParameterValue"));
        assert_eq!(exception.locator.as_deref(), Some("coverageId"));
        assert_eq!(exception.texts, vec!["Coverage 'nope' is not offered."]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            ExceptionReport::parse("not xml at all <"),
            Err(ExceptionParseError::Xml(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unrelated_xml() {
        let err = ExceptionReport::parse("<Capabilities></Capabilities>").unwrap_err();
        assert!(matches!(err, ExceptionParseError::NotAReport(name) if name == "Capabilities"));
    }

    #[test]
    fn test_display_includes_code_and_text() {
        let report = ExceptionReport::parse(REPORT).unwrap();
        let rendered = report.to_string();
        assert!(rendered.contains("InvalidParameterValue"));
        assert!(rendered.contains("not offered"));
    }

    #[test]
    fn test_report_without_entries_still_parses() {
        let report = ExceptionReport::parse(
            r#"<ExceptionReport version="2.0.1"></ExceptionReport>"#,
        )
        .unwrap();
        assert!(report.exceptions.is_empty());
    }
}
