use std::fmt;
use std::path::PathBuf;

use euclid::Transform2D;

pub struct Space;
pub type Transform = Transform2D<f32, Space, Space>;

/// Status and raw body of a recall API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallResponse {
    pub status: u16,
    pub body: String,
}

impl RecallResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Prints the status code on its own line followed by the body.
impl fmt::Display for RecallResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status)?;
        write!(f, "{}", self.body)
    }
}

/// Output of PDF text extraction: one string per page, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pages: Vec<String>,
}

impl ExtractedText {
    /// Text of each page.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.is_empty())
    }

    /// Concatenate every page with no separator.
    pub fn into_string(self) -> String {
        self.pages.concat()
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in &self.pages {
            f.write_str(page)?;
        }
        Ok(())
    }
}

impl From<Vec<String>> for ExtractedText {
    fn from(pages: Vec<String>) -> Self {
        ExtractedText { pages }
    }
}

/// What a file-to-file conversion did.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub page_count: usize,
    pub bytes_written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_concatenate_without_separator() {
        let text = ExtractedText::from(vec!["one\n".to_owned(), "two".to_owned()]);
        assert_eq!(text.to_string(), "one\ntwo");
        assert_eq!(text.page_count(), 2);
        assert_eq!(text.into_string(), "one\ntwo");
    }

    #[test]
    fn response_renders_status_then_body() {
        let response = RecallResponse {
            status: 404,
            body: "not found".to_owned(),
        };
        assert!(!response.is_success());
        assert_eq!(response.to_string(), "404\nnot found");
    }
}
