use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document};
use tracing::{debug, info};

use crate::error::ExtractError;
use crate::output::PlainTextOutput;
use crate::processor::Processor;
use crate::types::{ConversionSummary, ExtractedText};
use crate::utils::get_inherited;

fn extract_pages_from_doc(
    doc: &Document,
    normalize_ligatures: bool,
) -> Result<Vec<String>, ExtractError> {
    let mut output = PlainTextOutput::new(normalize_ligatures);
    let empty_resources = Dictionary::new();
    let pages = doc.get_pages();
    let mut p = Processor::new();

    for (page_num, object_id) in pages {
        let page_dict = doc.get_dictionary(object_id)?;
        let resources: &Dictionary =
            get_inherited(doc, page_dict, b"Resources").unwrap_or(&empty_resources);
        let content = doc.get_page_content(object_id)?;

        output.begin_page();
        p.process_stream(doc, &content, resources, &mut output, page_num)?;
        output.end_page();
        debug!("page {} done", page_num);
    }

    Ok(output.into_pages())
}

/// Builder for configuring PDF extraction options.
///
/// # Examples
///
/// ```no_run
/// use fsis_recall::PdfTextExtractor;
///
/// let text = PdfTextExtractor::builder()
///     .password("secret")
///     .normalize_ligatures(false)
///     .build()
///     .from_path("encrypted.pdf")?;
/// # Ok::<(), fsis_recall::ExtractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PdfTextExtractorBuilder {
    password: Option<String>,
    normalize_ligatures: bool,
}

impl Default for PdfTextExtractorBuilder {
    fn default() -> Self {
        PdfTextExtractorBuilder {
            password: None,
            normalize_ligatures: true,
        }
    }
}

impl PdfTextExtractorBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the password for encrypted PDFs.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Expand typographic ligatures such as `ﬁ` into their letters. On by default.
    pub fn normalize_ligatures(mut self, normalize: bool) -> Self {
        self.normalize_ligatures = normalize;
        self
    }

    /// Build the extractor configuration.
    pub fn build(self) -> PdfTextExtractor {
        PdfTextExtractor {
            password: self.password,
            normalize_ligatures: self.normalize_ligatures,
        }
    }
}

/// PDF text extractor with configuration options.
///
/// # Examples
///
/// ```no_run
/// use fsis_recall::PdfTextExtractor;
///
/// let text = PdfTextExtractor::default().from_path("file.pdf")?;
/// for (i, page) in text.pages().iter().enumerate() {
///     println!("page {}: {} chars", i + 1, page.chars().count());
/// }
/// print!("{}", text);
/// # Ok::<(), fsis_recall::ExtractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    password: Option<String>,
    normalize_ligatures: bool,
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        PdfTextExtractorBuilder::default().build()
    }
}

impl PdfTextExtractor {
    /// Create a builder for configuring extraction options.
    pub fn builder() -> PdfTextExtractorBuilder {
        PdfTextExtractorBuilder::new()
    }

    /// Extract text from a PDF file at the given path.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<ExtractedText, ExtractError> {
        let file = File::open(path)?;
        self.from_reader(file)
    }

    /// Extract text from a PDF in memory.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        let mut doc = Document::load_mem(bytes)?;
        self.extract_from_document(&mut doc)
    }

    /// Extract text from a PDF reader.
    pub fn from_reader<R: Read>(&self, mut reader: R) -> Result<ExtractedText, ExtractError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.from_bytes(&bytes)
    }

    /// Extract `source` and write its text to `destination` as UTF-8.
    ///
    /// The destination is only touched once every page has been extracted.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<ConversionSummary, ExtractError> {
        let source = source.as_ref();
        let destination = destination.as_ref();

        let text = self.from_path(source)?;
        let page_count = text.page_count();
        let text = text.into_string();
        fs::write(destination, text.as_bytes())?;

        info!(
            "wrote {} bytes from {} pages of {} to {}",
            text.len(),
            page_count,
            source.display(),
            destination.display()
        );
        Ok(ConversionSummary {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            page_count,
            bytes_written: text.len(),
        })
    }

    fn extract_from_document(&self, doc: &mut Document) -> Result<ExtractedText, ExtractError> {
        // lopdf already decrypts documents that open with the empty user password.
        if doc.is_encrypted() && doc.encryption_state.is_none() {
            let password = self.password.as_deref().unwrap_or("");
            doc.decrypt(password)?;
            // Objects of a document that needed a password are not loaded, so
            // authenticating alone leaves nothing to read.
            doc.catalog()?;
        }

        let pages = extract_pages_from_doc(doc, self.normalize_ligatures)?;
        Ok(ExtractedText::from(pages))
    }
}

/// Extract text from a PDF file at the given path using default settings.
///
/// This is a convenience function equivalent to `PdfTextExtractor::default().from_path(path)`.
///
/// # Examples
///
/// ```no_run
/// let text = fsis_recall::from_path("file.pdf")?;
/// print!("{}", text);
/// # Ok::<(), fsis_recall::ExtractError>(())
/// ```
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ExtractedText, ExtractError> {
    PdfTextExtractor::default().from_path(path)
}

/// Extract text from a PDF in memory using default settings.
pub fn from_bytes(bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
    PdfTextExtractor::default().from_bytes(bytes)
}

/// Extract text from a PDF reader using default settings.
pub fn from_reader<R: Read>(reader: R) -> Result<ExtractedText, ExtractError> {
    PdfTextExtractor::default().from_reader(reader)
}

/// Convert a PDF file to a UTF-8 text file using default settings.
///
/// # Examples
///
/// ```no_run
/// let summary = fsis_recall::convert(
///     "Recall-API-documentation.pdf",
///     "Recall-API-documentation.txt",
/// )?;
/// println!("PDF converted successfully to {}", summary.destination.display());
/// # Ok::<(), fsis_recall::ExtractError>(())
/// ```
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
) -> Result<ConversionSummary, ExtractError> {
    PdfTextExtractor::default().convert(source, destination)
}
