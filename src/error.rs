use std::fmt::Formatter;

#[derive(Debug)]
pub enum ExtractError {
    IoError(std::io::Error),
    PdfError(lopdf::Error),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            ExtractError::IoError(e) => write!(f, "IO error: {}", e),
            ExtractError::PdfError(e) => write!(f, "PDF error: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::IoError(e) => Some(e),
            ExtractError::PdfError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::IoError(e)
    }
}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        ExtractError::PdfError(e)
    }
}

#[derive(Debug)]
pub enum LookupError {
    /// The request never produced an HTTP response (DNS, connect, TLS, timeout).
    TransportError(Box<ureq::Transport>),
    /// The response arrived but its body could not be read.
    IoError(std::io::Error),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            LookupError::TransportError(e) => write!(f, "Transport error: {}", e),
            LookupError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::TransportError(e) => Some(e.as_ref()),
            LookupError::IoError(e) => Some(e),
        }
    }
}

impl From<ureq::Transport> for LookupError {
    fn from(e: ureq::Transport) -> Self {
        LookupError::TransportError(Box::new(e))
    }
}

impl From<std::io::Error> for LookupError {
    fn from(e: std::io::Error) -> Self {
        LookupError::IoError(e)
    }
}
