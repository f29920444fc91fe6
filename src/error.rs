use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// The summary text was empty and the export was configured to refuse it.
    EmptyReport,
    Font(String),
    Pdf(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::EmptyReport => write!(f, "summary text is empty"),
            Error::Font(msg) => write!(f, "font error: {msg}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
