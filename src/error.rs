//! Error enum
use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Xml(quick_xml::Error),
    XmlAttribute(AttrError),
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    Csv(csv::Error),
    Matcher(aho_corasick::BuildError),
    /// A required input file (dump, catalog, database) does not exist.
    MissingInput(PathBuf),
    /// A worker panicked while processing a page.
    WorkerPanic(String),
    Custom(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Xml(e) => write!(f, "xml error: {e}"),
            Error::XmlAttribute(e) => write!(f, "xml attribute error: {e}"),
            Error::Sqlite(e) => write!(f, "sqlite error: {e}"),
            Error::Serde(e) => write!(f, "serde error: {e}"),
            Error::Csv(e) => write!(f, "csv error: {e}"),
            Error::Matcher(e) => write!(f, "could not build matcher: {e}"),
            Error::MissingInput(p) => write!(f, "missing input: {p:?}"),
            Error::WorkerPanic(msg) => write!(f, "worker panicked: {msg}"),
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Error {
        Error::Xml(e)
    }
}

impl From<AttrError> for Error {
    fn from(e: AttrError) -> Error {
        Error::XmlAttribute(e)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Error {
        Error::Sqlite(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Error {
        Error::Csv(e)
    }
}

impl From<aho_corasick::BuildError> for Error {
    fn from(e: aho_corasick::BuildError) -> Error {
        Error::Matcher(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
