/*! Corpus sources.

Wiki dumps are read page by page through [DumpReader], which only keeps the
fields of the page that is currently being parsed.

Raw page content is wikitext. [markup] extracts outgoing links (for the link
graph) and a plain text rendition (for mention matching).
!*/
mod dump;
pub mod markup;
mod page;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;

use crate::error::Error;

pub use dump::{DumpReader, ReadStats};
pub use page::PageRecord;

const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Open a (possibly compressed) source file.
///
/// Compression is guessed from the extension: `.gz` and `.bz2` are
/// decompressed with multi-member/multi-stream decoders, since dumps are often
/// produced by concatenating compressed chunks.
pub fn open(path: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader: Box<dyn BufRead + Send> = match path.extension().and_then(|ext| ext.to_str()) {
        Some("gz") => Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiGzDecoder::new(file),
        )),
        Some("bz2") => Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiBzDecoder::new(file),
        )),
        _ => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)),
    };

    Ok(reader)
}
