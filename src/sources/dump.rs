//! Streaming MediaWiki XML dump reader.
use std::{io::BufRead, path::Path};

use log::{debug, error};
use quick_xml::{events::Event, Reader};
use serde::Serialize;

use crate::error::Error;
use crate::filtering::{Filter, Namespaces};

use super::PageRecord;

/// Counters kept by [DumpReader].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Every `<page>` element encountered.
    pub pages_read: usize,
    /// Pages that were yielded (articles and redirects).
    pub yielded: usize,
    pub redirects: usize,
    /// Pages lacking a title or a content.
    pub missing_fields: usize,
    /// Pages with content that could not be unescaped.
    pub malformed: usize,
    /// Pages that are not in the main namespace.
    pub namespace_skipped: usize,
}

impl std::fmt::Display for ReadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "read {} pages: {} yielded ({} redirects), {} missing title/content, {} malformed, {} outside main namespace",
            self.pages_read,
            self.yielded,
            self.redirects,
            self.missing_fields,
            self.malformed,
            self.namespace_skipped
        )
    }
}

/// Fields of the page that is being parsed.
#[derive(Debug, Default)]
struct RawPage {
    title: Option<String>,
    ns: Option<String>,
    text: Option<String>,
    redirect: Option<String>,
    malformed: bool,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Ns,
    Text,
}

impl RawPage {
    fn push(&mut self, field: Field, content: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Ns => &mut self.ns,
            Field::Text => &mut self.text,
        };
        target.get_or_insert_with(String::new).push_str(content);
    }
}

/// Lazy, non-restartable iterator over the pages of a dump.
///
/// The XML event buffer is cleared after each event, so that memory usage is
/// bounded by the size of the largest page rather than by the size of the dump.
pub struct DumpReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    namespaces: Namespaces,
    max_pages: Option<usize>,
    stats: ReadStats,
    done: bool,
}

impl DumpReader<Box<dyn BufRead + Send>> {
    /// Open a dump, decompressing it if needed. See [super::open].
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(super::open(path)?))
    }
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            namespaces: Namespaces::default(),
            max_pages: None,
            stats: ReadStats::default(),
            done: false,
        }
    }

    /// Stop after `max_pages` yielded pages.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Pull events until the end of the next `<page>` element.
    ///
    /// Errors returned from here concern the XML stream itself and are not recoverable.
    fn next_raw(&mut self) -> Result<Option<RawPage>, Error> {
        let mut page: Option<RawPage> = None;
        let mut field: Option<Field> = None;

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(ref e) => match (e.name().as_ref(), page.as_mut()) {
                    (b"page", _) => page = Some(RawPage::default()),
                    (b"title", Some(_)) => field = Some(Field::Title),
                    (b"ns", Some(_)) => field = Some(Field::Ns),
                    (b"text", Some(p)) => {
                        // keep the last revision only
                        p.text = Some(String::new());
                        field = Some(Field::Text);
                    }
                    _ => (),
                },
                Event::Empty(ref e) => {
                    if let (b"redirect", Some(p)) = (e.name().as_ref(), page.as_mut()) {
                        match e.try_get_attribute("title") {
                            Ok(Some(attr)) => match attr.unescape_value() {
                                Ok(target) => p.redirect = Some(target.into_owned()),
                                Err(_) => p.malformed = true,
                            },
                            Ok(None) => (),
                            Err(_) => p.malformed = true,
                        }
                    }
                }
                Event::Text(ref t) => {
                    if let (Some(p), Some(f)) = (page.as_mut(), field) {
                        match t.unescape() {
                            Ok(content) => p.push(f, &content),
                            Err(_) => p.malformed = true,
                        }
                    }
                }
                Event::CData(ref t) => {
                    if let (Some(p), Some(f)) = (page.as_mut(), field) {
                        p.push(f, &String::from_utf8_lossy(t));
                    }
                }
                Event::End(ref e) => match e.name().as_ref() {
                    b"title" | b"ns" | b"text" => field = None,
                    b"page" => {
                        if page.is_some() {
                            return Ok(page);
                        }
                    }
                    _ => (),
                },
                Event::Eof => return Ok(None),
                _ => (),
            }
        }
    }

    /// Turn a raw page into a record, updating counters.
    ///
    /// Returns [None] when the page has to be skipped.
    fn to_record(&mut self, raw: RawPage) -> Option<PageRecord> {
        if raw.malformed {
            debug!("skipping malformed page {:?}", raw.title);
            self.stats.malformed += 1;
            return None;
        }

        let (title, text) = match (raw.title, raw.text) {
            (Some(title), Some(text)) if !title.trim().is_empty() && !text.is_empty() => {
                (title, text)
            }
            (title, _) => {
                debug!("skipping page with missing title or content: {:?}", title);
                self.stats.missing_fields += 1;
                return None;
            }
        };

        let main_ns = raw.ns.as_deref().map_or(true, |ns| ns.trim() == "0");
        if !main_ns || !self.namespaces.detect(title.as_str()) {
            self.stats.namespace_skipped += 1;
            return None;
        }

        if raw.redirect.is_some() {
            self.stats.redirects += 1;
        }
        self.stats.yielded += 1;
        Some(PageRecord::new(title, text, raw.redirect))
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = Result<PageRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(max) = self.max_pages {
                if self.stats.yielded >= max {
                    debug!("reached maximum page count ({})", max);
                    self.done = true;
                    return None;
                }
            }

            match self.next_raw() {
                Ok(Some(raw)) => {
                    self.stats.pages_read += 1;
                    if let Some(record) = self.to_record(raw) {
                        return Some(Ok(record));
                    }
                }
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    error!(
                        "unreadable dump after {} pages: {}",
                        self.stats.pages_read, e
                    );
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
  <siteinfo>
    <sitename>Wikipedia</sitename>
  </siteinfo>
  <page>
    <title>Germany</title>
    <ns>0</ns>
    <id>1</id>
    <revision>
      <id>10</id>
      <text bytes="42" xml:space="preserve">'''Germany''' borders [[France]] &amp; [[Poland|Polska]].</text>
    </revision>
  </page>
  <page>
    <title>Deutschland</title>
    <ns>0</ns>
    <redirect title="Germany" />
    <revision>
      <text xml:space="preserve">#REDIRECT [[Germany]]</text>
    </revision>
  </page>
  <page>
    <title>Talk:Germany</title>
    <ns>1</ns>
    <revision>
      <text xml:space="preserve">Some discussion.</text>
    </revision>
  </page>
  <page>
    <title>Category:Countries</title>
    <revision>
      <text xml:space="preserve">Countries.</text>
    </revision>
  </page>
  <page>
    <title>Empty</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve" />
    </revision>
  </page>
  <page>
    <title>History</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve">old</text>
    </revision>
    <revision>
      <text xml:space="preserve">new</text>
    </revision>
  </page>
</mediawiki>"#;

    fn reader() -> DumpReader<&'static [u8]> {
        DumpReader::new(DUMP.as_bytes())
    }

    #[test]
    fn read_pages() {
        let mut r = reader();
        let pages: Vec<PageRecord> = r.by_ref().map(|p| p.unwrap()).collect();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].title, "Germany");
        assert_eq!(
            pages[0].text,
            "'''Germany''' borders [[France]] & [[Poland|Polska]]."
        );
        assert!(!pages[0].is_redirect());
        assert_eq!(pages[1].redirect, Some("Germany".to_string()));
        assert_eq!(pages[2].text, "new");

        let stats = r.stats();
        assert_eq!(stats.pages_read, 6);
        assert_eq!(stats.yielded, 3);
        assert_eq!(stats.redirects, 1);
        assert_eq!(stats.namespace_skipped, 2);
        assert_eq!(stats.missing_fields, 1);
    }

    #[test]
    fn max_pages() {
        let mut r = reader().with_max_pages(Some(1));
        assert_eq!(r.by_ref().count(), 1);
        assert_eq!(r.stats().yielded, 1);
    }

    #[test]
    fn truncated_dump() {
        let truncated = &DUMP[..DUMP.find("<title>Deutschland").unwrap()];
        let r = DumpReader::new(truncated.as_bytes());
        let pages: Vec<_> = r.collect();
        assert!(pages[0].is_ok());
        assert!(pages.len() <= 2);
    }
}
