//! Capability contracts between the extraction strategies and their raw
//! inputs.
//!
//! Message acquisition itself (mailbox login, searching, fetching, flag
//! management) lives outside this crate; the strategies only ever see an
//! already-fetched batch of messages, or already-split export rows.

use csv::{ReaderBuilder, StringRecord, Terminator};
use encoding_rs::Encoding;

use crate::errors::{ExtractError, ExtractResult};

/// One body part of a (possibly multipart) mail message, as handed over by
/// the acquisition collaborator. The body stays in its transport form —
/// undoing the base64 layer and the declared character set is the job of
/// [`crate::content`].
#[derive(Debug, Clone)]
pub struct MessagePart {
    /// Content kind, e.g. `text/plain` or `text/html`
    pub content_type: String,
    /// Declared character set of the decoded body, when stated
    pub charset: Option<String>,
    /// Whether the body bytes still carry a base64 transfer encoding
    pub transfer_base64: bool,
    pub body: Vec<u8>,
}

impl MessagePart {
    pub fn new(content_type: &str, body: Vec<u8>) -> Self {
        MessagePart {
            content_type: content_type.to_string(),
            charset: None,
            transfer_base64: false,
            body,
        }
    }

    pub fn text_plain(body: &str) -> Self {
        Self::new("text/plain", body.as_bytes().to_vec())
    }

    pub fn text_html(body: &str) -> Self {
        Self::new("text/html", body.as_bytes().to_vec())
    }

    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = Some(charset.to_string());
        self
    }

    pub fn base64_encoded(mut self) -> Self {
        self.transfer_base64 = true;
        self
    }
}

/// Minimal view of a fetched mail message that an email strategy needs.
pub trait RawMessage {
    /// Mailbox-level identifier, echoed back through
    /// [`MessageSource::keep_unseen`].
    fn uid(&self) -> u32;
    fn is_multipart(&self) -> bool;
    fn parts(&self) -> &[MessagePart];
    /// Raw `Subject` header, possibly RFC 2047 encoded
    fn subject(&self) -> Option<&str>;
    /// Raw `Date` header
    fn date(&self) -> Option<&str>;
}

/// An already-fetched batch of messages plus the one side channel the
/// strategies use: asking the acquisition layer to leave a message unread
/// when its content belongs to a different extraction pass.
pub trait MessageSource {
    type Message: RawMessage;

    fn messages(&self) -> &[Self::Message];
    fn keep_unseen(&mut self, uid: u32);
}

/// Owned message representation produced by the acquisition collaborator.
#[derive(Debug, Clone)]
pub struct FetchedMail {
    uid: u32,
    subject: Option<String>,
    date: Option<String>,
    parts: Vec<MessagePart>,
}

impl FetchedMail {
    pub fn new(uid: u32) -> Self {
        FetchedMail {
            uid,
            subject: None,
            date: None,
            parts: Vec::new(),
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = Some(date.to_string());
        self
    }

    pub fn with_part(mut self, part: MessagePart) -> Self {
        self.parts.push(part);
        self
    }
}

impl RawMessage for FetchedMail {
    fn uid(&self) -> u32 {
        self.uid
    }

    fn is_multipart(&self) -> bool {
        self.parts.len() > 1
    }

    fn parts(&self) -> &[MessagePart] {
        &self.parts
    }

    fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// In-memory [`MessageSource`] over a pre-materialized batch. The unseen
/// requests are recorded for the acquisition collaborator to act on after
/// the pass completes.
#[derive(Debug, Default)]
pub struct MemorySource {
    mails: Vec<FetchedMail>,
    kept_unseen: Vec<u32>,
}

impl MemorySource {
    pub fn new(mails: Vec<FetchedMail>) -> Self {
        MemorySource {
            mails,
            kept_unseen: Vec::new(),
        }
    }

    /// Messages a strategy asked to leave unread.
    pub fn kept_unseen(&self) -> &[u32] {
        &self.kept_unseen
    }
}

impl From<Vec<FetchedMail>> for MemorySource {
    fn from(mails: Vec<FetchedMail>) -> Self {
        Self::new(mails)
    }
}

impl MessageSource for MemorySource {
    type Message = FetchedMail;

    fn messages(&self) -> &[FetchedMail] {
        &self.mails
    }

    fn keep_unseen(&mut self, uid: u32) {
        if !self.kept_unseen.contains(&uid) {
            self.kept_unseen.push(uid);
        }
    }
}

/// Delimiter, quoting and encoding conventions of a row-based export.
///
/// The dialect is consumed by the caller that opens the file (see
/// [`crate::builder::ExportBuilder`]); the strategies themselves only see
/// the already-split rows.
#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    pub double_quote: bool,
    pub escape: Option<u8>,
    pub terminator: Terminator,
    /// Source character encoding label, e.g. `utf-8` or `iso-8859-2`
    pub encoding: &'static str,
}

impl Dialect {
    /// Semicolon-delimited export with CRLF rows, shared by several banks.
    pub const fn semicolon(encoding: &'static str) -> Self {
        Dialect {
            delimiter: b';',
            quote: b'"',
            double_quote: false,
            escape: None,
            terminator: Terminator::CRLF,
            encoding,
        }
    }

    /// Plain comma-separated export.
    pub const fn comma() -> Self {
        Dialect {
            delimiter: b',',
            quote: b'"',
            double_quote: true,
            escape: None,
            terminator: Terminator::CRLF,
            encoding: "utf-8",
        }
    }

    /// Decodes raw file bytes with the dialect's declared character set.
    pub fn decode(&self, bytes: &[u8]) -> ExtractResult<String> {
        let encoding = Encoding::for_label(self.encoding.as_bytes())
            .ok_or_else(|| ExtractError::UnknownCharset(self.encoding.to_string()))?;
        let (text, _, _) = encoding.decode(bytes);
        Ok(text.into_owned())
    }

    /// Decodes and splits raw export content into rows for a strategy.
    pub fn read_rows(&self, bytes: &[u8]) -> ExtractResult<Vec<StringRecord>> {
        let text = self.decode(bytes)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(self.double_quote)
            .escape(self.escape)
            .terminator(self.terminator)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_multipart_flag_follows_part_count() {
        let single = FetchedMail::new(1).with_part(MessagePart::text_plain("hello"));
        assert!(!single.is_multipart());

        let multi = FetchedMail::new(2)
            .with_part(MessagePart::text_plain("hello"))
            .with_part(MessagePart::text_html("<p>hello</p>"));
        assert!(multi.is_multipart());
    }

    #[test]
    fn test_memory_source_records_unseen_requests() {
        let mut source = MemorySource::new(vec![FetchedMail::new(7), FetchedMail::new(8)]);
        source.keep_unseen(8);
        source.keep_unseen(8);
        assert_eq!(source.kept_unseen(), &[8]);
        assert_eq!(source.messages().len(), 2);
    }

    #[rstest]
    #[case(Dialect::semicolon("utf-8"), "a;b;\"c d\"\r\n1;2;3\r\n", vec![vec!["a", "b", "c d"], vec!["1", "2", "3"]])]
    #[case(Dialect::comma(), "a,b\n1,\"x,y\"\n", vec![vec!["a", "b"], vec!["1", "x,y"]])]
    fn test_dialect_read_rows(
        #[case] dialect: Dialect,
        #[case] content: &str,
        #[case] expected: Vec<Vec<&str>>,
    ) {
        let rows = dialect.read_rows(content.as_bytes()).unwrap();
        let got: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().collect()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_dialect_decodes_latin2() {
        let dialect = Dialect::semicolon("iso-8859-2");
        // "Výběr" in ISO-8859-2
        let bytes = [b'V', 0xFD, b'b', 0xEC, b'r'];
        assert_eq!(dialect.decode(&bytes).unwrap(), "Výběr");
    }

    #[test]
    fn test_dialect_unknown_encoding() {
        let dialect = Dialect {
            encoding: "no-such-charset",
            ..Dialect::comma()
        };
        let result = dialect.read_rows(b"a,b");
        assert!(matches!(result, Err(ExtractError::UnknownCharset(_))));
    }
}
