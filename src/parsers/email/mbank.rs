//! mBank "Email Push" balance mails. The balance hides in an HTML part
//! behind the `Vlast.prostr` label; only the single latest snapshot of
//! the whole batch is kept.

use crate::content;
use crate::errors::{ExtractError, ExtractResult};
use crate::parsers::traits::Extractor;
use crate::parsers::util::parse_price;
use crate::source::{MessageSource, RawMessage};
use crate::types::Balance;

pub struct MbankMail;

impl Extractor for MbankMail {
    const SOURCE: &'static str = "mbank-mail";
    const HAS_BALANCE: bool = true;
}

impl MbankMail {
    pub const SUBJECT_MARKER: &'static str = "Email Push";

    /// Label preceding the available-funds figure
    const LABEL: &'static str = "Vlast.prostr";

    /// Returns at most one snapshot: the latest across the batch.
    pub fn parse<S: MessageSource>(source: &mut S) -> ExtractResult<Vec<Balance>> {
        let mut latest: Option<Balance> = None;

        for message in source.messages() {
            let subject = content::decode_subject(message)?;
            if !subject.contains(Self::SUBJECT_MARKER) {
                continue;
            }
            if !message.is_multipart() {
                continue;
            }

            // the push mail carries several HTML parts; only one of them
            // holds the funds label
            let mut body = None;
            for part in message.parts() {
                if !part.content_type.starts_with("text/html") {
                    continue;
                }
                let decoded = content::decode_part(part)?;
                if decoded.contains(Self::LABEL) {
                    body = Some(decoded);
                    break;
                }
            }
            let Some(body) = body else {
                log::debug!(
                    "{}: message {} has no funds part, skipped",
                    Self::SOURCE,
                    message.uid()
                );
                continue;
            };

            let snapshot = Self::scan_body(&body, message)?;
            match latest.as_ref() {
                Some(kept) if !kept.is_older_than(&snapshot) => {}
                _ => latest = Some(snapshot),
            }
        }

        Ok(latest.into_iter().collect())
    }

    fn scan_body<M: RawMessage>(body: &str, message: &M) -> ExtractResult<Balance> {
        // window from the last label occurrence to the next markup tag
        let tail = match body.rfind(Self::LABEL) {
            Some(start) => &body[start..],
            None => return Err(ExtractError::MissingSentinel(Self::LABEL)),
        };
        let window = match tail.find('<') {
            Some(end) => &tail[..end],
            None => return Err(ExtractError::MissingSentinel("<")),
        };

        let value = window
            .split(':')
            .nth(1)
            .unwrap_or("")
            .trim()
            .trim_matches('.')
            .trim();

        let mut tokens = value.split(' ');
        let amount = tokens.next().unwrap_or("");

        Ok(Balance {
            balance: Some(parse_price(amount)?),
            currency: value.split(' ').next_back().map(str::to_string),
            date: content::message_date(message),
            ..Balance::default()
        })
    }
}
