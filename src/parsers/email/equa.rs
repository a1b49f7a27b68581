//! Equa bank balance mails. Every message carries one snapshot; across
//! the batch only the latest snapshot per account survives.

use std::collections::BTreeMap;

use crate::content;
use crate::errors::ExtractResult;
use crate::parsers::traits::Extractor;
use crate::parsers::util::{czech_datetime, non_empty, parse_price};
use crate::source::{MessageSource, RawMessage};
use crate::types::Balance;

pub struct EquaMail;

impl Extractor for EquaMail {
    const SOURCE: &'static str = "equa-mail";
    const HAS_BALANCE: bool = true;
}

impl EquaMail {
    /// Collects the latest balance snapshot per account from the whole
    /// batch. The result is eager by design: deduplication needs to see
    /// every message before anything can be handed out.
    pub fn parse<S: MessageSource>(source: &mut S) -> ExtractResult<Vec<Balance>> {
        let mut latest: BTreeMap<String, Balance> = BTreeMap::new();

        for message in source.messages() {
            let message_date = content::message_date(message);
            let Some(part) = content::text_part(message) else {
                log::debug!(
                    "{}: message {} has no text part, skipped",
                    Self::SOURCE,
                    message.uid()
                );
                continue;
            };
            let body = content::decode_part(part)?.replace("\r\n", "\n");

            let mut snapshot = Balance::default();
            for line in body.lines() {
                let tokens: Vec<&str> = line.split(' ').collect();
                if line.contains("stka") {
                    // "Disponibilní částka účtu <account> ..."
                    snapshot.account = tokens.get(3).and_then(|t| non_empty(t));
                } else if line.contains("dne") {
                    if tokens.len() >= 2 {
                        snapshot.balance = Some(parse_price(tokens[tokens.len() - 2])?);
                        snapshot.currency = tokens
                            .last()
                            .map(|t| t.trim_end_matches('.').to_string());
                    }
                    let stated = tokens
                        .get(3..5)
                        .map(|t| t.join(" "))
                        .and_then(|raw| czech_datetime(&raw));
                    snapshot.date = stated.or(message_date);
                }
            }

            let key = snapshot.account.clone().unwrap_or_default();
            match latest.get(&key) {
                Some(kept) if !kept.is_older_than(&snapshot) => {}
                _ => {
                    latest.insert(key, snapshot);
                }
            }
        }

        Ok(latest.into_values().collect())
    }
}
