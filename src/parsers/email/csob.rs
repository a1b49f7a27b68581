//! ČSOB "Info 24" advice mails. One message packs several transactions,
//! each closed by a running-balance line; detail blocks span multiple
//! lines, so the scanner carries one-line lookahead flags between
//! iterations.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::content;
use crate::errors::{ExtractError, ExtractResult};
use crate::parsers::traits::Extractor;
use crate::parsers::util::{after_label, non_empty, parse_price, strip_leading_zeros};
use crate::source::{MessageSource, RawMessage};
use crate::types::{Payment, PaymentType};

/// Counterparty account at the end of a line: `number[-number]/bankcode`
static ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\d]+((?:\d+-)?\d+/\d+)$").unwrap());

const TYPES: &[(&str, PaymentType)] = &[
    ("transakce platební kartou", PaymentType::Card),
    ("transakce TPS", PaymentType::Transaction),
    ("služby mobilního operátora", PaymentType::MobileOperator),
    ("poplatky", PaymentType::Fees),
    ("úroky", PaymentType::Saving),
];

const TYPE_SAVING: &str = "úroky";

pub struct CsobMail;

impl Extractor for CsobMail {
    const SOURCE: &'static str = "csob-mail";
    const HAS_PAYMENTS: bool = true;
}

impl CsobMail {
    /// Advice mails share the "Info 24" subject with balance mails; only
    /// subjects carrying this marker belong to the payments pass.
    pub const SUBJECT_MARKER: &'static str = "Avízo";

    /// Trailing boilerplate cutoff
    const WINDOW_END: &'static str = ":::::::::::::";
    /// Running-balance line closing each transaction
    const BOUNDARY: &'static str = "Zůstatek na účtu";
    /// Greeting marker; when present the introductory paragraph is dropped
    const GREETING: &'static str = "klientko";

    /// Prepares the scan windows of every advice message in the batch and
    /// returns the lazy line scanner over them. Messages that are not
    /// advice mails are routed back to the source as unseen.
    pub fn parse<S: MessageSource>(source: &mut S) -> ExtractResult<CsobScan> {
        let mut bodies = VecDeque::new();

        for index in 0..source.messages().len() {
            let message = &source.messages()[index];
            let uid = message.uid();

            let subject = content::decode_subject(message)?;
            if !subject.contains(Self::SUBJECT_MARKER) {
                log::debug!("{}: leaving message {uid} for the balance pass", Self::SOURCE);
                source.keep_unseen(uid);
                continue;
            }

            let message = &source.messages()[index];
            let Some(date) = content::message_date(message) else {
                log::warn!("{}: message {uid} has no parseable date, skipped", Self::SOURCE);
                continue;
            };
            let Some(part) = content::text_part(message) else {
                log::debug!("{}: message {uid} has no text part, skipped", Self::SOURCE);
                continue;
            };

            let body = content::decode_part(part)?.replace("\r\n", "\n");
            let window = match body.find(Self::WINDOW_END) {
                Some(end) => &body[..end],
                None => return Err(ExtractError::MissingSentinel(Self::WINDOW_END)),
            };
            let window = if window.contains(Self::GREETING) {
                window.split("\n\n").skip(1).collect::<Vec<_>>().join("\n")
            } else {
                window.to_string()
            };

            let lines = window.lines().map(str::to_string).collect();
            bodies.push_back((lines, date));
        }

        Ok(CsobScan {
            bodies,
            state: None,
        })
    }
}

/// Forward-only scanner over the prepared advice bodies. All transient
/// scan state lives here, scoped to one parse invocation.
pub struct CsobScan {
    bodies: VecDeque<(Vec<String>, NaiveDateTime)>,
    state: Option<ScanState>,
}

impl Iterator for CsobScan {
    type Item = ExtractResult<Payment>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(state) = self.state.as_mut() {
                while let Some(line) = state.lines.next() {
                    match state.step(&line) {
                        Ok(Some(payment)) => return Some(Ok(payment)),
                        Ok(None) => {}
                        Err(error) => return Some(Err(error)),
                    }
                }
                // anything after the last running-balance line never
                // completed, drop it with the body
                self.state = None;
            }

            let (lines, date) = self.bodies.pop_front()?;
            self.state = Some(ScanState::new(lines, date));
        }
    }
}

struct ScanState {
    lines: std::vec::IntoIter<String>,
    message_date: NaiveDateTime,
    record: Payment,
    /// Accumulated type-announcement text, resolved at emission
    type_text: String,
    detail_follows: bool,
    sender_name_follows: bool,
    message_follows: bool,
    /// Cleared by the "will not post yet" marker
    valid: bool,
}

impl ScanState {
    fn new(lines: Vec<String>, message_date: NaiveDateTime) -> Self {
        ScanState {
            lines: lines.into_iter(),
            message_date,
            record: Payment::at(message_date),
            type_text: String::new(),
            detail_follows: false,
            sender_name_follows: false,
            message_follows: false,
            valid: true,
        }
    }

    /// Evaluates one line against the recognizers in precedence order; a
    /// line matches at most one of them. Returns a finished record when
    /// the line was a record boundary with valid content before it.
    fn step(&mut self, line: &str) -> ExtractResult<Option<Payment>> {
        // lookahead flags wait for the next non-empty line
        if line.trim().is_empty() {
            return Ok(None);
        }

        if line.contains(CsobMail::BOUNDARY) {
            return Ok(self.flush());
        }

        if line.starts_with("dne") {
            // "dne <date> byla na účtu <acct> zaúčtována <type>:"
            self.type_text = line.split(' ').skip(7).collect::<Vec<_>>().join(" ");
            self.type_text.pop();
            return Ok(None);
        }

        if line.contains("zatím nezaúčtována") {
            self.valid = false;
            return Ok(None);
        }

        if line.starts_with("částka") {
            let raw = line.split(' ').nth(1).unwrap_or("");
            self.record.price = parse_price(raw)?;
            return Ok(None);
        }

        if let Some(caps) = ACCOUNT_RE.captures(line) {
            self.record.account = caps.get(1).map(|m| m.as_str().to_string());
            return Ok(None);
        }

        if line.starts_with("protiúčet") {
            let value = after_label(line);
            self.record.account = if value.is_empty() {
                non_empty(&line.split(' ').skip(1).collect::<Vec<_>>().join(" "))
            } else {
                Some(value)
            };
            return Ok(None);
        }

        if line.starts_with("detail") {
            self.detail_follows = true;
            return Ok(None);
        }

        if line.starts_with("KS") {
            if let Some(value) = line.split(' ').nth(1) {
                self.record.constant_symbol = Some(value.to_string());
            }
            return Ok(None);
        }

        if line.starts_with("VS") {
            if let Some(value) = line.split(' ').next_back() {
                self.record.variable_symbol = Some(strip_leading_zeros(value).to_string());
            }
            return Ok(None);
        }

        if line.starts_with("SS") {
            if let Some(value) = line.split(' ').nth(1) {
                self.record.specific_symbol = Some(value.to_string());
            }
            return Ok(None);
        }

        if line.starts_with("zpráva pro") {
            self.message_follows = true;
            return Ok(None);
        }

        if self.detail_follows {
            self.detail_follows = false;
            if line.contains("SPO") {
                self.record.description = Some(line.to_string());
            } else if !line.starts_with("splatnost") && !line.starts_with("zpr") {
                self.record.detail_from = Some(line.to_string());
            }
            return Ok(None);
        }

        if self.sender_name_follows {
            self.sender_name_follows = false;
            self.record.detail_from = Some(line.to_string());
            return Ok(None);
        }

        if self.message_follows {
            self.message_follows = false;
            self.record.message = Some(line.to_string());
            return Ok(None);
        }

        if line.starts_with("Od") {
            let rest = line.split(' ').skip(1).collect::<Vec<_>>().join(" ");
            if rest.trim().is_empty() {
                self.sender_name_follows = true;
            } else {
                self.record.detail_from = Some(rest);
            }
            return Ok(None);
        }

        if line.starts_with("Místo") {
            self.record.place = Some(line.split(' ').skip(1).collect::<Vec<_>>().join(" "));
            return Ok(None);
        }

        if line.contains("úrok") {
            self.type_text = TYPE_SAVING.to_string();
        }

        Ok(None)
    }

    /// Record boundary: emit the in-progress record when it is valid and
    /// actually saw an amount, then reset every transient field keeping
    /// only the message-level date.
    fn flush(&mut self) -> Option<Payment> {
        let emitted = if self.valid && self.record.has_price() {
            let mut finished =
                std::mem::replace(&mut self.record, Payment::at(self.message_date));
            finished.transaction_type = PaymentType::classify(TYPES, &self.type_text);
            Some(finished)
        } else {
            self.record = Payment::at(self.message_date);
            None
        };

        self.type_text.clear();
        self.detail_follows = false;
        self.sender_name_follows = false;
        self.message_follows = false;
        self.valid = true;

        emitted
    }
}
