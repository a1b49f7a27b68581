//! Raiffeisenbank notification mails. One transaction per message, built
//! from `Label: value` lines; the direction keyword decides which side of
//! the transfer each account line describes and the sign of the amount.

use std::collections::VecDeque;

use chrono::NaiveDateTime;

use crate::content;
use crate::errors::ExtractResult;
use crate::parsers::traits::Extractor;
use crate::parsers::util::{after_label, czech_datetime, non_empty, parse_price, strip_leading_zeros};
use crate::source::{MessageSource, RawMessage};
use crate::types::{Payment, PaymentType};

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Incoming,
    Outgoing,
}

pub struct RaiffeisenMail;

impl Extractor for RaiffeisenMail {
    const SOURCE: &'static str = "raiffeisenbank-mail";
    const HAS_PAYMENTS: bool = true;
}

impl RaiffeisenMail {
    pub fn parse<S: MessageSource>(source: &mut S) -> ExtractResult<RaiffeisenScan> {
        let mut bodies = VecDeque::new();

        for message in source.messages() {
            let Some(date) = content::message_date(message) else {
                log::warn!(
                    "{}: message {} has no parseable date, skipped",
                    Self::SOURCE,
                    message.uid()
                );
                continue;
            };
            let Some(part) = content::text_part(message) else {
                continue;
            };
            let body = content::decode_part(part)?.replace("\r\n", "\n");
            bodies.push_back((body, date));
        }

        Ok(RaiffeisenScan { bodies })
    }

    /// Scans one message body into at most one payment. Messages whose
    /// template never carried an amount yield nothing.
    fn scan_message(body: &str, message_date: NaiveDateTime) -> ExtractResult<Option<Payment>> {
        let mut payment = Payment::at(message_date);
        let mut direction: Option<Direction> = None;

        for line in body.lines() {
            if line.contains("ODCHOZI") {
                payment.transaction_type = PaymentType::Transaction;
                direction = Some(Direction::Outgoing);
            } else if line.contains("PRICHOZI") {
                payment.transaction_type = PaymentType::Transaction;
                direction = Some(Direction::Incoming);
            } else if (line.starts_with("Z:") && direction == Some(Direction::Incoming))
                || (line.starts_with("Na") && direction == Some(Direction::Outgoing))
            {
                payment.account = Some(counterparty_account(&after_label(line)));
            } else if (line.starts_with("Z:") && direction == Some(Direction::Outgoing))
                || (line.starts_with("Na") && direction == Some(Direction::Incoming))
            {
                payment.account_from = Some(counterparty_account(&after_label(line)));
            } else if line.starts_with("Castka:") {
                let data = after_label(line);
                let mut tokens: Vec<&str> = data.split(' ').collect();
                tokens.pop(); // trailing currency code
                payment.price = parse_price(&tokens.concat())?;
                if direction == Some(Direction::Outgoing) {
                    payment.price = -payment.price;
                }
            } else if line.starts_with("KS:") {
                payment.constant_symbol = non_empty(&after_label(line));
            } else if line.starts_with("VS:") {
                payment.variable_symbol =
                    non_empty(strip_leading_zeros(&after_label(line)));
            } else if line.starts_with("SS:") {
                payment.specific_symbol = non_empty(&after_label(line));
            } else if line.starts_with("Dne:") {
                // split only once, the time value carries its own colon;
                // strict template date, message timestamp when it fails
                let value = line.splitn(2, ':').nth(1).unwrap_or("");
                payment.date = czech_datetime(value).unwrap_or(message_date);
            } else if line.starts_with("Zprava:") {
                payment.message = non_empty(&after_label(line));
            }
        }

        if payment.has_price() {
            Ok(Some(payment))
        } else {
            Ok(None)
        }
    }
}

/// `number[-number]/bankcode`, dropping anything after the bank code
fn counterparty_account(raw: &str) -> String {
    raw.split('/').take(2).collect::<Vec<_>>().join("/")
}

/// One-payment-per-message sequence over the prepared bodies.
pub struct RaiffeisenScan {
    bodies: VecDeque<(String, NaiveDateTime)>,
}

impl Iterator for RaiffeisenScan {
    type Item = ExtractResult<Payment>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (body, date) = self.bodies.pop_front()?;
            match RaiffeisenMail::scan_message(&body, date) {
                Ok(Some(payment)) => return Some(Ok(payment)),
                Ok(None) => continue,
                Err(error) => return Some(Err(error)),
            }
        }
    }
}
