//! Equa bank account export: semicolon-delimited, one header row, eleven
//! fixed columns.

use csv::StringRecord;

use crate::errors::ExtractResult;
use crate::parsers::traits::Extractor;
use crate::parsers::util::{non_empty, parse_price, row_date};
use crate::source::Dialect;
use crate::types::{Payment, PaymentType};

const TYPES: &[(&str, PaymentType)] = &[
    ("Odchozí platba v rámci ČR", PaymentType::Transaction),
    ("Platba kartou", PaymentType::Card),
    ("Platba v rámci Equa bank", PaymentType::Transaction),
    ("Poplatek za výběr z bankomatu", PaymentType::Fees),
    ("Příchozí platba v rámci ČR", PaymentType::Transaction),
    ("Připsaný úrok", PaymentType::Saving),
    ("Srážková daň z úroků", PaymentType::Saving),
    ("Trvalý příkaz", PaymentType::Transaction),
    ("Výběr z bankomatu", PaymentType::Card),
];

const COLUMNS: usize = 11;

pub struct EquaExport;

impl Extractor for EquaExport {
    const SOURCE: &'static str = "equa-export";
    const HAS_PAYMENTS: bool = true;
}

impl EquaExport {
    pub const DIALECT: Dialect = Dialect::semicolon("utf-8");

    pub fn parse<I>(rows: I) -> impl Iterator<Item = ExtractResult<Payment>>
    where
        I: IntoIterator<Item = StringRecord>,
    {
        rows.into_iter()
            .skip(1)
            .filter_map(|row| Self::map_row(&row).transpose())
    }

    fn map_row(row: &StringRecord) -> ExtractResult<Option<Payment>> {
        if row.len() < COLUMNS {
            log::debug!("{}: skipping short row ({} fields)", Self::SOURCE, row.len());
            return Ok(None);
        }

        // columns: account, iban, contra account, name, booking date,
        // value date, amount, detail, description, category, code
        let mut payment = Payment::at(row_date(&row[4], "%d.%m.%Y")?);
        payment.price = parse_price(&row[6])?;
        payment.detail_from = non_empty(row[3].trim_matches('.'));
        payment.description = non_empty(&row[8]).or_else(|| non_empty(&row[9]));
        payment.transaction_type = PaymentType::classify(TYPES, &row[7]);
        // card rows carry the acquirer in the contra-account column
        if payment.transaction_type != PaymentType::Card {
            payment.account = non_empty(&row[2]);
        }

        Ok(Some(payment))
    }
}
