//! Zuno account export: plain CSV, one header row, at least seven
//! columns.

use csv::StringRecord;

use crate::errors::ExtractResult;
use crate::parsers::traits::Extractor;
use crate::parsers::util::{non_empty, parse_price, row_date};
use crate::source::Dialect;
use crate::types::{Payment, PaymentType};

const TYPES: &[(&str, PaymentType)] = &[
    ("Manuální splátka KREDITKY z vašeho účtu", PaymentType::Card),
    ("Platba KARTOU", PaymentType::Card),
    ("Splátka KREDITKY inkasem z ÚČTU", PaymentType::Card),
    ("Odeslaná domácí platba", PaymentType::Transaction),
    ("Odeslaná SEPA platba", PaymentType::Transaction),
    ("Převod mezi vlastními účty:", PaymentType::Transaction),
    ("Převod základního vkladu", PaymentType::Transaction),
    ("Přijatá domácí platba", PaymentType::Transaction),
    ("Trvalý příkaz", PaymentType::Transaction),
    ("Poplatek", PaymentType::Fees),
    ("Vrácení poplatku", PaymentType::Fees),
    ("Platba z vlastního účtu:", PaymentType::Transaction),
    ("Úrok", PaymentType::Saving),
    ("Srážka daně", PaymentType::Saving),
    ("Výběr z bankomatu", PaymentType::Card),
];

const COLUMNS: usize = 7;

pub struct ZunoExport;

impl Extractor for ZunoExport {
    const SOURCE: &'static str = "zuno-export";
    const HAS_PAYMENTS: bool = true;
}

impl ZunoExport {
    pub const DIALECT: Dialect = Dialect::comma();

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

        // columns: date, type, account name, contra account, contra bank
        // code, description, amount
        let mut payment = Payment::at(row_date(&row[0], "%d.%m.%Y")?);
        payment.price = parse_price(&row[6])?;
        payment.message = non_empty(&row[5]);
        payment.description = non_empty(&row[5]);
        payment.account = contra_account(&row[3], &row[4]);
        payment.transaction_type = PaymentType::classify(TYPES, &row[1]);

        Ok(Some(payment))
    }
}

/// Contra account padded with zeros in the export; empty halves collapse
/// to no account at all.
fn contra_account(number: &str, bank_code: &str) -> Option<String> {
    let joined = format!("{}/{}", number.trim_start_matches('0'), bank_code);
    non_empty(joined.trim_matches('/'))
}
