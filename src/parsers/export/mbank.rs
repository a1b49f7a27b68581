//! mBank account export: semicolon-delimited ISO-8859-2 file with a
//! preamble; rows only start after the `#Datum` header marker. Fields
//! come wrapped in apostrophes and padded to fixed widths.

use csv::StringRecord;

use crate::errors::ExtractResult;
use crate::parsers::traits::Extractor;
use crate::parsers::util::{non_empty, parse_price, row_date};
use crate::source::Dialect;
use crate::types::{Payment, PaymentType};

const TYPES: &[(&str, PaymentType)] = &[
    ("VÝBĚR Z BANKOMATU", PaymentType::Card),
    ("PLATBA KARTOU", PaymentType::Card),
    ("PLATBA KARTOU S VÝBĚREM HOTOVOSTI", PaymentType::Card),
    ("INKASO / SIPO", PaymentType::Transaction),
    ("ODCHOZÍ PLATBA DO JINÉ BANKY", PaymentType::Transaction),
    ("ODCHOZÍ PLATBA DO MBANK", PaymentType::Transaction),
    ("POPL. ZA VÝBĚR Z BANKOMATU V ZAHR.", PaymentType::Fees),
    ("POPLATEK ZA VÝBĚR Z BANKOMATU V ČR", PaymentType::Fees),
    ("PŘÍCHOZÍ PLATBA Z JINÉ BANKY", PaymentType::Transaction),
    ("ZÚČTOVÁNÍ ÚROKŮ", PaymentType::Saving),
];

/// Marker opening the transaction section of the export
const HEADER_MARKER: &str = "#Datum";

/// Merchant descriptions are padded to a fixed column with spaces
const PADDING: &str = "                            ";

const COLUMNS: usize = 11;

pub struct MbankExport;

impl Extractor for MbankExport {
    const SOURCE: &'static str = "mbank-export";
    const HAS_PAYMENTS: bool = true;
}

impl MbankExport {
    pub const DIALECT: Dialect = Dialect::semicolon("iso-8859-2");

    pub fn parse<I>(rows: I) -> impl Iterator<Item = ExtractResult<Payment>>
    where
        I: IntoIterator<Item = StringRecord>,
    {
        let mut in_section = false;
        rows.into_iter().filter_map(move |row| {
            if !in_section {
                in_section =
                    row.len() > 1 && row.get(0).is_some_and(|f| f.starts_with(HEADER_MARKER));
                return None;
            }
            Self::map_row(&row).transpose()
        })
    }

    fn map_row(row: &StringRecord) -> ExtractResult<Option<Payment>> {
        if row.len() < COLUMNS {
            return Ok(None);
        }

        // columns: booking date, value date, type, description,
        // counterparty name, contra account, KS, VS, SS, amount, balance
        let mut payment = Payment::at(row_date(&row[0], "%d-%m-%Y")?);
        payment.price = parse_price(&row[9])?;

        let mut description = unquote(&row[3]);
        let mut from_name = unquote(&row[4]);
        let contra_account = unquote(&row[5]);

        if let Some(cut) = description.find(PADDING) {
            description.truncate(cut);
        }
        if description.contains('/') {
            // "MERCHANT NAME /CITY" carries the place behind the slash
            let mut segments: Vec<&str> = description.split('/').collect();
            let place = segments.pop().unwrap_or("").trim().to_string();
            from_name = segments.join("/");
            payment.place = non_empty(&place);
            description.clear();
        }

        payment.description = non_empty(&description);
        payment.detail_from = non_empty(&from_name);
        payment.account = non_empty(
            contra_account
                .trim_start_matches('0')
                .trim_start_matches('-')
                .trim_start_matches('0'),
        );
        payment.transaction_type = PaymentType::classify(TYPES, &unquote(&row[2]));

        Ok(Some(payment))
    }
}

fn unquote(field: &str) -> String {
    field.trim_matches([' ', '\''].as_slice()).to_string()
}
