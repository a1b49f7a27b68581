//! UniCredit account export: semicolon-delimited, preamble skipped until
//! the `Účet` header marker, at least twenty-four columns. The own
//! account column carries only the number, so the static UniCredit bank
//! code completes it.

use csv::StringRecord;

use crate::errors::ExtractResult;
use crate::parsers::traits::Extractor;
use crate::parsers::util::{non_empty, parse_price, row_date, strip_leading_zeros};
use crate::source::Dialect;
use crate::types::{Payment, PaymentType};

/// UniCredit Bank Czech Republic routing code
pub const UCB_BANK_CODE: &str = "2700";

const TYPES: &[(&str, PaymentType)] = &[
    ("KARETNÍ TRANSAKCE", PaymentType::Card),
    ("VÝBĚR Z BANKOMATU", PaymentType::Card),
    ("PLATBA PLATEBNÍ KARTOU", PaymentType::Card),
    ("VÝBĚR Z BANKOMATU V ZAHRANIČÍ", PaymentType::Card),
    ("VKLAD BANKOMATEM", PaymentType::Card),
    ("SPRÁVA ÚVĚRU", PaymentType::Transaction),
    ("TUZEMSKÁ PLATBA ODCHOZÍ", PaymentType::Transaction),
    ("TUZEMSKÁ PLATBA PŘÍCHOZÍ", PaymentType::Transaction),
    ("POPLATKY", PaymentType::Fees),
    ("TRVALÝ PŘÍKAZ", PaymentType::Transaction),
    ("ÚROKY", PaymentType::Saving),
    ("SRÁŽKOVÁ DAŇ", PaymentType::Saving),
];

const HEADER_MARKER: &str = "Účet";

const COLUMNS: usize = 24;

pub struct UnicreditExport;

impl Extractor for UnicreditExport {
    const SOURCE: &'static str = "unicredit-export";
    const HAS_PAYMENTS: bool = true;
}

impl UnicreditExport {
    pub const DIALECT: Dialect = Dialect::semicolon("utf-8");

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
            log::debug!("{}: skipping short row ({} fields)", Self::SOURCE, row.len());
            return Ok(None);
        }

        // columns: own account, amount, currency, booking date, value
        // date, contra bank code, bank names (2), contra account,
        // counterparty name, 3 address fields, type, 5 detail fields,
        // KS, VS, SS, payment title, reference number
        let mut payment = Payment::at(row_date(&row[3], "%Y-%m-%d")?);
        payment.price = parse_price(&row[1])?;
        payment.account = non_empty(format!("{}/{}", &row[8], &row[5]).trim_matches('/'));
        payment.account_from = Some(format!("{}/{}", &row[0], UCB_BANK_CODE));
        payment.detail_from = non_empty(&row[9]);

        payment.transaction_type = PaymentType::classify(TYPES, &row[13]);
        if payment.transaction_type == PaymentType::Undefined {
            // textual fallback: fee-like prefixes classify as fees,
            // anything else is a transfer with the type text preserved
            if row[13].to_lowercase().starts_with("poplat") {
                payment.transaction_type = PaymentType::Fees;
            } else {
                payment.transaction_type = PaymentType::Transaction;
                payment.message = non_empty(&row[13]);
            }
        }
        if payment.transaction_type == PaymentType::Card {
            payment.place = non_empty(&row[18]);
        }

        payment.description = non_empty(format!("{} {} {}", &row[14], &row[15], &row[16]).trim());
        payment.constant_symbol = non_empty(&row[19]);
        payment.variable_symbol = non_empty(strip_leading_zeros(&row[20]));
        payment.specific_symbol = non_empty(&row[21]);

        Ok(Some(payment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn data_row() -> Vec<String> {
        let mut fields = vec![String::new(); COLUMNS];
        fields[0] = "2112345678".to_string();
        fields[1] = "-1500,00".to_string();
        fields[2] = "CZK".to_string();
        fields[3] = "2024-03-15".to_string();
        fields[4] = "2024-03-15".to_string();
        fields[5] = "0100".to_string();
        fields[6] = "Komerční banka".to_string();
        fields[8] = "987654321".to_string();
        fields[9] = "Jan Novák".to_string();
        fields[13] = "TUZEMSKÁ PLATBA ODCHOZÍ".to_string();
        fields[14] = "nájem".to_string();
        fields[15] = "březen".to_string();
        fields[19] = "0308".to_string();
        fields[20] = "00001234".to_string();
        fields[21] = "9".to_string();
        fields
    }

    fn parse_one(fields: Vec<String>) -> Payment {
        let rows = vec![
            StringRecord::from(vec!["výpis", "za období"]),
            StringRecord::from(vec!["Účet", "Částka", "Měna"]),
            StringRecord::from(fields),
        ];
        let mut payments: Vec<_> = UnicreditExport::parse(rows)
            .collect::<ExtractResult<Vec<_>>>()
            .unwrap();
        assert_eq!(payments.len(), 1);
        payments.remove(0)
    }

    #[test]
    fn test_domestic_transfer_row() {
        let payment = parse_one(data_row());
        assert_eq!(payment.transaction_type, PaymentType::Transaction);
        assert_eq!(payment.price, Decimal::from_str("-1500.00").unwrap());
        assert_eq!(payment.account.as_deref(), Some("987654321/0100"));
        assert_eq!(payment.account_from.as_deref(), Some("2112345678/2700"));
        assert_eq!(payment.detail_from.as_deref(), Some("Jan Novák"));
        assert_eq!(payment.description.as_deref(), Some("nájem březen"));
        assert_eq!(payment.constant_symbol.as_deref(), Some("0308"));
        assert_eq!(payment.variable_symbol.as_deref(), Some("1234"));
        assert_eq!(payment.specific_symbol.as_deref(), Some("9"));
        assert_eq!(
            payment.date.date(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_card_row_takes_place_from_detail() {
        let mut fields = data_row();
        fields[13] = "PLATBA PLATEBNÍ KARTOU".to_string();
        fields[18] = "PRAHA 1".to_string();
        let payment = parse_one(fields);
        assert_eq!(payment.transaction_type, PaymentType::Card);
        assert_eq!(payment.place.as_deref(), Some("PRAHA 1"));
    }

    #[rstest]
    #[case("Poplatek za vedení účtu", PaymentType::Fees, None)]
    #[case("NĚCO ÚPLNĚ NOVÉHO", PaymentType::Transaction, Some("NĚCO ÚPLNĚ NOVÉHO"))]
    fn test_unmatched_type_fallback(
        #[case] raw_type: &str,
        #[case] expected: PaymentType,
        #[case] message: Option<&str>,
    ) {
        let mut fields = data_row();
        fields[13] = raw_type.to_string();
        let payment = parse_one(fields);
        assert_eq!(payment.transaction_type, expected);
        assert_eq!(payment.message.as_deref(), message);
    }

    #[test]
    fn test_missing_contra_account_collapses() {
        let mut fields = data_row();
        fields[5] = String::new();
        fields[8] = String::new();
        let payment = parse_one(fields);
        assert!(payment.account.is_none());
    }

    #[test]
    fn test_preamble_and_short_rows_are_skipped() {
        let rows = vec![
            StringRecord::from(vec!["výpis", "za období"]),
            StringRecord::from(vec!["Účet", "Částka"]),
            StringRecord::from(vec!["2112345678", "-1,00"]),
        ];
        let payments: Vec<_> = UnicreditExport::parse(rows)
            .collect::<ExtractResult<Vec<_>>>()
            .unwrap();
        assert!(payments.is_empty());
    }
}
