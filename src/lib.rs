//! Normalize Czech bank notification emails and account export files
//! into payment and balance records.
//!
//! ```rust,ignore
//! use bank_notify_rs::{ExportBuilder, MailFormat};
//!
//! // export file from disk
//! let payments = ExportBuilder::new()
//!     .path("vypis.csv")
//!     .parse()?;
//!
//! // already-fetched mailbox batch
//! let payments = MailFormat::Csob.collect_payments(&mut source)?;
//! ```
//!
//! Message acquisition (IMAP login, searching, flagging) and file opening
//! stay outside this crate; the strategies consume an already-fetched
//! batch of messages or already-split export rows through the contracts
//! in [`source`].

mod builder;
mod types;

pub mod content;
pub mod errors;
pub mod parsers;
pub mod source;

pub use builder::{ExportBuilder, ExportFormat, MailFormat};
pub use errors::{ExtractError, ExtractResult};
pub use parsers::prelude::*;
pub use types::{Balance, Payment, PaymentType};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FetchedMail, MemorySource, MessagePart};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    // end to end: an ATM withdrawal row must come out as a negative card
    // payment
    #[test]
    fn test_export_row_to_card_payment() {
        let content = "\
Číslo účtu;IBAN;Protiúčet;Název protiúčtu;Datum zaúčtování;Datum valuty;Částka;Detail;Popis;Kategorie;Kód\r\n\
123456/6100;CZ65;;;15.03.2024;15.03.2024;-150,00;Výběr z bankomatu;;;\r\n";

        let payments = ExportBuilder::new()
            .content(content.as_bytes())
            .format(ExportFormat::Equa)
            .parse()
            .unwrap();

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].price, Decimal::from_str("-150.0").unwrap());
        assert_eq!(payments[0].transaction_type, PaymentType::Card);
    }

    // end to end: symbol lines populate the payment symbols, variable
    // symbol without its leading zeros
    #[test]
    fn test_symbol_lines_to_payment_symbols() {
        let body = "dne 15.03.2024 byla na účtu 123456789/0300 zaúčtována transakce TPS:\n\
částka 100,00 CZK\n\
KS 0308\n\
VS 00001234\n\
Zůstatek na účtu 123456789/0300 je 1.000,00 CZK\n\
:::::::::::::\n";
        let mail = FetchedMail::new(1)
            .with_subject("Info 24 - Avízo")
            .with_date("Fri, 15 Mar 2024 08:05:00 +0100")
            .with_part(MessagePart::text_plain(body));
        let mut source = MemorySource::new(vec![mail]);

        let payments = MailFormat::Csob.collect_payments(&mut source).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].constant_symbol.as_deref(), Some("0308"));
        assert_eq!(payments[0].variable_symbol.as_deref(), Some("1234"));
    }

    // end to end: a balance mail with an unparsable stated date falls
    // back to the message's own timestamp instead of raising
    #[test]
    fn test_balance_date_falls_back_to_message_timestamp() {
        let body = "Disponibilní částka účtu 123456/6100 se změnila.\n\
Zůstatek se dne vcera vecer změnil na 500,00 CZK.\n";
        let mail = FetchedMail::new(1)
            .with_date("Tue, 19 Mar 2024 07:30:00 +0100")
            .with_part(MessagePart::text_plain(body));
        let mut source = MemorySource::new(vec![mail]);

        let balances = MailFormat::Equa.collect_balances(&mut source).unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(
            balances[0].date,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 19)
                .unwrap()
                .and_hms_opt(7, 30, 0)
        );
    }

    // one shared mailbox, two passes: the payments pass leaves balance
    // mail unseen for the balance pass
    #[test]
    fn test_passes_share_one_mailbox() {
        let advice = FetchedMail::new(1)
            .with_subject("Info 24 - Avízo")
            .with_date("Fri, 15 Mar 2024 08:05:00 +0100")
            .with_part(MessagePart::text_plain(
                "dne 15.03.2024 byla na účtu 1/0300 zaúčtována transakce TPS:\n\
částka 10,00 CZK\n\
Zůstatek na účtu 1/0300 je 1,00 CZK\n\
:::::::::::::\n",
            ));
        let other = FetchedMail::new(2)
            .with_subject("Info 24 - Zůstatek")
            .with_date("Fri, 15 Mar 2024 08:06:00 +0100")
            .with_part(MessagePart::text_plain("zůstatek 1,00 CZK\n"));
        let mut source = MemorySource::new(vec![advice, other]);

        let payments = MailFormat::Csob.collect_payments(&mut source).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(source.kept_unseen(), &[2]);
    }
}
