//! Runs the ČSOB payments pass over a hand-built message batch, the way
//! an acquisition layer would hand one over after fetching a mailbox.

use bank_notify_rs::source::{FetchedMail, MemorySource, MessagePart};
use bank_notify_rs::MailFormat;

const ADVICE_BODY: &str = "Vážená paní klientko,\n\
\n\
dne 15.03.2024 byla na účtu 123456789/0300 zaúčtována transakce TPS:\n\
částka 1234,56 CZK\n\
na účet 987654-321/0100\n\
KS 0308\n\
VS 00001234\n\
Zůstatek na účtu 123456789/0300 je 10.000,00 CZK\n\
:::::::::::::\n\
Obchodní sdělení.\n";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let advice = FetchedMail::new(1)
        .with_subject("Info 24 - Avízo")
        .with_date("Fri, 15 Mar 2024 08:05:00 +0100")
        .with_part(MessagePart::text_plain(ADVICE_BODY));
    let balance = FetchedMail::new(2)
        .with_subject("Info 24 - Zůstatek")
        .with_date("Fri, 15 Mar 2024 08:06:00 +0100")
        .with_part(MessagePart::text_plain("zůstatek 10.000,00 CZK\n"));

    let mut source = MemorySource::new(vec![advice, balance]);

    let payments = MailFormat::Csob.collect_payments(&mut source)?;

    println!("Found {} payments", payments.len());
    for payment in &payments {
        println!(
            "  {} {} -> {} (VS {})",
            payment.date,
            payment.price,
            payment.account.as_deref().unwrap_or("?"),
            payment.variable_symbol.as_deref().unwrap_or("-"),
        );
    }

    println!(
        "Left unseen for the balance pass: {:?}",
        source.kept_unseen()
    );

    Ok(())
}
