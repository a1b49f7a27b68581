use bank_notify_rs::ExportBuilder;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let Some(file_path) = args.get(1) else {
        eprintln!("usage: parse_export <export.csv>");
        std::process::exit(2);
    };

    let payments = ExportBuilder::new().path(file_path).parse()?;

    println!("Found {} payments\n", payments.len());

    for (i, payment) in payments.iter().take(10).enumerate() {
        println!("Payment {}:", i + 1);
        println!("  Date: {}", payment.date);
        println!("  Price: {}", payment.price);
        println!("  Type: {:?}", payment.transaction_type);
        println!(
            "  From: {}",
            payment.detail_from.as_deref().unwrap_or("N/A")
        );
        if let Some(account) = &payment.account {
            println!("  Account: {}", account);
        }
        if let Some(vs) = &payment.variable_symbol {
            println!("  VS: {}", vs);
        }
        println!();
    }

    if payments.len() > 10 {
        println!("... and {} more payments", payments.len() - 10);
    }

    Ok(())
}
