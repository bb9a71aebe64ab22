mod commands;

use anyhow::{Context, Result};
use bank_account::{Bank, SqliteAccountStore};
use commands::{Args, Command, Parser};

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Open the store and the bank over it
    let store = SqliteAccountStore::open(&args.db)
        .with_context(|| format!("Failed to open database: {}", args.db.display()))?;
    let mut bank = Bank::new(store);

    // 2. Run the requested command
    match args.command {
        Command::Create { id, currency } => {
            bank.create_account(id, &currency)
                .with_context(|| format!("Failed to create account {id}"))?;
        }
        Command::Pay {
            account,
            kind,
            amount,
            currency,
        } => {
            let recorded = bank
                .submit_payment(account, kind, &amount, &currency)
                .with_context(|| format!("Failed to process {kind} on account {account}"))?;
            log::info!("Payment processed: {kind} {}", recorded.amount());
        }
        Command::Balance { account } => {
            let balance = bank
                .balance(account)
                .with_context(|| format!("Failed to read balance of account {account}"))?;
            let mut csv_writer = csv::Writer::from_writer(std::io::stdout());
            csv_writer.serialize(&balance)?;
            csv_writer.flush()?;
        }
        Command::History { account } => {
            bank.export_history(account, std::io::stdout())
                .with_context(|| format!("Failed to export history of account {account}"))?;
        }
        Command::Import { input_file } => {
            log::info!("Processing payments from {}", input_file.display());
            let file = std::fs::File::open(&input_file).with_context(|| {
                format!("Failed to open input file: {}", input_file.display())
            })?;
            bank.process_payments(file)
                .context("Failed to process payments")?;
        }
    }

    Ok(())
}
