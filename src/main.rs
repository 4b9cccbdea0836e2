use std::process::ExitCode;

use color_eyre::eyre::OptionExt as _;
use csv::ReaderBuilder;
use csv::Trim;
use toyledger::account::AccountId;
use toyledger::account::InMemoryAccountStore;
use toyledger::command::Command;
use toyledger::config::LedgerConfig;
use toyledger::engine::LedgerEngine;
use toyledger::identity::CredentialAlreadyRegistered;
use toyledger::identity::TokenTable;
use toyledger::ledger::InMemoryLedgerStore;
use toyledger::service::AuthenticatedLedger;
use tracing::error;
use tracing::info;

mod report;

type Ledger = AuthenticatedLedger<TokenTable, InMemoryAccountStore, InMemoryLedgerStore>;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let config = LedgerConfig::load()?;
    toyledger::logging::init(&config.log)?;

    let commands_file_path = std::env::args().nth(1).ok_or_eyre("no commands CSV supplied")?;
    let mut commands_file_reader = ReaderBuilder::new().trim(Trim::All).from_path(commands_file_path)?;

    let ledger = Ledger::new(
        TokenTable::new(),
        LedgerEngine::new(
            InMemoryAccountStore::new(),
            InMemoryLedgerStore::new(),
            config.retry,
            config.history,
        ),
    );

    let mut opened_accounts = Vec::new();
    let mut failed_rows = 0_usize;

    for (row, command_res) in commands_file_reader.deserialize::<Command>().enumerate() {
        let command = match command_res {
            Ok(command) => command,
            Err(error) => {
                error!(row, %error, "failed to deserialize command");
                failed_rows += 1;
                continue;
            }
        };

        if let Err(error) = execute(&ledger, command, &mut opened_accounts) {
            error!(row, %error, "failed to execute command");
            failed_rows += 1;
        }
    }

    let (reports, failed_audits) = report::audit_all(ledger.engine(), &opened_accounts);
    failed_rows += failed_audits;
    report::write_csv_to_stdout(reports)?;

    if failed_rows > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn execute(ledger: &Ledger, command: Command, opened_accounts: &mut Vec<AccountId>) -> color_eyre::Result<()> {
    match command {
        Command::Open { account, token } => {
            // Checked upfront so that a rejected row opens no account.
            if ledger.resolver().is_registered(&token) {
                return Err(CredentialAlreadyRegistered.into());
            }
            let account_id = ledger.open_account(&account)?;
            ledger.resolver().register(token, account_id.clone())?;
            info!(%account_id, "account opened");
            opened_accounts.push(account_id);
        }
        Command::Deposit { token, amount } => {
            let balance = ledger.deposit(&token, amount)?;
            info!(%amount, %balance, "deposit applied");
        }
        Command::Withdraw { token, amount } => {
            let balance = ledger.withdraw(&token, amount)?;
            info!(%amount, %balance, "withdrawal applied");
        }
        Command::Balance { token } => {
            let balance = ledger.balance(&token)?;
            info!(%balance, "balance");
        }
        Command::History { token, limit } => {
            for record in ledger.history(&token, limit)? {
                info!(%record, occurred_at = %record.occurred_at, "history");
            }
        }
    }
    Ok(())
}
