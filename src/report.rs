use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;
use toyledger::account::AccountId;
use toyledger::account::AccountStore;
use toyledger::engine::AuditReport;
use toyledger::engine::LedgerEngine;
use toyledger::ledger::LedgerStore;
use tracing::error;

/// Audits every account in `account_ids`, returning the reports of those that passed and how many failed.
///
/// A failed audit is logged and does not prevent the others from being reported.
pub fn audit_all<A, L>(engine: &LedgerEngine<A, L>, account_ids: &[AccountId]) -> (Vec<AuditReport>, usize)
where
    A: AccountStore,
    L: LedgerStore,
{
    let mut reports = Vec::with_capacity(account_ids.len());
    let mut failed = 0;
    for account_id in account_ids {
        match engine.audit(account_id) {
            Ok(report) => reports.push(report),
            Err(error) => {
                error!(%account_id, %error, "failed to audit account");
                failed += 1;
            }
        }
    }
    (reports, failed)
}

/// Writes the supplied [`AuditReport`]s to stdout as CSV in ascending `account` order.
pub fn write_csv_to_stdout<I>(reports: I) -> color_eyre::Result<()>
where
    I: IntoIterator<Item = AuditReport>,
{
    let mut reports: Vec<AuditReport> = reports.into_iter().collect();
    reports.sort_unstable_by(|a, b| a.account_id.cmp(&b.account_id));

    let mut writer = Writer::from_writer(std::io::stdout());
    for report in reports {
        writer.serialize(AccountReport::from(report))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct AccountReport {
    account: AccountId,
    #[serde(with = "rust_decimal::serde::str")]
    balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    deposited: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    withdrawn: Decimal,
    transactions: usize,
}

impl From<AuditReport> for AccountReport {
    fn from(report: AuditReport) -> Self {
        Self {
            account: report.account_id,
            balance: report.balance,
            deposited: report.deposited,
            withdrawn: report.withdrawn,
            transactions: report.records,
        }
    }
}
