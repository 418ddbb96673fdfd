use std::{fs::File, path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use dialoguer::Confirm;
use thiserror::Error;

use super::output::{self, MessageKind};
use super::view::{TransactionRow, View};
use crate::backup::{
    BackupLocation, BackupReceipt, BackupResult, BackupService, BackupSnapshot, BackupStatus,
    DownloadSink, FolderHandle, FsFolderProvider, Outcome, Picker, RestoreSummary, StatusKind,
};
use crate::config::ConfigManager;
use crate::core::ledger_manager::LedgerManager;
use crate::core::time::{Clock, SystemClock};
use crate::core::utils::PathResolver;
use crate::engine::TransactionFilter;
use crate::errors::LedgerError;
use crate::ledger::{Transaction, TransactionKind};
use crate::storage::JsonFileStore;
use crate::utils::build_info;

const USAGE: &str = "\
Usage: quick_money_cli [--user <id>] [--yes] <command> [args]

Commands:
  summary                               balances, today's spending and this month
  list                                  transactions, newest first
  add <income|expense> <amount> <category> <account> [--date YYYY-MM-DD] [--note <text>]
  add transfer <amount> <from> <to> [--fee <amount>] [--date YYYY-MM-DD] [--note <text>]
  remove <id>                           delete a transaction
  budgets                               budget consumption this month
  trend                                 six-month history and three-month projection
  backup                                write a backup (folder, else downloads)
  backups                               list backups in the folder
  restore <file>                        restore a backup from the folder
  restore-file <path>                   restore a backup from any file
  set-folder <path>                     choose the backup folder
  clear-folder                          forget the backup folder
  export <out.csv>                      export transactions as CSV
  version                               build information";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0} (run `quick_money_cli help` for usage)")]
    Usage(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    Version,
    Summary,
    List,
    Add(Transaction),
    Remove(i64),
    Budgets,
    Trend,
    Backup,
    Backups,
    Restore(String),
    RestoreFile(PathBuf),
    SetFolder(PathBuf),
    ClearFolder,
    Export(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    user: Option<String>,
    assume_yes: bool,
    command: Command,
}

/// Picker answering with a path given on the command line.
struct ArgPicker(PathBuf);

impl Picker for ArgPicker {
    fn pick_folder(&self) -> Option<FolderHandle> {
        Some(FolderHandle::from_path(self.0.clone()))
    }

    fn pick_file(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Runs one command and returns the process exit code.
pub fn run_cli(args: Vec<String>) -> Result<i32, CliError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let invocation = parse(&args, clock.today())?;
    match invocation.command {
        Command::Help => {
            println!("{}", USAGE);
            return Ok(0);
        }
        Command::Version => {
            println!("{}", build_info::current().summary());
            return Ok(0);
        }
        _ => {}
    }

    let base = PathResolver::base_dir();
    let configs = ConfigManager::with_base_dir(base.clone())?;
    let config = configs.load()?;
    let user = invocation
        .user
        .clone()
        .unwrap_or_else(|| config.default_user.clone());
    let store = JsonFileStore::new(Some(base.clone()))?;
    let mut session = LedgerManager::open(Box::new(store), &user, clock)?;

    for warning in &session.open_report().warnings {
        output::warning(format!("Loaded defaults for {}", warning));
    }
    let generated = session.open_report().generated.len();
    if generated > 0 {
        output::print(
            MessageKind::Info,
            format!("Generated {} recurring transaction(s)", generated),
        );
    }

    let backups = BackupService::new(
        Box::new(FsFolderProvider),
        Box::new(configs),
        DownloadSink::default_in(&base),
        config.app_prefix.clone(),
    )
    .with_retention(config.retention);

    let view = execute(invocation, &mut session, &backups)?;
    print!("{}", view.render(&config.currency));
    Ok(match &view {
        View::Status(BackupStatus {
            kind: StatusKind::Error,
            ..
        }) => 1,
        _ => 0,
    })
}

fn execute(
    invocation: Invocation,
    session: &mut LedgerManager,
    backups: &BackupService,
) -> Result<View, CliError> {
    let view = match invocation.command {
        Command::Help | Command::Version => View::Status(BackupStatus::info(USAGE)),
        Command::Summary => View::Summary {
            view: session.view(),
            drift: session.drift(),
        },
        Command::List => View::Transactions(
            session
                .transactions(&TransactionFilter::new())
                .into_iter()
                .map(|txn| TransactionRow::resolve(session.ledger(), txn))
                .collect(),
        ),
        Command::Add(transaction) => {
            let id = session.add_transaction(transaction)?;
            View::Status(BackupStatus::success(format!("Added transaction {}", id)))
        }
        Command::Remove(id) => {
            session.remove_transaction(id)?;
            View::Status(BackupStatus::success(format!("Removed transaction {}", id)))
        }
        Command::Budgets => View::Budgets(session.view().budgets),
        Command::Trend => View::Trend(session.view().forecast),
        Command::Backup => {
            let result = session.backup(backups).map(Outcome::Completed);
            View::Status(BackupStatus::from_result(&result, describe_receipt))
        }
        Command::Backups => match backups.list() {
            Ok(names) => View::Backups(names),
            Err(err) => View::Status(BackupStatus::from_error(&err)),
        },
        Command::Restore(name) => {
            let result = backups
                .read(&name)
                .and_then(|snapshot| restore(session, backups, &snapshot, invocation.assume_yes));
            View::Status(BackupStatus::from_result(&result, describe_restore))
        }
        Command::RestoreFile(path) => {
            let assume_yes = invocation.assume_yes;
            let confirm = |snapshot: &BackupSnapshot| assume_yes || confirm_restore(snapshot);
            let result = session.restore_picked(backups, &ArgPicker(path), &confirm);
            View::Status(BackupStatus::from_result(&result, describe_restore))
        }
        Command::SetFolder(path) => {
            let result = backups.pick_folder(&ArgPicker(path));
            View::Status(BackupStatus::from_result(&result, |name| {
                format!("Backup folder set to {}", name)
            }))
        }
        Command::ClearFolder => {
            let result = backups.clear_folder().map(Outcome::Completed);
            View::Status(BackupStatus::from_result(&result, |_| {
                "Backup folder cleared".to_string()
            }))
        }
        Command::Export(path) => {
            let file = File::create(&path)?;
            let rows = session.export_csv(file)?;
            View::Status(BackupStatus::success(format!(
                "Exported {} transaction(s) to {}",
                rows,
                path.display()
            )))
        }
    };
    Ok(view)
}

fn restore(
    session: &mut LedgerManager,
    backups: &BackupService,
    snapshot: &BackupSnapshot,
    assume_yes: bool,
) -> BackupResult<Outcome<RestoreSummary>> {
    let confirm = |snapshot: &BackupSnapshot| assume_yes || confirm_restore(snapshot);
    session.restore(backups, snapshot, &confirm)
}

/// Asks before overwriting; a closed or missing terminal counts as "no".
fn confirm_restore(snapshot: &BackupSnapshot) -> bool {
    let count = snapshot.transactions.as_ref().map_or(0, Vec::len);
    Confirm::new()
        .with_prompt(format!(
            "Replace all current data with this backup ({} transactions)?",
            count
        ))
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn describe_receipt(receipt: &BackupReceipt) -> String {
    match &receipt.location {
        BackupLocation::Folder { folder } => {
            format!("Backed up to {}/{}", folder, receipt.file_name)
        }
        BackupLocation::Download { path } => format!("Backup saved to {}", path.display()),
    }
}

fn describe_restore(summary: &RestoreSummary) -> String {
    let restored: Vec<&str> = summary.restored.iter().map(|c| c.suffix()).collect();
    let mut message = format!("Restored {}", restored.join(", "));
    if !summary.kept.is_empty() {
        let kept: Vec<&str> = summary.kept.iter().map(|c| c.suffix()).collect();
        message.push_str(&format!("; kept current {}", kept.join(", ")));
    }
    message
}

fn parse(args: &[String], today: NaiveDate) -> Result<Invocation, CliError> {
    let mut user = None;
    let mut assume_yes = false;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--user" => {
                let id = iter
                    .next()
                    .ok_or_else(|| CliError::Usage("--user needs an id".into()))?;
                user = Some(id.clone());
            }
            "--yes" | "-y" => assume_yes = true,
            _ => rest.push(arg.as_str()),
        }
    }

    let (name, params) = match rest.split_first() {
        Some((name, params)) => (*name, params),
        None => ("help", &[][..]),
    };
    let command = match (name, params) {
        ("help" | "--help" | "-h", _) => Command::Help,
        ("version" | "--version", []) => Command::Version,
        ("summary", []) => Command::Summary,
        ("list", []) => Command::List,
        ("add", params) => Command::Add(parse_add(params, today)?),
        ("remove", [id]) => Command::Remove(
            id.parse()
                .map_err(|_| CliError::Usage(format!("`{}` is not a transaction id", id)))?,
        ),
        ("budgets", []) => Command::Budgets,
        ("trend", []) => Command::Trend,
        ("backup", []) => Command::Backup,
        ("backups", []) => Command::Backups,
        ("restore", [file]) => Command::Restore(file.to_string()),
        ("restore-file", [path]) => Command::RestoreFile(PathBuf::from(*path)),
        ("set-folder", [path]) => Command::SetFolder(PathBuf::from(*path)),
        ("clear-folder", []) => Command::ClearFolder,
        ("export", [path]) => Command::Export(PathBuf::from(*path)),
        (other, _) => return Err(CliError::Usage(format!("unrecognized command `{}`", other))),
    };
    Ok(Invocation {
        user,
        assume_yes,
        command,
    })
}

fn parse_add(params: &[&str], today: NaiveDate) -> Result<Transaction, CliError> {
    let mut positional = Vec::new();
    let mut date = today;
    let mut note = None;
    let mut fee = None;
    let mut iter = params.iter();
    while let Some(param) = iter.next() {
        match *param {
            "--date" => {
                let raw = flag_value(&mut iter, "--date")?;
                date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| CliError::Usage(format!("`{}` is not a YYYY-MM-DD date", raw)))?;
            }
            "--note" => note = Some(flag_value(&mut iter, "--note")?.to_string()),
            "--fee" => fee = Some(parse_amount(flag_value(&mut iter, "--fee")?)?),
            other => positional.push(other),
        }
    }

    let transaction = match positional.as_slice() {
        ["transfer", amount, from, to] => {
            Transaction::new(TransactionKind::Transfer, parse_amount(amount)?, "", *from, date)
                .transfer_to(*to, fee)
        }
        [kind @ ("income" | "expense"), amount, category, account] => {
            if fee.is_some() {
                return Err(CliError::Usage("--fee only applies to transfers".into()));
            }
            let kind = if *kind == "income" {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            };
            Transaction::new(kind, parse_amount(amount)?, *category, *account, date)
        }
        _ => return Err(CliError::Usage("add: wrong arguments".into())),
    };
    Ok(match note {
        Some(note) => transaction.with_note(note),
        None => transaction,
    })
}

fn flag_value<'a>(iter: &mut std::slice::Iter<'_, &'a str>, flag: &str) -> Result<&'a str, CliError> {
    iter.next()
        .copied()
        .ok_or_else(|| CliError::Usage(format!("{} needs a value", flag)))
}

fn parse_amount(raw: &str) -> Result<f64, CliError> {
    raw.parse()
        .map_err(|_| CliError::Usage(format!("`{}` is not an amount", raw)))
}
