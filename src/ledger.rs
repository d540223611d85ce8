use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::{codec, AccountId, CodecError};

/// Possible errors to occur while appending to the ledger
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to append an entry to the ledger file")]
    WriteFailed(#[source] std::io::Error),
    #[error(transparent)]
    Encode(#[from] CodecError),
}

/// The kind of balance-affecting event a ledger entry describes
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// An account was opened; the amount is the opening balance
    AccountCreated,
    /// A credit to the account
    Deposit,
    /// A debit to the account
    Withdraw,
    /// A credit computed from the balance and an interest rate
    InterestApplied,
}

/// One line of the ledger file
///
/// The amount is always the non-negative magnitude of the change; the
/// kind conveys the direction. Entries are immutable once written and
/// keep their append order forever.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LedgerEntry {
    account_id: AccountId,
    kind: EntryKind,
    amount: Decimal,
}

impl LedgerEntry {
    pub fn new(account_id: AccountId, kind: EntryKind, amount: Decimal) -> Self {
        Self {
            account_id,
            kind,
            amount,
        }
    }

    /// The account this entry belongs to
    ///
    /// The account is not required to still exist; the ledger keeps the
    /// history of deleted accounts.
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// The append-only ledger of balance-affecting events
///
/// The ledger holds only the path to its file. Every operation opens the
/// file, does its work and closes it again; appends never truncate
/// existing content.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Creates a ledger handle for the given file path
    ///
    /// The file itself is created lazily on the first append; a missing
    /// file simply means "no history".
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry to the end of the ledger file
    pub fn append(
        &self,
        account_id: AccountId,
        kind: EntryKind,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let entry = LedgerEntry::new(account_id, kind, amount);
        let line = codec::encode_entry(&entry)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(LedgerError::WriteFailed)?;
        writeln!(file, "{line}").map_err(LedgerError::WriteFailed)?;

        Ok(())
    }

    /// All entries for one account, in append order
    ///
    /// Re-scans the ledger file from the start on every call. A missing
    /// file yields an empty iterator; lines that fail to decode are
    /// skipped.
    pub fn entries_for(&self, account_id: AccountId) -> impl Iterator<Item = LedgerEntry> {
        let lines = match File::open(&self.path) {
            Ok(file) => Some(BufReader::new(file).lines()),
            Err(_) => None,
        };

        lines
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .filter_map(|line| match codec::decode_entry(&line) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("skipping ledger line: {err}");
                    None
                }
            })
            .filter(move |entry| entry.account_id() == account_id)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn append_keeps_order_and_filters_by_account() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("transactions.txt"));

        ledger
            .append(AccountId::from(1), EntryKind::Deposit, dec!(50))
            .unwrap();
        ledger
            .append(AccountId::from(2), EntryKind::Deposit, dec!(99))
            .unwrap();
        ledger
            .append(AccountId::from(1), EntryKind::Withdraw, dec!(20))
            .unwrap();

        let entries: Vec<_> = ledger.entries_for(AccountId::from(1)).collect();
        assert_eq!(
            entries,
            vec![
                LedgerEntry::new(AccountId::from(1), EntryKind::Deposit, dec!(50)),
                LedgerEntry::new(AccountId::from(1), EntryKind::Withdraw, dec!(20)),
            ]
        );
    }

    #[test]
    fn missing_file_means_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("transactions.txt"));
        assert_eq!(ledger.entries_for(AccountId::from(1)).count(), 0);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.txt");
        std::fs::write(&path, "1,deposit,50\nnot a ledger line\n1,withdraw,20\n").unwrap();

        let ledger = Ledger::new(&path);
        let kinds: Vec<_> = ledger
            .entries_for(AccountId::from(1))
            .map(|entry| entry.kind())
            .collect();
        assert_eq!(kinds, vec![EntryKind::Deposit, EntryKind::Withdraw]);
    }

    #[test]
    fn append_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.txt");

        let ledger = Ledger::new(&path);
        ledger
            .append(AccountId::from(1), EntryKind::Deposit, dec!(1))
            .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        ledger
            .append(AccountId::from(1), EntryKind::Deposit, dec!(2))
            .unwrap();
        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(&before));
        assert!(after.len() > before.len());
    }
}
