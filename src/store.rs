use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::{
    account, codec, Account, AccountError, AccountId, CodecError, EntryKind, Ledger, LedgerEntry,
    LedgerError,
};

/// The default maximum number of live accounts
pub const DEFAULT_CAPACITY: usize = 100;

/// Possible errors to occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("There's already an account with id {0}")]
    DuplicateId(AccountId),
    #[error("No account with id {0} was found")]
    NotFound(AccountId),
    #[error("The store has reached its capacity")]
    StoreFull,
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("failed to write the snapshot file")]
    SnapshotWriteFailed(#[source] std::io::Error),
    #[error("failed to read the snapshot file")]
    SnapshotReadFailed(#[source] std::io::Error),
}

/// The central store of all live account records
///
/// The store is the sole owner of record lifetime and the sole writer of
/// the snapshot file. Records keep their insertion order. Every mutating
/// operation rewrites the snapshot file in full; balance-affecting
/// operations additionally append one entry to the ledger. When a persist
/// fails, the in-memory mutation stays applied and the error tells the
/// caller the state is accepted but not yet durable; `persist` can be
/// retried.
#[derive(Debug)]
pub struct AccountStore {
    accounts: Vec<Account>,
    capacity: usize,
    snapshot_path: PathBuf,
    ledger: Ledger,
}

impl AccountStore {
    /// Creates an empty store backed by the given snapshot file
    pub fn new(snapshot_path: impl Into<PathBuf>, ledger: Ledger) -> Self {
        Self {
            accounts: Vec::new(),
            capacity: DEFAULT_CAPACITY,
            snapshot_path: snapshot_path.into(),
            ledger,
        }
    }

    /// Overrides the maximum number of live accounts
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Creates a store and loads the snapshot file once
    ///
    /// A missing snapshot file means an empty store, not an error.
    pub fn open(snapshot_path: impl Into<PathBuf>, ledger: Ledger) -> Result<Self, StoreError> {
        let mut store = Self::new(snapshot_path, ledger);
        store.load()?;
        Ok(store)
    }

    /// Creates a new account record
    ///
    /// The opening balance is logged to the ledger as an
    /// [`EntryKind::AccountCreated`] entry.
    pub fn create(
        &mut self,
        id: AccountId,
        holder: impl Into<String>,
        balance: Decimal,
    ) -> Result<&Account, StoreError> {
        if self.accounts.len() >= self.capacity {
            return Err(StoreError::StoreFull);
        }
        if self.position(id).is_some() {
            return Err(StoreError::DuplicateId(id));
        }
        account::check_non_negative(balance)?;

        self.accounts.push(Account::new(id, holder, balance));
        self.ledger.append(id, EntryKind::AccountCreated, balance)?;
        self.persist()?;

        // pushed right above, so the slot is always there
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    /// Looks up the account with the given id
    pub fn find(&self, id: AccountId) -> Result<&Account, StoreError> {
        self.accounts
            .iter()
            .find(|account| account.id() == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// All live accounts in insertion order
    pub fn find_all(&self) -> &[Account] {
        &self.accounts
    }

    /// Replaces the holder name of an account
    pub fn update_holder(
        &mut self,
        id: AccountId,
        holder: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.find_mut(id)?.set_holder(holder);
        self.persist()
    }

    /// Removes an account record
    ///
    /// The remaining records keep their relative order. The account's
    /// ledger history is retained.
    pub fn delete(&mut self, id: AccountId) -> Result<(), StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        self.accounts.remove(index);
        self.persist()
    }

    /// Deposits the specified amount on an account
    pub fn deposit(&mut self, id: AccountId, amount: Decimal) -> Result<(), StoreError> {
        self.find_mut(id)?.deposit(amount)?;
        self.ledger.append(id, EntryKind::Deposit, amount)?;
        self.persist()
    }

    /// Withdraws the specified amount from an account
    ///
    /// A rejected withdrawal leaves the balance unchanged, appends nothing
    /// to the ledger and does not rewrite the snapshot.
    pub fn withdraw(&mut self, id: AccountId, amount: Decimal) -> Result<(), StoreError> {
        self.find_mut(id)?.withdraw(amount)?;
        self.ledger.append(id, EntryKind::Withdraw, amount)?;
        self.persist()
    }

    /// Credits interest of `balance * rate` to an account
    pub fn apply_interest(&mut self, id: AccountId, rate: Decimal) -> Result<(), StoreError> {
        account::check_non_negative(rate)?;

        let account = self.find_mut(id)?;
        let interest = account.balance() * rate;
        account.deposit(interest)?;
        self.ledger.append(id, EntryKind::InterestApplied, interest)?;
        self.persist()
    }

    /// The ledger history of one account, in append order
    ///
    /// Works for deleted accounts as well; the ledger outlives the record.
    pub fn history_for(&self, id: AccountId) -> impl Iterator<Item = LedgerEntry> {
        self.ledger.entries_for(id)
    }

    /// Rewrites the snapshot file with every live record
    ///
    /// This is a full rewrite, O(n) per call, and idempotent; it is safe
    /// to call after every mutation and to retry after a failure.
    pub fn persist(&self) -> Result<(), StoreError> {
        let mut file =
            File::create(&self.snapshot_path).map_err(StoreError::SnapshotWriteFailed)?;
        for account in &self.accounts {
            let line = codec::encode_account(account)?;
            writeln!(file, "{line}").map_err(StoreError::SnapshotWriteFailed)?;
        }

        log::debug!(
            "wrote snapshot of {} records to {}",
            self.accounts.len(),
            self.snapshot_path.display()
        );
        Ok(())
    }

    /// Clears the store and repopulates it from the snapshot file
    ///
    /// Malformed lines are skipped individually, as are lines repeating
    /// an already loaded id and lines beyond capacity; loading always
    /// continues with the remaining lines.
    pub fn load(&mut self) -> Result<(), StoreError> {
        self.accounts.clear();

        let file = match File::open(&self.snapshot_path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(StoreError::SnapshotReadFailed(err)),
        };

        for line in BufReader::new(file).lines() {
            let line = line.map_err(StoreError::SnapshotReadFailed)?;
            if line.trim().is_empty() {
                continue;
            }

            let account = match codec::decode_account(&line) {
                Ok(account) => account,
                Err(err) => {
                    log::warn!("skipping snapshot line: {err}");
                    continue;
                }
            };
            if self.position(account.id()).is_some() {
                log::warn!("skipping snapshot line with duplicate id {}", account.id());
                continue;
            }
            if self.accounts.len() >= self.capacity {
                log::warn!("snapshot holds more records than capacity, truncating");
                break;
            }

            self.accounts.push(account);
        }

        Ok(())
    }

    /// The path of the snapshot file
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn position(&self, id: AccountId) -> Option<usize> {
        self.accounts.iter().position(|account| account.id() == id)
    }

    fn find_mut(&mut self, id: AccountId) -> Result<&mut Account, StoreError> {
        self.accounts
            .iter_mut()
            .find(|account| account.id() == id)
            .ok_or(StoreError::NotFound(id))
    }
}
