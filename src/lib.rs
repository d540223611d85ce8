pub use self::{
    account::{Account, AccountError, AccountId},
    codec::CodecError,
    ledger::{EntryKind, Ledger, LedgerEntry, LedgerError},
    store::{AccountStore, StoreError, DEFAULT_CAPACITY},
};

mod account;
pub mod codec;
mod ledger;
mod store;
