use rust_decimal::Decimal;

/// Possible errors to occur during account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("The amount must not be negative")]
    NegativeAmount,
    #[error("The account does not hold enough funds")]
    InsufficientFunds,
}

/// The unique identifier of an account
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash)]
pub struct AccountId(u32);

impl From<u32> for AccountId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A bank account record
///
/// The record is the unit of the snapshot file: one line per account,
/// fields in the order `id, holder, balance`. The id is assigned by the
/// caller and never changes; the holder name and the balance are mutable,
/// the balance only through [`Account::deposit`] and [`Account::withdraw`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    id: AccountId,
    holder: String,
    balance: Decimal,
}

impl Account {
    /// Creates a new account record with the specified opening balance
    pub fn new(id: AccountId, holder: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id,
            holder: holder.into(),
            balance,
        }
    }

    /// The identifier of the account
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// The name of the account holder
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Replaces the holder name
    pub fn set_holder(&mut self, holder: impl Into<String>) {
        self.holder = holder.into();
    }

    /// The current balance of the account
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Deposits the specified amount on the account
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        check_non_negative(amount)?;
        self.balance += amount;

        Ok(())
    }

    /// Withdraws the specified amount from the account
    ///
    /// A withdrawal exceeding the balance is rejected and leaves the
    /// balance unchanged; the balance never goes negative.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        check_non_negative(amount)?;
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds);
        }
        self.balance -= amount;

        Ok(())
    }
}

pub(crate) fn check_non_negative(amount: Decimal) -> Result<(), AccountError> {
    match amount.is_sign_negative() && !amount.is_zero() {
        false => Ok(()),
        true => Err(AccountError::NegativeAmount),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn deposit_adds_to_balance() {
        let mut account = Account::new(AccountId::from(1), "Alice", dec!(100));
        account.deposit(dec!(50)).unwrap();
        assert_eq!(account.balance(), dec!(150));
    }

    #[test]
    fn withdraw_subtracts_from_balance() {
        let mut account = Account::new(AccountId::from(1), "Alice", dec!(100));
        account.withdraw(dec!(30)).unwrap();
        assert_eq!(account.balance(), dec!(70));
    }

    #[test]
    fn withdraw_more_than_balance_is_rejected() {
        let mut account = Account::new(AccountId::from(1), "Alice", dec!(100));
        let err = account.withdraw(dec!(100.01)).unwrap_err();
        assert!(matches!(err, AccountError::InsufficientFunds));
        assert_eq!(account.balance(), dec!(100));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut account = Account::new(AccountId::from(1), "Alice", dec!(100));
        assert!(matches!(
            account.deposit(dec!(-1)),
            Err(AccountError::NegativeAmount)
        ));
        assert!(matches!(
            account.withdraw(dec!(-1)),
            Err(AccountError::NegativeAmount)
        ));
        assert_eq!(account.balance(), dec!(100));
    }
}
