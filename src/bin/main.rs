use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use rust_decimal::Decimal;

use bank_ledger::{Account, AccountId, AccountStore, Ledger};

/// A cli interface to the bank account store
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The directory holding the snapshot and ledger files
    #[clap(long, default_value = ".")]
    data_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Admin,
    User,
}

/// The fixed credential table; there is no account management for logins
const CREDENTIALS: &[(&str, &str, Role)] = &[
    ("Zain", "4365", Role::Admin),
    ("Haider", "4384", Role::User),
    ("Rehman", "4351", Role::User),
    ("Ehsan", "4358", Role::User),
];

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let ledger = Ledger::new(args.data_dir.join("transactions.txt"));
    log::debug!("using ledger file {}", ledger.path().display());

    let mut store = AccountStore::open(args.data_dir.join("accounts.txt"), ledger)?;
    log::debug!(
        "loaded {} accounts from {}",
        store.find_all().len(),
        store.snapshot_path().display()
    );

    println!("Welcome to Bank Account System");
    loop {
        println!("\n=== Online Banking System ===");
        println!("1. Admin Login");
        println!("2. User Login");
        println!("3. Exit");

        match prompt_parse::<u32>("Enter your choice: ")? {
            1 => {
                if authenticate(Role::Admin)? {
                    admin_menu(&mut store)?;
                }
            }
            2 => {
                if authenticate(Role::User)? {
                    user_menu(&mut store)?;
                }
            }
            3 => break,
            _ => {}
        }
    }

    println!("\nThank you for using the system.");
    Ok(())
}

fn authenticate(role: Role) -> anyhow::Result<bool> {
    let user = prompt("Enter username: ")?;
    let pass = prompt("Enter password: ")?;

    let valid = CREDENTIALS
        .iter()
        .any(|&(name, secret, r)| r == role && name == user && secret == pass);
    if !valid {
        println!("Invalid credentials.");
    }

    Ok(valid)
}

fn admin_menu(store: &mut AccountStore) -> anyhow::Result<()> {
    loop {
        println!("\n--- Admin Menu ---");
        println!("1. Create Account");
        println!("2. View All Accounts");
        println!("3. Search by Account Number");
        println!("4. Update Account");
        println!("5. Delete Account");
        println!("6. Back to Main Menu");

        match prompt_parse::<u32>("Enter choice: ")? {
            1 => {
                let id = prompt_account_id()?;
                let holder = prompt("Enter Holder Name: ")?;
                let balance = prompt_amount("Enter Initial Balance: ")?;
                match store.create(id, holder, balance) {
                    Ok(_) => println!("Account created successfully."),
                    Err(err) => println!("{err}"),
                }
            }
            2 => {
                for account in store.find_all() {
                    display(account);
                }
            }
            3 => {
                let id = prompt_account_id()?;
                match store.find(id) {
                    Ok(account) => display(account),
                    Err(err) => println!("{err}"),
                }
            }
            4 => {
                let id = prompt_account_id()?;
                let holder = prompt("Enter new name: ")?;
                match store.update_holder(id, holder) {
                    Ok(()) => println!("Account updated."),
                    Err(err) => println!("{err}"),
                }
            }
            5 => {
                let id = prompt_account_id()?;
                match store.delete(id) {
                    Ok(()) => println!("Account deleted."),
                    Err(err) => println!("{err}"),
                }
            }
            6 => return Ok(()),
            _ => {}
        }
    }
}

fn user_menu(store: &mut AccountStore) -> anyhow::Result<()> {
    let id = prompt_account_id()?;
    if let Err(err) = store.find(id) {
        println!("{err}");
        return Ok(());
    }

    loop {
        println!("\n--- User Menu ---");
        println!("1. View Account");
        println!("2. Deposit");
        println!("3. Withdraw");
        println!("4. View Summary");
        println!("5. Apply Interest");
        println!("6. View Transaction History");
        println!("7. Exit");

        match prompt_parse::<u32>("Enter choice: ")? {
            1 => match store.find(id) {
                Ok(account) => display(account),
                Err(err) => println!("{err}"),
            },
            2 => {
                let amount = prompt_amount("Enter amount to deposit: ")?;
                if let Err(err) = store.deposit(id, amount) {
                    println!("{err}");
                }
            }
            3 => {
                let amount = prompt_amount("Enter amount to withdraw: ")?;
                if let Err(err) = store.withdraw(id, amount) {
                    println!("{err}");
                }
            }
            4 => match store.find(id) {
                Ok(account) => print_summary(account),
                Err(err) => println!("{err}"),
            },
            5 => match store.apply_interest(id, interest_rate()) {
                Ok(()) => println!(
                    "Interest applied at {}%.",
                    interest_rate() * Decimal::from(100)
                ),
                Err(err) => println!("{err}"),
            },
            6 => print_history(store, id)?,
            7 => return Ok(()),
            _ => {}
        }
    }
}

/// The fixed yearly interest rate of 5%
fn interest_rate() -> Decimal {
    Decimal::new(5, 2)
}

fn display(account: &Account) {
    println!("Account Number: {}", account.id());
    println!("Holder Name: {}", account.holder());
    println!("Balance: ${}", account.balance());
}

fn print_summary(account: &Account) {
    println!("\n--- Account Summary ---");
    println!("Account: {}", account.id());
    println!("Holder: {}", account.holder());
    println!("Balance: ${}", account.balance());
    println!("------------------------");
}

fn print_history(store: &AccountStore, id: AccountId) -> anyhow::Result<()> {
    println!("\n--- Transaction History for Account #{id} ---");
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(io::stdout());

    let mut found = false;
    for entry in store.history_for(id) {
        writer.serialize(&entry)?;
        found = true;
    }
    writer.flush()?;

    if !found {
        println!("No transactions for this account.");
    }
    println!("-----------------------------------------");
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        anyhow::bail!("input closed");
    }
    Ok(line.trim().to_string())
}

fn prompt_parse<T: FromStr>(label: &str) -> anyhow::Result<T> {
    loop {
        match prompt(label)?.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Invalid input. Try again."),
        }
    }
}

fn prompt_account_id() -> anyhow::Result<AccountId> {
    Ok(AccountId::from(prompt_parse::<u32>(
        "Enter Account Number: ",
    )?))
}

fn prompt_amount(label: &str) -> anyhow::Result<Decimal> {
    loop {
        let amount = prompt_parse::<Decimal>(label)?;
        if amount.is_sign_negative() {
            println!("Invalid input. Try again.");
            continue;
        }
        return Ok(amount);
    }
}
