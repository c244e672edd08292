use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use family_finance::{
    Amount, CategoryColor, CategoryName, Email, NewUser, PasswordHash, Transaction,
    TransactionType, UserID, ValidatedPassword, create_category, create_transaction, create_user,
    initialize_db,
};

/// A utility for creating a test database for the Family Finance server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Expense categories and a typical amount in cents for each.
const EXPENSE_CATEGORIES: [(&str, &str, i64); 4] = [
    ("Groceries", "#22c55e", 8_500),
    ("Rent", "#ef4444", 40_000),
    ("Transport", "#f59e0b", 2_500),
    ("Fun", "#a855f7", 4_000),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test users...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let admin = create_user(
        NewUser {
            email: Email::new("admin@example.com")?,
            full_name: Some("Alex Admin".to_owned()),
            is_admin: true,
            password_hash: password_hash.clone(),
        },
        &connection,
    )?;
    let member = create_user(
        NewUser {
            email: Email::new("member@example.com")?,
            full_name: None,
            is_admin: false,
            password_hash,
        },
        &connection,
    )?;

    for (user_id, seed) in [(admin.id, 7), (member.id, 13)] {
        println!("Creating sample data for user {user_id}...");
        create_sample_data(user_id, seed, &connection)?;
    }

    println!("Success! Log in with admin@example.com or member@example.com and the password 'test'.");

    Ok(())
}

/// A year of weekly expenses and fortnightly wages for `user_id`.
fn create_sample_data(
    user_id: UserID,
    seed: u64,
    connection: &Connection,
) -> Result<(), Box<dyn Error>> {
    let mut categories = Vec::with_capacity(EXPENSE_CATEGORIES.len());
    for (name, color, typical_cents) in EXPENSE_CATEGORIES {
        let category = create_category(
            CategoryName::new(name)?,
            CategoryColor::new(color)?,
            user_id,
            connection,
        )?;
        categories.push((category.id, name, typical_cents));
    }

    let today = OffsetDateTime::now_utc().date();
    let mut state = seed;
    // Linear congruential generator, good enough for varying the amounts.
    let mut next_random = move |bound: i64| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % bound as u64) as i64
    };

    for day in (0..365).rev() {
        let date = today - Duration::days(day);

        if day % 14 == 0 {
            create_transaction(
                Transaction::build(
                    Amount::new_unchecked(Decimal::new(250_000, 2)),
                    TransactionType::Income,
                    date,
                    "Wages",
                    user_id,
                ),
                connection,
            )?;
        }

        if day % 7 == 0 {
            for &(category_id, name, typical_cents) in &categories {
                let cents = typical_cents / 2 + next_random(typical_cents);
                create_transaction(
                    Transaction::build(
                        Amount::new_unchecked(Decimal::new(cents, 2)),
                        TransactionType::Expense,
                        date,
                        name,
                        user_id,
                    )
                    .category_id(Some(category_id)),
                    connection,
                )?;
            }
        }

        if day % 30 == 3 {
            create_transaction(
                Transaction::build(
                    Amount::new_unchecked(Decimal::new(1_000 + next_random(5_000), 2)),
                    TransactionType::Expense,
                    date,
                    "Miscellaneous",
                    user_id,
                ),
                connection,
            )?;
        }
    }

    Ok(())
}
