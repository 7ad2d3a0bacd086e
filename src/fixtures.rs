//! Demo data: 20 authors, 20 books each tied to a random author, and
//! optionally one plain user plus one administrator.
//!
//! Seeding is idempotent. The catalogue is only written into an empty author
//! table and users are only created when their email is free.

use bookapi_authz::Role;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};

use crate::modules::authors::entity as author;
use crate::modules::books::entity as book;
use crate::modules::users::accounts::{find_by_email, register_user};

pub const AUTHOR_COUNT: usize = 20;
pub const BOOK_COUNT: usize = 20;
pub const FIXTURE_PASSWORD: &str = "password";

const FIXTURE_USERS: [(&str, Role); 2] = [
    ("user@bookapi.com", Role::User),
    ("admin@bookapi.com", Role::Admin),
];

#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    pub with_users: bool,
    /// Fixes the author picked for each book; random when `None`.
    pub rng_seed: Option<u64>,
}

/// Rows written by one `seed` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub authors: usize,
    pub books: usize,
    pub users: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.authors == 0 && self.books == 0 && self.users == 0
    }
}

pub async fn seed(db: &DatabaseConnection, options: &SeedOptions) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    let txn = db.begin().await?;

    if author::Entity::find().count(&txn).await? == 0 {
        let mut rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut author_ids = Vec::with_capacity(AUTHOR_COUNT);
        for i in 0..AUTHOR_COUNT {
            let author = author::ActiveModel {
                first_name: Set(format!("First name {i}")),
                last_name: Set(format!("Last name {i}")),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            author_ids.push(author.id);
        }
        report.authors = author_ids.len();

        for i in 0..BOOK_COUNT {
            book::ActiveModel {
                title: Set(format!("Title {i}")),
                cover_text: Set(format!("Back cover text number {i}")),
                comment: Set(Some(format!("Librarian comment {i}"))),
                author_id: Set(author_ids.choose(&mut rng).copied()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            report.books += 1;
        }
    } else {
        tracing::info!("authors already present, catalogue fixtures skipped");
    }

    if options.with_users {
        for (email, role) in FIXTURE_USERS {
            if find_by_email(&txn, email).await?.is_some() {
                tracing::debug!(email, "fixture user exists");
                continue;
            }
            register_user(&txn, email, FIXTURE_PASSWORD, &[role]).await?;
            report.users += 1;
        }
    }

    txn.commit().await?;
    tracing::info!(
        authors = report.authors,
        books = report.books,
        users = report.users,
        "fixtures loaded"
    );
    Ok(report)
}
