//! Fake users for seeding databases and building fixtures.
//!
//! Names come from a `StdRng` seeded with the factory seed, so a failing
//! test reproduces with the same names and emails. Emails are unique per
//! factory because every call advances a sequence that is part of the address.
//!
//! ```
//! use test_utils::{Role, UserFactory};
//!
//! let mut users = UserFactory::from_test_name("test_listing");
//! let alice = users.make();
//! let admin = UserFactory::from_test_name("test_listing_admins").role(Role::Admin).make();
//!
//! assert_eq!(alice.role, Role::Client);
//! assert_eq!(admin.role, Role::Admin);
//! assert!(alice.email.ends_with("@example.org"));
//! ```

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::fmt;

/// Bcrypt hash of the string `password`, shared by every fake user so tests
/// can log in without hashing at runtime.
pub const DEFAULT_PASSWORD_HASH: &str =
    "$2y$10$92IXUNpkjO0rOQ5byMi.Ye4oKoEa3Ro9llC/.og/at2.uheWG/igi";

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Linus", "Margaret", "Alan", "Barbara", "Ken", "Frances", "Dennis", "Radia",
    "Edsger", "Sophie", "Niklaus", "Hedy", "Donald", "Katherine",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Torvalds", "Hamilton", "Turing", "Liskov", "Thompson", "Allen",
    "Ritchie", "Perlman", "Dijkstra", "Wilson", "Wirth", "Lamarr", "Knuth", "Johnson",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub email_verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct UserFactory {
    seed: u64,
    rng: StdRng,
    sequence: u64,
    role: Role,
    verified: bool,
}

impl UserFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            sequence: 0,
            role: Role::default(),
            verified: true,
        }
    }

    pub fn from_test_name(name: &str) -> Self {
        Self::new(crate::seed_from_name(name))
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Users created from here on have no `email_verified_at`.
    pub fn unverified(mut self) -> Self {
        self.verified = false;
        self
    }

    pub fn make(&mut self) -> FakeUser {
        self.sequence += 1;
        let first = FIRST_NAMES[self.rng.random_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[self.rng.random_range(0..LAST_NAMES.len())];

        FakeUser {
            name: format!("{} {}", first, last),
            email: format!(
                "{}.{}.{:04x}{}@example.org",
                first.to_lowercase(),
                last.to_lowercase(),
                self.seed & 0xffff,
                self.sequence
            ),
            password_hash: DEFAULT_PASSWORD_HASH.to_string(),
            role: self.role,
            email_verified_at: self.verified.then(Utc::now),
        }
    }

    pub fn make_many(&mut self, count: usize) -> Vec<FakeUser> {
        (0..count).map(|_| self.make()).collect()
    }

    /// Insert a fresh user and return its id.
    #[cfg(feature = "postgres")]
    pub async fn create(
        &mut self,
        db: &sea_orm::DatabaseConnection,
    ) -> Result<i32, sea_orm::DbErr> {
        use sea_orm::{ConnectionTrait, DbBackend, Statement};

        let user = self.make();
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO users (name, email, password_hash, role, email_verified_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
            [
                user.name.into(),
                user.email.into(),
                user.password_hash.into(),
                user.role.as_str().into(),
                user.email_verified_at.into(),
            ],
        );

        let row = db
            .query_one_raw(stmt)
            .await?
            .ok_or(sea_orm::DbErr::RecordNotInserted)?;
        row.try_get("", "id")
    }

    #[cfg(feature = "postgres")]
    pub async fn create_many(
        &mut self,
        db: &sea_orm::DatabaseConnection,
        count: usize,
    ) -> Result<Vec<i32>, sea_orm::DbErr> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.create(db).await?);
        }
        Ok(ids)
    }
}
