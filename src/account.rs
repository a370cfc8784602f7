use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError, UniverseError};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(id: TodoId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(password: impl Into<String>, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            password: password.into(),
            email: email.into(),
            todos: Vec::new(),
            created_at: now,
        }
    }
}

/// Outcome of a successful [`AccountStore::authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Login {
    Existing,
    /// Unknown usernames are registered on the spot.
    Created,
}

pub type Accounts = BTreeMap<String, Account>;

/// All accounts, persisted as one JSON blob under a fixed storage key:
/// `{ "<username>": { password, email, todos: [{ id, text, completed, createdAt }], createdAt } }`
pub struct AccountStore<S> {
    storage: S,
    key: String,
    accounts: Accounts,
}

impl<S: Storage> AccountStore<S> {
    /// Reads the persisted blob. A missing, unreadable or malformed blob is
    /// replaced by the demo seed, which is written back immediately.
    pub fn load(storage: S, key: impl Into<String>, now: DateTime<Utc>) -> Self {
        let key = key.into();
        let loaded = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Accounts>(&raw) {
                Ok(accounts) => Some(accounts),
                Err(err) => {
                    log::warn!("discarding malformed account data: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::error!("reading account data failed: {err}");
                None
            }
        };

        let mut store = Self {
            storage,
            key,
            accounts: BTreeMap::new(),
        };
        match loaded {
            Some(accounts) => {
                log::info!("loaded {} accounts", accounts.len());
                store.accounts = accounts;
            }
            None => {
                store.accounts = demo_accounts(now);
                log::info!("seeded demo accounts");
                if let Err(err) = store.save() {
                    log::error!("persisting demo accounts failed: {err}");
                }
            }
        }
        store
    }

    /// Overwrites the persisted blob with the whole account mapping.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.accounts)?;
        self.storage.set(&self.key, &raw)
    }

    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.accounts.contains_key(username) {
            return Err(UniverseError::DuplicateUser(username.to_string()));
        }
        self.accounts
            .insert(username.to_string(), Account::new(password, email, now));
        log::info!("registered `{username}`");
        self.save()?;
        Ok(())
    }

    pub fn authenticate(&mut self, username: &str, password: &str, now: DateTime<Utc>) -> Result<Login> {
        match self.accounts.get(username) {
            Some(account) if account.password == password => Ok(Login::Existing),
            Some(_) => Err(UniverseError::BadCredentials),
            None => {
                let email = format!("{username}@demo.com");
                self.accounts
                    .insert(username.to_string(), Account::new(password, email, now));
                log::info!("auto-registered `{username}`");
                self.save()?;
                Ok(Login::Created)
            }
        }
    }

    pub fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    pub fn account_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.accounts.get_mut(username)
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

fn demo_accounts(now: DateTime<Utc>) -> Accounts {
    let samples = [
        ("Explore the 3D Universe", false),
        ("Test floating spheres", true),
        ("Click 3D VIEW button", false),
        ("Navigate with mouse", false),
        ("Complete this mission", true),
    ];
    let mut demo = Account::new("demo", "demo@3dtodo.com", now);
    demo.todos = samples
        .iter()
        .zip(1..)
        .map(|(&(text, completed), id)| Todo {
            completed,
            ..Todo::new(TodoId(id), text, now)
        })
        .collect();

    let mut accounts = BTreeMap::new();
    accounts.insert("demo".to_string(), demo);
    accounts.insert(
        "tuba".to_string(),
        Account::new("password", "tuba@3dtodo.com", now),
    );
    accounts
}
