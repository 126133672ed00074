// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Account registry
//
// Accounts are stored in a local JSON file keyed by username.
// New accounts wait for the administrator's approval before they can log in.

use crate::storage::{self, JsonFile};
use crate::types::{Account, AccountStatus, AppError};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// Username of the bootstrap administrator
pub const ADMIN_USERNAME: &str = "admin";

const ADMIN_PASSWORD: &str = "123456";

type Accounts = IndexMap<String, Account>;

fn bootstrap_accounts() -> Accounts {
    let mut accounts = Accounts::new();
    accounts.insert(
        ADMIN_USERNAME.to_string(),
        Account {
            password: ADMIN_PASSWORD.to_string(),
            status: AccountStatus::Approved,
            address: "SJTU".to_string(),
            contact: "admin@example.org".to_string(),
        },
    );
    accounts
}

/// File-based user store
pub struct AccountRegistry {
    accounts: RwLock<Accounts>,
    file: JsonFile,
}

impl AccountRegistry {
    /// Open the store, creating it with the admin account on first run
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let file = JsonFile::new(path);
        let accounts = file.load_or_init(bootstrap_accounts)?;

        Ok(Self {
            accounts: RwLock::new(accounts),
            file,
        })
    }

    /// Sign up a new account in pending state
    pub fn register(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
        address: &str,
        contact: &str,
    ) -> Result<(), AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        if password != confirm {
            return Err(AppError::Validation(
                "Password and confirmation must match".to_string(),
            ));
        }

        let mut accounts = storage::write(&self.accounts);
        if accounts.contains_key(username) {
            return Err(AppError::Validation(format!(
                "Username already exists: {}",
                username
            )));
        }

        let mut next = accounts.clone();
        next.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                status: AccountStatus::Pending,
                address: address.trim().to_string(),
                contact: contact.trim().to_string(),
            },
        );
        self.file.save(&next)?;
        *accounts = next;

        tracing::info!("Registered account {}, awaiting approval", username);
        Ok(())
    }

    /// Check credentials. Unknown users, wrong passwords and unapproved
    /// accounts are rejected in that order.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let accounts = storage::read(&self.accounts);
        let account = accounts
            .get(username)
            .ok_or_else(|| AppError::NotFound(format!("User {} is not registered", username)))?;

        if account.password != password {
            return Err(AppError::InvalidCredential);
        }
        if !account.is_approved() {
            return Err(AppError::NotApproved(username.to_string()));
        }

        Ok(account.clone())
    }

    pub fn approve(&self, username: &str) -> Result<(), AppError> {
        self.set_status(username, AccountStatus::Approved)
    }

    pub fn reject(&self, username: &str) -> Result<(), AppError> {
        self.set_status(username, AccountStatus::Rejected)
    }

    fn set_status(&self, username: &str, status: AccountStatus) -> Result<(), AppError> {
        let mut accounts = storage::write(&self.accounts);
        let mut next = accounts.clone();
        next.get_mut(username)
            .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", username)))?
            .status = status;
        self.file.save(&next)?;
        *accounts = next;

        tracing::info!("Account {} is now {}", username, status);
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<Account> {
        storage::read(&self.accounts).get(username).cloned()
    }

    /// All usernames in registration order
    pub fn list_usernames(&self) -> Vec<String> {
        storage::read(&self.accounts).keys().cloned().collect()
    }

    /// Usernames still waiting for a decision
    pub fn pending_usernames(&self) -> Vec<String> {
        storage::read(&self.accounts)
            .iter()
            .filter(|(_, account)| account.status == AccountStatus::Pending)
            .map(|(username, _)| username.clone())
            .collect()
    }
}
