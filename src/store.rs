use itertools::Itertools;
use log::*;
use uuid::Uuid;

use crate::error::{RepoError, RepoResult};
use crate::model::{Account, UserStore};

// In-memory operations only. Persisting is the caller's job.
impl UserStore {
    pub fn find_by_credentials(&self, username: &str, password: &str) -> Option<&Account> {
        self.accounts.iter()
            .find(|a| a.username == username && a.password == password)
    }

    pub fn exists_by_username(&self, username: &str) -> bool {
        self.accounts.iter().any(|a| a.username == username)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn insert(&mut self, account: Account) -> RepoResult<&Account> {
        if self.exists_by_username(&account.username) {
            return Err(RepoError::DuplicateUsername(account.username));
        }
        self.accounts.push(account);
        // Just pushed
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    /// Overwrites the stored account with the same id.
    pub fn replace(&mut self, account: Account) -> RepoResult<()> {
        match self.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => {
                *existing = account;
                Ok(())
            },
            None => Err(RepoError::NotFound(format!("account {}", account.username))),
        }
    }

    pub fn remove(&mut self, username: &str) -> RepoResult<Account> {
        match self.accounts.iter().position(|a| a.username == username) {
            Some(index) => Ok(self.accounts.remove(index)),
            None => Err(RepoError::NotFound(format!("account {}", username))),
        }
    }

    pub fn list_usernames(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.username.clone()).collect()
    }

    /// Restores the uniqueness invariants on data read back from storage.
    /// First occurrence wins for both usernames and favorite plant ids.
    pub fn sanitize(self) -> Self {
        let before = self.accounts.len();
        let accounts = self.accounts.into_iter()
            .unique_by(|a| a.username.clone())
            .map(|mut a| {
                a.favorite_plants = a.favorite_plants.into_iter()
                    .unique_by(|p| p.id)
                    .collect();
                a
            })
            .collect_vec();
        if accounts.len() != before {
            warn!("Dropped {} account(s) with duplicate usernames", before - accounts.len());
        }
        UserStore { accounts }
    }
}
