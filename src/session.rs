//! The session manager: the one entry point the presentation layer talks to.
//!
//! All commands run to completion on the calling thread. Every command that
//! changes durable data has saved the user store before it returns `Ok`.

use log::*;
use uuid::Uuid;

use crate::cache::{BlobStore, Persistence};
use crate::catalog::{Catalog, CatalogFilter};
use crate::error::{RepoError, RepoResult};
use crate::events::{Listeners, SessionEvent, SubscriptionId};
use crate::ids::{IdSource, RandomIds};
use crate::model::{Account, Plant, UserStore};

/// Working copy of the active account, checked out of the user store.
/// Edits only become durable through `commit`.
#[derive(Debug)]
struct Checkout {
    account: Account,
}

impl Checkout {
    fn commit(&self, users: &mut UserStore) -> RepoResult<()> {
        users.replace(self.account.clone())
    }
}

#[derive(Debug)]
enum Session {
    Anonymous,
    Authenticated(Checkout),
}

#[derive(Debug)]
pub struct SessionManager<B> {
    catalog: Catalog,
    users: UserStore,
    persistence: Persistence<B>,
    ids: Box<dyn IdSource>,
    state: Session,
    listeners: Listeners,
}

impl<B: BlobStore> SessionManager<B> {
    pub fn open(blobs: B) -> Self {
        Self::with_ids(blobs, Box::new(RandomIds))
    }

    /// Loads the catalog and the saved user store. Always starts Anonymous.
    pub fn with_ids(blobs: B, mut ids: Box<dyn IdSource>) -> Self {
        let catalog = Catalog::load(ids.as_mut());
        let persistence = Persistence::new(blobs);
        let users = persistence.load();
        SessionManager {
            catalog,
            users,
            persistence,
            ids,
            state: Session::Anonymous,
            listeners: Listeners::default(),
        }
    }

    pub fn blobs(&self) -> &B {
        self.persistence.blobs()
    }

    // Catalog

    pub fn catalog(&self) -> &[Plant] {
        self.catalog.plants()
    }

    pub fn plant(&self, id: Uuid) -> Option<&Plant> {
        self.catalog.get(id)
    }

    pub fn search_catalog(&self, filter: &CatalogFilter) -> Vec<&Plant> {
        self.catalog.search(filter)
    }

    // Queries

    pub fn current_account(&self) -> Option<&Account> {
        match &self.state {
            Session::Authenticated(checkout) => Some(&checkout.account),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_account().is_some()
    }

    pub fn favorites(&self) -> &[Plant] {
        match self.current_account() {
            Some(account) => &account.favorite_plants,
            None => &[],
        }
    }

    pub fn is_favorite(&self, plant_id: Uuid) -> bool {
        self.current_account().map_or(false, |a| a.is_favorite(plant_id))
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites().len()
    }

    pub fn search_favorites(&self, query: &str) -> Vec<&Plant> {
        self.favorites().iter().filter(|p| p.matches(query)).collect()
    }

    pub fn list_usernames(&self) -> Vec<String> {
        self.users.list_usernames()
    }

    // Observation

    pub fn subscribe<F: FnMut(&SessionEvent) + 'static>(&mut self, listener: F) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // Commands

    /// An already active session is logged out first.
    pub fn login(&mut self, username: &str, password: &str) -> RepoResult<&Account> {
        if self.is_authenticated() {
            self.logout()?;
        }
        let account = match self.users.find_by_credentials(username, password) {
            Some(a) => a.clone(),
            None => {
                warn!("Failed login for '{}'", username);
                return Err(RepoError::InvalidCredentials);
            },
        };
        info!("Logged in as '{}'", username);
        self.state = Session::Authenticated(Checkout { account });
        self.listeners.notify(&SessionEvent::LoggedIn { username: username.to_owned() });
        self.active()
    }

    pub fn register(&mut self, username: &str, password: &str) -> RepoResult<&Account> {
        if self.is_authenticated() {
            return Err(RepoError::AlreadyAuthenticated);
        }
        if username.is_empty() {
            return Err(RepoError::EmptyField("username"));
        }
        if password.is_empty() {
            return Err(RepoError::EmptyField("password"));
        }
        let account = Account::new(self.ids.next_id(), username, password);
        self.users.insert(account.clone())?;
        if let Err(e) = self.persist() {
            // Keep memory in line with what is on disk
            self.users.remove(username)?;
            return Err(e);
        }
        info!("Registered '{}'", username);
        self.state = Session::Authenticated(Checkout { account });
        self.listeners.notify(&SessionEvent::Registered { username: username.to_owned() });
        self.active()
    }

    /// Writes the working copy back, saves, then ends the session.
    /// The account and its favorites stay in the store.
    pub fn logout(&mut self) -> RepoResult<()> {
        let username = match &self.state {
            Session::Anonymous => {
                debug!("Logout without an active session");
                return Ok(());
            },
            Session::Authenticated(checkout) => {
                checkout.commit(&mut self.users)?;
                checkout.account.username.clone()
            },
        };
        self.persist()?;
        self.state = Session::Anonymous;
        info!("Logged out '{}'", username);
        self.listeners.notify(&SessionEvent::LoggedOut { username });
        Ok(())
    }

    /// Returns false if the plant was already a favorite.
    /// The plant is stored as a snapshot.
    pub fn add_favorite(&mut self, plant: &Plant) -> RepoResult<bool> {
        self.edit_favorites(|favorites| {
            if favorites.iter().any(|p| p.id == plant.id) {
                return false;
            }
            favorites.push(plant.clone());
            true
        })
    }

    /// Like `add_favorite`, for a plant that must be in the catalog.
    pub fn add_favorite_by_id(&mut self, plant_id: Uuid) -> RepoResult<bool> {
        let plant = self.catalog.get(plant_id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("plant {}", plant_id)))?;
        self.add_favorite(&plant)
    }

    /// Returns false if no favorite had that id.
    pub fn remove_favorite(&mut self, plant_id: Uuid) -> RepoResult<bool> {
        self.edit_favorites(|favorites| {
            let before = favorites.len();
            favorites.retain(|p| p.id != plant_id);
            favorites.len() != before
        })
    }

    /// Returns whether the plant is a favorite afterwards.
    pub fn toggle_favorite(&mut self, plant: &Plant) -> RepoResult<bool> {
        if self.is_favorite(plant.id) {
            self.remove_favorite(plant.id)?;
            Ok(false)
        } else {
            self.add_favorite(plant)?;
            Ok(true)
        }
    }

    pub fn delete_account(&mut self) -> RepoResult<()> {
        let username = match &self.state {
            Session::Authenticated(checkout) => checkout.account.username.clone(),
            Session::Anonymous => return Err(RepoError::NoActiveSession),
        };
        let index = self.users.accounts.iter().position(|a| a.username == username);
        let removed = self.users.remove(&username)?;
        if let Err(e) = self.persist() {
            // Back into its old slot, so listing order is unchanged
            let index = index.unwrap_or(self.users.accounts.len());
            self.users.accounts.insert(index, removed);
            return Err(e);
        }
        self.state = Session::Anonymous;
        info!("Deleted account '{}'", username);
        self.listeners.notify(&SessionEvent::AccountDeleted { username });
        Ok(())
    }

    fn active(&self) -> RepoResult<&Account> {
        self.current_account().ok_or(RepoError::NoActiveSession)
    }

    fn persist(&mut self) -> RepoResult<()> {
        self.persistence.save(&self.users)?;
        Ok(())
    }

    /// `edit` reports whether it changed anything. Unchanged lists are not saved.
    /// A failed save puts the previous list back in both the checkout and the store.
    fn edit_favorites<F: FnOnce(&mut Vec<Plant>) -> bool>(&mut self, edit: F) -> RepoResult<bool> {
        let checkout = match &mut self.state {
            Session::Authenticated(checkout) => checkout,
            Session::Anonymous => return Err(RepoError::NoActiveSession),
        };
        let previous = checkout.account.favorite_plants.clone();
        if !edit(&mut checkout.account.favorite_plants) {
            return Ok(false);
        }
        checkout.commit(&mut self.users)?;
        let username = checkout.account.username.clone();
        let count = checkout.account.favorite_plants.len();
        if let Err(e) = self.persist() {
            if let Session::Authenticated(checkout) = &mut self.state {
                checkout.account.favorite_plants = previous;
                checkout.commit(&mut self.users)?;
            }
            warn!("Favorites of '{}' not saved: {}", username, e);
            return Err(e);
        }
        debug!("'{}' now has {} favorite(s)", username, count);
        self.listeners.notify(&SessionEvent::FavoritesChanged { username, count });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryBlobStore;
    use crate::ids::SequentialIds;
    use anyhow::{bail, Result};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn manager() -> SessionManager<MemoryBlobStore> {
        SessionManager::with_ids(MemoryBlobStore::new(), Box::new(SequentialIds::default()))
    }

    fn reopen(previous: &SessionManager<MemoryBlobStore>) -> SessionManager<MemoryBlobStore> {
        SessionManager::with_ids(previous.blobs().clone(), Box::new(SequentialIds::starting_at(500)))
    }

    /// Memory slots whose writes can be switched off from outside.
    #[derive(Debug, Default, Clone)]
    struct FlakyBlobs {
        inner: MemoryBlobStore,
        failing: Rc<Cell<bool>>,
    }

    impl BlobStore for FlakyBlobs {
        fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
            if self.failing.get() {
                bail!("disk unavailable")
            }
            self.inner.write(key, value)
        }
    }

    fn flaky() -> (SessionManager<FlakyBlobs>, Rc<Cell<bool>>) {
        let blobs = FlakyBlobs::default();
        let failing = blobs.failing.clone();
        let repo = SessionManager::with_ids(blobs, Box::new(SequentialIds::default()));
        (repo, failing)
    }

    /// What a fresh process would load from the flaky store.
    fn saved_favorites(repo: &SessionManager<FlakyBlobs>, username: &str, password: &str) -> Vec<Plant> {
        let mut reopened = SessionManager::with_ids(
            repo.blobs().inner.clone(),
            Box::new(SequentialIds::starting_at(500)),
        );
        reopened.login(username, password).unwrap().favorite_plants.clone()
    }

    #[test]
    fn starts_anonymous() {
        let repo = manager();
        assert!(repo.current_account().is_none());
        assert_eq!(repo.favorite_count(), 0);
        assert_eq!(repo.catalog().len(), 10);
    }

    #[test]
    fn register_logs_in_with_no_favorites() {
        let mut repo = manager();
        let account = repo.register("ana", "1234").unwrap();
        assert_eq!(account.username, "ana");
        assert!(account.favorite_plants.is_empty());
        assert_eq!(repo.list_usernames(), vec!["ana"]);
    }

    #[test]
    fn register_rejects_empty_fields() {
        let mut repo = manager();
        assert!(matches!(repo.register("", "x"), Err(RepoError::EmptyField("username"))));
        assert!(matches!(repo.register("x", ""), Err(RepoError::EmptyField("password"))));
        assert!(repo.list_usernames().is_empty());
        assert!(!repo.is_authenticated());
    }

    #[test]
    fn register_rejects_taken_username() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        repo.logout().unwrap();
        let err = repo.register("ana", "other").unwrap_err();
        assert!(matches!(err, RepoError::DuplicateUsername(_)));
        assert_eq!(repo.list_usernames(), vec!["ana"]);
    }

    #[test]
    fn register_while_logged_in_is_refused() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        assert!(matches!(repo.register("bo", "pw"), Err(RepoError::AlreadyAuthenticated)));
        assert_eq!(repo.current_account().unwrap().username, "ana");
    }

    #[test]
    fn favorites_are_idempotent() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        let monstera = repo.catalog()[0].clone();

        assert!(repo.add_favorite(&monstera).unwrap());
        assert!(!repo.add_favorite(&monstera).unwrap());
        assert_eq!(repo.favorite_count(), 1);
        assert!(repo.is_favorite(monstera.id));

        assert!(repo.remove_favorite(monstera.id).unwrap());
        assert!(!repo.remove_favorite(monstera.id).unwrap());
        assert_eq!(repo.favorite_count(), 0);
    }

    #[test]
    fn favorites_need_a_session() {
        let mut repo = manager();
        let pothos = repo.catalog()[1].clone();
        assert!(matches!(repo.add_favorite(&pothos), Err(RepoError::NoActiveSession)));
        assert!(matches!(repo.remove_favorite(pothos.id), Err(RepoError::NoActiveSession)));
        assert!(matches!(repo.delete_account(), Err(RepoError::NoActiveSession)));
    }

    #[test]
    fn add_by_id_checks_catalog_membership() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        let zz = repo.catalog()[9].id;
        assert!(repo.add_favorite_by_id(zz).unwrap());
        assert!(matches!(repo.add_favorite_by_id(Uuid::nil()), Err(RepoError::NotFound(_))));
        assert_eq!(repo.favorite_count(), 1);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        let fern = repo.catalog()[4].clone();
        assert!(repo.toggle_favorite(&fern).unwrap());
        assert!(!repo.toggle_favorite(&fern).unwrap());
        assert!(!repo.is_favorite(fern.id));
    }

    #[test]
    fn every_favorite_change_is_saved() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        let monstera = repo.catalog()[0].clone();
        repo.add_favorite(&monstera).unwrap();

        // Without logging out
        let mut reopened = reopen(&repo);
        assert!(!reopened.is_authenticated());
        let account = reopened.login("ana", "1234").unwrap();
        assert_eq!(account.favorite_plants, vec![monstera]);
    }

    #[test]
    fn logout_keeps_favorites_for_next_login() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        let plants: Vec<Plant> = repo.catalog()[..3].to_vec();
        repo.add_favorite(&plants[0]).unwrap();
        repo.add_favorite(&plants[1]).unwrap();
        repo.logout().unwrap();

        repo.login("ana", "1234").unwrap();
        repo.add_favorite(&plants[2]).unwrap();
        repo.logout().unwrap();

        let account = repo.login("ana", "1234").unwrap();
        assert_eq!(account.favorite_plants, plants);
    }

    #[test]
    fn login_failure_keeps_anonymous() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        repo.logout().unwrap();
        assert!(matches!(repo.login("ana", "wrong"), Err(RepoError::InvalidCredentials)));
        assert!(repo.current_account().is_none());
    }

    #[test]
    fn login_switches_accounts() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        let cactus = repo.catalog()[8].clone();
        repo.add_favorite(&cactus).unwrap();
        repo.logout().unwrap();
        repo.register("bo", "pw").unwrap();

        let ana = repo.login("ana", "1234").unwrap();
        assert_eq!(ana.favorite_plants.len(), 1);
        repo.login("bo", "pw").unwrap();
        assert_eq!(repo.favorite_count(), 0);
    }

    #[test]
    fn search_favorites_matches_names() {
        let mut repo = manager();
        assert!(repo.search_favorites("").is_empty());
        repo.register("ana", "1234").unwrap();
        let plants: Vec<Plant> = repo.catalog().to_vec();
        for plant in &plants {
            repo.add_favorite(plant).unwrap();
        }
        let hits = repo.search_favorites("FICUS");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ficus Lyrata");
        assert_eq!(repo.search_favorites("").len(), 10);
    }

    #[test]
    fn delete_account_removes_credentials() {
        let mut repo = manager();
        repo.register("ana", "1234").unwrap();
        repo.delete_account().unwrap();
        assert!(!repo.is_authenticated());
        assert!(matches!(repo.login("ana", "1234"), Err(RepoError::InvalidCredentials)));

        let mut reopened = reopen(&repo);
        assert!(reopened.list_usernames().is_empty());
        assert!(reopened.register("ana", "new").is_ok());
    }

    #[test]
    fn failed_register_is_rolled_back() {
        let (mut repo, failing) = flaky();
        failing.set(true);
        let err = repo.register("ana", "1234").unwrap_err();
        assert!(matches!(err, RepoError::Storage(_)));
        assert!(!repo.is_authenticated());
        assert!(repo.list_usernames().is_empty());

        failing.set(false);
        assert!(repo.register("ana", "1234").is_ok());
    }

    #[test]
    fn failed_add_leaves_favorites_unchanged() {
        let (mut repo, failing) = flaky();
        repo.register("ana", "1234").unwrap();
        let monstera = repo.catalog()[0].clone();

        failing.set(true);
        assert!(matches!(repo.add_favorite(&monstera), Err(RepoError::Storage(_))));
        assert_eq!(repo.favorite_count(), 0);
        assert!(!repo.is_favorite(monstera.id));
        assert!(saved_favorites(&repo, "ana", "1234").is_empty());

        // Retrying has to write, not report "already a favorite"
        failing.set(false);
        assert!(repo.add_favorite(&monstera).unwrap());
        assert_eq!(saved_favorites(&repo, "ana", "1234"), vec![monstera]);
    }

    #[test]
    fn failed_remove_leaves_favorites_unchanged() {
        let (mut repo, failing) = flaky();
        repo.register("ana", "1234").unwrap();
        let pothos = repo.catalog()[1].clone();
        repo.add_favorite(&pothos).unwrap();

        failing.set(true);
        assert!(matches!(repo.remove_favorite(pothos.id), Err(RepoError::Storage(_))));
        assert!(repo.is_favorite(pothos.id));
        assert_eq!(saved_favorites(&repo, "ana", "1234"), vec![pothos.clone()]);

        failing.set(false);
        assert!(repo.remove_favorite(pothos.id).unwrap());
        assert!(saved_favorites(&repo, "ana", "1234").is_empty());
    }

    #[test]
    fn failed_logout_keeps_session() {
        let (mut repo, failing) = flaky();
        repo.register("ana", "1234").unwrap();
        let fern = repo.catalog()[4].clone();
        repo.add_favorite(&fern).unwrap();

        failing.set(true);
        assert!(matches!(repo.logout(), Err(RepoError::Storage(_))));
        assert_eq!(repo.current_account().map(|a| a.username.as_str()), Some("ana"));
        assert_eq!(repo.favorites(), &[fern.clone()][..]);

        failing.set(false);
        repo.logout().unwrap();
        assert!(!repo.is_authenticated());
        assert_eq!(saved_favorites(&repo, "ana", "1234"), vec![fern]);
    }

    #[test]
    fn failed_delete_keeps_account_in_place() {
        let (mut repo, failing) = flaky();
        for name in &["ana", "bo", "cy"] {
            repo.register(name, "pw").unwrap();
            repo.logout().unwrap();
        }
        repo.login("bo", "pw").unwrap();

        failing.set(true);
        assert!(matches!(repo.delete_account(), Err(RepoError::Storage(_))));
        assert!(repo.is_authenticated());
        assert_eq!(repo.list_usernames(), vec!["ana", "bo", "cy"]);

        failing.set(false);
        repo.logout().unwrap();
        assert!(repo.login("bo", "pw").is_ok());
        repo.delete_account().unwrap();
        assert_eq!(repo.list_usernames(), vec!["ana", "cy"]);
    }

    #[test]
    fn listeners_see_completed_commands() {
        let mut repo = manager();
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        repo.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        repo.register("ana", "1234").unwrap();
        let pothos = repo.catalog()[1].clone();
        repo.add_favorite(&pothos).unwrap();
        repo.add_favorite(&pothos).unwrap();
        repo.logout().unwrap();
        let _ = repo.login("ana", "nope");

        let ana = || "ana".to_owned();
        assert_eq!(*seen.borrow(), vec![
            SessionEvent::Registered { username: ana() },
            SessionEvent::FavoritesChanged { username: ana(), count: 1 },
            SessionEvent::LoggedOut { username: ana() },
        ]);
    }
}
