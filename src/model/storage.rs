use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::plant::Plant;

// Storage model, serialised as a single blob
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStore {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Hash, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    // Stored in clear, local only
    pub password: String,
    /// Snapshots of catalog plants, in the order they were added.
    pub favorite_plants: Vec<Plant>,
}

impl Account {
    pub fn new(id: Uuid, username: &str, password: &str) -> Self {
        Account {
            id,
            username: username.to_owned(),
            password: password.to_owned(),
            favorite_plants: vec![],
        }
    }

    pub fn is_favorite(&self, plant_id: Uuid) -> bool {
        self.favorite_plants.iter().any(|p| p.id == plant_id)
    }
}
