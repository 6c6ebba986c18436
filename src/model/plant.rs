use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Display order for filter chips. Not a ranking.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Fácil",
            Difficulty::Medium => "Media",
            Difficulty::Hard => "Difícil",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "fácil" => Ok(Difficulty::Easy),
            "medium" | "media" => Ok(Difficulty::Medium),
            "hard" | "difícil" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Debug, Hash, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct CareInstructions {
    pub water_frequency: String,
    pub sunlight: String,
    pub temperature: String,
    pub humidity: String,
    pub soil: String,
    pub fertilization: String,
    pub pruning: String,
}

#[derive(Debug, Hash, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub scientific_name: String,
    pub image_ref: String,
    pub description: String,
    pub care_instructions: CareInstructions,
    pub difficulty: Difficulty,
}

impl Plant {
    /// Case-insensitive substring match on either name. Empty query matches.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.scientific_name.to_lowercase().contains(&query)
    }
}
