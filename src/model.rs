pub mod plant;
pub mod storage;

pub use plant::{CareInstructions, Difficulty, Plant};
pub use storage::{Account, UserStore};
