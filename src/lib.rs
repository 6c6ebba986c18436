mod cache;
mod catalog;
mod error;
mod events;
mod ids;
mod model;
mod session;
mod store;

pub use cache::{BlobStore, FileBlobStore, MemoryBlobStore, Persistence, USER_DATA_KEY};
pub use catalog::{load_catalog, Catalog, CatalogFilter};
pub use error::{RepoError, RepoResult};
pub use events::{Listeners, SessionEvent, SubscriptionId};
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use model::{Account, CareInstructions, Difficulty, Plant, UserStore};
pub use session::SessionManager;
