use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already registered: {0}")]
    DuplicateUsername(String),

    #[error("Field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("A session is already active")]
    AlreadyAuthenticated,

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl RepoError {
    /// Message suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> &'static str {
        match self {
            RepoError::InvalidCredentials => "Incorrect username or password",
            RepoError::DuplicateUsername(_) => "A user with that name is already registered",
            RepoError::EmptyField(_) => "Please fill in all fields",
            RepoError::NotFound(_) => "That item no longer exists",
            RepoError::NoActiveSession => "Please log in first",
            RepoError::AlreadyAuthenticated => "Log out before switching accounts",
            RepoError::Storage(_) => "Could not save your data",
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
