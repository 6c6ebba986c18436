use uuid::Uuid;

/// Source of fresh identifiers for plants and accounts.
pub trait IdSource: std::fmt::Debug {
    fn next_id(&mut self) -> Uuid;
}

#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Counts up from a starting value. Deterministic, for tests and fixtures.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn starting_at(next: u128) -> Self {
        SequentialIds { next }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}
