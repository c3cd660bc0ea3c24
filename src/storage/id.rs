use super::types::UserId;
use uuid::Uuid;

/// Source of record identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> UserId;
}

/// Random v4 UUID generator. Holds no state beyond the OS entropy source.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> UserId {
        UserId(Uuid::new_v4())
    }
}
