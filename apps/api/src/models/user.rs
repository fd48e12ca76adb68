use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity performing a core operation. Always passed explicitly,
/// never inferred from ambient request state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl Actor {
    pub fn new(id: Uuid, email: impl Into<String>, role: impl Into<String>) -> Self {
        Actor {
            id,
            email: email.into(),
            role: role.into(),
        }
    }
}
