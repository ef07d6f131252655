//! Random link ids.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Hands out UUID v4 strings.
pub struct LiveIdGenerator;

impl IdGenerator for LiveIdGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
