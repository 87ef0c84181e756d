//! Domain model for a category.
//!
//! The name is the natural key: expense saves look categories up by exact
//! name, the category editor matches ignoring case. Categories are shared
//! between expenses and survive their last reference.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    /// Create a new category with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
