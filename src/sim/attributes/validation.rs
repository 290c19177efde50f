//! Validation flags raised by the director

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValidationFlag {
    /// Last move was rejected; the host plays a shake animation
    InvalidMove,
    Custom(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    flags: BTreeSet<ValidationFlag>,
}

impl Validation {
    pub fn add(&mut self, flag: ValidationFlag) {
        self.flags.insert(flag);
    }

    pub fn add_invalid_move(&mut self) {
        self.add(ValidationFlag::InvalidMove);
    }

    /// Replace all flags
    pub fn set(&mut self, flags: impl IntoIterator<Item = ValidationFlag>) {
        self.flags = flags.into_iter().collect();
    }

    pub fn remove(&mut self, flag: &ValidationFlag) -> bool {
        self.flags.remove(flag)
    }

    pub fn contains(&self, flag: &ValidationFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_invalid_move(&self) -> bool {
        self.contains(&ValidationFlag::InvalidMove)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationFlag> {
        self.flags.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
