//! Where an entity is along its current path

use serde::{Deserialize, Serialize};

use crate::sim::path::PathId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPosition {
    pub length: f32,
    pub path_id: PathId,
}

impl PathPosition {
    pub fn new(path_id: impl Into<PathId>) -> Self {
        Self {
            length: 0.0,
            path_id: path_id.into(),
        }
    }

    pub fn set_length(&mut self, length: f32) {
        self.length = length;
    }

    pub fn increase_length(&mut self, addition: f32) {
        self.length += addition;
    }

    pub fn decrease_length(&mut self, reduction: f32) {
        self.length -= reduction;
    }

    /// Switch paths, starting again from the beginning
    pub fn change_path(&mut self, path_id: impl Into<PathId>) {
        self.path_id = path_id.into();
        self.length = 0.0;
    }
}
