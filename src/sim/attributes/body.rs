//! Position and size

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SHIP_RADIUS;

/// A circle in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            r: SHIP_RADIUS,
        }
    }
}

impl Body {
    pub fn new(x: f32, y: f32, r: f32) -> Self {
        Self { x, y, r }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.r
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.x = pos.x;
        self.y = pos.y;
    }

    pub fn by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Move to `x`, and to `y` when given
    pub fn to(&mut self, x: f32, y: Option<f32>) {
        self.x = x;
        if let Some(y) = y {
            self.y = y;
        }
    }

    // Direction helpers ignore the sign of `amount`
    pub fn up(&mut self, amount: f32) {
        self.by(0.0, -amount.abs());
    }

    pub fn down(&mut self, amount: f32) {
        self.by(0.0, amount.abs());
    }

    pub fn left(&mut self, amount: f32) {
        self.by(-amount.abs(), 0.0);
    }

    pub fn right(&mut self, amount: f32) {
        self.by(amount.abs(), 0.0);
    }

    /// Penetration depth if the two circles overlap
    pub fn overlap(&self, other: &Body) -> Option<f32> {
        let dist = self.position().distance(other.position());
        let reach = self.r + other.r;
        (dist < reach).then_some(reach - dist)
    }
}
