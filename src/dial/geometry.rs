//! Dial geometry
//!
//! Three handles sit on a circle. The angles they subtend at the centre are
//! turned into arc lengths, and the arc lengths into a power split:
//! - rock -> scissor arc drives the engine
//! - scissor -> paper arc drives the weapons
//! - paper -> rock arc drives the shields

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Angle sums below `360 - ANGLE_SUM_TOLERANCE` mean all handles share a half circle
const ANGLE_SUM_TOLERANCE: f32 = 1e-3;

/// One of the three draggable dial handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    Rock,
    Paper,
    Scissor,
}

impl Handle {
    /// Draw order; later handles render on top
    pub const ALL: [Handle; 3] = [Handle::Rock, Handle::Paper, Handle::Scissor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::Rock => "rock",
            Handle::Paper => "paper",
            Handle::Scissor => "scissor",
        }
    }
}

/// Placement of the dial inside its square view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialGeometry {
    /// Side of the square view the dial is drawn in
    pub view_size: f32,
    pub center: Vec2,
    pub radius: f32,
    /// Hit radius of a handle
    pub handle_radius: f32,
}

impl Default for DialGeometry {
    fn default() -> Self {
        use crate::consts::*;
        Self::new(DIAL_VIEW_SIZE, DIAL_RADIUS, DIAL_HANDLE_RADIUS)
    }
}

impl DialGeometry {
    /// Dial centred in a `view_size` square
    pub fn new(view_size: f32, radius: f32, handle_radius: f32) -> Self {
        Self {
            view_size,
            center: Vec2::splat(view_size / 2.0),
            radius,
            handle_radius,
        }
    }

    #[inline]
    pub fn circumference(&self) -> f32 {
        std::f32::consts::TAU * self.radius
    }

    /// Project a point radially onto the dial circle.
    ///
    /// The centre itself has no direction, so it has no projection.
    pub fn snap_to_circle(&self, point: Vec2) -> Option<Vec2> {
        let d = point - self.center;
        let len = d.length();
        if len <= f32::EPSILON {
            return None;
        }
        Some(self.center + d * (self.radius / len))
    }

    /// Angle p0-C-p1 at the dial centre, in degrees (law of cosines)
    pub fn angle_at_center(&self, p0: Vec2, p1: Vec2) -> f32 {
        // f64: acos loses precision near 0 and 180 degrees
        let (p0, p1, c) = (p0.as_dvec2(), p1.as_dvec2(), self.center.as_dvec2());
        let b = p0.distance(c);
        let a = p1.distance(c);
        let side = p0.distance(p1);
        let denom = 2.0 * a * b;
        if denom <= f64::EPSILON {
            return 0.0;
        }
        let cos = ((a * a + b * b - side * side) / denom).clamp(-1.0, 1.0);
        cos.acos().to_degrees() as f32
    }

    /// Length of an arc spanning `angle` degrees
    #[inline]
    pub fn arc_length(&self, angle: f32) -> f32 {
        angle / 360.0 * self.circumference()
    }

    /// Pairwise handle angles, adjusted so they partition the full circle
    pub fn find_angles(&self, rock: Vec2, scissor: Vec2, paper: Vec2) -> DialAngles {
        DialAngles {
            rock_scissor: self.angle_at_center(rock, scissor),
            scissor_paper: self.angle_at_center(scissor, paper),
            paper_rock: self.angle_at_center(rock, paper),
        }
        .adjusted()
    }

    pub fn calculate_arcs(&self, angles: &DialAngles) -> Arcs {
        Arcs {
            rock_to_scissor: self.arc_length(angles.rock_scissor),
            scissor_to_paper: self.arc_length(angles.scissor_paper),
            paper_to_rock: self.arc_length(angles.paper_rock),
        }
    }
}

/// Angles (degrees) between neighbouring handles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialAngles {
    pub rock_scissor: f32,
    pub scissor_paper: f32,
    pub paper_rock: f32,
}

impl DialAngles {
    pub fn sum(&self) -> f32 {
        self.rock_scissor + self.scissor_paper + self.paper_rock
    }

    /// When all handles sit in one half circle the raw angles sum to less
    /// than 360: the largest one measures the short way round and is
    /// replaced by its reflex angle.
    pub fn adjusted(self) -> Self {
        if self.sum() >= 360.0 - ANGLE_SUM_TOLERANCE {
            return self;
        }

        let mut values = [self.rock_scissor, self.scissor_paper, self.paper_rock];
        // First of equal maxima wins
        let mut largest = 0;
        for i in 1..values.len() {
            if values[i] > values[largest] {
                largest = i;
            }
        }
        values[largest] = 360.0 - values[largest];

        Self {
            rock_scissor: values[0],
            scissor_paper: values[1],
            paper_rock: values[2],
        }
    }
}

/// Arc lengths between neighbouring handles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arcs {
    pub rock_to_scissor: f32,
    pub scissor_to_paper: f32,
    pub paper_to_rock: f32,
}

impl Arcs {
    pub fn total(&self) -> f32 {
        self.rock_to_scissor + self.scissor_to_paper + self.paper_to_rock
    }

    /// SVG large-arc flags, in (rock->scissor, scissor->paper, paper->rock) order
    pub fn large_arc_flags(&self) -> [bool; 3] {
        [
            self.rock_to_scissor >= self.scissor_to_paper + self.paper_to_rock,
            self.scissor_to_paper >= self.rock_to_scissor + self.paper_to_rock,
            self.paper_to_rock >= self.scissor_to_paper + self.rock_to_scissor,
        ]
    }
}

/// Power allocation in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSplit {
    pub engine: f32,
    pub weapons: f32,
    pub shields: f32,
}

impl Default for PowerSplit {
    fn default() -> Self {
        Self {
            engine: 34.0,
            weapons: 33.0,
            shields: 33.0,
        }
    }
}

impl PowerSplit {
    /// Each arc as a share of the circumference, renormalised to sum to 100
    pub fn from_arcs(arcs: &Arcs, circumference: f32) -> Self {
        if circumference <= f32::EPSILON {
            return Self::default();
        }
        let engine = arcs.rock_to_scissor / circumference * 100.0;
        let weapons = arcs.scissor_to_paper / circumference * 100.0;
        let shields = arcs.paper_to_rock / circumference * 100.0;

        let sum = engine + weapons + shields;
        if sum <= f32::EPSILON {
            return Self::default();
        }
        let k = 100.0 / sum;
        Self {
            engine: engine * k,
            weapons: weapons * k,
            shields: shields * k,
        }
    }

    pub fn total(&self) -> f32 {
        self.engine + self.weapons + self.shields
    }
}
