//! Pointer-driven dial controller
//!
//! Holds the three handle positions and which handle (if any) is being
//! dragged. Pointer moves while dragging snap the handle to the circle and
//! produce a fresh [`PowerSplit`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Arcs, DialGeometry, Handle, PowerSplit};

/// Unsnapped starting points, in a 100-unit view
const INITIAL_ROCK: Vec2 = Vec2::new(40.0, 75.0);
const INITIAL_PAPER: Vec2 = Vec2::new(0.0, 0.0);
const INITIAL_SCISSOR: Vec2 = Vec2::new(200.0, 200.0);
const INITIAL_VIEW_SIZE: f32 = 100.0;

/// An SVG arc drawn between two neighbouring handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPath {
    pub from: Handle,
    pub to: Handle,
    pub large_arc: bool,
    /// SVG path data
    pub d: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialController {
    geometry: DialGeometry,
    rock: Vec2,
    paper: Vec2,
    scissor: Vec2,
    arcs: Arcs,
    /// Handle currently being dragged
    recording: Option<Handle>,
}

impl Default for DialController {
    fn default() -> Self {
        Self::new(DialGeometry::default())
    }
}

impl DialController {
    pub fn new(geometry: DialGeometry) -> Self {
        let scale = geometry.view_size / INITIAL_VIEW_SIZE;
        // Fall back to a fixed angle if a starting point lands on the centre
        let place = |p: Vec2, fallback_deg: f32| {
            geometry.snap_to_circle(p * scale).unwrap_or_else(|| {
                crate::polar_to_cartesian(
                    geometry.center,
                    geometry.radius,
                    fallback_deg.to_radians(),
                )
            })
        };

        let rock = place(INITIAL_ROCK, 90.0);
        let paper = place(INITIAL_PAPER, 210.0);
        let scissor = place(INITIAL_SCISSOR, 330.0);
        let arcs = geometry.calculate_arcs(&geometry.find_angles(rock, scissor, paper));

        Self {
            geometry,
            rock,
            paper,
            scissor,
            arcs,
            recording: None,
        }
    }

    pub fn geometry(&self) -> &DialGeometry {
        &self.geometry
    }

    pub fn handle_position(&self, handle: Handle) -> Vec2 {
        match handle {
            Handle::Rock => self.rock,
            Handle::Paper => self.paper,
            Handle::Scissor => self.scissor,
        }
    }

    pub fn arcs(&self) -> Arcs {
        self.arcs
    }

    pub fn split(&self) -> PowerSplit {
        PowerSplit::from_arcs(&self.arcs, self.geometry.circumference())
    }

    pub fn recording(&self) -> Option<Handle> {
        self.recording
    }

    /// Start dragging a handle
    pub fn press(&mut self, handle: Handle) {
        log::debug!("dial: dragging {}", handle.as_str());
        self.recording = Some(handle);
    }

    /// Topmost handle whose hit circle contains `point` (dial-local coordinates)
    pub fn handle_at(&self, point: Vec2) -> Option<Handle> {
        let mut best: Option<(Handle, f32)> = None;
        for handle in Handle::ALL {
            let d = self.handle_position(handle).distance(point);
            if d > self.geometry.handle_radius {
                continue;
            }
            // Later handles draw on top, so they win ties
            match best {
                Some((_, best_d)) if d > best_d => {}
                _ => best = Some((handle, d)),
            }
        }
        best.map(|(h, _)| h)
    }

    /// Press whichever handle is under `point`
    pub fn press_at(&mut self, point: Vec2) -> Option<Handle> {
        let handle = self.handle_at(point)?;
        self.press(handle);
        Some(handle)
    }

    /// [`press_at`](Self::press_at) for a pointer in page coordinates, with
    /// the same `origin` convention as [`pointer_move`](Self::pointer_move)
    pub fn pointer_down(&mut self, client: Vec2, origin: Vec2) -> Option<Handle> {
        self.press_at(client - origin)
    }

    /// Stop dragging
    pub fn release(&mut self) {
        self.recording = None;
    }

    /// Pointer moved to `client` (page coordinates); `origin` is the dial
    /// view's top-left corner on the page.
    ///
    /// Returns the new split while a handle is being dragged.
    pub fn pointer_move(&mut self, client: Vec2, origin: Vec2) -> Option<PowerSplit> {
        let handle = self.recording?;
        let pos = self.geometry.snap_to_circle(client - origin)?;

        let (rock, scissor, paper) = match handle {
            Handle::Rock => (pos, self.scissor, self.paper),
            Handle::Paper => (self.rock, self.scissor, pos),
            Handle::Scissor => (self.rock, pos, self.paper),
        };
        let angles = self.geometry.find_angles(rock, scissor, paper);
        self.arcs = self.geometry.calculate_arcs(&angles);
        self.rock = rock;
        self.scissor = scissor;
        self.paper = paper;

        let split = self.split();
        log::debug!(
            "dial: engine {:.1} weapons {:.1} shields {:.1}",
            split.engine,
            split.weapons,
            split.shields
        );
        Some(split)
    }

    /// SVG arcs: rock -> scissor, scissor -> paper, paper -> rock
    pub fn segment_paths(&self) -> [SegmentPath; 3] {
        let flags = self.arcs.large_arc_flags();
        let r = self.geometry.radius;
        let segment = |from: Handle, to: Handle, large_arc: bool| {
            let a = self.handle_position(from);
            let b = self.handle_position(to);
            SegmentPath {
                from,
                to,
                large_arc,
                d: format!(
                    "M {} {} A {},{} 0 {} 0 {} {}",
                    a.x,
                    a.y,
                    r,
                    r,
                    u8::from(large_arc),
                    b.x,
                    b.y
                ),
            }
        };
        [
            segment(Handle::Rock, Handle::Scissor, flags[0]),
            segment(Handle::Scissor, Handle::Paper, flags[1]),
            segment(Handle::Paper, Handle::Rock, flags[2]),
        ]
    }
}
