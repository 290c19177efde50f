//! SVG paths that entities travel along
//!
//! A path is parsed from SVG path data, flattened into a polyline and
//! indexed by cumulative length, so positions can be looked up by the
//! scalar "length along path" each entity tracks.
//!
//! Supported commands: M/m, L/l, H/h, V/v, Q/q, C/c, Z/z (one subpath).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attributes::Power;
use crate::consts::{CURVE_SEGMENTS, HEADING_LOOKAHEAD};
use crate::error::{Error, Result};

pub type PathId = String;

/// Minimum power levels (percent) an entity needs to join a path
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapons: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shields: Option<f32>,
}

impl PowerRequirement {
    pub fn engine(min: f32) -> Self {
        Self {
            engine: Some(min),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_none() && self.weapons.is_none() && self.shields.is_none()
    }

    /// Every named minimum is at or below the entity's level
    pub fn is_met_by(&self, power: &Power) -> bool {
        let ok = |min: Option<f32>, level: f32| min.is_none_or(|m| level >= m);
        ok(self.engine, power.engine) && ok(self.weapons, power.weapons) && ok(self.shields, power.shields)
    }
}

/// Path as written in settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDef {
    pub id: PathId,
    /// SVG path data
    pub instructions: String,
    #[serde(default)]
    pub requirement: PowerRequirement,
    /// NPC ships may spawn at the start of this path
    #[serde(default)]
    pub spawn: bool,
}

/// A parsed, flattened path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub id: PathId,
    pub instructions: String,
    pub requirement: PowerRequirement,
    pub spawn: bool,
    /// Ends with a closepath; positions wrap instead of clamping
    pub closed: bool,
    points: Vec<Vec2>,
    /// cumulative[i] = length from the start to points[i]
    cumulative: Vec<f32>,
}

impl Path {
    pub fn parse(
        id: impl Into<PathId>,
        instructions: impl Into<String>,
        requirement: PowerRequirement,
    ) -> Result<Self> {
        let id = id.into();
        let instructions = instructions.into();
        let (points, closed) = parse_instructions(&id, &instructions)?;

        let mut cumulative = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        cumulative.push(0.0);
        for pair in points.windows(2) {
            acc += pair[0].distance(pair[1]);
            cumulative.push(acc);
        }

        Ok(Self {
            id,
            instructions,
            requirement,
            spawn: false,
            closed,
            points,
            cumulative,
        })
    }

    pub fn from_def(def: &PathDef) -> Result<Self> {
        let mut path = Self::parse(def.id.clone(), def.instructions.clone(), def.requirement)?;
        path.spawn = def.spawn;
        Ok(path)
    }

    pub fn total_length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn start_position(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Point `len` units along the path. Open paths clamp to their ends,
    /// closed paths wrap around.
    pub fn point_at_length(&self, len: f32) -> Vec2 {
        let total = self.total_length();
        if self.points.len() < 2 || total <= f32::EPSILON {
            return self.start_position();
        }
        let len = if self.closed {
            len.rem_euclid(total)
        } else {
            len.clamp(0.0, total)
        };

        let i = self.cumulative.partition_point(|&c| c < len);
        if i == 0 {
            return self.points[0];
        }
        let i = i.min(self.points.len() - 1);
        let (c0, c1) = (self.cumulative[i - 1], self.cumulative[i]);
        let seg = c1 - c0;
        let t = if seg <= f32::EPSILON { 0.0 } else { (len - c0) / seg };
        self.points[i - 1].lerp(self.points[i], t)
    }

    /// Direction of travel at `len`, in degrees
    pub fn heading_at(&self, len: f32) -> f32 {
        let total = self.total_length();
        if total <= f32::EPSILON {
            return 0.0;
        }
        let p = self.point_at_length(len);
        let q = self.point_at_length((len + HEADING_LOOKAHEAD) % total);
        (q.y - p.y).atan2(q.x - p.x).to_degrees()
    }

    /// Whether `len` is at or beyond the end of the path
    pub fn is_past_end(&self, len: f32) -> bool {
        len >= self.total_length()
    }
}

/// Ordered path table; definition order is lookup order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSet {
    paths: Vec<Path>,
}

impl PathSet {
    pub fn from_defs(defs: &[PathDef]) -> Result<Self> {
        let mut set = Self::default();
        for def in defs {
            set.insert(Path::from_def(def)?);
        }
        Ok(set)
    }

    /// Add a path, replacing any path with the same id in place
    pub fn insert(&mut self, path: Path) {
        match self.paths.iter_mut().find(|p| p.id == path.id) {
            Some(existing) => *existing = path,
            None => self.paths.push(path),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Path> {
        self.paths.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }

    /// Paths worth drawing (zero-length placeholders are skipped)
    pub fn visible(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().filter(|p| p.total_length() > 0.0)
    }

    pub fn spawn_paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().filter(|p| p.spawn)
    }

    /// First path whose start lies strictly within `r` of `pos`
    pub fn find_nearest_path(&self, pos: Vec2, r: f32) -> Option<&Path> {
        self.paths.iter().find(|p| p.start_position().distance(pos) < r)
    }

    /// Path an entity at `pos` switches onto: the nearest path by
    /// [`find_nearest_path`](Self::find_nearest_path), if that is not the
    /// current one and `power` meets its requirement
    pub fn find_switch(&self, pos: Vec2, r: f32, current: &str, power: &Power) -> Option<&Path> {
        self.find_nearest_path(pos, r)
            .filter(|p| p.id != current && p.requirement.is_met_by(power))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
    path_id: &'a str,
}

impl Cursor<'_> {
    fn skip_separators(&mut self) {
        while self.pos < self.src.len()
            && (self.src[self.pos].is_ascii_whitespace() || self.src[self.pos] == b',')
        {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn error(&self, reason: &'static str) -> Error {
        Error::PathParse {
            path_id: self.path_id.to_string(),
            offset: self.pos,
            reason,
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn number(&mut self) -> Result<f32> {
        self.skip_separators();
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut count = self.digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            count += self.digits();
        }
        if count == 0 {
            self.pos = start;
            return Err(self.error("expected number"));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                self.pos = mark;
            }
        }

        let value = std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f32>().ok());
        match value {
            Some(v) => Ok(v),
            None => {
                self.pos = start;
                Err(self.error("malformed number"))
            }
        }
    }

    fn pair(&mut self) -> Result<Vec2> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Vec2::new(x, y))
    }
}

fn quadratic(p0: Vec2, c: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + c * (2.0 * u * t) + p1 * (t * t)
}

fn cubic(p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + c0 * (3.0 * u * u * t) + c1 * (3.0 * u * t * t) + p1 * (t * t * t)
}

fn parse_instructions(path_id: &str, instructions: &str) -> Result<(Vec<Vec2>, bool)> {
    let mut cur = Cursor {
        src: instructions.as_bytes(),
        pos: 0,
        path_id,
    };
    let mut points: Vec<Vec2> = Vec::new();
    let mut current = Vec2::ZERO;
    let mut subpath_start = Vec2::ZERO;
    let mut closed = false;
    let mut command: Option<u8> = None;

    loop {
        cur.skip_separators();
        let Some(c) = cur.peek() else { break };

        if c.is_ascii_alphabetic() {
            cur.pos += 1;
            command = Some(c);
        }
        let Some(cmd) = command else {
            return Err(cur.error("expected command"));
        };

        let relative = cmd.is_ascii_lowercase();
        let base = if relative { current } else { Vec2::ZERO };

        if points.is_empty() && !matches!(cmd, b'M' | b'm') {
            return Err(cur.error("path must start with moveto"));
        }

        match cmd.to_ascii_uppercase() {
            b'M' => {
                if !points.is_empty() {
                    return Err(cur.error("multiple subpaths are not supported"));
                }
                current = base + cur.pair()?;
                subpath_start = current;
                points.push(current);
                // Extra coordinate pairs after a moveto are line-tos
                command = Some(if relative { b'l' } else { b'L' });
            }
            b'L' => {
                current = base + cur.pair()?;
                points.push(current);
            }
            b'H' => {
                let x = cur.number()?;
                current = Vec2::new(if relative { current.x + x } else { x }, current.y);
                points.push(current);
            }
            b'V' => {
                let y = cur.number()?;
                current = Vec2::new(current.x, if relative { current.y + y } else { y });
                points.push(current);
            }
            b'Q' => {
                let control = base + cur.pair()?;
                let end = base + cur.pair()?;
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    points.push(quadratic(current, control, end, t));
                }
                current = end;
            }
            b'C' => {
                let c0 = base + cur.pair()?;
                let c1 = base + cur.pair()?;
                let end = base + cur.pair()?;
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    points.push(cubic(current, c0, c1, end, t));
                }
                current = end;
            }
            b'Z' => {
                if current.distance(subpath_start) > f32::EPSILON {
                    points.push(subpath_start);
                }
                current = subpath_start;
                closed = true;
                command = None;
                continue;
            }
            _ => {
                cur.pos -= 1;
                return Err(cur.error("unsupported command"));
            }
        }
        closed = false;
    }

    if points.is_empty() {
        return Err(cur.error("empty path"));
    }
    Ok((points, closed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOP: &str = "M 630 400 Q 600 70 500 250 Q 350 580 200 250 Q 100 70 80 400 Q 80 510 350 525 Q 600 510 630 400 Z";
    const SPUR: &str = "M443.48822021484375 350.9056701660156 l -50 -50 l 0 -100";

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_parse_relative_lines() {
        let path = Path::parse("path1", SPUR, PowerRequirement::engine(50.0)).unwrap();
        assert!(!path.closed);
        assert_eq!(path.points().len(), 3);
        let expected = 50.0 * std::f32::consts::SQRT_2 + 100.0;
        assert!((path.total_length() - expected).abs() < 1e-3);
        assert!(approx(path.start_position(), Vec2::new(443.48822, 350.90567)));
        assert!(approx(
            path.point_at_length(path.total_length()),
            Vec2::new(393.48822, 200.90567)
        ));
    }

    #[test]
    fn test_parse_closed_curve() {
        let path = Path::parse("path0", LOOP, PowerRequirement::default()).unwrap();
        assert!(path.closed);
        assert_eq!(path.points().len(), 1 + 5 * CURVE_SEGMENTS);
        assert!(path.total_length() > 1000.0);
        // Closing point equals the start, so no extra segment
        assert!(approx(*path.points().last().unwrap(), path.start_position()));
    }

    #[test]
    fn test_point_at_length_open_clamps() {
        let path = Path::parse("p", "M 0 0 L 10 0 L 10 10", PowerRequirement::default()).unwrap();
        assert!(approx(path.point_at_length(15.0), Vec2::new(10.0, 5.0)));
        assert!(approx(path.point_at_length(100.0), Vec2::new(10.0, 10.0)));
        assert!(approx(path.point_at_length(-5.0), Vec2::ZERO));
        assert!(path.is_past_end(20.0));
        assert!(!path.is_past_end(19.9));
    }

    #[test]
    fn test_point_at_length_closed_wraps() {
        let path = Path::parse("p", "M 0 0 H 10 V 10 Z", PowerRequirement::default()).unwrap();
        assert!(path.closed);
        let total = 20.0 + 200.0_f32.sqrt();
        assert!((path.total_length() - total).abs() < 1e-3);
        assert!(approx(path.point_at_length(total + 5.0), Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn test_heading() {
        let path = Path::parse("p", "M0 0 L10 0", PowerRequirement::default()).unwrap();
        assert!(path.heading_at(0.0).abs() < 1e-3);

        let spur = Path::parse("path1", SPUR, PowerRequirement::default()).unwrap();
        assert!((spur.heading_at(0.0) + 135.0).abs() < 1e-2);
    }

    #[test]
    fn test_parse_numbers_and_separators() {
        let path = Path::parse("p", "M1e1,0L-10-0.5,l.5 .5", PowerRequirement::default()).unwrap();
        assert!(approx(path.points()[0], Vec2::new(10.0, 0.0)));
        assert!(approx(path.points()[1], Vec2::new(-10.0, -0.5)));
        assert!(approx(path.points()[2], Vec2::new(-9.5, 0.0)));
    }

    #[test]
    fn test_parse_errors() {
        let err = Path::parse("bad", "L 10 10", PowerRequirement::default()).unwrap_err();
        assert!(matches!(err, Error::PathParse { offset: 1, .. }));

        let err = Path::parse("bad", "M 0 0 L 5", PowerRequirement::default()).unwrap_err();
        assert!(matches!(err, Error::PathParse { reason: "expected number", .. }));

        let err = Path::parse("bad", "M 0 0 X 1", PowerRequirement::default()).unwrap_err();
        assert!(matches!(err, Error::PathParse { offset: 6, reason: "unsupported command", .. }));

        assert!(Path::parse("bad", "", PowerRequirement::default()).is_err());
        assert!(Path::parse("bad", "M 0 0 Z 4 4", PowerRequirement::default()).is_err());
    }

    #[test]
    fn test_zero_length_path_is_hidden() {
        let defs = vec![
            PathDef {
                id: "path0".into(),
                instructions: LOOP.into(),
                requirement: PowerRequirement::default(),
                spawn: false,
            },
            PathDef {
                id: "_0".into(),
                instructions: "M0 0 L 0 0".into(),
                requirement: PowerRequirement::default(),
                spawn: false,
            },
        ];
        let set = PathSet::from_defs(&defs).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.visible().count(), 1);
        assert_eq!(set.get("_0").unwrap().point_at_length(3.0), Vec2::ZERO);
    }

    #[test]
    fn test_find_nearest_path() {
        let mut set = PathSet::default();
        set.insert(Path::parse("path0", LOOP, PowerRequirement::default()).unwrap());
        set.insert(Path::parse("path1", SPUR, PowerRequirement::engine(50.0)).unwrap());

        let near_spur = Vec2::new(440.0, 350.0);
        assert_eq!(set.find_nearest_path(near_spur, 10.0).unwrap().id, "path1");
        assert!(set.find_nearest_path(near_spur, 1.0).is_none());
        assert_eq!(set.find_nearest_path(Vec2::new(630.0, 400.0), 10.0).unwrap().id, "path0");

        // Replacing keeps definition order
        set.insert(Path::parse("path0", "M 0 0 L 1 1", PowerRequirement::default()).unwrap());
        assert_eq!(set.iter().next().unwrap().id, "path0");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_find_switch_skips_current_and_unmet() {
        let mut set = PathSet::default();
        set.insert(Path::parse("path0", LOOP, PowerRequirement::default()).unwrap());
        set.insert(Path::parse("path1", SPUR, PowerRequirement::engine(50.0)).unwrap());
        let at_spur = set.get("path1").unwrap().start_position();

        let mut power = Power::default();
        assert!(set.find_switch(at_spur, 10.0, "path0", &power).is_none());
        power.engine = 60.0;
        assert_eq!(set.find_switch(at_spur, 10.0, "path0", &power).unwrap().id, "path1");
        assert!(set.find_switch(at_spur, 10.0, "path1", &power).is_none());
    }

    #[test]
    fn test_find_switch_only_considers_first_start() {
        let mut set = PathSet::default();
        set.insert(Path::parse("a", "M 0 0 L 100 0", PowerRequirement::default()).unwrap());
        set.insert(Path::parse("b", "M 3 0 L 3 100", PowerRequirement::default()).unwrap());
        set.insert(Path::parse("c", "M 0 3 L -100 3", PowerRequirement::default()).unwrap());
        let power = Power::default();

        // "a" comes first and is current, so the later starts are not tried
        assert!(set.find_switch(Vec2::ZERO, 10.0, "a", &power).is_none());
        assert_eq!(set.find_switch(Vec2::ZERO, 10.0, "b", &power).unwrap().id, "a");

        // An unmet requirement on the first match blocks the rest too
        set.insert(Path::parse("a", "M 0 0 L 100 0", PowerRequirement::engine(90.0)).unwrap());
        assert!(set.find_switch(Vec2::ZERO, 10.0, "b", &power).is_none());
    }

    #[test]
    fn test_requirement() {
        let req = PowerRequirement::engine(50.0);
        let mut power = Power::default();
        assert!(!req.is_met_by(&power));
        power.engine = 50.0;
        assert!(req.is_met_by(&power));
        assert!(PowerRequirement::default().is_met_by(&Power::default()));
        assert!(PowerRequirement::default().is_empty());
    }
}
