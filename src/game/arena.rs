//! Arena bounds and toroidal wraparound.
//!
//! The arena is a `width` × `height` rectangle whose opposite edges are
//! identified. Every distance or connecting-path computation that has to
//! respect wraparound goes through [`ArenaBounds::shortest_path`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::math::Segment;

/// Size of a toroidal arena. Coordinates live in `[0, width) × [0, height)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    width: f32,
    height: f32,
}

/// Which copy of the target a shortest path aims at, and the edge it crosses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    /// Translation applied to the target to reach the chosen copy.
    pub offset: Vec2,
    /// Arena edge the path leaves through.
    pub boundary: Segment,
}

/// Shortest connecting path between two arena points.
///
/// `end` is the target translated by the crossing offset, so it may lie
/// outside the arena. Use [`ToroidalPath::segments`] to get in-arena pieces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToroidalPath {
    pub start: Vec2,
    pub end: Vec2,
    pub crossing: Option<Crossing>,
}

impl ArenaBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(Vec2::ZERO, self.size())
    }

    /// Both dimensions are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Map any point back into `[0, width) × [0, height)`.
    pub fn wrap(&self, point: Vec2) -> Vec2 {
        Vec2::new(wrap_coord(point.x, self.width), wrap_coord(point.y, self.height))
    }

    /// Translations reaching the four toroidal neighbours of the arena.
    pub fn offsets(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.width, 0.0),
            Vec2::new(-self.width, 0.0),
            Vec2::new(0.0, self.height),
            Vec2::new(0.0, -self.height),
        ]
    }

    /// Arena edges, index-aligned with [`ArenaBounds::offsets`]: a path aiming
    /// at a target translated by `offsets()[i]` leaves through `boundary_segments()[i]`.
    pub fn boundary_segments(&self) -> [Segment; 4] {
        let (w, h) = (self.width, self.height);
        [
            Segment::new(Vec2::new(w, 0.0), Vec2::new(w, h)),
            Segment::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, h)),
            Segment::new(Vec2::new(0.0, h), Vec2::new(w, h)),
            Segment::new(Vec2::new(0.0, 0.0), Vec2::new(w, 0.0)),
        ]
    }

    /// Shortest path from `from` to `to`, considering the target and its four
    /// translates. The direct path wins ties.
    pub fn shortest_path(&self, from: Vec2, to: Vec2) -> ToroidalPath {
        let start = self.wrap(from);
        let target = self.wrap(to);

        let mut best = ToroidalPath { start, end: target, crossing: None };
        let mut best_dist_sq = start.distance_squared(target);

        for (offset, boundary) in self.offsets().into_iter().zip(self.boundary_segments()) {
            let candidate = target + offset;
            let dist_sq = start.distance_squared(candidate);
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best = ToroidalPath {
                    start,
                    end: candidate,
                    crossing: Some(Crossing { offset, boundary }),
                };
            }
        }

        best
    }

    /// Vector from `from` to the nearest copy of `to`.
    pub fn delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        let path = self.shortest_path(from, to);
        path.end - path.start
    }

    pub fn distance(&self, from: Vec2, to: Vec2) -> f32 {
        self.delta(from, to).length()
    }

    pub fn distance_squared(&self, from: Vec2, to: Vec2) -> f32 {
        self.delta(from, to).length_squared()
    }

    /// Distance from `point` to a wall, measured against every toroidal copy of
    /// the point so walls near the opposite edge count too.
    pub fn distance_to_segment(&self, point: Vec2, segment: &Segment) -> f32 {
        let point = self.wrap(point);
        self.offsets()
            .into_iter()
            .map(|offset| segment.distance_to_point(point + offset))
            .fold(segment.distance_to_point(point), f32::min)
    }
}

impl ToroidalPath {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn length_squared(&self) -> f32 {
        self.start.distance_squared(self.end)
    }

    /// The path as one in-arena segment, or two when it crosses an edge.
    pub fn segments(&self) -> SmallVec<[Segment; 2]> {
        let path = Segment::new(self.start, self.end);
        let Some(crossing) = self.crossing else {
            return smallvec![path];
        };

        let t = path
            .intersection_param(&crossing.boundary)
            .unwrap_or_else(|| axis_crossing_param(&path, &crossing));
        let exit = path.point_at(t);

        smallvec![
            Segment::new(self.start, exit),
            Segment::new(exit - crossing.offset, self.end - crossing.offset),
        ]
    }
}

/// Fallback when rounding puts the exit a hair outside the boundary segment.
fn axis_crossing_param(path: &Segment, crossing: &Crossing) -> f32 {
    let d = path.delta();
    let t = if crossing.offset.x != 0.0 {
        (crossing.boundary.start.x - path.start.x) / d.x
    } else {
        (crossing.boundary.start.y - path.start.y) / d.y
    };
    if t.is_finite() {
        t.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn wrap_coord(value: f32, size: f32) -> f32 {
    let wrapped = value.rem_euclid(size);
    // rem_euclid can round up to `size` for tiny negative inputs
    if wrapped >= size {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> ArenaBounds {
        ArenaBounds::new(480.0, 320.0)
    }

    #[test]
    fn test_direct_path_when_no_wrap_is_shorter() {
        let path = arena().shortest_path(Vec2::new(100.0, 100.0), Vec2::new(140.0, 130.0));
        assert!(path.crossing.is_none());
        assert!((path.length() - 50.0).abs() < 1e-4);
        assert_eq!(path.segments().len(), 1);
    }

    #[test]
    fn test_path_wraps_across_right_edge() {
        let bounds = arena();
        let path = bounds.shortest_path(Vec2::new(470.0, 100.0), Vec2::new(10.0, 100.0));
        let crossing = path.crossing.expect("path should wrap");
        assert_eq!(crossing.offset, Vec2::new(480.0, 0.0));
        assert!((path.length() - 20.0).abs() < 1e-4);

        let segments = path.segments();
        assert_eq!(segments.len(), 2);
        assert!((segments[0].end.x - 480.0).abs() < 1e-4);
        assert!(segments[1].start.x.abs() < 1e-4);
        assert!((segments[1].end - Vec2::new(10.0, 100.0)).length() < 1e-4);
    }

    #[test]
    fn test_path_wraps_across_bottom_edge() {
        let path = arena().shortest_path(Vec2::new(50.0, 5.0), Vec2::new(60.0, 310.0));
        let crossing = path.crossing.expect("path should wrap");
        assert_eq!(crossing.offset, Vec2::new(0.0, -320.0));
        let segments = path.segments();
        assert!(segments[0].end.y.abs() < 1e-4);
        assert!((segments[1].start.y - 320.0).abs() < 1e-4);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let bounds = arena();
        let a = Vec2::new(5.0, 300.0);
        let b = Vec2::new(470.0, 15.0);
        assert!((bounds.distance(a, b) - bounds.distance(b, a)).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_keeps_points_in_range() {
        let bounds = arena();
        assert_eq!(bounds.wrap(Vec2::new(-10.0, 330.0)), Vec2::new(470.0, 10.0));
        let tiny = bounds.wrap(Vec2::new(-1e-9, 0.0));
        assert!(tiny.x >= 0.0 && tiny.x < 480.0);
    }

    #[test]
    fn test_wall_distance_sees_across_edge() {
        let bounds = arena();
        let wall = Segment::new(Vec2::new(478.0, 0.0), Vec2::new(478.0, 320.0));
        let d = bounds.distance_to_segment(Vec2::new(3.0, 100.0), &wall);
        assert!((d - 5.0).abs() < 1e-4);
    }
}
