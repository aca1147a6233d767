use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Parallel-line tolerance for segment intersection tests.
pub const PARALLEL_EPSILON: f32 = 1e-9;

/// A straight piece of wall or path between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn delta(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn length(&self) -> f32 {
        self.delta().length()
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start + self.delta() * t
    }

    /// Axis-aligned box covering the segment.
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }

    /// Shortest distance from `point` to any point of the segment.
    pub fn distance_to_point(&self, point: Vec2) -> f32 {
        let d = self.delta();
        let len_sq = d.length_squared();
        if len_sq <= f32::EPSILON {
            return self.start.distance(point);
        }
        let t = ((point - self.start).dot(d) / len_sq).clamp(0.0, 1.0);
        self.point_at(t).distance(point)
    }

    /// Parameter along `self` where it meets `other`, if the two cross.
    ///
    /// Parallel (including collinear) pairs report no crossing; use
    /// [`Segment::intersects`] when touching and overlap must count.
    pub fn intersection_param(&self, other: &Segment) -> Option<f32> {
        let r = self.delta();
        let s = other.delta();
        let denom = r.perp_dot(s);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let qp = other.start - self.start;
        let t = qp.perp_dot(s) / denom;
        let u = qp.perp_dot(r) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    /// True when the segments share at least one point.
    pub fn intersects(&self, other: &Segment) -> bool {
        let (p1, p2) = (self.start, self.end);
        let (q1, q2) = (other.start, other.end);

        let d1 = orientation(q1, q2, p1);
        let d2 = orientation(q1, q2, p2);
        let d3 = orientation(p1, p2, q1);
        let d4 = orientation(p1, p2, q2);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1 == 0.0 && within_box(q1, q2, p1))
            || (d2 == 0.0 && within_box(q1, q2, p2))
            || (d3 == 0.0 && within_box(p1, p2, q1))
            || (d4 == 0.0 && within_box(p1, p2, q2))
    }

    /// Cast from `start` towards `end` against the outline of `rect`.
    ///
    /// Returns the first point where the segment meets one of the rectangle's
    /// edges, or `end` itself when it meets none of them.
    pub fn raycast_rect(&self, rect: Rect) -> Vec2 {
        let corners = [
            rect.min,
            Vec2::new(rect.max.x, rect.min.y),
            rect.max,
            Vec2::new(rect.min.x, rect.max.y),
        ];

        let mut nearest: Option<f32> = None;
        for i in 0..4 {
            let edge = Segment::new(corners[i], corners[(i + 1) % 4]);
            if let Some(t) = self.intersection_param(&edge) {
                nearest = Some(nearest.map_or(t, |best| best.min(t)));
            }
        }

        match nearest {
            Some(t) => self.point_at(t),
            None => self.end,
        }
    }
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// `c` lies inside the bounding box of `a`-`b` (used for collinear cases).
fn within_box(a: Vec2, b: Vec2, c: Vec2) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

/// Wrap an angle into `[-PI, PI)`.
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Heading (radians, counter-clockwise from +x) pointing along `direction`.
pub fn heading_of(direction: Vec2) -> f32 {
    direction.y.atan2(direction.x)
}
