//! Static/kinematic colliders and the swept-circle query
//!
//! A circle of radius r swept along a ray hits a shape exactly when the ray
//! hits the shape inflated by r. Boxes inflate to rounded rectangles: slab
//! test against the box grown by r, then a corner-circle test when the entry
//! point falls in a corner region.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sign_or_one;

pub type ColliderId = u32;

/// Bit set of collision layers (bit i = layer i)
pub type LayerMask = u32;

pub const ALL_LAYERS: LayerMask = !0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box
    Box { center: Vec2, half_extents: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

impl Shape {
    pub fn center(&self) -> Vec2 {
        match *self {
            Shape::Box { center, .. } | Shape::Circle { center, .. } => center,
        }
    }

    /// Half size of the axis-aligned bounding box
    pub fn extents(&self) -> Vec2 {
        match *self {
            Shape::Box { half_extents, .. } => half_extents,
            Shape::Circle { radius, .. } => Vec2::splat(radius),
        }
    }

    fn set_center(&mut self, new_center: Vec2) {
        match self {
            Shape::Box { center, .. } | Shape::Circle { center, .. } => *center = new_center,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub id: ColliderId,
    pub shape: Shape,
    /// Layer index 0..32
    pub layer: u32,
    /// Triggers are reported by overlap queries only, never by casts
    pub is_trigger: bool,
}

impl Collider {
    #[inline]
    pub fn in_mask(&self, mask: LayerMask) -> bool {
        self.layer < 32 && mask & (1 << self.layer) != 0
    }
}

/// One result of a circle cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    /// Distance travelled along the cast direction before contact
    pub distance: f32,
    /// Contact point on the collider surface
    pub point: Vec2,
    /// Surface normal at the contact, pointing toward the cast circle
    pub normal: Vec2,
    pub collider: ColliderId,
}

/// Bounding box of a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub center: Vec2,
    pub extents: Vec2,
}

/// Collision queries supplied by the physics provider
pub trait CircleCaster {
    /// Sweep a circle from `origin` along unit `dir` up to `max_distance`
    /// against non-trigger colliders in `mask`, sorted by distance
    fn circle_cast(
        &self,
        origin: Vec2,
        radius: f32,
        dir: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<CastHit>;

    fn bounds(&self, id: ColliderId) -> Option<Bounds>;
}

/// Ray against circle; returns (t, normal)
fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f32, max: f32) -> Option<(f32, Vec2)> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        // Starting inside: zero-distance hit pushing outward
        return Some((0.0, m.try_normalize().unwrap_or(-dir)));
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()).max(0.0);
    if t > max {
        return None;
    }
    let normal = (origin + dir * t - center) / radius;
    Some((t, normal))
}

/// Circle of `radius` swept against an axis-aligned box; returns (t, normal)
fn sweep_box(
    origin: Vec2,
    dir: Vec2,
    radius: f32,
    center: Vec2,
    half: Vec2,
    max: f32,
) -> Option<(f32, Vec2)> {
    let lo = center - half;
    let hi = center + half;

    let closest = origin.clamp(lo, hi);
    let offset = origin - closest;
    if offset.length_squared() <= radius * radius {
        let normal = match offset.try_normalize() {
            Some(n) => n,
            None => {
                // Center inside the box: leave through the shallowest face
                let local = origin - center;
                let depth = half - local.abs();
                if depth.x < depth.y {
                    Vec2::new(sign_or_one(local.x), 0.0)
                } else {
                    Vec2::new(0.0, sign_or_one(local.y))
                }
            }
        };
        return Some((0.0, normal));
    }

    let grown_lo = lo - Vec2::splat(radius);
    let grown_hi = hi + Vec2::splat(radius);
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = max;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d) = (origin[axis], dir[axis]);
        if d.abs() < 1e-8 {
            if o < grown_lo[axis] || o > grown_hi[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (grown_lo[axis] - o) * inv;
        let mut t2 = (grown_hi[axis] - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_enter {
            t_enter = t1;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    let t = t_enter.max(0.0);
    if t > max || t_exit < 0.0 {
        return None;
    }

    let p = origin + dir * t;
    let in_corner_x = p.x < lo.x || p.x > hi.x;
    let in_corner_y = p.y < lo.y || p.y > hi.y;
    if in_corner_x && in_corner_y {
        let corner = Vec2::new(
            if p.x < lo.x { lo.x } else { hi.x },
            if p.y < lo.y { lo.y } else { hi.y },
        );
        return ray_circle(origin, dir, corner, radius, max);
    }

    Some((t, normal))
}

/// Plain collider list with brute-force queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColliderSet {
    colliders: Vec<Collider>,
    next_id: ColliderId,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, shape: Shape, layer: u32, is_trigger: bool) -> ColliderId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.colliders.push(Collider {
            id,
            shape,
            layer,
            is_trigger,
        });
        id
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    pub fn set_center(&mut self, id: ColliderId, center: Vec2) {
        if let Some(collider) = self.colliders.iter_mut().find(|c| c.id == id) {
            collider.shape.set_center(center);
        }
    }

    pub fn remove(&mut self, id: ColliderId) -> Option<Collider> {
        let idx = self.colliders.iter().position(|c| c.id == id)?;
        Some(self.colliders.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Trigger colliders in `mask` overlapping the circle
    pub fn overlap_triggers(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ColliderId> {
        self.colliders
            .iter()
            .filter(|c| c.is_trigger && c.in_mask(mask))
            .filter(|c| match c.shape {
                Shape::Circle {
                    center: other,
                    radius: r,
                } => (center - other).length() <= radius + r,
                Shape::Box {
                    center: other,
                    half_extents,
                } => {
                    let closest = center.clamp(other - half_extents, other + half_extents);
                    (center - closest).length() <= radius
                }
            })
            .map(|c| c.id)
            .collect()
    }
}

impl CircleCaster for ColliderSet {
    fn circle_cast(
        &self,
        origin: Vec2,
        radius: f32,
        dir: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<CastHit> {
        let dir = match dir.try_normalize() {
            Some(d) => d,
            None => return Vec::new(),
        };
        if !(max_distance >= 0.0) {
            return Vec::new();
        }

        let mut hits: Vec<CastHit> = self
            .colliders
            .iter()
            .filter(|c| !c.is_trigger && c.in_mask(mask))
            .filter_map(|c| {
                let (distance, normal) = match c.shape {
                    Shape::Box {
                        center,
                        half_extents,
                    } => sweep_box(origin, dir, radius, center, half_extents, max_distance)?,
                    Shape::Circle { center, radius: r } => {
                        ray_circle(origin, dir, center, r + radius, max_distance)?
                    }
                };
                Some(CastHit {
                    distance,
                    point: origin + dir * distance - normal * radius,
                    normal,
                    collider: c.id,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.collider.cmp(&b.collider))
        });
        hits
    }

    fn bounds(&self, id: ColliderId) -> Option<Bounds> {
        self.get(id).map(|c| Bounds {
            center: c.shape.center(),
            extents: c.shape.extents(),
        })
    }
}
