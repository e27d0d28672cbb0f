//! Arcade physics: gravity, static tile bodies and dynamic AABB bodies.
//!
//! Static bodies are whole grid tiles, indexed by tile coordinate so
//! collision checks only look at the handful of tiles a body overlaps.
//! Dynamic bodies move one axis at a time and are pushed out of any solid
//! tile they enter on that axis.

use std::collections::BTreeMap;

use ahash::AHashMap;
use tracing::debug;
use xytopia_common::{Rect, StageError, TileCoord, Vec2};

use crate::handles::{BodyId, IdAllocator, ResourceKind};

/// Default downward acceleration in world units per second squared.
pub const DEFAULT_GRAVITY: f32 = 300.0;

/// Slack used when mapping body edges to tiles, so a body resting exactly on
/// a tile edge does not count as overlapping the neighbour.
const EDGE_EPSILON: f32 = 1e-3;

/// Sides on which a body was stopped during the last step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    /// Hit something above
    pub up: bool,
    /// Resting on something below
    pub down: bool,
    /// Hit something on the left
    pub left: bool,
    /// Hit something on the right
    pub right: bool,
}

/// Dynamic body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Center in world units
    pub center: Vec2,
    /// Half width and half height
    pub half_extents: Vec2,
    /// Velocity in world units per second
    pub velocity: Vec2,
    /// Whether the body is kept inside the world bounds
    pub collide_world_bounds: bool,
    blocked: Blocked,
}

impl Body {
    /// Bounding box.
    #[must_use]
    pub fn aabb(&self) -> Rect {
        Rect::from_center(self.center, self.half_extents.x, self.half_extents.y)
    }

    /// Sides blocked during the last step.
    #[must_use]
    pub const fn blocked(&self) -> Blocked {
        self.blocked
    }

    /// Whether the body is standing on something.
    #[must_use]
    pub const fn blocked_down(&self) -> bool {
        self.blocked.down
    }
}

/// Physics world.
#[derive(Debug)]
pub struct ArcadePhysics {
    gravity: f32,
    tile_size: f32,
    tiles: AHashMap<(i32, i32), BodyId>,
    tile_of: AHashMap<BodyId, (i32, i32)>,
    bodies: BTreeMap<BodyId, Body>,
    ids: IdAllocator,
    bounds: Option<Rect>,
}

impl ArcadePhysics {
    /// Creates an empty world.
    #[must_use]
    pub fn new(gravity: f32, tile_size: f32) -> Self {
        Self {
            gravity,
            tile_size: tile_size.max(1.0),
            tiles: AHashMap::new(),
            tile_of: AHashMap::new(),
            bodies: BTreeMap::new(),
            ids: IdAllocator::default(),
            bounds: None,
        }
    }

    /// Gravity in units/s².
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Tile edge length.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Sets the rectangle bodies with `collide_world_bounds` stay inside.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// Makes a tile solid. Adding the same tile twice returns the existing body.
    pub fn add_static_tile(&mut self, tile: TileCoord) -> BodyId {
        let key = (tile.col, tile.row);
        if let Some(id) = self.tiles.get(&key) {
            return *id;
        }
        let id = BodyId(self.ids.next());
        self.tiles.insert(key, id);
        self.tile_of.insert(id, key);
        id
    }

    /// Whether a tile is solid.
    #[must_use]
    pub fn is_solid_tile(&self, col: i32, row: i32) -> bool {
        self.tiles.contains_key(&(col, row))
    }

    /// Adds a dynamic body that collides with world bounds.
    pub fn add_body(&mut self, center: Vec2, half_extents: Vec2) -> BodyId {
        let id = BodyId(self.ids.next());
        self.bodies.insert(
            id,
            Body {
                center,
                half_extents,
                velocity: Vec2::ZERO,
                collide_world_bounds: true,
                blocked: Blocked::default(),
            },
        );
        id
    }

    /// Reads a dynamic body.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Mutates a dynamic body.
    pub fn body_mut(&mut self, id: BodyId) -> Result<&mut Body, StageError> {
        self.bodies.get_mut(&id).ok_or(StageError::UnknownHandle {
            kind: ResourceKind::Body.name(),
            id: id.raw(),
        })
    }

    /// Removes a static or dynamic body. Returns `false` if it was already gone.
    pub fn release(&mut self, id: BodyId) -> bool {
        if let Some(key) = self.tile_of.remove(&id) {
            self.tiles.remove(&key);
            return true;
        }
        let removed = self.bodies.remove(&id).is_some();
        if !removed {
            debug!(body = id.raw(), "Release of unknown body ignored");
        }
        removed
    }

    /// Live static plus dynamic bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.tiles.len() + self.bodies.len()
    }

    /// Advances every dynamic body by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        for id in ids {
            let Some(mut body) = self.bodies.remove(&id) else {
                continue;
            };
            body.blocked = Blocked::default();
            body.velocity.y += self.gravity * dt;

            body.center.x += body.velocity.x * dt;
            self.resolve_x(&mut body);
            body.center.y += body.velocity.y * dt;
            self.resolve_y(&mut body);

            if body.collide_world_bounds {
                if let Some(bounds) = self.bounds {
                    clamp_to_bounds(&mut body, bounds);
                }
            }
            self.bodies.insert(id, body);
        }
    }

    fn span(&self, min: f32, max: f32) -> (i32, i32) {
        let first = ((min + EDGE_EPSILON) / self.tile_size).floor() as i32;
        let last = ((max - EDGE_EPSILON) / self.tile_size).ceil() as i32 - 1;
        (first, last)
    }

    fn resolve_x(&self, body: &mut Body) {
        if body.velocity.x == 0.0 {
            return;
        }
        let aabb = body.aabb();
        let (col0, col1) = self.span(aabb.min_x, aabb.max_x);
        let (row0, row1) = self.span(aabb.min_y, aabb.max_y);
        let hits = (row0..=row1).flat_map(|row| {
            (col0..=col1).filter(move |col| self.is_solid_tile(*col, row))
        });

        if body.velocity.x > 0.0 {
            if let Some(col) = hits.min() {
                body.center.x = col as f32 * self.tile_size - body.half_extents.x;
                body.velocity.x = 0.0;
                body.blocked.right = true;
            }
        } else if let Some(col) = hits.max() {
            body.center.x = (col + 1) as f32 * self.tile_size + body.half_extents.x;
            body.velocity.x = 0.0;
            body.blocked.left = true;
        }
    }

    fn resolve_y(&self, body: &mut Body) {
        if body.velocity.y == 0.0 {
            return;
        }
        let aabb = body.aabb();
        let (col0, col1) = self.span(aabb.min_x, aabb.max_x);
        let (row0, row1) = self.span(aabb.min_y, aabb.max_y);
        let hits = (col0..=col1).flat_map(|col| {
            (row0..=row1).filter(move |row| self.is_solid_tile(col, *row))
        });

        if body.velocity.y > 0.0 {
            if let Some(row) = hits.min() {
                body.center.y = row as f32 * self.tile_size - body.half_extents.y;
                body.velocity.y = 0.0;
                body.blocked.down = true;
            }
        } else if let Some(row) = hits.max() {
            body.center.y = (row + 1) as f32 * self.tile_size + body.half_extents.y;
            body.velocity.y = 0.0;
            body.blocked.up = true;
        }
    }
}

fn clamp_to_bounds(body: &mut Body, bounds: Rect) {
    let half = body.half_extents;
    if body.center.x - half.x < bounds.min_x {
        body.center.x = bounds.min_x + half.x;
        body.velocity.x = body.velocity.x.max(0.0);
        body.blocked.left = true;
    } else if body.center.x + half.x > bounds.max_x {
        body.center.x = bounds.max_x - half.x;
        body.velocity.x = body.velocity.x.min(0.0);
        body.blocked.right = true;
    }
    if body.center.y - half.y < bounds.min_y {
        body.center.y = bounds.min_y + half.y;
        body.velocity.y = body.velocity.y.max(0.0);
        body.blocked.up = true;
    } else if body.center.y + half.y > bounds.max_y {
        body.center.y = bounds.max_y - half.y;
        body.velocity.y = body.velocity.y.min(0.0);
        body.blocked.down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn floor_world() -> ArcadePhysics {
        let mut physics = ArcadePhysics::new(DEFAULT_GRAVITY, 32.0);
        for col in 0..10 {
            physics.add_static_tile(TileCoord::new(col, 10));
        }
        physics
    }

    #[test]
    fn test_body_falls_and_lands() {
        let mut physics = floor_world();
        let id = physics.add_body(Vec2::new(80.0, 200.0), Vec2::new(8.0, 16.0));

        physics.step(DT);
        assert!(physics.body(id).expect("body").velocity.y > 0.0);
        assert!(!physics.body(id).expect("body").blocked_down());

        for _ in 0..240 {
            physics.step(DT);
        }
        let body = physics.body(id).expect("body");
        assert!(body.blocked_down());
        assert!((body.aabb().max_y - 320.0).abs() < 0.01);
    }

    #[test]
    fn test_resting_body_stays_grounded() {
        let mut physics = floor_world();
        let id = physics.add_body(Vec2::new(80.0, 304.0), Vec2::new(8.0, 16.0));
        for _ in 0..10 {
            physics.step(DT);
            assert!(physics.body(id).expect("body").blocked_down());
        }
    }

    #[test]
    fn test_wall_blocks_horizontal_motion() {
        let mut physics = floor_world();
        for row in 0..10 {
            physics.add_static_tile(TileCoord::new(5, row));
        }
        let id = physics.add_body(Vec2::new(140.0, 304.0), Vec2::new(8.0, 16.0));
        for _ in 0..60 {
            physics.body_mut(id).expect("body").velocity.x = 300.0;
            physics.step(DT);
        }
        let body = physics.body(id).expect("body");
        assert!(body.blocked().right);
        assert!((body.aabb().max_x - 160.0).abs() < 0.01);
    }

    #[test]
    fn test_ceiling_stops_jump() {
        let mut physics = floor_world();
        for col in 0..10 {
            physics.add_static_tile(TileCoord::new(col, 7));
        }
        let id = physics.add_body(Vec2::new(80.0, 304.0), Vec2::new(8.0, 16.0));
        physics.body_mut(id).expect("body").velocity.y = -300.0;
        let mut hit_ceiling = false;
        for _ in 0..30 {
            physics.step(DT);
            hit_ceiling |= physics.body(id).expect("body").blocked().up;
        }
        assert!(hit_ceiling);
        assert!(physics.body(id).expect("body").aabb().min_y >= 256.0 - 0.01);
    }

    #[test]
    fn test_world_bounds_clamp() {
        let mut physics = ArcadePhysics::new(DEFAULT_GRAVITY, 32.0);
        physics.set_bounds(Rect::new(0.0, 0.0, 320.0, 320.0));
        let id = physics.add_body(Vec2::new(20.0, 300.0), Vec2::new(8.0, 16.0));
        physics.body_mut(id).expect("body").velocity.x = -3000.0;
        for _ in 0..30 {
            physics.step(DT);
        }
        let body = physics.body(id).expect("body");
        assert!((body.aabb().min_x - 0.0).abs() < 0.01);
        assert!(body.blocked_down());
    }

    #[test]
    fn test_release_static_and_dynamic() {
        let mut physics = ArcadePhysics::new(DEFAULT_GRAVITY, 32.0);
        let tile = physics.add_static_tile(TileCoord::new(1, 1));
        assert_eq!(physics.add_static_tile(TileCoord::new(1, 1)), tile);
        let body = physics.add_body(Vec2::ZERO, Vec2::new(1.0, 1.0));
        assert_eq!(physics.body_count(), 2);

        assert!(physics.release(tile));
        assert!(!physics.is_solid_tile(1, 1));
        assert!(physics.release(body));
        assert!(!physics.release(body));
        assert_eq!(physics.body_count(), 0);
        assert!(physics.body_mut(body).is_err());
    }
}
