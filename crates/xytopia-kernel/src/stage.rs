//! The stage: everything a scene can put on screen or schedule.
//!
//! Scenes only talk to the [`Stage`] trait. [`HeadlessStage`] keeps all
//! objects in memory and is what the binary and the tests run against; a GPU
//! backend would implement the same trait.

use std::collections::BTreeMap;

use ahash::AHashSet;
use tracing::{debug, trace};
use xytopia_common::{StageError, Vec2};

use crate::handles::{
    Handle, IdAllocator, ListenerId, ResourceCounts, ResourceKind, SpriteId, TimerId, TweenId,
};
use crate::tween::{ActiveTween, Tween, TweenProperty, TweenStep};

/// What a sprite draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteContent {
    /// A texture, by key
    Image(String),
    /// A texture repeated across the sprite's area, scrollable
    TiledImage(String),
    /// A text label
    Text(String),
    /// A solid rectangle with the given RGB fill
    Rectangle(u32),
}

/// A drawable object on the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// What is drawn
    pub content: SpriteContent,
    /// World position of the origin
    pub position: Vec2,
    /// Size in world units (before scale)
    pub size: Vec2,
    /// Horizontal scale; negative mirrors
    pub scale_x: f32,
    /// Vertical scale
    pub scale_y: f32,
    /// Rotation in radians
    pub rotation: f32,
    /// Opacity, 0..=1
    pub alpha: f32,
    /// RGB tint, `0xFFFFFF` for none
    pub tint: u32,
    /// Hidden sprites are skipped by renderers and hit tests
    pub visible: bool,
    /// Draw order; higher is on top
    pub depth: i32,
    /// Texture scroll offset for tiled sprites
    pub tile_offset: Vec2,
}

impl Sprite {
    /// Reads a tweenable property.
    #[must_use]
    pub fn property(&self, property: TweenProperty) -> f32 {
        match property {
            TweenProperty::X => self.position.x,
            TweenProperty::Y => self.position.y,
            TweenProperty::Scale => self.scale_y,
            TweenProperty::Rotation => self.rotation,
            TweenProperty::Alpha => self.alpha,
            TweenProperty::TileX => self.tile_offset.x,
            TweenProperty::TileY => self.tile_offset.y,
        }
    }

    /// Writes a tweenable property. Scale keeps the horizontal mirror sign.
    pub fn set_property(&mut self, property: TweenProperty, value: f32) {
        match property {
            TweenProperty::X => self.position.x = value,
            TweenProperty::Y => self.position.y = value,
            TweenProperty::Scale => {
                self.scale_x = value * self.scale_x.signum();
                self.scale_y = value;
            },
            TweenProperty::Rotation => self.rotation = value,
            TweenProperty::Alpha => self.alpha = value,
            TweenProperty::TileX => self.tile_offset.x = value,
            TweenProperty::TileY => self.tile_offset.y = value,
        }
    }

    /// Axis-aligned screen footprint, centred on the position (ignores rotation).
    #[must_use]
    pub fn footprint(&self) -> xytopia_common::Rect {
        xytopia_common::Rect::from_center(
            self.position,
            self.size.x * self.scale_x.abs() / 2.0,
            self.size.y * self.scale_y.abs() / 2.0,
        )
    }
}

/// Builder for new sprites.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDesc {
    sprite: Sprite,
}

impl SpriteDesc {
    fn with_content(content: SpriteContent, position: Vec2, size: Vec2) -> Self {
        Self {
            sprite: Sprite {
                content,
                position,
                size,
                scale_x: 1.0,
                scale_y: 1.0,
                rotation: 0.0,
                alpha: 1.0,
                tint: 0x00FF_FFFF,
                visible: true,
                depth: 0,
                tile_offset: Vec2::ZERO,
            },
        }
    }

    /// Textured image.
    #[must_use]
    pub fn image(texture: &str, position: Vec2, size: Vec2) -> Self {
        Self::with_content(SpriteContent::Image(texture.to_string()), position, size)
    }

    /// Tiled, scrollable image.
    #[must_use]
    pub fn tiled(texture: &str, position: Vec2, size: Vec2) -> Self {
        Self::with_content(SpriteContent::TiledImage(texture.to_string()), position, size)
    }

    /// Text label.
    #[must_use]
    pub fn text(label: &str, position: Vec2, size: Vec2) -> Self {
        Self::with_content(SpriteContent::Text(label.to_string()), position, size)
    }

    /// Filled rectangle.
    #[must_use]
    pub fn rectangle(fill: u32, position: Vec2, size: Vec2) -> Self {
        Self::with_content(SpriteContent::Rectangle(fill), position, size)
    }

    /// Sets uniform scale.
    #[must_use]
    pub fn scale(mut self, scale: f32) -> Self {
        self.sprite.scale_x = scale;
        self.sprite.scale_y = scale;
        self
    }

    /// Sets opacity.
    #[must_use]
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.sprite.alpha = alpha;
        self
    }

    /// Sets RGB tint.
    #[must_use]
    pub fn tint(mut self, tint: u32) -> Self {
        self.sprite.tint = tint;
        self
    }

    /// Sets draw order.
    #[must_use]
    pub fn depth(mut self, depth: i32) -> Self {
        self.sprite.depth = depth;
        self
    }

    /// Texture key this sprite needs prepared, if any.
    #[must_use]
    pub fn texture(&self) -> Option<&str> {
        match &self.sprite.content {
            SpriteContent::Image(key) | SpriteContent::TiledImage(key) => Some(key),
            SpriteContent::Text(_) | SpriteContent::Rectangle(_) => None,
        }
    }

    /// Finishes the sprite.
    #[must_use]
    pub fn build(self) -> Sprite {
        self.sprite
    }
}

/// Input channel a scene subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Key presses
    Keyboard,
    /// Mouse wheel
    Wheel,
    /// Pointer movement and clicks
    Pointer,
}

/// Engine capability surface used by scenes.
pub trait Stage {
    /// Declares a texture as loaded. Sprites may only use prepared textures.
    fn prepare_texture(&mut self, key: &str);

    /// Whether `key` has been prepared.
    fn has_texture(&self, key: &str) -> bool;

    /// Adds a sprite.
    fn spawn(&mut self, desc: SpriteDesc) -> Result<SpriteId, StageError>;

    /// Reads a sprite.
    fn sprite(&self, id: SpriteId) -> Option<&Sprite>;

    /// Mutates a sprite.
    fn sprite_mut(&mut self, id: SpriteId) -> Result<&mut Sprite, StageError>;

    /// Starts a tween on an existing sprite.
    fn add_tween(&mut self, tween: Tween) -> Result<TweenId, StageError>;

    /// Starts a repeating timer firing every `period_ms`.
    fn add_timer(&mut self, period_ms: f32) -> TimerId;

    /// Number of times the timer fired since the last call.
    fn take_timer_fires(&mut self, id: TimerId) -> u32;

    /// Registers interest in an input channel.
    fn listen(&mut self, kind: ListenerKind) -> ListenerId;

    /// Whether any listener is registered for `kind`.
    fn is_listening(&self, kind: ListenerKind) -> bool;

    /// Releases a resource. Returns `false` if it was already gone
    /// (finished tweens remove themselves), so releasing twice is harmless.
    fn release(&mut self, handle: Handle) -> bool;

    /// Live resource counts.
    fn counts(&self) -> ResourceCounts;

    /// Advances tweens and timers.
    fn advance(&mut self, dt: f32);
}

#[derive(Debug, Clone)]
struct TimerState {
    period_ms: f32,
    elapsed_ms: f32,
    pending: u32,
}

/// In-memory stage.
///
/// Sprites are kept in a `BTreeMap` so iteration (and therefore logs and
/// tests) follows creation order.
#[derive(Debug, Default)]
pub struct HeadlessStage {
    textures: AHashSet<String>,
    sprites: BTreeMap<SpriteId, Sprite>,
    tweens: BTreeMap<TweenId, ActiveTween>,
    timers: BTreeMap<TimerId, TimerState>,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    sprite_ids: IdAllocator,
    tween_ids: IdAllocator,
    timer_ids: IdAllocator,
    listener_ids: IdAllocator,
}

impl HeadlessStage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for HeadlessStage {
    fn prepare_texture(&mut self, key: &str) {
        self.textures.insert(key.to_string());
    }

    fn has_texture(&self, key: &str) -> bool {
        self.textures.contains(key)
    }

    fn spawn(&mut self, desc: SpriteDesc) -> Result<SpriteId, StageError> {
        if let Some(texture) = desc.texture() {
            if !self.has_texture(texture) {
                return Err(StageError::MissingTexture(texture.to_string()));
            }
        }
        let id = SpriteId(self.sprite_ids.next());
        self.sprites.insert(id, desc.build());
        Ok(id)
    }

    fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    fn sprite_mut(&mut self, id: SpriteId) -> Result<&mut Sprite, StageError> {
        self.sprites.get_mut(&id).ok_or(StageError::UnknownHandle {
            kind: ResourceKind::Sprite.name(),
            id: id.raw(),
        })
    }

    fn add_tween(&mut self, tween: Tween) -> Result<TweenId, StageError> {
        if !self.sprites.contains_key(&tween.target) {
            return Err(StageError::UnknownHandle {
                kind: ResourceKind::Sprite.name(),
                id: tween.target.raw(),
            });
        }
        let id = TweenId(self.tween_ids.next());
        self.tweens.insert(id, ActiveTween::new(tween));
        Ok(id)
    }

    fn add_timer(&mut self, period_ms: f32) -> TimerId {
        let id = TimerId(self.timer_ids.next());
        self.timers.insert(
            id,
            TimerState {
                period_ms: period_ms.max(1.0),
                elapsed_ms: 0.0,
                pending: 0,
            },
        );
        id
    }

    fn take_timer_fires(&mut self, id: TimerId) -> u32 {
        self.timers
            .get_mut(&id)
            .map_or(0, |timer| std::mem::take(&mut timer.pending))
    }

    fn listen(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.listener_ids.next());
        self.listeners.insert(id, kind);
        id
    }

    fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    fn release(&mut self, handle: Handle) -> bool {
        let removed = match handle.kind {
            ResourceKind::Sprite => {
                let id = SpriteId(handle.id);
                // Tweens die with their target.
                self.tweens.retain(|_, t| t.tween().target != id);
                self.sprites.remove(&id).is_some()
            },
            ResourceKind::Tween => self.tweens.remove(&TweenId(handle.id)).is_some(),
            ResourceKind::Timer => self.timers.remove(&TimerId(handle.id)).is_some(),
            ResourceKind::Listener => self.listeners.remove(&ListenerId(handle.id)).is_some(),
            // Bodies live in the physics world.
            ResourceKind::Body => false,
        };
        trace!(%handle, removed, "Released");
        removed
    }

    fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            sprites: self.sprites.len(),
            bodies: 0,
            tweens: self.tweens.len(),
            timers: self.timers.len(),
            listeners: self.listeners.len(),
        }
    }

    fn advance(&mut self, dt: f32) {
        let dt_ms = dt * 1000.0;

        for timer in self.timers.values_mut() {
            timer.elapsed_ms += dt_ms;
            while timer.elapsed_ms >= timer.period_ms {
                timer.elapsed_ms -= timer.period_ms;
                timer.pending += 1;
            }
        }

        let mut finished = Vec::new();
        for (id, active) in &mut self.tweens {
            let target = active.tween().target;
            let property = active.tween().property;
            let Some(sprite) = self.sprites.get_mut(&target) else {
                finished.push(*id);
                continue;
            };
            match active.advance(dt_ms, sprite.property(property)) {
                TweenStep::Waiting => {},
                TweenStep::Running(value) => sprite.set_property(property, value),
                TweenStep::Finished(value) => {
                    sprite.set_property(property, value);
                    finished.push(*id);
                },
            }
        }
        if !finished.is_empty() {
            debug!(count = finished.len(), "Tweens completed");
        }
        for id in finished {
            self.tweens.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::Repeat;

    fn stage_with_texture() -> HeadlessStage {
        let mut stage = HeadlessStage::new();
        stage.prepare_texture("block");
        stage
    }

    #[test]
    fn test_spawn_requires_prepared_texture() {
        let mut stage = HeadlessStage::new();
        let desc = SpriteDesc::image("block", Vec2::ZERO, Vec2::new(32.0, 32.0));
        assert!(matches!(
            stage.spawn(desc.clone()),
            Err(StageError::MissingTexture(_))
        ));
        stage.prepare_texture("block");
        assert!(stage.spawn(desc).is_ok());
    }

    #[test]
    fn test_text_needs_no_texture() {
        let mut stage = HeadlessStage::new();
        let id = stage
            .spawn(SpriteDesc::text("hello", Vec2::ZERO, Vec2::new(80.0, 20.0)))
            .expect("text");
        let sprite = stage.sprite(id).expect("sprite");
        assert!(matches!(&sprite.content, SpriteContent::Text(t) if t == "hello"));
    }

    #[test]
    fn test_tween_moves_sprite_and_completes() {
        let mut stage = stage_with_texture();
        let id = stage
            .spawn(SpriteDesc::image("block", Vec2::ZERO, Vec2::new(1.0, 1.0)))
            .expect("sprite");
        stage
            .add_tween(Tween::to(id, TweenProperty::X, 100.0, 1000.0))
            .expect("tween");

        stage.advance(0.5);
        let x = stage.sprite(id).expect("live").position.x;
        assert!((x - 50.0).abs() < 0.01);

        stage.advance(0.6);
        assert_eq!(stage.sprite(id).expect("live").position.x, 100.0);
        assert_eq!(stage.counts().tweens, 0);
    }

    #[test]
    fn test_releasing_sprite_drops_its_tweens() {
        let mut stage = stage_with_texture();
        let id = stage
            .spawn(SpriteDesc::image("block", Vec2::ZERO, Vec2::new(1.0, 1.0)))
            .expect("sprite");
        stage
            .add_tween(Tween::to(id, TweenProperty::Alpha, 0.0, 500.0).repeat(Repeat::Forever))
            .expect("tween");
        assert_eq!(stage.counts().tweens, 1);

        assert!(stage.release(id.into()));
        assert_eq!(stage.counts(), ResourceCounts::default());
        assert!(!stage.release(id.into()));
    }

    #[test]
    fn test_tween_on_missing_sprite_fails() {
        let mut stage = HeadlessStage::new();
        let result = stage.add_tween(Tween::to(SpriteId(9), TweenProperty::X, 1.0, 1.0));
        assert!(matches!(result, Err(StageError::UnknownHandle { .. })));
    }

    #[test]
    fn test_timer_fires() {
        let mut stage = HeadlessStage::new();
        let timer = stage.add_timer(500.0);
        stage.advance(0.3);
        assert_eq!(stage.take_timer_fires(timer), 0);
        stage.advance(0.8);
        assert_eq!(stage.take_timer_fires(timer), 2);
        assert_eq!(stage.take_timer_fires(timer), 0);
    }

    #[test]
    fn test_listeners() {
        let mut stage = HeadlessStage::new();
        assert!(!stage.is_listening(ListenerKind::Wheel));
        let id = stage.listen(ListenerKind::Wheel);
        assert!(stage.is_listening(ListenerKind::Wheel));
        assert!(stage.release(id.into()));
        assert!(!stage.is_listening(ListenerKind::Wheel));
    }

    #[test]
    fn test_scale_property_keeps_mirror() {
        let mut sprite = SpriteDesc::rectangle(0, Vec2::ZERO, Vec2::new(2.0, 2.0)).build();
        sprite.scale_x = -1.0;
        sprite.set_property(TweenProperty::Scale, 1.5);
        assert_eq!(sprite.scale_x, -1.5);
        assert_eq!(sprite.scale_y, 1.5);
        assert_eq!(sprite.footprint().width(), 3.0);
    }
}
