//! The visitor's avatar: a body made of six sprites over one physics body.
//!
//! The [`Avatar`] aggregate owns every handle. Nothing outside
//! [`AvatarController`] can move a part; other systems read the body
//! position and facing through accessors.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use xytopia_common::{StageError, Vec2};
use xytopia_kernel::{ArcadePhysics, BodyId, Handle, SpriteDesc, SpriteId, Stage};

use crate::input::Input;

/// Avatar tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Horizontal speed while a direction is held (units/s)
    pub move_speed: f32,
    /// Upward speed applied when jumping from the ground (units/s)
    pub jump_speed: f32,
    /// Walk cycle phase per millisecond of game time
    pub walk_rate: f32,
    /// Leg bob amplitude (units)
    pub leg_amplitude: f32,
    /// Arm swing amplitude (radians)
    pub arm_amplitude: f32,
    /// Collision box half width
    pub half_width: f32,
    /// Collision box half height
    pub half_height: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            move_speed: 300.0,
            jump_speed: 300.0,
            walk_rate: 0.015,
            leg_amplitude: 4.0,
            arm_amplitude: 0.175,
            half_width: 10.0,
            half_height: 24.0,
        }
    }
}

/// Named avatar parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvatarPart {
    /// Head
    Head,
    /// Torso
    Torso,
    /// Left arm
    LeftArm,
    /// Right arm
    RightArm,
    /// Left leg
    LeftLeg,
    /// Right leg
    RightLeg,
}

impl AvatarPart {
    /// Every part, back to front.
    pub const ALL: [Self; 6] = [
        Self::LeftArm,
        Self::LeftLeg,
        Self::RightLeg,
        Self::Torso,
        Self::Head,
        Self::RightArm,
    ];

    /// Offset from the body center for a right-facing pose.
    #[must_use]
    pub const fn base_offset(self) -> Vec2 {
        match self {
            Self::Head => Vec2::new(0.0, -16.0),
            Self::Torso => Vec2::new(0.0, 0.0),
            Self::LeftArm => Vec2::new(-9.0, -1.0),
            Self::RightArm => Vec2::new(9.0, -1.0),
            Self::LeftLeg => Vec2::new(-4.0, 16.0),
            Self::RightLeg => Vec2::new(4.0, 16.0),
        }
    }

    const fn size(self) -> Vec2 {
        match self {
            Self::Head => Vec2::new(16.0, 16.0),
            Self::Torso => Vec2::new(14.0, 18.0),
            Self::LeftArm | Self::RightArm => Vec2::new(4.0, 14.0),
            Self::LeftLeg | Self::RightLeg => Vec2::new(5.0, 16.0),
        }
    }

    const fn fill(self) -> u32 {
        match self {
            Self::Head | Self::LeftArm | Self::RightArm => 0x00F1_C27D,
            Self::Torso => 0x004A_9EFF,
            Self::LeftLeg | Self::RightLeg => 0x0033_3366,
        }
    }
}

/// Procedural limb offsets for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LimbPose {
    /// Left leg vertical bob
    pub left_leg: f32,
    /// Right leg vertical bob
    pub right_leg: f32,
    /// Left arm swing angle
    pub left_arm: f32,
    /// Right arm swing angle
    pub right_arm: f32,
}

impl LimbPose {
    /// Walking pose at `time_ms`.
    #[must_use]
    pub fn walking(config: &AvatarConfig, time_ms: f32) -> Self {
        let walk_time = time_ms * config.walk_rate;
        Self {
            left_leg: walk_time.sin() * config.leg_amplitude,
            right_leg: (walk_time + PI).sin() * config.leg_amplitude,
            left_arm: (walk_time + PI).sin() * config.arm_amplitude,
            right_arm: walk_time.sin() * config.arm_amplitude,
        }
    }

    /// Whether every offset is zero.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        *self == Self::default()
    }
}

/// Avatar aggregate: the physics body, the part sprites and the pose.
#[derive(Debug)]
pub struct Avatar {
    body: BodyId,
    parts: Vec<(AvatarPart, SpriteId)>,
    facing: f32,
    pose: LimbPose,
}

impl Avatar {
    /// Physics body.
    #[must_use]
    pub const fn body(&self) -> BodyId {
        self.body
    }

    /// Sprite for a part.
    #[must_use]
    pub fn part(&self, part: AvatarPart) -> Option<SpriteId> {
        self.parts.iter().find(|(p, _)| *p == part).map(|(_, id)| *id)
    }

    /// `1.0` facing right, `-1.0` facing left.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.facing
    }

    /// Current limb offsets.
    #[must_use]
    pub const fn pose(&self) -> LimbPose {
        self.pose
    }

    /// Stage handles owned by the avatar (the body lives in physics).
    pub fn sprite_handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.parts.iter().map(|(_, id)| Handle::from(*id))
    }
}

/// Drives the avatar from input every tick.
#[derive(Debug)]
pub struct AvatarController {
    config: AvatarConfig,
    avatar: Avatar,
}

impl AvatarController {
    /// Creates the body and part sprites centred at `position`.
    pub fn spawn(
        config: AvatarConfig,
        position: Vec2,
        physics: &mut ArcadePhysics,
        stage: &mut dyn Stage,
    ) -> Result<Self, StageError> {
        let body = physics.add_body(position, Vec2::new(config.half_width, config.half_height));
        let mut parts = Vec::with_capacity(AvatarPart::ALL.len());
        for (depth, part) in AvatarPart::ALL.into_iter().enumerate() {
            let desc = SpriteDesc::rectangle(part.fill(), position + part.base_offset(), part.size())
                .depth(10 + depth as i32);
            parts.push((part, stage.spawn(desc)?));
        }
        Ok(Self {
            config,
            avatar: Avatar {
                body,
                parts,
                facing: 1.0,
                pose: LimbPose::default(),
            },
        })
    }

    /// The aggregate, read-only.
    #[must_use]
    pub const fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    /// Tuning in use.
    #[must_use]
    pub const fn config(&self) -> &AvatarConfig {
        &self.config
    }

    /// Applies input to the body, updates the walk pose and lays the part
    /// sprites out around the body.
    ///
    /// Left wins when both directions are held. Jump is applied on every
    /// tick that up is held while the body rests on something.
    pub fn tick(
        &mut self,
        input: &Input,
        physics: &mut ArcadePhysics,
        stage: &mut dyn Stage,
        time_ms: f32,
    ) -> Result<(), StageError> {
        let body = physics.body_mut(self.avatar.body)?;

        if input.left {
            body.velocity.x = -self.config.move_speed;
            self.avatar.facing = -1.0;
        } else if input.right {
            body.velocity.x = self.config.move_speed;
            self.avatar.facing = 1.0;
        } else {
            body.velocity.x = 0.0;
        }

        if input.up && body.blocked_down() {
            body.velocity.y = -self.config.jump_speed;
        }

        self.avatar.pose = if body.velocity.x == 0.0 {
            LimbPose::default()
        } else {
            LimbPose::walking(&self.config, time_ms)
        };

        let center = body.center;
        self.layout_parts(stage, center)
    }

    /// Re-positions the part sprites around `center`.
    pub fn layout_parts(&self, stage: &mut dyn Stage, center: Vec2) -> Result<(), StageError> {
        let facing = self.avatar.facing;
        let pose = self.avatar.pose;
        for (part, id) in &self.avatar.parts {
            let base = part.base_offset();
            let (bob, swing) = match part {
                AvatarPart::LeftLeg => (pose.left_leg, 0.0),
                AvatarPart::RightLeg => (pose.right_leg, 0.0),
                AvatarPart::LeftArm => (0.0, pose.left_arm),
                AvatarPart::RightArm => (0.0, pose.right_arm),
                AvatarPart::Head | AvatarPart::Torso => (0.0, 0.0),
            };
            let sprite = stage.sprite_mut(*id)?;
            sprite.position = Vec2::new(center.x + base.x * facing, center.y + base.y + bob);
            sprite.rotation = swing * facing;
            sprite.scale_x = facing * sprite.scale_y;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xytopia_common::TileCoord;
    use xytopia_kernel::{HeadlessStage, DEFAULT_GRAVITY};

    const DT: f32 = 1.0 / 60.0;

    fn grounded_avatar() -> (AvatarController, ArcadePhysics, HeadlessStage) {
        let mut physics = ArcadePhysics::new(DEFAULT_GRAVITY, 32.0);
        for col in 0..20 {
            physics.add_static_tile(TileCoord::new(col, 10));
        }
        let mut stage = HeadlessStage::new();
        let avatar = AvatarController::spawn(
            AvatarConfig::default(),
            Vec2::new(320.0, 296.0),
            &mut physics,
            &mut stage,
        )
        .expect("spawn");
        physics.step(DT);
        assert!(physics
            .body(avatar.avatar().body())
            .expect("body")
            .blocked_down());
        (avatar, physics, stage)
    }

    fn velocity(avatar: &AvatarController, physics: &ArcadePhysics) -> Vec2 {
        physics.body(avatar.avatar().body()).expect("body").velocity
    }

    #[test]
    fn test_right_held_moves_right() {
        let (mut avatar, mut physics, mut stage) = grounded_avatar();
        let input = Input {
            right: true,
            ..Input::default()
        };
        avatar
            .tick(&input, &mut physics, &mut stage, 100.0)
            .expect("tick");
        assert_eq!(velocity(&avatar, &physics).x, 300.0);
        assert_eq!(avatar.avatar().facing(), 1.0);
    }

    #[test]
    fn test_left_wins_over_right() {
        let (mut avatar, mut physics, mut stage) = grounded_avatar();
        let input = Input {
            left: true,
            right: true,
            ..Input::default()
        };
        avatar
            .tick(&input, &mut physics, &mut stage, 100.0)
            .expect("tick");
        assert_eq!(velocity(&avatar, &physics).x, -300.0);
        assert_eq!(avatar.avatar().facing(), -1.0);

        let head = avatar.avatar().part(AvatarPart::Head).expect("head");
        assert!(stage.sprite(head).expect("sprite").scale_x < 0.0);
    }

    #[test]
    fn test_release_resets_velocity_and_limbs() {
        let (mut avatar, mut physics, mut stage) = grounded_avatar();
        let walking = Input {
            right: true,
            ..Input::default()
        };
        avatar
            .tick(&walking, &mut physics, &mut stage, 100.0)
            .expect("tick");
        assert!(!avatar.avatar().pose().is_rest());

        avatar
            .tick(&Input::default(), &mut physics, &mut stage, 117.0)
            .expect("tick");
        assert_eq!(velocity(&avatar, &physics).x, 0.0);
        assert!(avatar.avatar().pose().is_rest());

        let leg = avatar.avatar().part(AvatarPart::LeftLeg).expect("leg");
        let body = physics.body(avatar.avatar().body()).expect("body").center;
        let sprite = stage.sprite(leg).expect("sprite");
        assert_eq!(sprite.position.y, body.y + AvatarPart::LeftLeg.base_offset().y);
        assert_eq!(sprite.rotation, 0.0);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let (mut avatar, mut physics, mut stage) = grounded_avatar();
        let up = Input {
            up: true,
            ..Input::default()
        };
        avatar.tick(&up, &mut physics, &mut stage, 0.0).expect("tick");
        assert_eq!(velocity(&avatar, &physics).y, -300.0);

        physics.step(DT);
        assert!(!physics.body(avatar.avatar().body()).expect("body").blocked_down());
        avatar.tick(&up, &mut physics, &mut stage, 16.0).expect("tick");
        assert!(velocity(&avatar, &physics).y > -300.0);
    }

    #[test]
    fn test_walking_pose_phases() {
        let config = AvatarConfig::default();
        let pose = LimbPose::walking(&config, 100.0);
        let w = 100.0_f32 * 0.015;
        assert!((pose.left_leg - w.sin() * 4.0).abs() < 1e-5);
        assert!((pose.left_leg + pose.right_leg).abs() < 1e-5);
        assert!((pose.right_arm - w.sin() * 0.175).abs() < 1e-5);
        assert!((pose.left_arm + pose.right_arm).abs() < 1e-5);
    }

    #[test]
    fn test_spawn_registers_six_sprites() {
        let (avatar, _, stage) = grounded_avatar();
        assert_eq!(avatar.avatar().sprite_handles().count(), 6);
        assert_eq!(stage.counts().sprites, 6);
        for part in AvatarPart::ALL {
            assert!(avatar.avatar().part(part).is_some());
        }
    }
}
