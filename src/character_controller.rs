use std::fmt::Display;

use anyhow::Result;
use cgmath::*;

use crate::{
    constants::{
        BODY_SIZE, GRAVITY, GROUND_LEVEL, JUMP_IMPULSE, SCREEN_HEIGHT, SCREEN_WIDTH,
        WALK_SPEED, WALL_JUMP_HORIZONTAL_MULTIPLIER, WALL_SLIDE_GRAVITY_SCALE,
        WALL_SLIDE_MAX_FALL,
    },
    geom::{clamp, Bounds},
    input::Buttons,
    level::LevelGeometry,
    mask::SolidQuery,
    resolver::{resolve_axis_motion, Axis},
};

// ---------------------------------------------------------------------------------------------------------------------

/// Movement tuning. Units are pixels & seconds; +y is down, so `jump_impulse` is negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    // max horizontal speed, also the initial speed of a fast-fall
    pub speed: f32,
    pub gravity: f32,
    // vertical velocity set at the start of a jump
    pub jump_impulse: f32,
    // multiplies gravity while wall-sliding, in (0, 1]
    pub wall_slide_gravity_scale: f32,
    // cap on downward velocity while wall-sliding
    pub wall_slide_max_fall: f32,
    pub wall_jump_horizontal_multiplier: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed: WALK_SPEED,
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            wall_slide_gravity_scale: WALL_SLIDE_GRAVITY_SCALE,
            wall_slide_max_fall: WALL_SLIDE_MAX_FALL,
            wall_jump_horizontal_multiplier: WALL_JUMP_HORIZONTAL_MULTIPLIER,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("speed", self.speed),
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("wall_slide_gravity_scale", self.wall_slide_gravity_scale),
            ("wall_slide_max_fall", self.wall_slide_max_fall),
            (
                "wall_jump_horizontal_multiplier",
                self.wall_jump_horizontal_multiplier,
            ),
        ];
        for (name, value) in values.iter() {
            if !value.is_finite() {
                anyhow::bail!("Tuning value '{}' must be finite, got {}", name, value);
            }
        }

        if self.speed <= 0.0 {
            anyhow::bail!("Tuning speed must be positive, got {}", self.speed);
        }
        if self.gravity < 0.0 {
            anyhow::bail!("Tuning gravity must not pull upwards, got {}", self.gravity);
        }
        if self.jump_impulse >= 0.0 {
            anyhow::bail!(
                "Tuning jump_impulse must be negative (upwards), got {}",
                self.jump_impulse
            );
        }
        if self.wall_slide_gravity_scale <= 0.0 || self.wall_slide_gravity_scale > 1.0 {
            anyhow::bail!(
                "Tuning wall_slide_gravity_scale must be in (0, 1], got {}",
                self.wall_slide_gravity_scale
            );
        }
        if self.wall_slide_max_fall <= 0.0 {
            anyhow::bail!(
                "Tuning wall_slide_max_fall must be positive, got {}",
                self.wall_slide_max_fall
            );
        }
        if self.wall_jump_horizontal_multiplier < 0.0 {
            anyhow::bail!(
                "Tuning wall_jump_horizontal_multiplier must not be negative, got {}",
                self.wall_jump_horizontal_multiplier
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallDirection {
    None,
    Left,
    Right,
}

impl Default for WallDirection {
    fn default() -> Self {
        WallDirection::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Grounded,
    Ascending,
    Descending,
    WallSliding,
}

impl Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stance::Grounded => write!(f, "Grounded"),
            Stance::Ascending => write!(f, "Ascending"),
            Stance::Descending => write!(f, "Descending"),
            Stance::WallSliding => write!(f, "WallSliding"),
        }
    }
}

/// What the body's box is pressed against, found by probing one pixel out from each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Contacts {
    ground: bool,
    left: bool,
    right: bool,
}

impl Contacts {
    fn touching_wall(&self) -> bool {
        self.left || self.right
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// A square actor moved by gravity and input. Level geometry is never stored; it's handed in
/// for the duration of each `apply_input` / `step` call, and when it's absent the body stands
/// on a flat ground line instead.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    position: Point2<f32>,
    velocity: Vector2<f32>,
    size: f32,
    tuning: Tuning,

    // playfield used when no level geometry is supplied
    screen: Bounds,
    ground_level: f32,
    respawn_point: Point2<f32>,

    jumping: bool,
    wall_sliding: bool,
    wall_direction: WallDirection,
    jump_key_held: bool,
    fast_falling: bool,
    grounded: bool,
    stance: Stance,
    respawn_count: u32,
}

impl KinematicBody {
    pub fn new(position: Point2<f32>) -> Self {
        Self {
            position,
            velocity: Zero::zero(),
            size: BODY_SIZE,
            tuning: Tuning::default(),
            screen: Bounds::new(point2(0.0, 0.0), vec2(SCREEN_WIDTH, SCREEN_HEIGHT)),
            ground_level: GROUND_LEVEL,
            respawn_point: position,
            jumping: false,
            wall_sliding: false,
            wall_direction: WallDirection::None,
            jump_key_held: false,
            fast_falling: false,
            grounded: false,
            stance: Stance::Descending,
            respawn_count: 0,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Sets the playfield and ground line used when stepping without level geometry
    pub fn with_screen(mut self, screen: Bounds, ground_level: f32) -> Self {
        self.screen = screen;
        self.ground_level = ground_level;
        self
    }

    pub fn with_respawn_point(mut self, respawn_point: Point2<f32>) -> Self {
        self.respawn_point = respawn_point;
        self
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

    /// Input phase. Sets horizontal intent from left/right, probes for wall and ground contact,
    /// and starts a jump (or wall-jump) on the rising edge of the jump button.
    pub fn apply_input(&mut self, buttons: &Buttons, geometry: Option<&LevelGeometry>) {
        // if both are held, right is checked last and wins
        self.velocity.x = 0.0;
        if buttons.left {
            self.velocity.x = -self.tuning.speed;
        }
        if buttons.right {
            self.velocity.x = self.tuning.speed;
        }

        let contacts = self.probe_contacts(geometry);

        self.wall_sliding =
            !contacts.ground && contacts.touching_wall() && self.velocity.y > 0.0;
        self.wall_direction = if contacts.left {
            WallDirection::Left
        } else if contacts.right {
            WallDirection::Right
        } else {
            WallDirection::None
        };

        let can_jump = contacts.ground || (contacts.touching_wall() && !contacts.ground);
        let jump_pressed = buttons.jump && !self.jump_key_held;

        let jump_fired = jump_pressed && can_jump;
        if jump_fired {
            self.jumping = true;
            self.velocity.y = self.tuning.jump_impulse;

            if !contacts.ground {
                // kick away from the wall
                let kick = self.tuning.speed * self.tuning.wall_jump_horizontal_multiplier;
                if contacts.left {
                    self.velocity.x = kick;
                } else if contacts.right {
                    self.velocity.x = -kick;
                }
                self.wall_sliding = false;
            }
        }

        // fast-fall sets a starting velocity; gravity still integrates on top of it
        self.fast_falling = buttons.down;
        if buttons.down {
            self.velocity.y = self.tuning.speed;
        }

        self.jump_key_held = buttons.jump;
        // a jump leaves the ground this tick even though the box hasn't moved yet
        self.grounded = contacts.ground && !jump_fired;
        self.update_stance();
    }

    /// Integration phase. Returns true when the body has reached the right edge of the playfield,
    /// which tells the caller to advance to the next level.
    pub fn step(&mut self, dt: f32, geometry: Option<&LevelGeometry>) -> bool {
        let screen = match geometry {
            Some(geometry) => geometry.bounds(),
            None => self.screen,
        };

        if let Some(geometry) = geometry {
            if geometry.touches_hazard(&self.bounds()) {
                log::info!("Hazard contact at {:?}", self.position);
                self.respawn();
                return self.reached_right_edge(&screen);
            }
        }

        if !(dt > 0.0 && dt.is_finite()) {
            return self.reached_right_edge(&screen);
        }

        self.apply_horizontal_movement(dt, geometry, &screen);
        self.apply_vertical_movement(dt, geometry);
        self.fast_falling = false;

        if self.position.y > screen.bottom() {
            log::info!("Fell below the screen at {:?}", self.position);
            self.respawn();
        }

        self.update_stance();
        self.reached_right_edge(&screen)
    }

    /// Unconditionally moves the body; velocity and state are untouched
    pub fn teleport(&mut self, x: f32, y: f32) {
        self.position = point2(x, y);
    }

    /// Teleports to the respawn point and zeroes velocity. Safe to call repeatedly.
    pub fn respawn(&mut self) {
        self.position = self.respawn_point;
        self.velocity = Zero::zero();
        self.jumping = false;
        self.wall_sliding = false;
        self.wall_direction = WallDirection::None;
        self.fast_falling = false;
        self.grounded = false;
        self.respawn_count += 1;
        self.update_stance();
        log::info!(
            "Respawned at {:?} (respawn #{})",
            self.respawn_point,
            self.respawn_count
        );
    }

    pub fn set_respawn_point(&mut self, respawn_point: Point2<f32>) {
        self.respawn_point = respawn_point;
    }

    pub fn set_velocity(&mut self, velocity: Vector2<f32>) {
        self.velocity = velocity;
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

    pub fn position(&self) -> Point2<f32> {
        self.position
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.velocity
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::square(self.position.x, self.position.y, self.size)
    }

    pub fn respawn_point(&self) -> Point2<f32> {
        self.respawn_point
    }

    pub fn respawn_count(&self) -> u32 {
        self.respawn_count
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_wall_sliding(&self) -> bool {
        self.wall_sliding
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn wall_direction(&self) -> WallDirection {
        self.wall_direction
    }

    pub fn stance(&self) -> Stance {
        self.stance
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

    fn probe_contacts(&self, geometry: Option<&LevelGeometry>) -> Contacts {
        let bounds = self.bounds();
        match geometry {
            Some(geometry) => Contacts {
                ground: geometry.overlaps(&bounds.offset(0.0, 1.0)),
                left: geometry.overlaps(&bounds.offset(-1.0, 0.0)),
                right: geometry.overlaps(&bounds.offset(1.0, 0.0)),
            },
            None => Contacts {
                ground: bounds.bottom() >= self.ground_level,
                left: false,
                right: false,
            },
        }
    }

    fn apply_horizontal_movement(
        &mut self,
        dt: f32,
        geometry: Option<&LevelGeometry>,
        screen: &Bounds,
    ) {
        let extent = vec2(self.size, self.size);
        let dx = self.velocity.x * dt;

        let (mut x, mut blocked) = match geometry {
            Some(geometry) => {
                let motion = resolve_axis_motion(
                    Axis::Horizontal,
                    self.position.x,
                    dx,
                    self.position.y,
                    extent,
                    geometry,
                );
                (motion.position, motion.blocked)
            }
            None => (self.position.x + dx, false),
        };

        // the playfield edges act as walls
        let clamped = clamp(x, screen.left(), screen.right() - self.size);
        if clamped != x {
            x = clamped;
            blocked = true;
        }

        self.position.x = x;
        if blocked {
            self.velocity.x = 0.0;
        }
    }

    fn apply_vertical_movement(&mut self, dt: f32, geometry: Option<&LevelGeometry>) {
        let gravity_scale = if self.wall_sliding {
            self.tuning.wall_slide_gravity_scale
        } else {
            1.0
        };
        self.velocity.y += self.tuning.gravity * gravity_scale * dt;

        // a fast-fall this tick is exempt from the slide cap
        if self.wall_sliding && !self.fast_falling && self.velocity.y > self.tuning.wall_slide_max_fall
        {
            self.velocity.y = self.tuning.wall_slide_max_fall;
        }

        let dy = self.velocity.y * dt;
        let falling = self.velocity.y > 0.0;

        match geometry {
            Some(geometry) => {
                let motion = resolve_axis_motion(
                    Axis::Vertical,
                    self.position.y,
                    dy,
                    self.position.x,
                    vec2(self.size, self.size),
                    geometry,
                );
                self.position.y = motion.position;
                if motion.blocked {
                    self.velocity.y = 0.0;
                    if falling {
                        self.land();
                    } else {
                        // bumped a ceiling, jump state is untouched
                        self.grounded = false;
                    }
                } else {
                    self.grounded = false;
                }
            }
            None => {
                self.position.y += dy;
                if self.position.y + self.size >= self.ground_level {
                    self.position.y = self.ground_level - self.size;
                    self.velocity.y = 0.0;
                    self.land();
                } else {
                    self.grounded = false;
                }
            }
        }
    }

    fn land(&mut self) {
        self.jumping = false;
        self.wall_sliding = false;
        self.grounded = true;
    }

    fn reached_right_edge(&self, screen: &Bounds) -> bool {
        self.position.x + self.size >= screen.right()
    }

    fn update_stance(&mut self) {
        let new_stance = if self.wall_sliding {
            Stance::WallSliding
        } else if self.grounded {
            Stance::Grounded
        } else if self.velocity.y < 0.0 {
            Stance::Ascending
        } else {
            Stance::Descending
        };

        if new_stance != self.stance {
            log::debug!(
                "Stance transition at {:?} from {} -> {}",
                self.position,
                self.stance,
                new_stance
            );
            self.stance = new_stance;
        }
    }
}
