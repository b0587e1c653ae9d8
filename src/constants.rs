// Movement values were tuned per-frame at REFERENCE_FPS and are stored here converted
// to per-second units.
// Units are pixels & seconds unless otherwise specified.

pub const SCREEN_WIDTH: f32 = 1920.0;
pub const SCREEN_HEIGHT: f32 = 1080.0;

// The flat ground line used when no level geometry is loaded
pub const GROUND_LEVEL: f32 = 500.0;

// Frame rate the per-frame tuning was authored against
pub const REFERENCE_FPS: f32 = 165.0;

pub const BODY_SIZE: f32 = 50.0;

pub const WALK_SPEED: f32 = 5.0 * REFERENCE_FPS;
pub const GRAVITY: f32 = 0.5 * REFERENCE_FPS * REFERENCE_FPS;
pub const JUMP_IMPULSE: f32 = -15.0 * REFERENCE_FPS;
pub const WALL_SLIDE_GRAVITY_SCALE: f32 = 0.35;
pub const WALL_SLIDE_MAX_FALL: f32 = 2.0 * REFERENCE_FPS;
pub const WALL_JUMP_HORIZONTAL_MULTIPLIER: f32 = 2.5;

// Collision resolution
pub const REFINEMENT_MAX_ITERATIONS: u32 = 12;
pub const REFINEMENT_EPSILON: f32 = 0.001;

// The orchestrator never hands the body a frame delta longer than this
pub const MAX_FRAME_DT: f32 = 1.0 / 20.0;

pub const TRAIL_LENGTH: usize = 12;
