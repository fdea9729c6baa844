use glam::Vec3;

// Shared tuning constants for the scroll-surfer scene. Both the renderer and
// the frame driver read these; tests assert the relationships between them.

// Asset locations (relative to the hosting page)
pub const SHIP_MODEL_URL: &str = "/models/spaceship.glb";
pub const WORMHOLE_MODEL_URL: &str = "/models/WORMHOLE.glb";
pub const ENVIRONMENT_HDR_URL: &str = "/hdri/sky_1.hdr";

// Camera
pub const CAMERA_POSITION: [f32; 3] = [0.0, 1.5, 8.0];
pub const CAMERA_ROTATION_X: f32 = -0.05; // slight downward pitch
pub const CAMERA_BASE_FOV_DEG: f32 = 70.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

// Bloom pass
pub const BLOOM_THRESHOLD: f32 = 0.3;
pub const BLOOM_STRENGTH: f32 = 0.5;
pub const BLOOM_RADIUS: f32 = 0.4;
pub const BLOOM_SMOOTH_WIDTH: f32 = 0.01;
pub const BLOOM_MIP_COUNT: usize = 5;
pub const BLOOM_KERNEL_RADII: [u32; BLOOM_MIP_COUNT] = [3, 5, 7, 9, 11]; // sigma == radius
pub const BLOOM_FACTORS: [f32; BLOOM_MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];

// Ship placement and mouse interaction
pub const SHIP_REST_POSITION: [f32; 3] = [0.0, -1.5, -4.0];
pub const SHIP_BASE_YAW: f32 = std::f32::consts::PI; // model faces +Z, flip toward camera
pub const SHIP_SCALE: f32 = 0.45;
pub const SHIP_INTRO_DISTANCE: f32 = 60.0; // intro starts this far along +Z from rest
pub const SHIP_INTRO_LERP: f32 = 0.03;
pub const SHIP_INTRO_SNAP_EPS: f32 = 0.01;
pub const MOUSE_FOLLOW_SPEED: f32 = 0.07;
pub const SHIP_ROTATION_FACTOR: f32 = 0.4;
pub const SHIP_MAX_TILT: f32 = std::f32::consts::PI / 9.0;
pub const PARALLAX_FACTOR_X: f32 = 6.0;
pub const PARALLAX_FACTOR_Y: f32 = 3.0;

// Emissive glow driven by scroll activity
pub const EMISSIVE_INITIAL: f32 = 10.0;
pub const EMISSIVE_RESTING: f32 = 30.0;
pub const EMISSIVE_ACTIVE_MIN: f32 = 90.0;
pub const EMISSIVE_ACTIVE_MAX: f32 = 100.0;
pub const EMISSIVE_LERP_RATE_PER_SEC: f32 = 5.0; // lerp factor = min(rate * dt, 1)

// Acceleration visuals
pub const FORWARD_BOOST_AMOUNT: f32 = 40.0; // ship lurch along -Z while scrolling
pub const FOV_DECREASE_AMOUNT: f32 = 30.0; // degrees of FOV narrowing while scrolling
pub const ACCEL_EFFECT_LERP: f32 = 0.1; // per-frame fraction for FOV and boost

// Scroll state machine
pub const SCROLL_QUIET_WINDOW_MS: f64 = 150.0;
pub const SCROLL_SPEED_NORM_PX: f64 = 50.0; // scroll delta mapping to full intensity

// Trail particles
pub const MAX_TRAIL_PARTICLES: usize = 150;
pub const PARTICLE_LIFETIME_MIN: f32 = 0.8;
pub const PARTICLE_LIFETIME_MAX: f32 = 1.5;
pub const PARTICLE_EMISSION_THRESHOLD: f32 = 40.0; // emissive intensity gate
pub const PARTICLE_EMISSION_RATE: f32 = 250.0; // candidates per second at full chance
pub const PARTICLE_SPEED_MIN: f32 = 4.0;
pub const PARTICLE_SPEED_MAX: f32 = 7.0;
pub const PARTICLE_BASE_SIZE: f32 = 0.2;
pub const PARTICLE_SIZE_JITTER: f32 = 0.3; // fraction of base size
pub const PARTICLE_VELOCITY_JITTER: f32 = 0.5; // world units/sec, centered
pub const PARTICLE_EMISSION_OFFSET: f32 = -0.35; // behind the ship, local Z

// Wormhole placement and materials
pub const WORMHOLE_POSITION: [f32; 3] = [0.0, 0.0, 1000.0];
pub const WORMHOLE_SCALE: f32 = 10.0;
pub const WORMHOLE1_MATERIAL_NAME: &str = "WORMHOLE 1";
pub const WORMHOLE1_EMISSIVE: f32 = 45.0;
pub const WORMHOLE1_OFFSET_SPEED: [f32; 2] = [0.02, -0.06];
pub const WORMHOLE2_MATERIAL_NAME: &str = "WORMHOLE 2";
pub const WORMHOLE2_EMISSIVE: f32 = 25.0;
pub const WORMHOLE2_OFFSET_SPEED: [f32; 2] = [0.02, -0.09];

// Atmosphere
pub const FOG_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
pub const FOG_NEAR: f32 = 80.0;
pub const FOG_FAR: f32 = 300.0;
pub const AMBIENT_LIGHT: f32 = 0.05;
pub const DIRECTIONAL_LIGHT: f32 = 0.02;
pub const DIRECTIONAL_LIGHT_DIR: [f32; 3] = [2.0, 5.0, -5.0]; // toward the scene
pub const FALLBACK_BACKGROUND: [f32; 3] = [0.0196, 0.0196, 0.0392]; // 0x05050a
pub const ENV_REFLECTION_STRENGTH: f32 = 0.2; // equirect reflection mixed into mesh shading

#[inline]
pub fn ship_rest_vec3() -> Vec3 {
    Vec3::from_array(SHIP_REST_POSITION)
}

#[inline]
pub fn camera_position_vec3() -> Vec3 {
    Vec3::from_array(CAMERA_POSITION)
}
