// Policy, scene and showcase tuning shared by the pure core and the web layer.

// Profile tiers
pub const DESKTOP_FPS: f32 = 60.0;
pub const DESKTOP_DPR_CAP: f32 = 2.0;
pub const MOBILE_FPS: f32 = 30.0;
pub const MOBILE_DPR_CAP: f32 = 1.5;
pub const LOW_END_FPS: f32 = 15.0;
pub const LOW_END_DPR: f32 = 1.0;
pub const OFF_FPS: f32 = 0.0;
pub const OFF_DPR: f32 = 1.0;

// Capability thresholds
pub const LOW_END_MAX_MEMORY_GB: f64 = 4.0;
pub const LOW_END_MAX_CORES: u32 = 2;
pub const MOBILE_MAX_WIDTH: f64 = 768.0; // exclusive
pub const DEFAULT_DEVICE_MEMORY_GB: f64 = 8.0; // assumed when unreported
pub const DEFAULT_CORES: u32 = 4; // assumed when unreported

// Zone arbitration
pub const ZONE_RATIO_WEIGHT: f32 = 10.0;
pub const ZONE_PRIORITY_WEIGHT: f32 = 0.01;
pub const ZONE_HYSTERESIS_BONUS: f32 = 0.15; // in ratio units, current zone only
pub const ZONE_MIN_RATIO: f32 = 0.05; // below this everything falls back to Main

// Commit gating
pub const COMMIT_SETTLE_MS: f64 = 180.0;

// Coordination
pub const RESIZE_THROTTLE_MS: f64 = 32.0;
pub const RESIZE_DEBOUNCE_MS: f64 = 150.0;
pub const SCROLL_SETTLE_MS: f64 = 180.0;
pub const REBUILD_HEIGHT_THRESHOLD_PX: f64 = 120.0; // larger than a mobile toolbar

// Background scene
pub const NODE_WRAP_MARGIN_PX: f32 = 40.0;
pub const NODE_BAND: f32 = 0.75; // nodes live in the top 75% of the viewport
pub const DOT_BAND: f32 = 0.78;
pub const LINE_BAND_SPAN: f32 = 0.72;
pub const LINE_BAND_TOP: f32 = 0.06;
pub const LINE_MIN_SEGMENTS: u32 = 10;
pub const NODE_GLOW_RADIUS_MUL: f32 = 8.0;
pub const NODE_WOBBLE_X_PX: f32 = 6.0;
pub const NODE_WOBBLE_Y_PX: f32 = 4.0;
pub const NODE_WOBBLE_RATE: f32 = 0.6;
pub const SCENE_SEED: u64 = 0x5EED_BACD;

// Showcase progress mapping
pub const FIRST_ITEM_HOLD: f32 = 0.08;
pub const BOTTOM_ZONE_PX: f64 = 280.0;
pub const PROGRESS_SNAP: f32 = 0.005;
pub const TRIGGER_END_VIEWPORT_FRACTION: f64 = 0.5;

// Showcase smoothing
pub const LERP_ALPHA: f32 = 0.065;
pub const SNAP_T: f32 = 0.012;
pub const EPS_T: f32 = 0.004;
pub const SETTLED_T: f32 = 0.01;
pub const IDLE_MS: f64 = 900.0;

// Showcase plane layout
pub const PLANE_SPACING_X: f32 = 1.35;
pub const PLANE_LIFT_Y: f32 = 0.32;
pub const PLANE_FOCUS_LIFT_BIAS: f32 = 0.2;
pub const PLANE_DEPTH_Z: f32 = 0.85;
pub const PLANE_YAW: f32 = -0.07;
pub const PLANE_ROLL: f32 = -0.018;
pub const PLANE_SCALE_BASE: f32 = 0.985;
pub const PLANE_SCALE_FOCUS: f32 = 0.055;
pub const PLANE_OPACITY_BASE: f32 = 0.18;
pub const PLANE_OPACITY_FOCUS: f32 = 0.82;
pub const PLANE_EMISSIVE_BASE: f32 = 0.11;
pub const PLANE_EMISSIVE_FOCUS: f32 = 0.16;
pub const PLACEHOLDER_OPACITY: f32 = 0.22;
pub const PLANE_SIZE_DESKTOP: [f32; 2] = [5.1, 2.9];
pub const PLANE_SIZE_COARSE: [f32; 2] = [2.35, 1.35];
pub const MAX_PLANES: usize = 8;
pub const MAX_PLANES_COARSE: usize = 4;

// Showcase camera drift
pub const CAMERA_Z: f32 = 6.5;
pub const CAMERA_FOVY_DEG: f32 = 50.0;
pub const DRIFT_EDGE: f32 = 0.18;
pub const DRIFT_FLOOR: f32 = 0.65;
pub const DRIFT_POS_X: f32 = 0.2;
pub const DRIFT_POS_Y: f32 = 0.075;
pub const DRIFT_ROT_Y: f32 = 0.065;
pub const DRIFT_ROT_X: f32 = 0.038;

// Showcase eligibility
pub const SHOWCASE_SMALL_MAX_WIDTH: f64 = 768.0; // exclusive
pub const SHOWCASE_DESKTOP_MIN_WIDTH: f64 = 1024.0;
pub const SHOWCASE_DPR_CAP: f32 = 1.5;
pub const FALLBACK_IMAGES_PER_PROJECT: usize = 2;
