// DOM hooks and browser-side timing constants: the markers the surrounding
// page provides and the timer windows of the web glue.

// Media queries
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
pub const COARSE_POINTER_QUERY: &str = "(pointer: coarse)";

// Zone markers
pub const ZONE_ATTR: &str = "data-bg-zone";
pub const MENU_MARKER_SELECTOR: &str = "[data-bg-zone=\"menu-overlay\"]";
pub const ZONE_THRESHOLDS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

// Showcase markers
pub const STORY_ROOT_ID: &str = "work-story";
pub const CHAPTERS_WRAPPER_ID: &str = "chapters-wrapper";
pub const ACTIVE_INDEX_ATTR: &str = "data-active-index";
pub const SCROLLER_ID: &str = "scroll-root";
pub const SCROLLER_SELECTORS: [&str; 2] = ["[data-scroll-container]", "[data-lenis-scroll-container]"];
pub const SHOWCASE_ROOT_MARGIN: &str = "200px";

// Debug HUD
pub const DEBUG_HUD_ID: &str = "bg-debug";

// Background colours
pub const FALLBACK_BG: &str = "#0a0a0a";
pub const DOT_COLOR: &str = "rgba(255,255,255,1)";
pub const LINE_COLOR: &str = "rgba(80, 200, 220, 1)";
pub const GLOW_INNER: &str = "rgba(255,255,255,0.35)";
pub const GLOW_OUTER: &str = "rgba(255,255,255,0)";
pub const FADE_TOP: &str = "rgba(10,10,10,0)";
pub const FADE_BOTTOM: &str = "rgba(10,10,10,1)";

// Deferred background start
pub const IDLE_START_TIMEOUT_MS: u32 = 1500;
pub const IDLE_START_FALLBACK_MS: i32 = 700;

// Showcase re-measurement
pub const REFRESH_DEBOUNCE_MS: f64 = 150.0;
pub const REFRESH_EARLY_MS: i32 = 120;
pub const REFRESH_LATE_MS: i32 = 600;
pub const INIT_SETTLE_FRAMES: u32 = 2;

// Texture uploads
pub const MAX_TEXTURE_EDGE: u32 = 2048;
pub const PLACEHOLDER_RGBA: [u8; 4] = [40, 40, 40, 255];
