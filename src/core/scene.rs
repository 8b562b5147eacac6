use super::constants::*;
use super::policy::Profile;
use rand::prelude::*;

/// Per-profile drawing budget for the ambient background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    pub line_count: usize,
    pub segments_per_line: u32,
    pub line_alpha: f32,
    pub line_width: f32,
    pub amplitude: f32,       // px
    pub noise_frequency: f32, // per px
    pub time_speed: f32,
    pub dot_count: usize,
    pub dot_alpha: f32,
    pub node_count: usize,
    pub node_alpha: f32,
    pub fade_start: f32, // 0..1 of the viewport height
}

impl SceneConfig {
    pub const DESKTOP: SceneConfig = SceneConfig {
        line_count: 24,
        segments_per_line: 90,
        line_alpha: 0.10,
        line_width: 1.1,
        amplitude: 28.0,
        noise_frequency: 0.010,
        time_speed: 0.18,
        dot_count: 140,
        dot_alpha: 0.08,
        node_count: 20,
        node_alpha: 0.10,
        fade_start: 0.62,
    };
    pub const MOBILE: SceneConfig = SceneConfig {
        line_count: 16,
        segments_per_line: 70,
        line_alpha: 0.09,
        line_width: 1.0,
        amplitude: 22.0,
        noise_frequency: 0.011,
        time_speed: 0.15,
        dot_count: 80,
        dot_alpha: 0.07,
        node_count: 12,
        node_alpha: 0.09,
        fade_start: 0.60,
    };
    pub const LOW_END: SceneConfig = SceneConfig {
        line_count: 12,
        segments_per_line: 55,
        line_alpha: 0.08,
        line_width: 1.0,
        amplitude: 16.0,
        noise_frequency: 0.012,
        time_speed: 0.12,
        dot_count: 55,
        dot_alpha: 0.06,
        node_count: 8,
        node_alpha: 0.08,
        fade_start: 0.58,
    };
    pub const OFF: SceneConfig = SceneConfig {
        line_count: 0,
        segments_per_line: 0,
        line_alpha: 0.0,
        line_width: 1.0,
        amplitude: 0.0,
        noise_frequency: 0.0,
        time_speed: 0.0,
        dot_count: 0,
        dot_alpha: 0.0,
        node_count: 0,
        node_alpha: 0.0,
        fade_start: 0.6,
    };

    pub const fn for_profile(profile: Profile) -> SceneConfig {
        match profile {
            Profile::Desktop => Self::DESKTOP,
            Profile::Mobile => Self::MOBILE,
            Profile::LowEnd => Self::LOW_END,
            Profile::Off => Self::OFF,
        }
    }
}

// Arena capacity: the largest budget across all profiles.
pub const MAX_LINES: usize = SceneConfig::DESKTOP.line_count;
pub const MAX_NODES: usize = SceneConfig::DESKTOP.node_count;

// ---------------- 1-D value noise ----------------
#[inline]
fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// Deterministic hash of `i` into [0, 1).
#[inline]
pub fn hash1(i: f64) -> f64 {
    fract((i * 127.1).sin() * 43_758.545_312_3)
}

#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Smooth value noise in [0, 1].
pub fn noise1(x: f32, seed: f32) -> f32 {
    let x = x as f64;
    let i = x.floor();
    let u = smoothstep((x - i) as f32) as f64;
    let offset = seed as f64 * 1013.0;
    let a = hash1(i + offset);
    let b = hash1(i + 1.0 + offset);
    (a + (b - a) * u) as f32
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub base_y: f32,
    pub seed: f32,
    pub phase: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub x: f32,
    pub y: f32,
    pub vx: f32, // px/s
    pub vy: f32,
    pub radius: f32,
    pub seed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Number of primitives drawn for a budget scaled by `density`.
#[inline]
pub fn drawn_count(count: usize, density: f32, allocated: usize) -> usize {
    let scaled = (count as f32 * density.clamp(0.0, 1.0)).floor() as usize;
    scaled.min(allocated)
}

/// Background scene entities for one logical viewport size.
///
/// The line/node arrays are reserved once at the maximum budget and only
/// refilled on rebuild, never grown per frame.
pub struct Scene {
    width: f32,
    height: f32,
    config: SceneConfig,
    lines: Vec<Line>,
    nodes: Vec<Node>,
    builds: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            config: SceneConfig::OFF,
            lines: Vec::with_capacity(MAX_LINES),
            nodes: Vec::with_capacity(MAX_NODES),
            builds: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// How many times the entities were (re)built.
    #[inline]
    pub fn builds(&self) -> u32 {
        self.builds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn rebuild(&mut self, width: f32, height: f32, config: &SceneConfig) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.config = *config;
        self.builds += 1;

        let w = self.width;
        let h = self.height;

        // Lines spread over the upper part, keeping the lower area calm.
        let n_lines = config.line_count.min(MAX_LINES);
        self.lines.clear();
        for i in 0..n_lines {
            let t = if n_lines <= 1 {
                0.0
            } else {
                i as f32 / (n_lines - 1) as f32
            };
            self.lines.push(Line {
                base_y: (t * h * LINE_BAND_SPAN + h * LINE_BAND_TOP).round(),
                seed: 10.0 + i as f32 * 17.23,
                phase: i as f32 * 0.37,
            });
        }

        let mut rng = StdRng::seed_from_u64(SCENE_SEED);
        let n_nodes = config.node_count.min(MAX_NODES);
        self.nodes.clear();
        for i in 0..n_nodes {
            self.nodes.push(Node {
                x: rng.gen::<f32>() * w,
                y: rng.gen::<f32>() * h * NODE_BAND,
                vx: (rng.gen::<f32>() - 0.5) * 10.0,
                vy: (rng.gen::<f32>() - 0.5) * 6.0,
                radius: 1.5 + rng.gen::<f32>() * 2.5,
                seed: 100.0 + i as f32 * 13.7,
            });
        }
    }

    pub fn lines_drawn(&self, density: f32) -> &[Line] {
        let n = drawn_count(self.config.line_count, density, self.lines.len());
        &self.lines[..n]
    }

    pub fn nodes_drawn(&self, density: f32) -> &[Node] {
        let n = drawn_count(self.config.node_count, density, self.nodes.len());
        &self.nodes[..n]
    }

    /// Segment count used for every flow line.
    #[inline]
    pub fn segments(&self) -> u32 {
        self.config.segments_per_line.max(LINE_MIN_SEGMENTS)
    }

    /// Y coordinate of `line` at horizontal position `x` and time `t_sec`.
    #[inline]
    pub fn line_y(&self, line: &Line, x: f32, t_sec: f32) -> f32 {
        let c = &self.config;
        let nx = x * c.noise_frequency + t_sec * c.time_speed + line.phase;
        let n = noise1(nx, line.seed);
        line.base_y + (n - 0.5) * 2.0 * c.amplitude
    }

    /// Open polyline of one flow line, left edge to right edge.
    pub fn line_points<'a>(
        &'a self,
        line: &'a Line,
        t_sec: f32,
    ) -> impl Iterator<Item = (f32, f32)> + 'a {
        let seg = self.segments();
        let dx = self.width / seg as f32;
        (0..=seg).map(move |i| {
            let x = i as f32 * dx;
            (x, self.line_y(line, x, t_sec))
        })
    }

    /// Wobbled centre and glow radius of a node at `t_sec`.
    pub fn node_glow(&self, node: &Node, t_sec: f32) -> (f32, f32, f32) {
        let wob = (noise1(t_sec * NODE_WOBBLE_RATE + node.seed, node.seed) - 0.5) * 2.0;
        (
            node.x + wob * NODE_WOBBLE_X_PX,
            node.y + wob * NODE_WOBBLE_Y_PX,
            node.radius * NODE_GLOW_RADIUS_MUL,
        )
    }

    /// Integrate node drift and wrap around the edges with a margin so a
    /// glow leaves the screen completely before re-entering on the far side.
    pub fn step_nodes(&mut self, dt_sec: f32) {
        let w = self.width;
        let band = self.height * NODE_BAND;
        let m = NODE_WRAP_MARGIN_PX;
        for p in &mut self.nodes {
            p.x += p.vx * dt_sec;
            p.y += p.vy * dt_sec;
            if p.x < -m {
                p.x = w + m;
            } else if p.x > w + m {
                p.x = -m;
            }
            if p.y < -m {
                p.y = band + m;
            } else if p.y > band + m {
                p.y = -m;
            }
        }
    }

    /// Static dot field; drawn once per build into the cached layer.
    pub fn dots(&self) -> impl Iterator<Item = Dot> + '_ {
        let (w, h) = (self.width, self.height);
        (0..self.config.dot_count).map(move |i| {
            let seed = 500.0 + i as f64 * 9.17;
            Dot {
                x: hash1(seed + 1.0) as f32 * w,
                y: hash1(seed + 2.0) as f32 * h * DOT_BAND,
                radius: 0.6 + hash1(seed + 3.0) as f32 * 0.8,
            }
        })
    }

    /// Top of the bottom-anchored readability fade, in px.
    #[inline]
    pub fn fade_top(&self) -> f32 {
        self.height * self.config.fade_start
    }
}
