use super::constants::*;
use super::policy::Profile;
use super::scene::smoothstep;
use glam::{EulerRot, Mat4, Quat, Vec3};

/// One entry of the externally supplied project list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectItem {
    pub identifier: String,
    pub images: Vec<String>,
}

/// An image plane and the project it reports back to.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneSource {
    pub src: String,
    pub project_index: usize,
}

/// Flatten every project's images in order, keeping at most `max_planes`.
pub fn plane_sources(projects: &[ProjectItem], max_planes: usize) -> Vec<PlaneSource> {
    projects
        .iter()
        .enumerate()
        .flat_map(|(pi, p)| {
            p.images.iter().map(move |src| PlaneSource {
                src: normalize_src(src),
                project_index: pi,
            })
        })
        .take(max_planes.max(1))
        .collect()
}

/// Plane cap and world-space plane size for the pointer type.
pub fn plane_budget(coarse_pointer: bool) -> (usize, [f32; 2]) {
    if coarse_pointer {
        (MAX_PLANES_COARSE, PLANE_SIZE_COARSE)
    } else {
        (MAX_PLANES, PLANE_SIZE_DESKTOP)
    }
}

/// Images listed by the flat fallback: the first few of every project.
pub fn fallback_sources(projects: &[ProjectItem], per_project: usize) -> Vec<PlaneSource> {
    projects
        .iter()
        .enumerate()
        .flat_map(|(pi, p)| {
            p.images.iter().take(per_project).map(move |src| PlaneSource {
                src: normalize_src(src),
                project_index: pi,
            })
        })
        .collect()
}

/// Root-relative paths get a leading slash; absolute URLs pass through.
pub fn normalize_src(src: &str) -> String {
    if src.starts_with('/') || src.contains("://") || src.starts_with("data:") {
        src.to_string()
    } else {
        format!("/{src}")
    }
}

/// Scale `(width, height)` down so neither edge exceeds `max_edge`,
/// keeping the aspect ratio. Never returns a zero edge.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width.max(1), height.max(1));
    }
    let k = max_edge as f64 / longest as f64;
    (
        ((width as f64 * k).round() as u32).max(1),
        ((height as f64 * k).round() as u32).max(1),
    )
}

/// Inputs deciding between the 3D stack and the flat list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eligibility {
    pub profile: Profile,
    pub reduced_motion: bool,
    pub coarse_pointer: bool,
    pub viewport_width: f64,
}

impl Eligibility {
    pub fn allows_3d(&self) -> bool {
        !(matches!(self.profile, Profile::Off | Profile::LowEnd)
            || self.reduced_motion
            || self.coarse_pointer
            || self.viewport_width < SHOWCASE_SMALL_MAX_WIDTH
            || self.viewport_width < SHOWCASE_DESKTOP_MIN_WIDTH)
    }

    /// What the showcase should display. A GPU that failed once keeps the
    /// list for the rest of the mount.
    pub fn mode(&self, plane_count: usize, gpu_failed: bool) -> ShowcaseMode {
        if gpu_failed || !self.allows_3d() {
            ShowcaseMode::List
        } else if plane_count == 0 {
            ShowcaseMode::Empty
        } else {
            ShowcaseMode::Stack
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowcaseMode {
    /// WebGPU plane stack driven by scroll.
    Stack,
    /// Flat horizontally scrollable image list.
    List,
    /// Nothing to show.
    Empty,
}

#[inline]
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[inline]
pub fn snap01(p: f32) -> f32 {
    let c = clamp01(p);
    if c < PROGRESS_SNAP {
        0.0
    } else if c > 1.0 - PROGRESS_SNAP {
        1.0
    } else {
        c
    }
}

/// Proximity of a plane to the scroll target, 1 when centred.
#[inline]
pub fn focus(distance: f32) -> f32 {
    smoothstep(clamp01(1.0 - distance))
}

/// Scroll positions (in scroller content coordinates) where the trigger
/// region starts and ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerBounds {
    pub start: f64,
    pub end: f64,
}

impl TriggerBounds {
    /// Start when the wrapper's top reaches the viewport bottom; end when
    /// its bottom reaches the viewport's middle.
    pub fn measure(wrapper_top: f64, wrapper_height: f64, client_height: f64) -> Self {
        Self {
            start: wrapper_top - client_height,
            end: wrapper_top + wrapper_height - client_height * TRIGGER_END_VIEWPORT_FRACTION,
        }
    }

    pub fn progress(&self, scroll_top: f64) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if scroll_top >= self.end { 1.0 } else { 0.0 };
        }
        clamp01(((scroll_top - self.start) / span) as f32)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.scroll_height - (self.scroll_top + self.client_height)
    }
}

/// Map trigger progress to showcase progress: hold on the first item for
/// the first few percent and ramp to the end near the bottom of the page,
/// whatever the wrapper's own geometry says.
pub fn map_progress(trigger_progress: f32, metrics: &ScrollMetrics) -> f32 {
    let tp = clamp01(trigger_progress);
    let raw = if tp <= FIRST_ITEM_HOLD {
        0.0
    } else {
        (tp - FIRST_ITEM_HOLD) / (1.0 - FIRST_ITEM_HOLD)
    };
    let remaining = metrics.remaining();
    if remaining <= 0.0 {
        1.0
    } else if remaining < BOTTOM_ZONE_PX {
        let ramp = (1.0 - remaining / BOTTOM_ZONE_PX) as f32;
        snap01(raw).max(ramp)
    } else {
        snap01(raw)
    }
}

#[inline]
pub fn target_for(p: f32, count: usize) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    let last = (count - 1) as f32;
    let p = clamp01(p);
    if p >= 1.0 {
        last
    } else {
        p * last
    }
}

/// Scroll-driven focus index with exponential smoothing.
#[derive(Clone, Debug)]
pub struct Carousel {
    count: usize,
    current_t: f32,
    target_t: f32,
    last_update_ms: f64,
}

impl Carousel {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            current_t: 0.0,
            target_t: 0.0,
            last_update_ms: 0.0,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn current_t(&self) -> f32 {
        self.current_t
    }

    #[inline]
    pub fn target_t(&self) -> f32 {
        self.target_t
    }

    #[inline]
    fn last_index(&self) -> f32 {
        self.count.saturating_sub(1) as f32
    }

    /// Note activity that should keep the loop alive.
    #[inline]
    pub fn touch(&mut self, now_ms: f64) {
        self.last_update_ms = now_ms;
    }

    pub fn set_progress(&mut self, p: f32, now_ms: f64) {
        self.target_t = target_for(p, self.count);
        self.touch(now_ms);
    }

    /// Jump straight to `t` without smoothing.
    pub fn reset(&mut self, t: f32) {
        let t = t.clamp(0.0, self.last_index());
        self.current_t = t;
        self.target_t = t;
    }

    /// Advance one frame of smoothing and return the new `current_t`.
    pub fn step(&mut self) -> f32 {
        let last = self.last_index();
        let mut t = self.current_t + (self.target_t - self.current_t) * LERP_ALPHA;
        if (t - self.target_t).abs() < SNAP_T {
            t = self.target_t;
        }
        if t < EPS_T {
            t = 0.0;
        }
        if self.count > 1 && t > last - EPS_T {
            t = last;
        }
        self.current_t = t.clamp(0.0, last);
        self.current_t
    }

    /// Normalised progress of `current_t`; 0 for a single plane.
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count <= 1 {
            0.0
        } else {
            self.current_t / self.last_index()
        }
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current_t - self.target_t).abs() < SETTLED_T
    }

    pub fn should_idle(&self, now_ms: f64) -> bool {
        self.is_settled() && now_ms - self.last_update_ms > IDLE_MS
    }

    /// Index of the plane nearest to `current_t`.
    pub fn active_plane(&self) -> usize {
        if self.count == 0 {
            return 0;
        }
        (self.current_t.round().max(0.0) as usize).min(self.count - 1)
    }
}

/// Visual parameters of one plane for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanePose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub opacity: f32,
    pub emissive: f32,
    pub focus: f32,
}

impl PlanePose {
    pub fn model_matrix(&self, size: [f32; 2]) -> Mat4 {
        let rot = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(
            Vec3::new(size[0] * self.scale, size[1] * self.scale, 1.0),
            rot,
            self.position,
        )
    }
}

pub fn plane_pose(index: usize, current_t: f32) -> PlanePose {
    let offset = index as f32 - current_t;
    let dist = offset.abs();
    let f = focus(dist);
    PlanePose {
        position: Vec3::new(
            offset * PLANE_SPACING_X,
            (f - PLANE_FOCUS_LIFT_BIAS) * PLANE_LIFT_Y,
            -dist * PLANE_DEPTH_Z,
        ),
        rotation: Vec3::new(0.0, offset * PLANE_YAW, offset * PLANE_ROLL),
        scale: PLANE_SCALE_BASE + PLANE_SCALE_FOCUS * f,
        opacity: PLANE_OPACITY_BASE + PLANE_OPACITY_FOCUS * f,
        emissive: PLANE_EMISSIVE_BASE + PLANE_EMISSIVE_FOCUS * f,
        focus: f,
    }
}

/// Plane indices sorted back to front for alpha blending.
pub fn draw_order(poses: &[PlanePose]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..poses.len()).collect();
    order.sort_by(|a, b| poses[*a].position.z.total_cmp(&poses[*b].position.z));
    order
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_rotation_translation(rot, self.position).inverse()
    }
}

/// Camera drift following overall progress, damped near both ends so the
/// first and last planes stay centred.
pub fn camera_drift(p: f32) -> CameraPose {
    let p = clamp01(p);
    let edge = p.min(1.0 - p);
    let edge_ease = clamp01(edge / DRIFT_EDGE);
    let drift = DRIFT_FLOOR + (1.0 - DRIFT_FLOOR) * edge_ease;
    CameraPose {
        position: Vec3::new(
            (p - 0.5) * DRIFT_POS_X * drift,
            (0.5 - p) * DRIFT_POS_Y * drift,
            CAMERA_Z,
        ),
        rotation: Vec3::new(
            (0.5 - p) * DRIFT_ROT_X * drift,
            (p - 0.5) * DRIFT_ROT_Y * drift,
            0.0,
        ),
    }
}

/// Collapses active-item writes to changes only.
#[derive(Clone, Debug, Default)]
pub struct ActiveIndex {
    last: Option<usize>,
}

impl ActiveIndex {
    /// Returns the index to write, or `None` when unchanged.
    pub fn update(&mut self, project_index: usize) -> Option<usize> {
        if self.last == Some(project_index) {
            return None;
        }
        self.last = Some(project_index);
        Some(project_index)
    }

    #[inline]
    pub fn get(&self) -> Option<usize> {
        self.last
    }
}
