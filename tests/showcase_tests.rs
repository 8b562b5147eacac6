// Host-side tests for the showcase progress mapping, smoothing and layout.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod core {
    pub mod constants {
        include!("../src/core/constants.rs");
    }
    pub mod signals {
        include!("../src/core/signals.rs");
    }
    pub mod timing {
        include!("../src/core/timing.rs");
    }
    pub mod policy {
        include!("../src/core/policy.rs");
    }
    pub mod scene {
        include!("../src/core/scene.rs");
    }
    pub mod showcase {
        include!("../src/core/showcase.rs");
    }
}

use crate::core::constants::*;
use crate::core::policy::{compute_policy, Profile};
use crate::core::showcase::*;
use crate::core::signals::Capabilities;

fn far_from_bottom() -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: 0.0,
        scroll_height: 10_000.0,
        client_height: 800.0,
    }
}

fn near_bottom(remaining: f64) -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: 10_000.0 - 800.0 - remaining,
        scroll_height: 10_000.0,
        client_height: 800.0,
    }
}

fn project(id: &str, images: &[&str]) -> ProjectItem {
    ProjectItem {
        identifier: id.to_string(),
        images: images.iter().map(|s| s.to_string()).collect(),
    }
}

fn converge(c: &mut Carousel, max_frames: usize) -> Vec<f32> {
    let mut trace = Vec::new();
    for _ in 0..max_frames {
        trace.push(c.step());
        if c.current_t() == c.target_t() {
            break;
        }
    }
    trace
}

#[test]
fn progress_holds_first_item_early() {
    let m = far_from_bottom();
    assert_eq!(map_progress(0.0, &m), 0.0);
    assert_eq!(map_progress(0.05, &m), 0.0);
    assert_eq!(map_progress(FIRST_ITEM_HOLD, &m), 0.0);
    let mid = map_progress(0.54, &m);
    assert!((mid - 0.5).abs() < 1e-4, "mid = {mid}");
    assert_eq!(map_progress(1.0, &m), 1.0);
}

#[test]
fn progress_snaps_near_the_ends() {
    assert_eq!(snap01(0.003), 0.0);
    assert_eq!(snap01(0.997), 1.0);
    assert_eq!(snap01(0.5), 0.5);
    assert_eq!(snap01(-3.0), 0.0);
    assert_eq!(snap01(7.0), 1.0);
}

#[test]
fn bottom_of_page_forces_last_item() {
    assert_eq!(map_progress(0.3, &near_bottom(0.0)), 1.0);
    assert_eq!(map_progress(0.0, &near_bottom(-25.0)), 1.0);

    let half = map_progress(0.3, &near_bottom(140.0));
    assert!((half - 0.5).abs() < 1e-4, "half = {half}");

    // Trigger progress already past the ramp wins.
    let ahead = map_progress(0.9, &near_bottom(250.0));
    assert!(ahead > 0.85);
}

#[test]
fn target_reaches_last_index_exactly() {
    assert_eq!(target_for(1.0, 5), 4.0);
    assert_eq!(target_for(0.0, 5), 0.0);
    assert_eq!(target_for(0.5, 5), 2.0);
    assert_eq!(target_for(0.7, 1), 0.0);
    assert_eq!(target_for(0.7, 0), 0.0);
}

#[test]
fn smoothing_converges_monotonically_to_the_end() {
    let mut c = Carousel::new(5);
    c.set_progress(1.0, 0.0);
    let trace = converge(&mut c, 300);
    assert!(trace.len() < 200, "took {} frames", trace.len());
    assert!(trace.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(c.current_t(), 4.0);
    assert_eq!(c.progress(), 1.0);
    assert_eq!(c.active_plane(), 4);
}

#[test]
fn smoothing_converges_back_to_the_start() {
    let mut c = Carousel::new(5);
    c.reset(4.0);
    c.set_progress(0.0, 0.0);
    let trace = converge(&mut c, 300);
    assert!(trace.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(c.current_t(), 0.0);
    assert_eq!(c.progress(), 0.0);
}

#[test]
fn bottom_of_page_reaches_last_plane() {
    let mut c = Carousel::new(6);
    let p = map_progress(0.6, &near_bottom(0.0));
    c.set_progress(p, 0.0);
    converge(&mut c, 300);
    assert_eq!(c.current_t(), 5.0);
}

#[test]
fn single_plane_stays_at_zero() {
    let mut c = Carousel::new(1);
    c.set_progress(0.7, 0.0);
    for _ in 0..10 {
        assert_eq!(c.step(), 0.0);
    }
    assert_eq!(c.progress(), 0.0);
    assert_eq!(c.active_plane(), 0);
    assert!(c.progress().is_finite());
}

#[test]
fn empty_carousel_is_inert() {
    let mut c = Carousel::new(0);
    c.set_progress(1.0, 0.0);
    assert_eq!(c.step(), 0.0);
    assert_eq!(c.active_plane(), 0);
}

#[test]
fn carousel_idles_after_settling() {
    let mut c = Carousel::new(3);
    c.set_progress(0.5, 0.0);
    assert!(!c.should_idle(2_000.0));
    converge(&mut c, 300);
    assert!(c.is_settled());
    assert!(!c.should_idle(500.0));
    assert!(c.should_idle(1_000.0));
    c.touch(1_000.0);
    assert!(!c.should_idle(1_500.0));
}

#[test]
fn active_plane_rounds_to_nearest() {
    let mut c = Carousel::new(5);
    c.reset(1.6);
    assert_eq!(c.active_plane(), 2);
    c.reset(1.4);
    assert_eq!(c.active_plane(), 1);
    c.reset(9.0);
    assert_eq!(c.current_t(), 4.0);
}

#[test]
fn active_index_writes_only_on_change() {
    let mut a = ActiveIndex::default();
    assert_eq!(a.get(), None);
    assert_eq!(a.update(0), Some(0));
    assert_eq!(a.update(0), None);
    assert_eq!(a.update(1), Some(1));
    assert_eq!(a.update(1), None);
    assert_eq!(a.get(), Some(1));
}

#[test]
fn trigger_bounds_follow_wrapper_geometry() {
    let b = TriggerBounds::measure(2_000.0, 1_000.0, 800.0);
    assert_eq!(b.start, 1_200.0);
    assert_eq!(b.end, 2_600.0);
    assert_eq!(b.progress(1_200.0), 0.0);
    assert!((b.progress(1_900.0) - 0.5).abs() < 1e-6);
    assert_eq!(b.progress(0.0), 0.0);
    assert_eq!(b.progress(5_000.0), 1.0);

    let flat = TriggerBounds { start: 100.0, end: 100.0 };
    assert_eq!(flat.progress(99.0), 0.0);
    assert_eq!(flat.progress(100.0), 1.0);
}

#[test]
fn focused_plane_is_opaque_and_forward() {
    let pose = plane_pose(2, 2.0);
    assert_eq!(pose.focus, 1.0);
    assert!((pose.opacity - 1.0).abs() < 1e-5);
    assert!((pose.scale - (PLANE_SCALE_BASE + PLANE_SCALE_FOCUS)).abs() < 1e-6);
    assert_eq!(pose.position.x, 0.0);
    assert_eq!(pose.position.z, 0.0);
    assert!((pose.position.y - 0.8 * PLANE_LIFT_Y).abs() < 1e-6);
    assert_eq!(pose.rotation.y, 0.0);
}

#[test]
fn distant_planes_fade_and_recede() {
    let pose = plane_pose(0, 2.0);
    assert_eq!(pose.focus, 0.0);
    assert!((pose.opacity - PLANE_OPACITY_BASE).abs() < 1e-6);
    assert!(pose.position.x < 0.0);
    assert!((pose.position.z + 2.0 * PLANE_DEPTH_Z).abs() < 1e-5);

    let half = plane_pose(3, 2.5);
    assert!((half.focus - 0.5).abs() < 1e-6);
}

#[test]
fn draw_order_is_back_to_front() {
    let poses: Vec<PlanePose> = (0..5).map(|i| plane_pose(i, 2.0)).collect();
    let order = draw_order(&poses);
    assert_eq!(order.len(), 5);
    assert_eq!(order[4], 2);
    let mut first_two = [order[0], order[1]];
    first_two.sort();
    assert_eq!(first_two, [0, 4]);
    for w in order.windows(2) {
        assert!(poses[w[0]].position.z <= poses[w[1]].position.z);
    }
}

#[test]
fn camera_drift_is_damped_at_the_edges() {
    let start = camera_drift(0.0);
    assert!((start.position.x - (-0.5 * DRIFT_POS_X * DRIFT_FLOOR)).abs() < 1e-6);
    assert_eq!(start.position.z, CAMERA_Z);

    let centre = camera_drift(0.5);
    assert_eq!(centre.position.x, 0.0);
    assert_eq!(centre.rotation.y, 0.0);

    let a = camera_drift(0.2);
    let b = camera_drift(0.8);
    assert!((a.position.x + b.position.x).abs() < 1e-6);
    assert!((a.rotation.y + b.rotation.y).abs() < 1e-6);
}

#[test]
fn view_matrix_inverts_camera_placement() {
    let cam = camera_drift(0.5);
    let eye = cam.view_matrix().transform_point3(cam.position);
    assert!(eye.length() < 1e-4);
}

#[test]
fn plane_sources_flatten_in_order_with_cap() {
    let projects = vec![
        project("alpha", &["img/a1.jpg", "img/a2.jpg"]),
        project("beta", &["/img/b1.jpg"]),
        project("gamma", &["https://cdn.example.com/c1.jpg"]),
    ];
    let all = plane_sources(&projects, 8);
    let srcs: Vec<&str> = all.iter().map(|p| p.src.as_str()).collect();
    assert_eq!(
        srcs,
        vec![
            "/img/a1.jpg",
            "/img/a2.jpg",
            "/img/b1.jpg",
            "https://cdn.example.com/c1.jpg"
        ]
    );
    let owners: Vec<usize> = all.iter().map(|p| p.project_index).collect();
    assert_eq!(owners, vec![0, 0, 1, 2]);

    assert_eq!(plane_sources(&projects, 2).len(), 2);
    assert!(plane_sources(&[], 8).is_empty());
}

#[test]
fn fallback_lists_first_images_per_project() {
    let projects = vec![
        project("alpha", &["a1.jpg", "a2.jpg", "a3.jpg"]),
        project("beta", &[]),
        project("gamma", &["c1.jpg"]),
    ];
    let list = fallback_sources(&projects, FALLBACK_IMAGES_PER_PROJECT);
    let srcs: Vec<&str> = list.iter().map(|p| p.src.as_str()).collect();
    assert_eq!(srcs, vec!["/a1.jpg", "/a2.jpg", "/c1.jpg"]);
}

#[test]
fn normalize_keeps_absolute_urls() {
    assert_eq!(normalize_src("img/x.png"), "/img/x.png");
    assert_eq!(normalize_src("/img/x.png"), "/img/x.png");
    assert_eq!(normalize_src("https://a.b/x.png"), "https://a.b/x.png");
    assert_eq!(normalize_src("data:image/png;base64,AA"), "data:image/png;base64,AA");
}

#[test]
fn plane_budget_shrinks_for_touch() {
    assert_eq!(plane_budget(false), (MAX_PLANES, PLANE_SIZE_DESKTOP));
    assert_eq!(plane_budget(true), (MAX_PLANES_COARSE, PLANE_SIZE_COARSE));
}

#[test]
fn fit_within_keeps_aspect() {
    assert_eq!(fit_within(4_000, 2_000, 2_048), (2_048, 1_024));
    assert_eq!(fit_within(1_000, 3_000, 2_048), (683, 2_048));
    assert_eq!(fit_within(100, 50, 2_048), (100, 50));
    assert_eq!(fit_within(0, 0, 2_048), (1, 1));
    assert_eq!(fit_within(10_000, 1, 2_048), (2_048, 1));
}

#[test]
fn eligibility_requires_wide_fine_pointer_with_motion() {
    let ok = Eligibility {
        profile: Profile::Desktop,
        reduced_motion: false,
        coarse_pointer: false,
        viewport_width: 1024.0,
    };
    assert!(ok.allows_3d());
    assert!(!Eligibility {
        viewport_width: 1023.0,
        ..ok
    }
    .allows_3d());
    assert!(!Eligibility {
        viewport_width: 600.0,
        ..ok
    }
    .allows_3d());
    assert!(!Eligibility {
        coarse_pointer: true,
        ..ok
    }
    .allows_3d());
    assert!(!Eligibility {
        reduced_motion: true,
        ..ok
    }
    .allows_3d());
}

fn wide_desktop() -> Capabilities {
    Capabilities {
        device_memory_gb: Some(16.0),
        hardware_cores: Some(8),
        viewport_width: 1440.0,
        ..Capabilities::default()
    }
}

fn eligibility_for(caps: &Capabilities) -> Eligibility {
    Eligibility {
        profile: compute_policy(Some(caps)).profile,
        reduced_motion: caps.reduced_motion,
        coarse_pointer: caps.coarse_pointer,
        viewport_width: caps.viewport_width,
    }
}

#[test]
fn weak_or_off_profiles_get_the_flat_list() {
    assert!(eligibility_for(&wide_desktop()).allows_3d());

    let save_data = Capabilities {
        save_data: true,
        ..wide_desktop()
    };
    let e = eligibility_for(&save_data);
    assert_eq!(e.profile, Profile::Off);
    assert!(!e.allows_3d());
    assert_eq!(e.mode(8, false), ShowcaseMode::List);

    let low_memory = Capabilities {
        device_memory_gb: Some(2.0),
        ..wide_desktop()
    };
    let e = eligibility_for(&low_memory);
    assert_eq!(e.profile, Profile::LowEnd);
    assert!(!e.allows_3d());
    assert_eq!(e.mode(8, false), ShowcaseMode::List);
}

#[test]
fn mode_follows_eligibility_changes() {
    let wide = eligibility_for(&wide_desktop());
    assert_eq!(wide.mode(8, false), ShowcaseMode::Stack);
    assert_eq!(wide.mode(0, false), ShowcaseMode::Empty);
    assert_eq!(wide.mode(8, true), ShowcaseMode::List);

    let narrowed = Eligibility {
        viewport_width: 900.0,
        ..wide
    };
    assert_eq!(narrowed.mode(8, false), ShowcaseMode::List);

    let reduced = Eligibility {
        reduced_motion: true,
        ..wide
    };
    assert_eq!(reduced.mode(8, false), ShowcaseMode::List);

    let turned_off = Eligibility {
        profile: Profile::Off,
        ..wide
    };
    assert_eq!(turned_off.mode(8, false), ShowcaseMode::List);
    assert_eq!(wide.mode(8, false), ShowcaseMode::Stack);
}
