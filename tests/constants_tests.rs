// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod core_constants {
    include!("../src/core/constants.rs");
}

use constants::*;
use core_constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn profile_tiers_are_ordered() {
    assert!(DESKTOP_FPS > MOBILE_FPS);
    assert!(MOBILE_FPS > LOW_END_FPS);
    assert!(LOW_END_FPS > OFF_FPS);
    assert_eq!(OFF_FPS, 0.0);

    assert!(DESKTOP_DPR_CAP >= MOBILE_DPR_CAP);
    assert!(MOBILE_DPR_CAP >= LOW_END_DPR);
    assert!(LOW_END_DPR >= 1.0);
    assert!(OFF_DPR >= 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn zone_scoring_keeps_ratio_dominant() {
    // Priorities span 0..4, so the priority term never outweighs a 5% ratio gap.
    assert!(4.0 * ZONE_PRIORITY_WEIGHT < 0.05 * ZONE_RATIO_WEIGHT);
    assert!(ZONE_HYSTERESIS_BONUS > 0.0 && ZONE_HYSTERESIS_BONUS < 0.5);
    assert!(ZONE_MIN_RATIO > 0.0 && ZONE_MIN_RATIO < 0.25);
}

#[test]
fn zone_thresholds_are_sorted_and_normalized() {
    assert!(ZONE_THRESHOLDS.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ZONE_THRESHOLDS[0], 0.0);
    assert_eq!(ZONE_THRESHOLDS[ZONE_THRESHOLDS.len() - 1], 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn timing_windows_are_consistent() {
    assert!(RESIZE_THROTTLE_MS < RESIZE_DEBOUNCE_MS);
    assert!(SCROLL_SETTLE_MS > 0.0);
    assert!(COMMIT_SETTLE_MS > 0.0);
    assert!(REBUILD_HEIGHT_THRESHOLD_PX > 0.0);
    assert!(IDLE_START_FALLBACK_MS > 0);
    assert!(IDLE_START_TIMEOUT_MS as i32 > IDLE_START_FALLBACK_MS);
    assert!(REFRESH_EARLY_MS < REFRESH_LATE_MS);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn smoothing_thresholds_nest() {
    assert!(LERP_ALPHA > 0.0 && LERP_ALPHA < 1.0);
    assert!(EPS_T < SETTLED_T);
    assert!(SETTLED_T < SNAP_T);
    assert!(PROGRESS_SNAP < FIRST_ITEM_HOLD);
    assert!(FIRST_ITEM_HOLD < 1.0);
    assert!(BOTTOM_ZONE_PX > 0.0);
    assert!(IDLE_MS > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn plane_layout_stays_visible() {
    assert!(PLANE_OPACITY_BASE + PLANE_OPACITY_FOCUS <= 1.0 + 1e-6);
    assert!(PLACEHOLDER_OPACITY <= 0.22 + 1e-6);
    assert!(PLANE_SCALE_BASE > 0.0);
    assert!(MAX_PLANES_COARSE <= MAX_PLANES);
    assert!(PLANE_SIZE_COARSE[0] < PLANE_SIZE_DESKTOP[0]);
    assert!(DRIFT_FLOOR > 0.0 && DRIFT_FLOOR <= 1.0);
    assert!(DRIFT_EDGE > 0.0 && DRIFT_EDGE <= 0.5);
    assert!(CAMERA_Z > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn eligibility_widths_are_ordered() {
    assert!(SHOWCASE_SMALL_MAX_WIDTH <= SHOWCASE_DESKTOP_MIN_WIDTH);
    assert!(MOBILE_MAX_WIDTH <= SHOWCASE_DESKTOP_MIN_WIDTH);
    assert!(MAX_TEXTURE_EDGE.is_power_of_two());
    assert_eq!(PLACEHOLDER_RGBA[3], 255);
}
