// Host-side tests for profile derivation, zone arbitration and commit gating.
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
}

use crate::core::policy::*;
use crate::core::signals::Capabilities;

fn desktop_caps() -> Capabilities {
    Capabilities {
        device_memory_gb: Some(16.0),
        hardware_cores: Some(8),
        viewport_width: 1440.0,
        device_pixel_ratio: 3.0,
        ..Capabilities::default()
    }
}

fn ratios(pairs: &[(Zone, f32)]) -> ZoneRatios {
    let mut r = ZoneRatios::default();
    for (z, v) in pairs {
        r.set(*z, *v);
    }
    r
}

#[test]
fn no_environment_is_off() {
    assert_eq!(compute_policy(None), PolicyState::OFF);
}

#[test]
fn reduced_motion_forces_off_and_stopped() {
    let caps = Capabilities {
        reduced_motion: true,
        ..desktop_caps()
    };
    let base = compute_policy(Some(&caps));
    assert_eq!(base.profile, Profile::Off);
    assert_eq!(base.target_fps, 0.0);

    let state = RuntimeState::compose(base, true, Zone::Hero);
    assert!(!state.running);
    assert_eq!(state.target_fps, 0.0);
}

#[test]
fn save_data_forces_off() {
    let caps = Capabilities {
        save_data: true,
        ..desktop_caps()
    };
    assert_eq!(compute_policy(Some(&caps)).profile, Profile::Off);
}

#[test]
fn low_memory_or_few_cores_is_low_end() {
    let by_memory = Capabilities {
        device_memory_gb: Some(4.0),
        ..desktop_caps()
    };
    let p = compute_policy(Some(&by_memory));
    assert_eq!(p.profile, Profile::LowEnd);
    assert_eq!(p.target_fps, 15.0);
    assert_eq!(p.pixel_ratio_cap, 1.0);

    let by_cores = Capabilities {
        hardware_cores: Some(2),
        ..desktop_caps()
    };
    assert_eq!(compute_policy(Some(&by_cores)).profile, Profile::LowEnd);
}

#[test]
fn unreported_hardware_counts_as_capable() {
    let caps = Capabilities {
        device_memory_gb: None,
        hardware_cores: None,
        ..desktop_caps()
    };
    assert_eq!(compute_policy(Some(&caps)).profile, Profile::Desktop);
}

#[test]
fn coarse_pointer_or_narrow_viewport_is_mobile() {
    let coarse = Capabilities {
        coarse_pointer: true,
        ..desktop_caps()
    };
    let p = compute_policy(Some(&coarse));
    assert_eq!(p.profile, Profile::Mobile);
    assert_eq!(p.target_fps, 30.0);
    assert_eq!(p.pixel_ratio_cap, 1.5);

    let narrow = Capabilities {
        viewport_width: 767.0,
        ..desktop_caps()
    };
    assert_eq!(compute_policy(Some(&narrow)).profile, Profile::Mobile);

    let edge = Capabilities {
        viewport_width: 768.0,
        ..desktop_caps()
    };
    assert_eq!(compute_policy(Some(&edge)).profile, Profile::Desktop);
}

#[test]
fn desktop_caps_pixel_ratio_at_two() {
    let p = compute_policy(Some(&desktop_caps()));
    assert_eq!(p.profile, Profile::Desktop);
    assert_eq!(p.target_fps, 60.0);
    assert_eq!(p.pixel_ratio_cap, 2.0);

    let low_dpr = Capabilities {
        device_pixel_ratio: 1.25,
        ..desktop_caps()
    };
    assert_eq!(compute_policy(Some(&low_dpr)).pixel_ratio_cap, 1.25);

    let broken_dpr = Capabilities {
        device_pixel_ratio: f64::NAN,
        ..desktop_caps()
    };
    assert_eq!(compute_policy(Some(&broken_dpr)).pixel_ratio_cap, 1.0);
}

#[test]
fn zone_attr_round_trips() {
    for z in Zone::ALL {
        assert_eq!(Zone::from_attr(z.attr()), Some(z));
    }
    assert_eq!(Zone::from_attr("sidebar"), None);
}

#[test]
fn hysteresis_keeps_current_zone_on_close_ratios() {
    let r = ratios(&[(Zone::Hero, 0.40), (Zone::Selection, 0.46)]);
    assert_eq!(pick_zone(&r, false, Zone::Hero), Zone::Hero);
    assert_eq!(pick_zone(&r, false, Zone::Selection), Zone::Selection);
    // Coming from an unrelated zone, the larger ratio wins.
    assert_eq!(pick_zone(&r, false, Zone::Main), Zone::Selection);
}

#[test]
fn clear_visibility_gap_overrides_hysteresis() {
    let r = ratios(&[(Zone::Hero, 0.30), (Zone::Selection, 0.50)]);
    assert_eq!(pick_zone(&r, false, Zone::Hero), Zone::Selection);
}

#[test]
fn priority_breaks_exact_ties() {
    let r = ratios(&[(Zone::Hero, 0.5), (Zone::Footer, 0.5)]);
    assert_eq!(pick_zone(&r, false, Zone::Main), Zone::Footer);
}

#[test]
fn menu_overlay_wins_over_any_ratio() {
    let r = ratios(&[(Zone::Hero, 1.0), (Zone::Footer, 1.0)]);
    assert_eq!(pick_zone(&r, true, Zone::Hero), Zone::MenuOverlay);
}

#[test]
fn faint_visibility_falls_back_to_main() {
    let r = ratios(&[(Zone::Hero, 0.04), (Zone::Selection, 0.01)]);
    assert_eq!(pick_zone(&r, false, Zone::Hero), Zone::Main);
    assert_eq!(pick_zone(&ZoneRatios::default(), false, Zone::Footer), Zone::Main);
}

#[test]
fn ratios_are_sanitized() {
    let mut r = ZoneRatios::default();
    r.set(Zone::Hero, f32::NAN);
    r.set(Zone::Footer, 1.7);
    r.set(Zone::Selection, -0.2);
    assert_eq!(r.get(Zone::Hero), 0.0);
    assert_eq!(r.get(Zone::Footer), 1.0);
    assert_eq!(r.get(Zone::Selection), 0.0);
}

#[test]
fn zone_tuning_caps_fps_and_scales_density() {
    let base = compute_policy(Some(&desktop_caps()));

    let hero = RuntimeState::compose(base, true, Zone::Hero);
    assert_eq!(hero.target_fps, 60.0);
    assert_eq!(hero.density, 1.0);
    assert!(hero.running);

    let selection = RuntimeState::compose(base, true, Zone::Selection);
    assert_eq!(selection.target_fps, 15.0);
    assert_eq!(selection.density, 0.5);

    let main = RuntimeState::compose(base, true, Zone::Main);
    assert_eq!(main.target_fps, 10.0);
    assert_eq!(main.density, 0.75);
    assert!(main.running);

    let footer = RuntimeState::compose(base, true, Zone::Footer);
    assert_eq!(footer.target_fps, 0.0);
    assert_eq!(footer.density, 0.0);
    assert!(!footer.running);

    let menu = RuntimeState::compose(base, true, Zone::MenuOverlay);
    assert!(!menu.running);
}

#[test]
fn zone_cap_never_raises_base_fps() {
    let low = compute_policy(Some(&Capabilities {
        hardware_cores: Some(2),
        ..desktop_caps()
    }));
    let main = RuntimeState::compose(low, true, Zone::Main);
    assert_eq!(main.target_fps, 10.0);
    let hero = RuntimeState::compose(low, true, Zone::Hero);
    assert_eq!(hero.target_fps, 15.0);
}

#[test]
fn hidden_document_stops_running() {
    let base = compute_policy(Some(&desktop_caps()));
    let state = RuntimeState::compose(base, false, Zone::Hero);
    assert!(!state.running);
    assert!(!state.visible);
}

#[test]
fn frame_interval_follows_target_fps() {
    let base = compute_policy(Some(&desktop_caps()));
    let sel = RuntimeState::compose(base, true, Zone::Selection);
    assert!((sel.frame_interval_ms() - 1000.0 / 15.0).abs() < 1e-6);
    let footer = RuntimeState::compose(base, true, Zone::Footer);
    assert_eq!(footer.frame_interval_ms(), 1000.0);
}

#[test]
fn commit_requests_coalesce_into_one_frame() {
    let mut engine = PolicyEngine::new(Some(&desktop_caps()));
    assert!(engine.request_commit());
    assert!(!engine.request_commit());
    assert!(!engine.request_commit());

    engine.set_zone_ratio(Zone::Hero, 0.8);
    match engine.commit(1_000.0) {
        Commit::Published(state) => assert_eq!(state.zone, Zone::Hero),
        other => panic!("expected publish, got {other:?}"),
    }
    // The frame was consumed; a new request schedules again.
    assert!(engine.request_commit());
}

#[test]
fn identical_state_is_not_republished() {
    let mut engine = PolicyEngine::new(Some(&desktop_caps()));
    engine.set_zone_ratio(Zone::Hero, 0.8);
    assert!(matches!(engine.commit(0.0), Commit::Published(_)));
    assert_eq!(engine.commit(10.0), Commit::Unchanged);
    engine.set_zone_ratio(Zone::Hero, 0.9);
    assert_eq!(engine.commit(20.0), Commit::Unchanged);
}

#[test]
fn commit_is_held_during_scroll_then_flushed() {
    let mut engine = PolicyEngine::new(Some(&desktop_caps()));
    engine.on_scroll(1_000.0);
    engine.set_zone_ratio(Zone::Footer, 0.9);
    engine.request_commit();

    assert_eq!(engine.commit(1_100.0), Commit::Held);
    assert_eq!(engine.settle_deadline(), Some(1_180.0));
    assert_eq!(engine.state().zone, Zone::Main);

    assert_eq!(engine.flush_if_settled(1_150.0), Commit::Held);
    match engine.flush_if_settled(1_200.0) {
        Commit::Published(state) => {
            assert_eq!(state.zone, Zone::Footer);
            assert!(!state.running);
        }
        other => panic!("expected publish, got {other:?}"),
    }
    assert_eq!(engine.flush_if_settled(1_300.0), Commit::Unchanged);
}

#[test]
fn refresh_base_picks_up_reduced_motion() {
    let mut engine = PolicyEngine::new(Some(&desktop_caps()));
    assert!(engine.state().running);

    let reduced = Capabilities {
        reduced_motion: true,
        ..desktop_caps()
    };
    engine.refresh_base(Some(&reduced));
    match engine.commit(0.0) {
        Commit::Published(state) => {
            assert_eq!(state.profile, Profile::Off);
            assert_eq!(state.target_fps, 0.0);
            assert!(!state.running);
        }
        other => panic!("expected publish, got {other:?}"),
    }
}

#[test]
fn initial_state_is_main_zone() {
    let engine = PolicyEngine::new(Some(&desktop_caps()));
    assert_eq!(engine.state().zone, Zone::Main);
    assert_eq!(engine.base().profile, Profile::Desktop);
    assert_eq!(engine.state().target_fps, 10.0);
}
