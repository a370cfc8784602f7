#![cfg(not(target_arch = "wasm32"))]

mod common;

use todo_universe::clock::{Clock, ManualClock};

use common::{harness, START_MS};

fn run(h: &mut common::Harness<'_>, clock: &ManualClock, frames: u32, step_ms: i64) {
    for _ in 0..frames {
        clock.advance(step_ms);
        h.universe.tick(clock.now_ms());
    }
}

#[test]
fn every_tick_renders_exactly_one_frame() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();

    run(&mut h, &clock, 10, 16);
    assert_eq!(h.normal.frames.get(), 10);
    // Five nodes contribute body, ring, shell and 30 halo sparks each.
    assert!(h.normal.last_sprites.get() > 5 * 33);
}

#[test]
fn planets_and_station_advance_every_frame() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);

    let before = h.universe.stage().scene.decor.planets[0].transform.position;
    let spin = h.universe.stage().scene.decor.station.transform.rotation.y;
    run(&mut h, &clock, 3, 16);
    let decor = &h.universe.stage().scene.decor;
    assert_ne!(decor.planets[0].transform.position, before);
    assert!(decor.station.transform.rotation.y > spin);
}

#[test]
fn slow_frames_degrade_quality_once_and_for_good() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.toggle_view();

    // Ten frames per second is under the 30 fps floor.
    run(&mut h, &clock, 12, 100);
    let rl = h.universe.render_loop();
    assert!(rl.quality.is_degraded());
    assert!(rl.fps.fps().unwrap() < 30);
    assert_eq!(h.universe.stage().controls.rotate_speed_cap, Some(0.2));
    assert!((h.universe.stage().controls.effective_rotate_speed() - 0.2).abs() < 1e-6);
    assert_eq!(h.normal.pixel_ratio.get(), 0.5);
    assert_eq!(h.stereo.as_ref().unwrap().pixel_ratio.get(), 0.5);

    // Recovering to 60 fps does not restore anything.
    run(&mut h, &clock, 200, 16);
    let rl = h.universe.render_loop();
    assert!(rl.fps.fps().unwrap() >= 30);
    assert!(rl.quality.is_degraded());
    assert_eq!(h.universe.stage().controls.rotate_speed_cap, Some(0.2));
    assert_eq!(h.normal.pixel_ratio.get(), 0.5);
}

#[test]
fn fast_frames_keep_full_quality() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    run(&mut h, &clock, 130, 16);
    assert!(!h.universe.render_loop().quality.is_degraded());
    assert_eq!(h.universe.stage().controls.rotate_speed_cap, None);
    assert_eq!(h.normal.pixel_ratio.get(), 1.0);
}

#[test]
fn entrance_animation_finishes_after_delay_and_duration() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    assert!(h.universe.stage().scene.nodes.iter().all(|n| n.entrance.is_some()));

    run(&mut h, &clock, 1, 50);
    assert!(h.universe.stage().scene.nodes.iter().all(|n| n.entrance.is_some()));

    run(&mut h, &clock, 1, 2100);
    assert!(h.universe.stage().scene.nodes.iter().all(|n| n.entrance.is_none()));
}

#[test]
fn completion_pulse_ends_after_its_window() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    run(&mut h, &clock, 1, 2500);

    let id = todo_universe::account::TodoId(1);
    h.universe.toggle_todo(id).unwrap();
    let node = h.universe.stage().scene.nodes.get(id).unwrap();
    assert!((node.transform.scale - 1.3).abs() < 1e-5);

    run(&mut h, &clock, 1, 299);
    assert!(h.universe.stage().scene.nodes.get(id).unwrap().pulse.is_some());
    run(&mut h, &clock, 1, 1);
    let node = h.universe.stage().scene.nodes.get(id).unwrap();
    assert!(node.pulse.is_none());
    assert_eq!(node.transform.scale, 1.0);
}

#[test]
fn animation_time_advances_from_epoch_timestamps() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();

    let id = todo_universe::account::TodoId(1);
    let ring = |h: &common::Harness<'_>| h.universe.stage().scene.nodes.get(id).unwrap().ring.transform.scale;
    let stars = |h: &common::Harness<'_>| h.universe.stage().scene.decor.starfield.opacity;

    let mut rings = Vec::new();
    let mut twinkle = Vec::new();
    for _ in 0..30 {
        run(&mut h, &clock, 1, 16);
        rings.push(ring(&h));
        twinkle.push(stars(&h));
    }
    assert!(rings.windows(2).all(|w| w[0] != w[1]), "ring pulse frozen: {rings:?}");
    assert!(twinkle.windows(2).all(|w| w[0] != w[1]), "twinkle frozen: {twinkle:?}");
    assert!(rings.iter().all(|s| (0.8..=1.2).contains(s)));
}

#[test]
fn node_float_oscillates_instead_of_running_away() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    // Let the entrance tween settle so only the float moves the node.
    run(&mut h, &clock, 1, 2500);

    let id = todo_universe::account::TodoId(1);
    let y = |h: &common::Harness<'_>| h.universe.stage().scene.nodes.get(id).unwrap().transform.position.y;
    let start = y(&h);
    let mut peak = 0.0f32;
    // One full period of node 0's sin(0.5 t) float is 4π s, about 785 frames.
    for _ in 0..785 {
        run(&mut h, &clock, 1, 16);
        peak = peak.max((y(&h) - start).abs());
    }
    assert!(peak > 100.0, "float never moved: {peak}");
    let settled = (y(&h) - start).abs();
    assert!(settled < 10.0, "node ran away by {settled}");
}

#[test]
fn notifications_expire_on_tick() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    assert!(h.universe.notifier_mut().visible().count() > 0);

    run(&mut h, &clock, 1, 3000);
    assert_eq!(h.universe.notifier_mut().visible().count(), 0);
}
