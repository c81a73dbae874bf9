//! End-to-end economy scenarios through the public session API

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;
use orbital_swarm::sim::{Satellite, SpawnOutcome};
use orbital_swarm::{SimConfig, Simulation, TickDriver};

fn empty_session() -> Simulation {
    let mut config = SimConfig::default();
    config.seed = Some(2024);
    config.economy.initial_stored_energy = 0.0;
    Simulation::new(config).unwrap()
}

/// Park a satellite on a wide circular orbit, bypassing the spawn policy
fn force_satellite(sim: &mut Simulation) {
    let body = sim.state().planet.attractor();
    let id = sim.next_entity_id();
    let satellite = Satellite::circular(id, &body, DVec3::new(1e5, 0.0, 0.0), DVec3::NEG_Z);
    sim.insert_satellite(satellite);
}

#[test]
fn energy_accrues_only_with_satellites() {
    let mut sim = empty_session();

    for _ in 0..3600 {
        sim.advance(1.0);
    }
    assert_eq!(sim.resources().stored_energy.get(), 0.0);
    assert_eq!(sim.resources().power.get(), 0.0);

    force_satellite(&mut sim);
    assert_eq!(sim.resources().num_satellites.get(), 1);

    for _ in 0..3600 {
        sim.advance(1.0);
    }
    let stored = sim.resources().stored_energy.get();
    assert!((stored - 1.0).abs() < 1e-9, "stored = {}", stored);
    assert_eq!(sim.resources().power.get(), 1.0);

    let sat = &sim.state().swarm.as_slice()[0];
    assert!(sat.pos.is_finite() && sat.vel.is_finite());
}

#[test]
fn energy_clamps_at_capacity() {
    let mut config = SimConfig::default();
    config.seed = Some(1);
    config.economy.initial_stored_energy = 0.0;
    config.economy.max_stored_energy = 0.25;
    let mut sim = Simulation::new(config).unwrap();
    force_satellite(&mut sim);

    for _ in 0..3600 {
        sim.advance(1.0);
    }
    assert_eq!(sim.resources().stored_energy.get(), 0.25);
}

#[test]
fn saved_energy_buys_the_next_satellite() {
    let mut config = SimConfig::default();
    config.seed = Some(8);
    config.economy.spawn_cost = 0.5;
    config.economy.initial_stored_energy = 0.5;
    let mut sim = Simulation::new(config).unwrap();

    assert!(sim.request_spawn().is_spawned());
    assert_eq!(sim.request_spawn(), SpawnOutcome::InsufficientEnergy);

    // One satellite needs half an hour to pay for the next
    for _ in 0..1810 {
        sim.advance(1.0);
    }
    assert!(sim.request_spawn().is_spawned());
    assert_eq!(sim.resources().num_satellites.get(), 2);
    assert_eq!(sim.state().swarm.len(), 2);
}

#[test]
fn hud_follows_a_driven_session() {
    let mut config = SimConfig::default();
    config.seed = Some(99);
    config.economy.spawn_cost = 0.0;
    let mut sim = Simulation::new(config).unwrap();
    let mut driver = TickDriver::from_config(&sim.config().clock);

    let hud = Rc::new(RefCell::new(Vec::new()));
    let sink = hud.clone();
    let sub = sim
        .resources()
        .num_satellites
        .subscribe(move |n| sink.borrow_mut().push(*n));

    driver.start();
    let mut now = 0.0;
    for frame in 0..600 {
        if frame % 100 == 0 {
            sim.request_spawn();
        }
        driver.frame(now, &mut sim);
        now += 1.0 / 60.0;
    }
    sub.unsubscribe();
    sim.request_spawn();

    assert_eq!(*hud.borrow(), vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(sim.resources().num_satellites.get(), 7);
    // 599 ticks, each clamped to 16 ms
    assert!((sim.state().time - 599.0 * 0.016).abs() < 1e-9);
    for sat in sim.state().swarm.iter() {
        let r = sat.altitude_from_center(&sim.state().planet.attractor());
        assert!(r > 1.4e4 && r < 1.6e4, "satellite {} left its shell: {}", sat.id, r);
    }
}
