//! Bowsight demo harness
//!
//! Runs the targeting engine against a few scripted ranges on an in-memory
//! grid world and logs what it decides. Pass a settings JSON file as the
//! first argument to override the defaults.

use std::process::ExitCode;

use bowsight::aim::{
    ActorCategory, ActorId, ActorView, ArcKind, FlightOutcome, ShooterState, WeaponClass,
};
use bowsight::world::{GridWorld, Voxel};
use bowsight::{AimSettings, TargetingEngine, ViewAngles};
use glam::{DVec3, IVec3};

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Bowsight (native) starting...");

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut ok = true;
    ok &= flat_range(&settings);
    ok &= walled_range(&settings);
    ok &= out_of_reach(&settings);

    if ok {
        log::info!("All scenarios behaved as expected");
        ExitCode::SUCCESS
    } else {
        log::error!("Some scenarios did not behave as expected");
        ExitCode::FAILURE
    }
}

fn load_settings() -> Result<AimSettings, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            log::info!("Using settings from {path}");
            Ok(AimSettings::from_json(&json)?)
        }
        None => Ok(AimSettings::default()),
    }
}

/// Bow at the origin looking down +X over a stone floor
fn range() -> GridWorld {
    let mut shooter = ShooterState::at_eye(DVec3::ZERO, WeaponClass::Bow);
    shooter.id = ActorId(1);
    shooter.view = ViewAngles::new(-90.0, 0.0);
    let mut world = GridWorld::new(shooter);
    world.fill(IVec3::new(-2, -2, -4), IVec3::new(24, -2, 4), Voxel::Solid);
    world
}

fn zombie(id: u32, feet: DVec3) -> ActorView {
    ActorView::new(ActorId(id), "zombie", ActorCategory::Hostile, feet, 0.6, 1.8)
}

fn flat_range(settings: &AimSettings) -> bool {
    let mut world = range();
    world.spawn(zombie(2, DVec3::new(10.0, -0.9, 0.0)));
    let mut engine = TargetingEngine::new(settings.clone());

    let Some(target) = engine.on_cycle_key(&world) else {
        log::warn!("Flat range: nothing to lock");
        return false;
    };
    let report = engine.tick(&world, 0);
    let Some(plan) = engine.plan(&world, target) else {
        log::warn!("Flat range: no solution");
        return false;
    };

    log::info!(
        "Flat range: aim {:?} at {:.2} deg, {} points, {:?}",
        report.aim.map(|a| a.point),
        plan.launch_angle.to_degrees(),
        plan.trajectory.len(),
        plan.trajectory.outcome()
    );
    engine.stats().log_summary();
    plan.clear && plan.arc_kind == ArcKind::Low
}

fn walled_range(settings: &AimSettings) -> bool {
    let mut world = range();
    world.fill(IVec3::new(5, -2, -1), IVec3::new(5, 3, 1), Voxel::Solid);
    world.spawn(zombie(2, DVec3::new(10.0, -0.9, 0.0)));
    let mut engine = TargetingEngine::new(settings.clone());

    let Some(target) = engine.on_cycle_key(&world) else {
        log::warn!("Walled range: nothing to lock");
        return false;
    };
    let Some(plan) = engine.plan(&world, target) else {
        log::warn!("Walled range: no solution");
        return false;
    };

    log::info!(
        "Walled range: {:?} arc at {:.1} deg, flight {:.2}, {:?}",
        plan.arc_kind,
        plan.launch_angle.to_degrees(),
        plan.time_of_flight,
        plan.trajectory.outcome()
    );
    plan.arc_kind == ArcKind::High && matches!(plan.trajectory.outcome(), FlightOutcome::Hit { .. })
}

fn out_of_reach(settings: &AimSettings) -> bool {
    let mut world = range();
    world.set(IVec3::new(500, -2, 0), Voxel::Solid);
    world.spawn(zombie(2, DVec3::new(500.0, -0.9, 0.0)));
    let wide = AimSettings {
        search_radius: 1000.0,
        ..settings.clone()
    };
    let mut engine = TargetingEngine::new(wide);

    let target = engine.on_cycle_key(&world);
    let report = engine.tick(&world, 0);
    let preview = target.and_then(|id| engine.trajectory_preview(&world, id));

    log::info!(
        "Out of reach: target {:?}, aim {:?}, preview {}",
        target,
        report.aim,
        if preview.is_some() { "drawn" } else { "none" }
    );
    target.is_some() && report.aim.is_none() && preview.is_none()
}
