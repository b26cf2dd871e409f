//! Shot planning: pick the arc that actually reaches the target

use glam::DVec3;

use super::actor::{ActorId, ActorView, ShooterState};
use super::ballistics::{self, ArcKind};
use super::hitbox;
use super::predict::{Prediction, predict};
use super::trajectory::{FlightModel, Trajectory, fit_lob, simulate};
use crate::consts::{FLIGHT_TIME_MARGIN, FLIGHT_TIME_SLACK};
use crate::settings::AimSettings;
use crate::world::VoxelQuery;
use crate::{ViewAngles, horizontal_distance, look_angles};

/// A planned shot
#[derive(Debug, Clone)]
pub struct AimSolution {
    pub target: ActorId,
    pub aim_point: DVec3,
    pub arc_kind: ArcKind,
    /// Radians above horizontal
    pub launch_angle: f64,
    /// View to release at: yaw toward the aim point, pitch from the launch angle
    pub launch_view: ViewAngles,
    pub time_of_flight: f64,
    pub trajectory: Trajectory,
    /// The simulated flight reaches the target
    pub clear: bool,
    pub prediction: Prediction,
}

/// Plan a shot at `target`
///
/// Tries the low arc first and falls back to the high arc when the low one
/// is blocked. When neither gets through, the low arc is returned with
/// `clear` unset.
///
/// The high arc is refitted to the flight model's drag before it is flown;
/// each arc is simulated a little past its own flight time.
pub fn plan_shot<V: VoxelQuery + ?Sized>(
    world: &V,
    target: &ActorView,
    shooter: &ShooterState,
    settings: &AimSettings,
) -> Option<AimSolution> {
    let speed = shooter.projectile_speed(settings)?;
    let prediction = predict(world, target, shooter, speed, settings)?;

    let model = FlightModel::from_settings(settings);
    let eye = shooter.eye();
    let heading = prediction.aim_point - eye;
    let dxz = horizontal_distance(heading);
    let carried = if settings.inherit_shooter_velocity {
        DVec3::new(shooter.velocity.x, 0.0, shooter.velocity.z)
    } else {
        DVec3::ZERO
    };

    let fly = |kind: ArcKind| {
        let solved = prediction.arc.angle(kind);
        let free_time =
            ballistics::time_of_flight(solved, dxz, heading.y, speed, settings.gravity)
                .unwrap_or(prediction.time_of_flight);
        let (angle, time_of_flight) = match kind {
            ArcKind::Low => (solved, free_time),
            ArcKind::High => fit_lob(&model, speed, dxz, heading.y, settings.max_flight_time)
                .unwrap_or((solved, free_time)),
        };
        let horizon =
            (time_of_flight * FLIGHT_TIME_SLACK + FLIGHT_TIME_MARGIN).min(settings.max_flight_time);
        let velocity = ballistics::launch_velocity(heading, angle, speed) + carried;
        let trajectory = simulate(
            world,
            &model,
            eye,
            velocity,
            horizon,
            Some(&prediction.volume),
        );
        let mut launch_view = look_angles(eye, prediction.aim_point);
        launch_view.pitch = -angle.to_degrees();
        AimSolution {
            target: target.id,
            aim_point: prediction.aim_point,
            arc_kind: kind,
            launch_angle: angle,
            launch_view,
            time_of_flight,
            clear: trajectory.is_hit(),
            trajectory,
            prediction,
        }
    };

    let low = fly(ArcKind::Low);
    if low.clear || prediction.arc.low == prediction.arc.high {
        return Some(low);
    }

    let high = fly(ArcKind::High);
    if high.clear {
        log::debug!("Low arc to {:?} blocked, lobbing", target.id);
        return Some(high);
    }

    log::debug!("No clear arc to {:?}", target.id);
    Some(low)
}

/// Best shot through several candidates at once
#[derive(Debug, Clone)]
pub struct PiercingShot {
    /// The candidate the shot is aimed at
    pub primary: ActorId,
    /// Candidates the flight passes through, including the primary
    pub hits: usize,
    pub solution: AimSolution,
}

/// Plan a shot at each candidate and keep the one that passes through the
/// most candidates (first wins on ties)
pub fn plan_piercing<V: VoxelQuery + ?Sized>(
    world: &V,
    shooter: &ShooterState,
    candidates: &[&ActorView],
    settings: &AimSettings,
) -> Option<PiercingShot> {
    let mut best: Option<PiercingShot> = None;
    for target in candidates {
        let Some(solution) = plan_shot(world, target, shooter, settings) else {
            continue;
        };
        let hits = candidates
            .iter()
            .filter(|c| {
                if c.id == target.id {
                    solution.clear
                } else {
                    solution.trajectory.passes_through(&hitbox::resolve(**c))
                }
            })
            .count();
        if best.as_ref().is_none_or(|b| hits > b.hits) {
            best = Some(PiercingShot {
                primary: target.id,
                hits,
                solution,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aim::actor::{ActorCategory, WeaponClass};
    use crate::aim::trajectory::FlightOutcome;
    use crate::world::{GridWorld, Voxel};
    use glam::IVec3;

    fn zombie(id: u32, feet: DVec3) -> ActorView {
        ActorView::new(ActorId(id), "zombie", ActorCategory::Hostile, feet, 0.6, 1.8)
    }

    fn floor(world: &mut GridWorld) {
        world.fill(IVec3::new(-2, -2, -2), IVec3::new(40, -2, 2), Voxel::Solid);
    }

    fn bow() -> ShooterState {
        ShooterState::at_eye(DVec3::ZERO, WeaponClass::Bow)
    }

    #[test]
    fn test_flat_shot_hits_near_target() {
        let mut world = GridWorld::default();
        floor(&mut world);
        let target = zombie(1, DVec3::new(10.0, -0.9, 0.0));
        let shot = plan_shot(&world, &target, &bow(), &AimSettings::default()).unwrap();

        assert!(shot.clear);
        assert_eq!(shot.arc_kind, ArcKind::Low);
        assert!(shot.launch_angle > 0.0);
        let end = shot.trajectory.last().unwrap();
        assert!((end - DVec3::new(10.0, 0.0, 0.0)).length() < 0.5);
        // Facing +X, aimed slightly up
        assert!((shot.launch_view.yaw + 90.0).abs() < 1e-6);
        assert!(shot.launch_view.pitch < 0.0);
    }

    #[test]
    fn test_wall_forces_high_arc() {
        let mut world = GridWorld::default();
        world.fill(IVec3::new(0, -2, -1), IVec3::new(12, -2, 1), Voxel::Solid);
        world.fill(IVec3::new(5, -2, -1), IVec3::new(5, 3, 1), Voxel::Solid);
        let settings = AimSettings::default();
        let target = zombie(1, DVec3::new(10.0, -0.9, 0.0));
        let shot = plan_shot(&world, &target, &bow(), &settings).unwrap();

        assert_eq!(shot.arc_kind, ArcKind::High);
        assert!(shot.clear);
        assert!(matches!(shot.trajectory.outcome(), FlightOutcome::Hit { .. }));
        assert!(shot.launch_angle > 80.0_f64.to_radians());
        // A full lob at default gravity outlasts the old 60 unit horizon
        assert!(shot.time_of_flight > 60.0);
        assert!(shot.trajectory.len() > 1200);
    }

    #[test]
    fn test_low_arc_horizon_tracks_flight_time() {
        let mut world = GridWorld::default();
        world.fill(IVec3::new(-2, -2, -2), IVec3::new(12, -2, 2), Voxel::Solid);
        let target = zombie(1, DVec3::new(10.0, -0.9, 0.0));
        let mut settings = AimSettings::default();
        let shot = plan_shot(&world, &target, &bow(), &settings).unwrap();
        assert!(shot.clear);

        settings.max_flight_time = 0.5;
        let cut = plan_shot(&world, &target, &bow(), &settings).unwrap();
        assert!(!cut.clear);
        assert_eq!(cut.trajectory.outcome(), FlightOutcome::Expired);
        assert_eq!(cut.trajectory.len(), 10);
    }

    #[test]
    fn test_fully_blocked_returns_low_arc() {
        let mut world = GridWorld::default();
        floor(&mut world);
        world.fill(IVec3::new(5, -2, -3), IVec3::new(5, 100, 3), Voxel::Solid);
        let target = zombie(1, DVec3::new(10.0, -0.9, 0.0));
        let shot = plan_shot(&world, &target, &bow(), &AimSettings::default()).unwrap();
        assert!(!shot.clear);
        assert_eq!(shot.arc_kind, ArcKind::Low);
        assert!(matches!(shot.trajectory.outcome(), FlightOutcome::Blocked { .. }));
    }

    #[test]
    fn test_unreachable_has_no_plan() {
        let mut world = GridWorld::default();
        floor(&mut world);
        world.set(IVec3::new(500, -2, 0), Voxel::Solid);
        let target = zombie(1, DVec3::new(500.0, -0.9, 0.0));
        assert!(plan_shot(&world, &target, &bow(), &AimSettings::default()).is_none());

        let sword = ShooterState::at_eye(DVec3::ZERO, WeaponClass::Other);
        let near = zombie(2, DVec3::new(5.0, -0.9, 0.0));
        assert!(plan_shot(&world, &near, &sword, &AimSettings::default()).is_none());
    }

    #[test]
    fn test_piercing_prefers_lined_up_shot() {
        let mut world = GridWorld::default();
        floor(&mut world);
        let near = zombie(1, DVec3::new(5.0, -0.9, 0.0));
        let far = zombie(2, DVec3::new(12.0, -0.9, 0.0));
        let aside = zombie(3, DVec3::new(8.0, -0.9, 6.0));
        let candidates = vec![&aside, &near, &far];
        let best = plan_piercing(&world, &bow(), &candidates, &AimSettings::default()).unwrap();
        assert_eq!(best.primary, ActorId(2));
        assert_eq!(best.hits, 2);
    }
}
