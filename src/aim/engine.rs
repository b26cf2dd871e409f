//! Targeting engine: the host-facing entry point
//!
//! One engine value lives for the whole session. The host calls `tick` once
//! per game tick and forwards the cycle and lock key presses.

use super::actor::{ActorId, ActorView, ShooterState, WeaponClass};
use super::cache::{AimPoint, PredictionCache};
use super::eligibility::EligibilityFilter;
use super::environment::{self, EnvironmentalFactors};
use super::hitbox;
use super::lock::AimLock;
use super::selector::TargetSelector;
use super::shot::{self, AimSolution, PiercingShot};
use super::stats::EngineStats;
use super::trajectory::Trajectory;
use crate::ViewAngles;
use crate::error::Result;
use crate::settings::AimSettings;
use crate::world::WorldQuery;

/// What the engine produced this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    pub target: Option<ActorId>,
    pub aim: Option<AimPoint>,
    /// Smoothed view to steer toward, when aim lock is on
    pub steer: Option<ViewAngles>,
}

#[derive(Debug, Clone)]
pub struct TargetingEngine {
    settings: AimSettings,
    filter: EligibilityFilter,
    selector: TargetSelector,
    aim_lock: AimLock,
    cache: PredictionCache,
    stats: EngineStats,
    last_weapon: WeaponClass,
}

impl Default for TargetingEngine {
    fn default() -> Self {
        Self::new(AimSettings::default())
    }
}

impl TargetingEngine {
    pub fn new(settings: AimSettings) -> Self {
        Self {
            filter: EligibilityFilter::from_settings(&settings),
            selector: TargetSelector::new(),
            aim_lock: AimLock::new(settings.aim_smoothing),
            cache: PredictionCache::new(settings.cache_ttl_ms),
            stats: EngineStats::default(),
            last_weapon: WeaponClass::Other,
            settings,
        }
    }

    pub fn settings(&self) -> &AimSettings {
        &self.settings
    }

    /// Replace the settings; cached predictions are discarded
    pub fn update_settings(&mut self, settings: AimSettings) -> Result<()> {
        settings.validate()?;
        self.filter = EligibilityFilter::from_settings(&settings);
        self.aim_lock.set_smoothing(settings.aim_smoothing);
        self.cache.set_ttl(settings.cache_ttl_ms);
        self.cache.clear();
        self.settings = settings;
        Ok(())
    }

    pub fn current_target(&self) -> Option<ActorId> {
        self.selector.current()
    }

    pub fn aim_lock_enabled(&self) -> bool {
        self.aim_lock.is_enabled()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
            ..self.stats
        }
    }

    /// Per-tick update: drop stale locks and refresh the aim point
    pub fn tick<W: WorldQuery + ?Sized>(&mut self, world: &W, now_ms: u64) -> TickReport {
        self.stats.ticks += 1;
        let shooter = world.shooter_state();
        self.note_weapon(&shooter);

        let actors = world.actors_in_radius(shooter.position, self.settings.search_radius);
        let eligible = self.filter.apply(&shooter, &actors);
        if self.selector.invalidate(&eligible, shooter.holds_ranged()) {
            self.cache.clear();
            self.stats.target_changes += 1;
        }

        let Some(id) = self.selector.current() else {
            return TickReport::default();
        };
        let aim = eligible
            .iter()
            .find(|a| a.id == id)
            .and_then(|target| self.cached_aim(world, target, &shooter, now_ms));
        let steer = aim
            .filter(|_| self.aim_lock.is_enabled())
            .map(|aim| self.aim_lock.steer(shooter.view, aim.view));

        TickReport {
            target: Some(id),
            aim,
            steer,
        }
    }

    /// Aim point for `target`, served from the cache while fresh
    pub fn aim_point<W: WorldQuery + ?Sized>(
        &mut self,
        world: &W,
        target: ActorId,
        now_ms: u64,
    ) -> Option<AimPoint> {
        let shooter = world.shooter_state();
        let actors = world.actors_in_radius(shooter.position, self.settings.search_radius);
        let actor = self.find_eligible(&shooter, &actors, target)?;
        self.cached_aim(world, actor, &shooter, now_ms)
    }

    /// Full shot plan for `target`, computed fresh
    pub fn plan<W: WorldQuery + ?Sized>(&mut self, world: &W, target: ActorId) -> Option<AimSolution> {
        let shooter = world.shooter_state();
        let actors = world.actors_in_radius(shooter.position, self.settings.search_radius);
        let actor = self.find_eligible(&shooter, &actors, target)?;
        let solution = shot::plan_shot(world, actor, &shooter, &self.settings);
        record(&mut self.stats, solution.as_ref());
        solution
    }

    /// Simulated flight path for drawing; a new value on every call
    pub fn trajectory_preview<W: WorldQuery + ?Sized>(
        &mut self,
        world: &W,
        target: ActorId,
    ) -> Option<Trajectory> {
        self.plan(world, target).map(|s| s.trajectory)
    }

    pub fn environment<W: WorldQuery + ?Sized>(
        &self,
        world: &W,
        target: ActorId,
    ) -> Option<EnvironmentalFactors> {
        let shooter = world.shooter_state();
        let actors = world.actors_in_radius(shooter.position, self.settings.search_radius);
        let actor = self.find_eligible(&shooter, &actors, target)?;
        Some(environment::analyze(
            world,
            shooter.eye(),
            hitbox::resolve(actor).center(),
        ))
    }

    /// Best shot through the current candidates
    pub fn piercing<W: WorldQuery + ?Sized>(&self, world: &W) -> Option<PiercingShot> {
        let shooter = world.shooter_state();
        let actors = world.actors_in_radius(shooter.position, self.settings.search_radius);
        let eligible = self.filter.apply(&shooter, &actors);
        shot::plan_piercing(world, &shooter, &eligible, &self.settings)
    }

    /// Cycle key: snap to the crosshair if possible, else the next candidate
    pub fn on_cycle_key<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Option<ActorId> {
        let shooter = world.shooter_state();
        let previous = self.selector.current();

        if !shooter.holds_ranged() {
            self.selector.clear();
        } else {
            let actors = world.actors_in_radius(shooter.position, self.settings.search_radius);
            let eligible = self.filter.apply(&shooter, &actors);
            let cone = self.settings.snap_cone_degrees;
            if self.selector.snap_to_look(&shooter, &eligible, cone).is_none() {
                self.selector.cycle_next(&eligible);
            }
        }

        let current = self.selector.current();
        if current != previous {
            self.cache.clear();
            self.stats.target_changes += 1;
        }
        current
    }

    /// Lock key: toggles aim lock (only with a ranged weapon)
    pub fn on_lock_toggle_key<W: WorldQuery + ?Sized>(&mut self, world: &W) -> bool {
        let shooter = world.shooter_state();
        self.aim_lock.toggle(shooter.holds_ranged())
    }

    fn note_weapon(&mut self, shooter: &ShooterState) {
        if shooter.weapon != self.last_weapon {
            log::debug!("Weapon changed: {:?} -> {:?}", self.last_weapon, shooter.weapon);
            self.cache.clear();
            self.last_weapon = shooter.weapon;
        }
        if !shooter.holds_ranged() {
            self.aim_lock.disable();
        }
    }

    fn find_eligible<'a>(
        &self,
        shooter: &ShooterState,
        actors: &'a [ActorView],
        id: ActorId,
    ) -> Option<&'a ActorView> {
        actors
            .iter()
            .find(|a| a.id == id && self.filter.is_eligible(shooter, a))
    }

    fn cached_aim<W: WorldQuery + ?Sized>(
        &mut self,
        world: &W,
        target: &ActorView,
        shooter: &ShooterState,
        now_ms: u64,
    ) -> Option<AimPoint> {
        let settings = &self.settings;
        let stats = &mut self.stats;
        self.cache.get_or_compute(target.id, now_ms, || {
            let solution = shot::plan_shot(world, target, shooter, settings);
            record(stats, solution.as_ref());
            solution.map(|s| AimPoint {
                point: s.aim_point,
                view: s.launch_view,
            })
        })
    }
}

fn record(stats: &mut EngineStats, solution: Option<&AimSolution>) {
    match solution {
        None => stats.unreachable += 1,
        Some(s) => {
            stats.solved += 1;
            if !s.clear {
                stats.obstructed += 1;
            } else if s.arc_kind == super::ballistics::ArcKind::High {
                stats.high_arcs += 1;
            }
        }
    }
}
