//! Candidate filtering and ordering

use super::actor::{ActorCategory, ActorView, ShooterState};
use crate::settings::AimSettings;

/// Decides which actors may be targeted
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    pub radius: f64,
    pub excluded_species: Vec<String>,
    pub excluded_categories: Vec<ActorCategory>,
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::from_settings(&AimSettings::default())
    }
}

impl EligibilityFilter {
    pub fn from_settings(settings: &AimSettings) -> Self {
        Self {
            radius: settings.search_radius,
            excluded_species: settings.excluded_species.clone(),
            excluded_categories: settings.excluded_categories.clone(),
        }
    }

    /// Is this actor a valid target for `shooter`?
    pub fn is_eligible(&self, shooter: &ShooterState, actor: &ActorView) -> bool {
        actor.id != shooter.id
            && actor.alive
            && !self.excluded_categories.contains(&actor.category)
            && !self
                .excluded_species
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&actor.species))
            && actor.distance_squared_to(shooter.position) <= self.radius * self.radius
    }

    /// Eligible actors, nearest first
    ///
    /// Ties keep the order the host reported them in.
    pub fn apply<'a>(&self, shooter: &ShooterState, actors: &'a [ActorView]) -> Vec<&'a ActorView> {
        let mut eligible: Vec<(f64, &ActorView)> = actors
            .iter()
            .filter(|a| self.is_eligible(shooter, a))
            .map(|a| (a.distance_squared_to(shooter.position), a))
            .collect();
        eligible.sort_by(|a, b| a.0.total_cmp(&b.0));
        eligible.into_iter().map(|(_, a)| a).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aim::actor::{ActorId, WeaponClass};
    use glam::DVec3;

    fn actor(id: u32, species: &str, category: ActorCategory, x: f64) -> ActorView {
        ActorView::new(ActorId(id), species, category, DVec3::new(x, 0.0, 0.0), 0.6, 1.8)
    }

    fn shooter() -> ShooterState {
        let mut s = ShooterState::at_eye(DVec3::new(0.0, 1.62, 0.0), WeaponClass::Bow);
        s.id = ActorId(99);
        s
    }

    #[test]
    fn test_sorted_by_distance_with_stable_ties() {
        let actors = vec![
            actor(1, "zombie", ActorCategory::Hostile, 10.0),
            actor(2, "cow", ActorCategory::Passive, 3.0),
            actor(3, "skeleton", ActorCategory::Hostile, -3.0),
            actor(4, "player", ActorCategory::Player, 6.0),
        ];
        let ids: Vec<u32> = EligibilityFilter::default()
            .apply(&shooter(), &actors)
            .iter()
            .map(|a| a.id.0)
            .collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_exclusions() {
        let mut dead = actor(5, "zombie", ActorCategory::Hostile, 2.0);
        dead.alive = false;
        let mut me = actor(99, "player", ActorCategory::Player, 0.0);
        me.position = shooter().position;
        let actors = vec![
            dead,
            me,
            actor(6, "Bat", ActorCategory::Ambient, 2.0),
            actor(7, "armor_stand", ActorCategory::Decoration, 2.0),
            actor(8, "zombie", ActorCategory::Hostile, 200.0),
            actor(9, "zombie", ActorCategory::Hostile, 4.0),
        ];
        let eligible = EligibilityFilter::default().apply(&shooter(), &actors);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, ActorId(9));
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let filter = EligibilityFilter {
            radius: 5.0,
            ..Default::default()
        };
        let actors = vec![
            actor(1, "zombie", ActorCategory::Hostile, 5.0),
            actor(2, "zombie", ActorCategory::Hostile, 5.01),
        ];
        let eligible = filter.apply(&shooter(), &actors);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, ActorId(1));
    }
}
