//! Personality bundles shared by agents.

use serde::{Deserialize, Serialize};

/// Index into the [`PersonalityTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonalityId(pub u16);

/// Thresholds that shape how an agent picks targets and flies.
///
/// Angles are radians, distances are arena units, speeds are units/second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentPersonality {
    pub name: String,
    /// Fraction of all platforms to hold before switching from capture to defence.
    pub target_hold_fraction: f32,
    /// Heading error below which the agent throttles.
    pub steer_tolerance: f32,
    /// Inside this range the current heading is kept and throttle is off.
    pub no_steer_distance: f32,
    /// Throttle only beyond this range.
    pub coast_distance: f32,
    /// Boost beyond this range.
    pub aggressive_distance: f32,
    /// Extra heading correction applied at zero distance, as a multiple of the error.
    pub oversteer: f32,
    /// Distance at which the oversteer bias fades to nothing.
    pub oversteer_range: f32,
    /// Below this speed throttle is forced on.
    pub stall_speed: f32,
    /// An invisible steer target farther than this is abandoned.
    pub max_blind_distance: f32,
    /// Defenders re-pick their platform once this close to it.
    pub patrol_radius: f32,
    pub shoot_range: f32,
    /// Half-width of the firing cone.
    pub shoot_half_angle: f32,
    /// Travel speed assumed when judging whether a platform can be reached in time.
    pub assumed_speed: f32,
}

impl AgentPersonality {
    pub fn balanced() -> Self {
        Self {
            name: "balanced".to_string(),
            target_hold_fraction: 0.5,
            steer_tolerance: 0.35,
            no_steer_distance: 10.0,
            coast_distance: 24.0,
            aggressive_distance: 120.0,
            oversteer: 0.5,
            oversteer_range: 80.0,
            stall_speed: 4.0,
            max_blind_distance: 120.0,
            patrol_radius: 20.0,
            shoot_range: 160.0,
            shoot_half_angle: 0.15,
            assumed_speed: 60.0,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            name: "aggressive".to_string(),
            target_hold_fraction: 0.34,
            steer_tolerance: 0.5,
            coast_distance: 16.0,
            aggressive_distance: 80.0,
            oversteer: 0.8,
            shoot_range: 200.0,
            shoot_half_angle: 0.22,
            assumed_speed: 75.0,
            ..Self::balanced()
        }
    }

    pub fn turtle() -> Self {
        Self {
            name: "turtle".to_string(),
            target_hold_fraction: 0.75,
            steer_tolerance: 0.25,
            coast_distance: 32.0,
            aggressive_distance: 200.0,
            oversteer: 0.3,
            patrol_radius: 30.0,
            shoot_range: 120.0,
            shoot_half_angle: 0.1,
            assumed_speed: 50.0,
            ..Self::balanced()
        }
    }
}

/// Process-wide personality table. Agents refer to entries by [`PersonalityId`].
#[derive(Clone, Debug, PartialEq)]
pub struct PersonalityTable {
    entries: Vec<AgentPersonality>,
}

impl Default for PersonalityTable {
    fn default() -> Self {
        Self {
            entries: vec![
                AgentPersonality::balanced(),
                AgentPersonality::aggressive(),
                AgentPersonality::turtle(),
            ],
        }
    }
}

impl PersonalityTable {
    /// Falls back to the built-in table when `entries` is empty.
    pub fn new(entries: Vec<AgentPersonality>) -> Self {
        if entries.is_empty() {
            Self::default()
        } else {
            Self { entries }
        }
    }

    pub fn get(&self, id: PersonalityId) -> Option<&AgentPersonality> {
        self.entries.get(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<PersonalityId> {
        self.entries
            .iter()
            .position(|p| p.name == name)
            .map(|i| PersonalityId(i as u16))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
