//! Read-only view of the arena handed to the controller each frame.

use bevy::prelude::*;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipSnapshot {
    pub entity: Entity,
    pub position: Vec2,
    pub heading: f32,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformSnapshot {
    pub entity: Entity,
    pub position: Vec2,
    pub owner: Option<Entity>,
    pub time_to_neutral: Option<f32>,
}

/// Ships and platforms as of this frame. Ships are kept sorted by entity.
#[derive(Debug, Clone, Default)]
pub struct ArenaSnapshot {
    ships: Vec<ShipSnapshot>,
    platforms: Vec<PlatformSnapshot>,
}

impl ArenaSnapshot {
    pub fn new(mut ships: Vec<ShipSnapshot>, platforms: Vec<PlatformSnapshot>) -> Self {
        ships.sort_by_key(|s| s.entity);
        Self { ships, platforms }
    }

    pub fn ships(&self) -> &[ShipSnapshot] {
        &self.ships
    }

    pub fn platforms(&self) -> &[PlatformSnapshot] {
        &self.platforms
    }

    pub fn ship(&self, entity: Entity) -> Option<&ShipSnapshot> {
        self.ships
            .binary_search_by_key(&entity, |s| s.entity)
            .ok()
            .map(|i| &self.ships[i])
    }

    pub fn platform(&self, entity: Entity) -> Option<&PlatformSnapshot> {
        self.platforms.iter().find(|p| p.entity == entity)
    }
}

/// Platform counts per owner.
#[derive(Debug, Clone, Default)]
pub struct Standings {
    total: usize,
    held: FxHashMap<Entity, usize>,
    best: usize,
    leader: Option<Entity>,
}

impl Standings {
    pub fn from_snapshot(snapshot: &ArenaSnapshot) -> Self {
        let mut held: FxHashMap<Entity, usize> = FxHashMap::default();
        for owner in snapshot.platforms().iter().filter_map(|p| p.owner) {
            *held.entry(owner).or_default() += 1;
        }

        // Ties go to the lowest entity so every agent sees the same leader
        let mut leader: Option<(Entity, usize)> = None;
        for (&owner, &count) in &held {
            let better = match leader {
                None => true,
                Some((best_owner, best)) => count > best || (count == best && owner < best_owner),
            };
            if better {
                leader = Some((owner, count));
            }
        }

        Self {
            total: snapshot.platforms().len(),
            held,
            best: leader.map_or(0, |(_, count)| count),
            leader: leader.map(|(owner, _)| owner),
        }
    }

    pub fn held(&self, entity: Entity) -> usize {
        self.held.get(&entity).copied().unwrap_or(0)
    }

    /// Fraction of all platforms held by `entity`. Zero when there are no platforms.
    pub fn fraction(&self, entity: Entity) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.held(entity) as f32 / self.total as f32
        }
    }

    pub fn best_fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.best as f32 / self.total as f32
        }
    }

    /// Holder of the most platforms, if anyone holds one.
    pub fn leader(&self) -> Option<Entity> {
        self.leader
    }

    /// `entity` holds as many platforms as anyone.
    pub fn is_leading(&self, entity: Entity) -> bool {
        self.held(entity) >= self.best
    }
}
