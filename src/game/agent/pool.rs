//! Fixed-capacity agent storage addressed by generational handles.

use bevy::prelude::*;
use std::time::Duration;

use super::personality::PersonalityId;
use super::types::{AgentError, FrameFlags, Plan};
use crate::game::navmesh::NodeId;

/// Slot index plus the generation the slot had when the agent was spawned.
/// Handles to released slots resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentHandle {
    slot: u32,
    generation: u32,
}

impl AgentHandle {
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub entity: Entity,
    pub personality: PersonalityId,
    pub plan: Plan,
    pub steer_target: Option<NodeId>,
    /// Last time the steer target was visible.
    pub target_seen_at: Option<Duration>,
    pub last_think: Option<Duration>,
    pub last_steer: Option<Duration>,
    pub last_position: Vec2,
    pub flags: FrameFlags,
}

impl Agent {
    fn new(entity: Entity, personality: PersonalityId) -> Self {
        Self {
            entity,
            personality,
            plan: Plan::default(),
            steer_target: None,
            target_seen_at: None,
            last_think: None,
            last_steer: None,
            last_position: Vec2::ZERO,
            flags: FrameFlags::default(),
        }
    }

    /// Forget everything tied to a particular navmesh.
    pub fn reset_navigation(&mut self) {
        self.plan = Plan::default();
        self.steer_target = None;
        self.target_seen_at = None;
        self.last_think = None;
        self.last_steer = None;
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    agent: Option<Agent>,
}

#[derive(Debug, Clone)]
pub struct AgentPool {
    slots: Vec<Slot>,
}

impl AgentPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.agent.is_some()).count()
    }

    /// Take the first free slot for `entity`.
    pub fn spawn(&mut self, entity: Entity, personality: PersonalityId) -> Result<AgentHandle, AgentError> {
        if self.handle_for(entity).is_some() {
            return Err(AgentError::AlreadyControlled(entity));
        }

        let capacity = self.capacity();
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.agent.is_none())
            .ok_or(AgentError::PoolExhausted { capacity })?;

        slot.agent = Some(Agent::new(entity, personality));
        Ok(AgentHandle {
            slot: index as u32,
            generation: slot.generation,
        })
    }

    /// Release the slot controlling `entity`. Outstanding handles go stale.
    pub fn despawn(&mut self, entity: Entity) -> Option<Agent> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.agent.as_ref().is_some_and(|a| a.entity == entity))?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.agent.take()
    }

    pub fn get(&self, handle: AgentHandle) -> Option<&Agent> {
        self.slots
            .get(handle.slot())
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.agent.as_ref())
    }

    pub fn get_mut(&mut self, handle: AgentHandle) -> Option<&mut Agent> {
        self.slots
            .get_mut(handle.slot())
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.agent.as_mut())
    }

    pub fn handle_for(&self, entity: Entity) -> Option<AgentHandle> {
        self.iter()
            .find(|(_, agent)| agent.entity == entity)
            .map(|(handle, _)| handle)
    }

    /// Live agents in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentHandle, &Agent)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.agent.as_ref().map(|agent| {
                (
                    AgentHandle {
                        slot: i as u32,
                        generation: s.generation,
                    },
                    agent,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.slots.iter_mut().filter_map(|s| s.agent.as_mut())
    }
}
