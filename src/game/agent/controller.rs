use bevy::prelude::*;
use rand::rngs::StdRng;
use std::time::Duration;
use torusnav_macros::profile;

use super::fsm::{think, ThinkContext};
use super::personality::{PersonalityId, PersonalityTable};
use super::pool::{Agent, AgentHandle, AgentPool};
use super::snapshot::{ArenaSnapshot, Standings};
use super::steering::{should_shoot, steer, ShipControl, SteerLimits};
use super::types::AgentError;
use crate::game::config::AgentConfig;
use crate::game::navmesh::NavMesh;
use crate::profile_log;

/// Owns every live agent and drives them once per frame.
#[derive(Resource)]
pub struct AgentController {
    config: AgentConfig,
    personalities: PersonalityTable,
    pool: AgentPool,
    rng: StdRng,
    frame: u64,
}

impl AgentController {
    pub fn new(config: AgentConfig, personalities: PersonalityTable) -> Self {
        let pool = AgentPool::with_capacity(config.pool_capacity);
        let rng = config.rng();
        Self {
            config,
            personalities,
            pool,
            rng,
            frame: 0,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn personalities(&self) -> &PersonalityTable {
        &self.personalities
    }

    /// Put `entity` under AI control.
    pub fn spawn_agent(&mut self, entity: Entity, personality: PersonalityId) -> Result<AgentHandle, AgentError> {
        if self.personalities.get(personality).is_none() {
            return Err(AgentError::UnknownPersonality(personality));
        }
        let handle = self.pool.spawn(entity, personality)?;
        info!(
            "[AGENTS] Controlling {:?} (slot {}, {} live)",
            entity,
            handle.slot(),
            self.pool.live_count()
        );
        Ok(handle)
    }

    /// Release control of `entity`. Returns whether it was controlled.
    pub fn despawn_agent(&mut self, entity: Entity) -> bool {
        let released = self.pool.despawn(entity).is_some();
        if released {
            info!("[AGENTS] Released {:?} ({} live)", entity, self.pool.live_count());
        }
        released
    }

    /// Swap the personality of an already controlled entity.
    pub fn set_personality(&mut self, entity: Entity, personality: PersonalityId) -> Result<(), AgentError> {
        if self.personalities.get(personality).is_none() {
            return Err(AgentError::UnknownPersonality(personality));
        }
        if let Some(agent) = self.pool.handle_for(entity).and_then(|h| self.pool.get_mut(h)) {
            agent.personality = personality;
        }
        Ok(())
    }

    pub fn agent(&self, handle: AgentHandle) -> Option<&Agent> {
        self.pool.get(handle)
    }

    pub fn agent_for(&self, entity: Entity) -> Option<&Agent> {
        self.pool.handle_for(entity).and_then(|h| self.pool.get(h))
    }

    pub fn agents(&self) -> impl Iterator<Item = (AgentHandle, &Agent)> + '_ {
        self.pool.iter()
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    /// Drop plans and steer targets, e.g. after the navmesh was replaced.
    pub fn reset_navigation(&mut self) {
        for agent in self.pool.iter_mut() {
            agent.reset_navigation();
        }
    }

    /// One controller frame.
    ///
    /// Agents run in slot order. Each one thinks and steers only when its own
    /// timer has elapsed (the first call always runs both); the shoot check
    /// runs every frame. Agents whose ship is missing from `snapshot` are skipped.
    #[profile]
    pub fn update_agents(
        &mut self,
        now: Duration,
        mesh: &NavMesh,
        snapshot: &ArenaSnapshot,
        control: &mut impl ShipControl,
    ) {
        self.frame += 1;

        let standings = Standings::from_snapshot(snapshot);
        let think_period = period(self.config.think_hz);
        let steer_period = period(self.config.steer_hz);
        let limits = SteerLimits {
            target_timeout: Duration::from_secs_f32(self.config.steer_target_timeout_secs.max(0.0)),
            max_hops: self.config.max_hops_per_steer,
        };

        for agent in self.pool.iter_mut() {
            let Some(ship) = snapshot.ship(agent.entity) else {
                continue;
            };
            let Some(personality) = self.personalities.get(agent.personality) else {
                continue;
            };

            agent.last_position = ship.position;
            agent.flags.shoot = false;

            if is_due(agent.last_think, now, think_period) {
                let ctx = ThinkContext {
                    me: agent.entity,
                    position: ship.position,
                    personality,
                    mesh,
                    snapshot,
                    standings: &standings,
                };
                let next = think(&agent.plan, &ctx, &mut self.rng);
                if next.state != agent.plan.state {
                    debug!(
                        "[AGENTS] {:?}: {:?} -> {:?}",
                        agent.entity, agent.plan.state, next.state
                    );
                }
                agent.plan = next;
                agent.last_think = Some(now);
            }

            if is_due(agent.last_steer, now, steer_period) {
                let command = steer(agent, ship, personality, mesh, &limits, now);
                agent.flags.accelerate = command.accelerate;
                agent.flags.boost = command.boost;
                control.request_heading(agent.entity, command);
                agent.last_steer = Some(now);
            }

            if should_shoot(ship, snapshot, personality, mesh.bounds()) {
                agent.flags.shoot = true;
                control.request_shoot(agent.entity);
            }
        }

        profile_log!(
            self.frame,
            "[AGENTS] frame {}: {} live agents",
            self.frame,
            self.pool.live_count()
        );
    }
}

fn period(hz: f32) -> Duration {
    Duration::from_secs_f32(1.0 / hz.max(1e-3))
}

fn is_due(last: Option<Duration>, now: Duration, period: Duration) -> bool {
    last.is_none_or(|t| now.saturating_sub(t) >= period)
}
