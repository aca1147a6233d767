use bevy::prelude::*;
use rustc_hash::FxHashSet;

use super::controller::AgentController;
use super::snapshot::{ArenaSnapshot, PlatformSnapshot, ShipSnapshot};
use super::steering::{ShipControl, SteerCommand};
use super::types::{AiPilot, Platform, ShipKinematics, ShipOrders};
use crate::game::navmesh::NavMesh;

/// Collects controller requests until they can be written to [`ShipOrders`].
#[derive(Default)]
pub struct OrderBuffer {
    steer: Vec<(Entity, SteerCommand)>,
    shoot: FxHashSet<Entity>,
}

impl OrderBuffer {
    fn clear(&mut self) {
        self.steer.clear();
        self.shoot.clear();
    }
}

impl ShipControl for OrderBuffer {
    fn request_heading(&mut self, entity: Entity, command: SteerCommand) {
        self.steer.push((entity, command));
    }

    fn request_shoot(&mut self, entity: Entity) {
        self.shoot.insert(entity);
    }
}

/// Mirror [`AiPilot`] components into the agent pool.
pub(super) fn sync_pilots(
    mut controller: ResMut<AgentController>,
    pilots: Query<(Entity, &AiPilot), Changed<AiPilot>>,
    mut removed: RemovedComponents<AiPilot>,
) {
    for entity in removed.read() {
        controller.despawn_agent(entity);
    }

    for (entity, pilot) in &pilots {
        let result = if controller.agent_for(entity).is_some() {
            controller.set_personality(entity, pilot.personality)
        } else {
            controller.spawn_agent(entity, pilot.personality).map(|_| ())
        };
        if let Err(e) = result {
            error!("[AGENTS] Cannot put {:?} under AI control: {}", entity, e);
        }
    }
}

pub(super) fn update_agents(
    time: Res<Time>,
    mesh: Option<Res<NavMesh>>,
    mut controller: ResMut<AgentController>,
    ships: Query<(Entity, &ShipKinematics)>,
    platforms: Query<(Entity, &Platform)>,
    mut orders: Query<&mut ShipOrders>,
    mut buffer: Local<OrderBuffer>,
) {
    let Some(mesh) = mesh else {
        return;
    };
    if mesh.is_changed() {
        controller.reset_navigation();
    }

    let snapshot = ArenaSnapshot::new(
        ships
            .iter()
            .map(|(entity, k)| ShipSnapshot {
                entity,
                position: k.position,
                heading: k.heading,
                velocity: k.velocity,
            })
            .collect(),
        platforms
            .iter()
            .map(|(entity, p)| PlatformSnapshot {
                entity,
                position: p.position,
                owner: p.owner,
                time_to_neutral: p.time_to_neutral,
            })
            .collect(),
    );

    buffer.clear();
    controller.update_agents(time.elapsed(), &mesh, &snapshot, &mut *buffer);

    for (_, agent) in controller.agents() {
        if let Ok(mut order) = orders.get_mut(agent.entity) {
            order.shoot = buffer.shoot.contains(&agent.entity);
        }
    }
    for &(entity, command) in &buffer.steer {
        if let Ok(mut order) = orders.get_mut(entity) {
            order.heading = command.heading;
            order.accelerate = command.accelerate;
            order.boost = command.boost;
        }
    }
}
