//! `CollisionComponent`: the one concrete, in-scope `Component`
//! implementation (§1: everything else under §4 is pluggable behavior, out
//! of scope). Grounded line-for-line in
//! `Dynamics_Collision/dynamics_collisionImplementation.cpp`'s `Trigger()`.

use dt_core::{AgentId, Tick};
use dt_graph::{Capability, Component, GraphResult, PortId, Signal};
use dt_world::{AgentUpdate, WorldState};

/// Post-latch deceleration, m/s² (`.cpp`'s hard-coded `10.0`).
const DECELERATION_MPS2: f64 = 10.0;

const OUT_DYNAMICS: PortId = PortId(0);

/// Inelastic-collision dynamics for one agent. One instance lives in that
/// agent's `ComponentGraph`; `trigger` re-latches whenever the agent's
/// collision-partner set grows, and keeps decelerating the agent to a stop
/// every cycle afterward.
#[derive(Debug)]
pub struct CollisionComponent {
    agent: AgentId,
    /// Wall-clock milliseconds per scheduler cycle (`SimConfig::global_cycle_time_ms`),
    /// needed to integrate velocity/position in the absence of a `Δt` parameter
    /// on `Component::trigger`.
    cycle_time_ms: u32,
    latched: bool,
    moving_direction: f64,
    velocity: f64,
    partner_count_at_latch: usize,
}

impl CollisionComponent {
    pub fn new(agent: AgentId, cycle_time_ms: u32) -> Self {
        Self {
            agent,
            cycle_time_ms,
            latched: false,
            moving_direction: 0.0,
            velocity: 0.0,
            partner_count_at_latch: 0,
        }
    }

    /// Recompute the inelastic-momentum combination over every current
    /// collision partner (§4.6): `V_x = Σ mᵢvᵢcosψᵢ / Σ mᵢ`, `V_y`
    /// analogously, speed `= hypot(V_x, V_y)`, heading via `atan2(V_y,
    /// V_x)`. Any partner being a fixed object brings the agent to rest
    /// immediately, matching the source's `isFixedObject` short-circuit.
    fn relatch(&mut self, world: &WorldState) {
        let Ok(agent) = world.get_agent(self.agent) else { return };
        let partners = &agent.collision_partners;

        if partners.iter().any(|p| p.is_fixed_object) {
            self.velocity = 0.0;
            self.moving_direction = agent.state.yaw;
            self.latched = true;
            self.partner_count_at_latch = partners.len();
            return;
        }

        let mut sum_mass = agent.model.weight;
        let mut sum_vx = agent.model.weight * agent.state.velocity * agent.state.yaw.cos();
        let mut sum_vy = agent.model.weight * agent.state.velocity * agent.state.yaw.sin();
        for partner in partners {
            sum_mass += partner.partner_mass;
            sum_vx += partner.partner_mass * partner.partner_velocity * partner.partner_heading.cos();
            sum_vy += partner.partner_mass * partner.partner_velocity * partner.partner_heading.sin();
        }

        let (vx, vy) = if sum_mass > 0.0 { (sum_vx / sum_mass, sum_vy / sum_mass) } else { (0.0, 0.0) };
        self.velocity = vx.hypot(vy);
        self.moving_direction = vy.atan2(vx);
        self.latched = true;
        self.partner_count_at_latch = partners.len();
    }
}

impl Component for CollisionComponent {
    fn name(&self) -> &str {
        "collision"
    }

    fn capability(&self) -> Capability {
        Capability::Dynamics
    }

    fn priority(&self) -> i32 {
        dt_graph::priorities::DYNAMICS_COLLISION
    }

    fn cycle_time(&self) -> u32 {
        1
    }

    fn offset_time(&self) -> u32 {
        0
    }

    fn update_input(&mut self, _port: PortId, _signal: Signal, _time: Tick) -> GraphResult<()> {
        Ok(())
    }

    fn update_output(&mut self, port: PortId, _time: Tick) -> GraphResult<Option<Signal>> {
        if port != OUT_DYNAMICS || !self.latched {
            return Ok(None);
        }
        Ok(Some(Signal::Dynamics(dt_graph::DynamicsSignal {
            component_state: dt_graph::ComponentState::Acting,
            acceleration: -DECELERATION_MPS2,
            velocity: self.velocity,
            x: 0.0,
            y: 0.0,
            yaw: self.moving_direction,
            yaw_rate: 0.0,
            steering_wheel_angle: 0.0,
            travel_distance: 0.0,
        })))
    }

    fn trigger(&mut self, world: &mut WorldState, agent: AgentId, _time: Tick) -> GraphResult<()> {
        let Ok(current) = world.get_agent(agent) else { return Ok(()) };
        if current.collision_partners.len() > self.partner_count_at_latch {
            self.relatch(world);
        }

        if !self.latched {
            return Ok(());
        }

        let cycle_time_s = self.cycle_time_ms as f64 / 1000.0;
        self.velocity = (self.velocity - DECELERATION_MPS2 * cycle_time_s).max(0.0);

        let ds = self.velocity * cycle_time_s;
        let mut state = current.state;
        state.velocity = self.velocity;
        state.yaw = self.moving_direction;
        state.acceleration = -DECELERATION_MPS2;
        state.x += ds * self.moving_direction.cos();
        state.y += ds * self.moving_direction.sin();
        state.distance_traveled += ds;

        world.queue_agent_update(agent, AgentUpdate::SetDynamicState(state));
        Ok(())
    }
}
