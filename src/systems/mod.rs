//! Systems module - all ECS systems for the tank battle simulation.

pub mod balloons;
#[cfg(feature = "dim3")]
pub mod collision;
pub mod debug;
pub mod effects;
pub mod firing;
pub mod impact;
pub mod kinematics;
pub mod match_flow;
