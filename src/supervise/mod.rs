//! Supervision core: descriptors, policies, and the control loop.
//!
//! Modules:
//! - [`spec`]: immutable child descriptors ([`ChildSpec`], [`ChildMode`]);
//! - [`intensity`]: sliding-window restart rate limiting;
//! - [`strategy`]: restart fan-out resolution ([`RestartStrategy`]);
//! - [`supervisor`]: the control loop and owner facade ([`Supervisor`],
//!   [`SupervisorDef`]).

mod intensity;
mod spec;
mod strategy;
mod supervisor;

pub use spec::{ChildMode, ChildSpec};
pub use strategy::RestartStrategy;
pub use supervisor::{Supervisor, SupervisorDef};
