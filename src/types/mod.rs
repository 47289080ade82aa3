//! Request option and specification types

mod containers;
mod filters;
mod services;
mod swarm;

pub use containers::*;
pub use filters::*;
pub use services::*;
pub use swarm::*;
