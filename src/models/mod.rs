//! Resource handles and the collections that create them

mod container;
mod image;
mod network;
mod node;
mod resource;
mod service;
mod swarm;
mod volume;

pub use container::*;
pub use image::*;
pub use network::*;
pub use node::*;
pub use resource::*;
pub use service::*;
pub use swarm::*;
pub use volume::*;
