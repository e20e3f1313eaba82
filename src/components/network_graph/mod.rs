mod component;
pub mod layout;
pub mod model;
pub mod pairing;
mod render;
pub mod state;
mod style;
pub mod types;
pub mod viewport;

pub use component::NetworkGraphCanvas;
pub use types::{ClusterData, Entity, EntityType, FilterMode, LogicalEdge};
