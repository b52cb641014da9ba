pub mod error;
pub mod geometry;
pub mod graph;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod params;
pub mod skeleton;
pub mod voxel;

pub use error::{Result, VoxgraphError};
pub use graph::{EdgeId, NodeGraph, NodeId};
pub use operations::VoxelGraphGenerator;
pub use params::VoxelGraphParams;
