//! Pipeline stages turning a filled voxel grid into a node graph.

mod extract;
mod floor;
mod generate;
mod merge;

pub use extract::ExtractGraph;
pub use floor::ProjectToFloor;
pub use generate::VoxelGraphGenerator;
pub use merge::MergeShortEdges;
