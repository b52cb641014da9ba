pub mod distance;
pub mod fill;
pub mod grid;
pub mod shell;

pub use distance::{offset_cell, Cell, DistanceGrid, NEIGHBOR_OFFSETS};
pub use grid::VoxelGrid;
