use thiserror::Error;

/// Top-level error type for the voxel graph pipeline.
#[derive(Debug, Error)]
pub enum VoxgraphError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// Geometric degeneracy. Always fatal to the operation that hit it.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("singular matrix")]
    SingularMatrix,

    #[error("invalid face: {0}")]
    InvalidFace(String),
}

/// Node graph consistency violations.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node not found")]
    NodeNotFound,

    #[error("edge not found")]
    EdgeNotFound,

    #[error("collision point lies outside the edge")]
    CollisionOffEdge,

    #[error("edge {edge} has no clearance set")]
    UnsetClearance { edge: usize },

    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}

/// Errors in user supplied configuration.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("parameter {name} = {value} is invalid")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Convenience type alias for results using [`VoxgraphError`].
pub type Result<T> = std::result::Result<T, VoxgraphError>;
