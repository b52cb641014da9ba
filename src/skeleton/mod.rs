//! Template-based topological thinning of distance fields.

pub mod template;
pub mod thinning;

pub use template::{generate_reflections, templates, Direction, GridTemplate, Mask, MirrorPlane, Reflection};
pub use thinning::{peel, remove_isolated, thin_directionally, Skeletonizer, ThinningStats};
