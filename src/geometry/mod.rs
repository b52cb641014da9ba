pub mod oriented_box;

pub use oriented_box::{AxisPins, OrientedBoundingBox, SupportPlane};
