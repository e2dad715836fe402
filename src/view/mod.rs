// View module - pixel <-> world coordinate mapping under pan and zoom

pub mod geometry;
pub mod transform;

pub use geometry::{Point2, Rect};
pub use transform::ViewTransform;
