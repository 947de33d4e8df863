pub mod color;
pub mod constraint;
pub mod geometry;
pub mod layer;
pub mod shape;
