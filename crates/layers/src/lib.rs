pub mod layer;
pub mod surface;
pub mod surface_shapes;
pub mod symbology;
pub mod terrain;

pub use layer::*;
