pub mod error;
pub mod grid;
pub mod lattice;
pub mod rect;

pub use error::*;
pub use grid::*;
pub use lattice::*;
pub use rect::*;
