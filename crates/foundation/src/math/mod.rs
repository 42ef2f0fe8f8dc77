pub mod geodesy;
pub mod globe;
pub mod great_circle;
pub mod precision;
pub mod vec;

pub use geodesy::*;
pub use globe::*;
pub use great_circle::*;
pub use precision::*;
pub use vec::*;
