// 地形计算模块

pub mod boundary;
pub mod contour;
pub mod deform;
pub mod geometry;
pub mod height_field;
pub mod noise;
pub mod palette;
pub mod query;
pub mod slope;

pub use boundary::*;
pub use contour::*;
pub use deform::*;
pub use geometry::PlanarPoint;
pub use height_field::*;
pub use noise::*;
pub use palette::*;
pub use query::*;
pub use slope::*;
