#![warn(clippy::all, rust_2018_idioms)]

//! Putting-green terrain: an irregular outline over a deformable height
//! field, with slope analysis and contour lines derived from it.

pub mod config;
pub mod error;
pub mod green;
pub mod terrain;

pub use config::GreenConfig;
pub use error::{Result, TerrainError};
pub use green::{ControlMarker, GreenSession, Hole, HolePlacement, HoleSite};
