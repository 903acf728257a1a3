#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]

pub mod ellipsoid;
mod math;
mod tests;

pub use ellipsoid::{Ellipsoid, EQUATORIAL_RADIUS_M, POLAR_RADIUS_M};
pub use math::{forward_mercator, inverse_mercator, Extent, LonLat, Vec3, MAX_MERCATOR_LAT_DEG};
