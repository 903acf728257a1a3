//! Reference ellipsoid and geodetic↔cartesian conversion.

use crate::math::{LonLat, Vec3};

/// WGS84 semi-major axis, meters.
pub const EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;
/// WGS84 semi-minor axis, meters.
pub const POLAR_RADIUS_M: f64 = 6_356_752.314_245;

/// Oblate ellipsoid of revolution with precomputed eccentricities.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsoid {
    /// Semi-major axis `a`, meters.
    pub a: f64,
    /// Semi-minor axis `b`, meters.
    pub b: f64,
    /// First eccentricity squared, `(a² − b²)/a²`.
    pub e2: f64,
    /// Second eccentricity squared, `(a² − b²)/b²`.
    pub ep2: f64,
}

impl Ellipsoid {
    /// Ellipsoid from semi-major/semi-minor axes in meters.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        let e2 = (a * a - b * b) / (a * a);
        let ep2 = (a * a - b * b) / (b * b);
        Self { a, b, e2, ep2 }
    }

    /// The WGS84 reference ellipsoid.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::new(EQUATORIAL_RADIUS_M, POLAR_RADIUS_M)
    }

    /// Geodetic (degrees, meters) to geocentric cartesian (meters).
    #[must_use]
    pub fn geodetic_to_cartesian(&self, ll: LonLat) -> Vec3 {
        let lon = ll.lon_rad();
        let lat = ll.lat_rad();
        let (slat, clat) = lat.sin_cos();
        let (slon, clon) = lon.sin_cos();
        // Prime vertical radius of curvature
        let n = self.a / (1.0 - self.e2 * slat * slat).sqrt();
        Vec3::new(
            (n + ll.height) * clat * clon,
            (n + ll.height) * clat * slon,
            (n * (1.0 - self.e2) + ll.height) * slat,
        )
    }

    /// Geocentric cartesian (meters) to geodetic (degrees, meters).
    ///
    /// Bowring's closed form with the parametric-latitude refinement; error
    /// is far below 1e-9 rad for positions within a few hundred km of the
    /// surface, which covers everything a globe renderer feeds it.
    #[must_use]
    pub fn cartesian_to_geodetic(&self, v: Vec3) -> LonLat {
        let p = (v.x * v.x + v.y * v.y).sqrt();
        if p < 1e-9 {
            // On the polar axis the longitude is arbitrary; use 0.
            let lat = if v.z >= 0.0 { 90.0 } else { -90.0 };
            return LonLat::new(0.0, lat, v.z.abs() - self.b);
        }
        let lon = v.y.atan2(v.x);
        let theta = (v.z * self.a).atan2(p * self.b);
        let (st, ct) = theta.sin_cos();
        let lat = (v.z + self.ep2 * self.b * st * st * st)
            .atan2(p - self.e2 * self.a * ct * ct * ct);
        let slat = lat.sin();
        let n = self.a / (1.0 - self.e2 * slat * slat).sqrt();
        let height = p / lat.cos() - n;
        LonLat::from_radians(lon, lat, height)
    }
}
