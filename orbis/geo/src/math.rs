// Keep imports minimal; this module is pure value math.

/// Latitude bound of the square web-mercator domain, degrees.
pub const MAX_MERCATOR_LAT_DEG: f64 = 85.051_128_779_8;

/// Cartesian 3D vector in meters (geocentric frame: +Z through the north pole).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }

    #[must_use]
    pub fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }

    #[must_use]
    pub fn scale(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    #[must_use]
    pub fn dot(self, o: Self) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    #[must_use]
    pub fn cross(self, o: Self) -> Self {
        Self::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        let l = self.length();
        if l == 0.0 {
            self
        } else {
            self.scale(1.0 / l)
        }
    }

    /// Mirror of `o` through `self`: the point one step past `self` coming from `o`.
    #[must_use]
    pub fn extrapolate_past(self, o: Self) -> Self {
        Self::new(
            self.x + self.x - o.x,
            self.y + self.y - o.y,
            self.z + self.z - o.z,
        )
    }

    /// Positions on the GPU are f32; precision is spent here, once.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

/// Geodetic coordinate: degrees east, degrees north, meters above the ellipsoid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LonLat {
    /// Longitude in degrees, east positive.
    pub lon: f64,
    /// Latitude in degrees, north positive.
    pub lat: f64,
    /// Height above the ellipsoid in meters.
    pub height: f64,
}

impl LonLat {
    #[must_use]
    pub fn new(lon: f64, lat: f64, height: f64) -> Self {
        Self { lon, lat, height }
    }

    #[must_use]
    pub fn from_radians(lon_rad: f64, lat_rad: f64, height: f64) -> Self {
        Self { lon: lon_rad.to_degrees(), lat: lat_rad.to_degrees(), height }
    }

    #[must_use]
    pub fn lon_rad(self) -> f64 {
        self.lon.to_radians()
    }

    #[must_use]
    pub fn lat_rad(self) -> f64 {
        self.lat.to_radians()
    }
}

impl From<[f64; 3]> for LonLat {
    fn from(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

/// Spherical web-mercator forward projection.
///
/// Input latitude is clamped to ±`MAX_MERCATOR_LAT_DEG`; the result carries
/// projected meters in `lon`/`lat` and passes `height` through unchanged.
#[must_use]
pub fn forward_mercator(ll: LonLat) -> LonLat {
    let lat = ll.lat.clamp(-MAX_MERCATOR_LAT_DEG, MAX_MERCATOR_LAT_DEG);
    let r = crate::ellipsoid::EQUATORIAL_RADIUS_M;
    let x = r * ll.lon.to_radians();
    let y = r * (std::f64::consts::FRAC_PI_4 + 0.5 * lat.to_radians()).tan().ln();
    LonLat::new(x, y, ll.height)
}

/// Spherical web-mercator inverse projection (meters back to degrees).
#[must_use]
pub fn inverse_mercator(m: LonLat) -> LonLat {
    let r = crate::ellipsoid::EQUATORIAL_RADIUS_M;
    let lon = (m.lon / r).to_degrees();
    let lat = (2.0 * (m.lat / r).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    LonLat::new(lon, lat, m.height)
}

/// Geographic bounding rectangle in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    /// South-west corner.
    pub sw: LonLat,
    /// North-east corner.
    pub ne: LonLat,
}

impl Extent {
    /// Inverted-infinite extent; any `expand` makes it valid.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sw: LonLat::new(f64::INFINITY, f64::INFINITY, 0.0),
            ne: LonLat::new(f64::NEG_INFINITY, f64::NEG_INFINITY, 0.0),
        }
    }

    /// True until the first `expand`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sw.lon > self.ne.lon || self.sw.lat > self.ne.lat
    }

    /// Grow to include `ll` (heights are ignored).
    pub fn expand(&mut self, ll: LonLat) {
        self.sw.lon = self.sw.lon.min(ll.lon);
        self.sw.lat = self.sw.lat.min(ll.lat);
        self.ne.lon = self.ne.lon.max(ll.lon);
        self.ne.lat = self.ne.lat.max(ll.lat);
    }

    /// Smallest extent containing both.
    #[must_use]
    pub fn union(&self, o: &Self) -> Self {
        let mut e = *self;
        e.expand(o.sw);
        e.expand(o.ne);
        e
    }
}
