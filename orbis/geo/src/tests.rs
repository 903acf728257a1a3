#[cfg(test)]
mod tests {
    use crate::ellipsoid::Ellipsoid;
    use crate::math::{forward_mercator, inverse_mercator, Extent, LonLat, Vec3};

    #[test]
    fn geodetic_round_trip_surface_points() {
        let e = Ellipsoid::wgs84();
        let samples = [
            LonLat::new(0.0, 0.0, 0.0),
            LonLat::new(12.5, 41.9, 120.0),
            LonLat::new(-74.0, 40.7, 10.0),
            LonLat::new(151.2, -33.9, 0.0),
            LonLat::new(179.9, 89.0, 5000.0),
            LonLat::new(-179.9, -89.0, -100.0),
        ];
        for ll in samples {
            let v = e.geodetic_to_cartesian(ll);
            let back = e.cartesian_to_geodetic(v);
            assert!((back.lon - ll.lon).abs() < 1e-6, "lon {ll:?} -> {back:?}");
            assert!((back.lat - ll.lat).abs() < 1e-6, "lat {ll:?} -> {back:?}");
            // Height is the least-conditioned output near the poles.
            assert!((back.height - ll.height).abs() < 0.1, "h {ll:?} -> {back:?}");
        }
    }

    #[test]
    fn equator_radius_matches_semi_major() {
        let e = Ellipsoid::wgs84();
        let v = e.geodetic_to_cartesian(LonLat::new(0.0, 0.0, 0.0));
        assert!((v.x - e.a).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
        assert!(v.z.abs() < 1e-6);
    }

    #[test]
    fn poles_use_semi_minor_axis() {
        let e = Ellipsoid::wgs84();
        let n = e.geodetic_to_cartesian(LonLat::new(0.0, 90.0, 0.0));
        assert!((n.z - e.b).abs() < 1e-6);
        let ll = e.cartesian_to_geodetic(Vec3::new(0.0, 0.0, -e.b));
        assert!((ll.lat + 90.0).abs() < 1e-9);
        assert!(ll.height.abs() < 1e-6);
    }

    #[test]
    fn mercator_round_trip() {
        for ll in [
            LonLat::new(0.0, 0.0, 0.0),
            LonLat::new(45.0, 45.0, 0.0),
            LonLat::new(-120.0, -60.0, 7.5),
        ] {
            let m = forward_mercator(ll);
            let back = inverse_mercator(m);
            assert!((back.lon - ll.lon).abs() < 1e-9);
            assert!((back.lat - ll.lat).abs() < 1e-9);
            assert!((back.height - ll.height).abs() < 1e-12);
        }
    }

    #[test]
    fn mercator_clamps_polar_latitudes() {
        let near_pole = forward_mercator(LonLat::new(0.0, 89.9, 0.0));
        let clamped = forward_mercator(LonLat::new(0.0, 85.051_128_779_8, 0.0));
        assert!((near_pole.lat - clamped.lat).abs() < 1e-6);
        // Square domain: max |y| equals max |x| at the antimeridian.
        let corner = forward_mercator(LonLat::new(180.0, 90.0, 0.0));
        assert!((corner.lat - corner.lon).abs() < 1.0);
    }

    #[test]
    fn extrapolate_past_mirrors() {
        let p0 = Vec3::new(1.0, 2.0, 3.0);
        let p1 = Vec3::new(2.0, 4.0, 6.0);
        assert_eq!(p0.extrapolate_past(p1), Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn extent_expand_and_union() {
        let mut e = Extent::empty();
        assert!(e.is_empty());
        e.expand(LonLat::new(10.0, -5.0, 0.0));
        e.expand(LonLat::new(-20.0, 15.0, 0.0));
        assert!(!e.is_empty());
        assert_eq!(e.sw.lon, -20.0);
        assert_eq!(e.sw.lat, -5.0);
        assert_eq!(e.ne.lon, 10.0);
        assert_eq!(e.ne.lat, 15.0);

        let mut other = Extent::empty();
        other.expand(LonLat::new(30.0, 20.0, 0.0));
        let u = e.union(&other);
        assert_eq!(u.ne.lon, 30.0);
        assert_eq!(u.ne.lat, 20.0);
        assert_eq!(u.sw.lon, -20.0);
    }
}
