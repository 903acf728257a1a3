use engine::entity::{BufferKind, EntityError, GeoRings, Polyline, ResourceState, Rings};
use engine::ident::IdGenerator;
use engine::polyline::PathError;
use geo::{Ellipsoid, LonLat, Vec3};

fn open_rings() -> Rings {
    Rings::from_vec(vec![vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(10.0, 10.0, 0.0),
    ]])
}

fn shifted_rings(d: f64) -> Rings {
    Rings::from_vec(vec![vec![
        Vec3::new(d, 0.0, 0.0),
        Vec3::new(10.0 + d, 0.0, 0.0),
        Vec3::new(10.0 + d, 10.0, 0.0),
    ]])
}

#[test]
fn ids_are_monotonic_per_generator() {
    let ids = IdGenerator::new();
    let a = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    let b = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    assert!(b.id() > a.id());
}

#[test]
fn starts_detached_with_raw_path() {
    let ids = IdGenerator::new();
    let line = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    assert!(!line.is_attached());
    assert!(line.mesh().is_empty());
    assert_eq!(line.buffer_state(BufferKind::Vertices), ResourceState::Detached);
    assert_eq!(line.buffer_state(BufferKind::Indexes), ResourceState::Detached);
    assert_eq!(
        line.needs_upload(BufferKind::Vertices),
        Err(EntityError::Detached { id: line.id() })
    );
}

#[test]
fn constructor_validates_rings() {
    let ids = IdGenerator::new();
    let short = Rings::from_vec(vec![vec![Vec3::new(0.0, 0.0, 0.0)]]);
    assert_eq!(
        Polyline::from_cartesian(&ids, short, false, None).err(),
        Some(PathError::TooShort { len: 1 })
    );
}

#[test]
fn attach_builds_mesh_and_dirties_buffers() {
    let ids = IdGenerator::new();
    let mut line = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    line.attach().unwrap();
    assert!(line.is_attached());
    assert_eq!(line.mesh().vertex_count(), 4 * (3 + 2));
    assert!(line.needs_upload(BufferKind::Vertices).unwrap());
    assert!(line.needs_upload(BufferKind::Indexes).unwrap());

    line.mark_uploaded(BufferKind::Vertices);
    line.mark_uploaded(BufferKind::Indexes);
    assert!(!line.needs_upload(BufferKind::Vertices).unwrap());
    assert_eq!(line.buffer_state(BufferKind::Vertices), ResourceState::Clean);
}

#[test]
fn set_path_dirties_both_buffers() {
    let ids = IdGenerator::new();
    let mut line = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    line.attach().unwrap();
    line.mark_uploaded(BufferKind::Vertices);
    line.mark_uploaded(BufferKind::Indexes);

    let two = Rings::from_vec(vec![vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]]);
    line.set_path(two, false).unwrap();
    assert_eq!(line.buffer_state(BufferKind::Vertices), ResourceState::Dirty);
    assert_eq!(line.buffer_state(BufferKind::Indexes), ResourceState::Dirty);
    assert_eq!(line.mesh().vertex_count(), 4 * (2 + 2));
}

#[test]
fn equal_topology_update_leaves_indexes_clean() {
    let ids = IdGenerator::new();
    let mut line = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    line.attach().unwrap();
    line.mark_uploaded(BufferKind::Vertices);
    line.mark_uploaded(BufferKind::Indexes);
    let indexes_before = line.mesh().indexes.clone();

    line.set_path_equal_topology(shifted_rings(2.5)).unwrap();
    assert_eq!(line.buffer_state(BufferKind::Vertices), ResourceState::Dirty);
    assert_eq!(line.buffer_state(BufferKind::Indexes), ResourceState::Clean);
    assert_eq!(line.mesh().indexes, indexes_before);

    // The in-place rewrite matches a from-scratch build of the same rings.
    let mut rebuilt = Polyline::from_cartesian(&ids, shifted_rings(2.5), false, None).unwrap();
    rebuilt.ensure_mesh().unwrap();
    assert_eq!(line.mesh().vertices, rebuilt.mesh().vertices);
}

#[test]
fn equal_topology_update_rejects_shape_change() {
    let ids = IdGenerator::new();
    let mut line = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    line.attach().unwrap();
    let wrong = Rings::from_vec(vec![vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]]);
    assert!(matches!(
        line.set_path_equal_topology(wrong),
        Err(PathError::TopologyMismatch { .. })
    ));
}

#[test]
fn equal_topology_rejects_ring_split_changes() {
    // Same total point count, different ring boundaries: the index buffer
    // no longer matches, so the cheap path must refuse.
    let ids = IdGenerator::new();
    let p = |x: f64| Vec3::new(x, 0.0, 0.0);
    let rings_32 = Rings::from_vec(vec![vec![p(0.0), p(1.0), p(2.0)], vec![p(5.0), p(6.0)]]);
    let rings_23 = Rings::from_vec(vec![vec![p(0.0), p(1.0)], vec![p(5.0), p(6.0), p(7.0)]]);
    let mut line = Polyline::from_cartesian(&ids, rings_32, false, None).unwrap();
    line.attach().unwrap();
    assert!(matches!(
        line.set_path_equal_topology(rings_23),
        Err(PathError::TopologyMismatch { .. })
    ));
}

#[test]
fn detach_parks_buffer_states() {
    let ids = IdGenerator::new();
    let mut line = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    line.attach().unwrap();
    line.detach();
    assert!(!line.is_attached());
    assert_eq!(line.buffer_state(BufferKind::Vertices), ResourceState::Detached);
    assert!(line.needs_upload(BufferKind::Indexes).is_err());
    // The CPU-side mesh survives detach for a later re-attach.
    assert!(!line.mesh().is_empty());
}

#[test]
fn geodetic_polyline_derives_cartesian_and_extent() {
    let ids = IdGenerator::new();
    let rings = GeoRings::from_vec(vec![vec![
        LonLat::new(10.0, -5.0, 0.0),
        LonLat::new(20.0, 5.0, 0.0),
        LonLat::new(15.0, 2.0, 0.0),
    ]]);
    let mut line = Polyline::from_geodetic(&ids, rings, false, Ellipsoid::wgs84()).unwrap();
    line.ensure_mesh().unwrap();

    assert_eq!(line.rings_cartesian().len(), 1);
    assert_eq!(line.rings_cartesian()[0].len(), 3);
    assert_eq!(line.derived().mercator.len(), 3);

    let extent = line.bounding_extent();
    assert!((extent.sw.lon - 10.0).abs() < 1e-12);
    assert!((extent.ne.lon - 20.0).abs() < 1e-12);
    assert!((extent.sw.lat + 5.0).abs() < 1e-12);
    assert!((extent.ne.lat - 5.0).abs() < 1e-12);
}

#[test]
fn cartesian_polyline_with_ellipsoid_has_extent() {
    let ids = IdGenerator::new();
    let e = Ellipsoid::wgs84();
    let pts = vec![
        e.geodetic_to_cartesian(LonLat::new(-30.0, 10.0, 0.0)),
        e.geodetic_to_cartesian(LonLat::new(40.0, 60.0, 0.0)),
    ];
    let mut line =
        Polyline::from_cartesian(&ids, Rings::from_vec(vec![pts]), false, Some(e)).unwrap();
    line.ensure_mesh().unwrap();
    let extent = line.bounding_extent();
    assert!((extent.sw.lon + 30.0).abs() < 1e-6);
    assert!((extent.ne.lat - 60.0).abs() < 1e-6);
}

#[test]
fn style_setters_do_not_touch_buffers() {
    let ids = IdGenerator::new();
    let mut line = Polyline::from_cartesian(&ids, open_rings(), false, None).unwrap();
    line.attach().unwrap();
    line.mark_uploaded(BufferKind::Vertices);
    line.mark_uploaded(BufferKind::Indexes);

    line.set_color([1.0, 0.5, 0.25, 1.0]);
    line.set_thickness(4.0);
    line.set_visibility(false);
    line.set_picking_color([0.1, 0.2, 0.3]);

    assert_eq!(line.color(), [1.0, 0.5, 0.25, 1.0]);
    assert_eq!(line.thickness(), 4.0);
    assert!(!line.visible());
    assert_eq!(line.picking_color(), [0.1, 0.2, 0.3]);
    assert_eq!(line.buffer_state(BufferKind::Vertices), ResourceState::Clean);
    assert_eq!(line.buffer_state(BufferKind::Indexes), ResourceState::Clean);
}
