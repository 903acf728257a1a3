//! Polyline tessellation into screen-space-extruded triangle-strip buffers.
//!
//! A path point becomes four duplicated vertex positions tagged with one of
//! the order scalars `{1, -1, 2, -2}`; the vertex stage picks the extrusion
//! side and segment from the tag alone. Two synthetic phantom points wrap
//! each ring so every real vertex has a defined neighbor: closed rings reuse
//! their endpoints, open strips extrapolate one step past them. The renderer
//! binds the same vertex buffer three times at offsets of one point (48
//! bytes), so index `i` draws duplicate `i + 4` as the current vertex with
//! its neighbors at `i` and `i + 8`.

use geo::{forward_mercator, Ellipsoid, LonLat, Vec3};

/// Extrusion tags attached to the four duplicates of every point, in order.
pub const ORDER_CYCLE: [f32; 4] = [1.0, -1.0, 2.0, -2.0];

/// Duplicates emitted per logical point.
pub const COPIES_PER_POINT: usize = 4;

/// Errors raised at the tessellation API boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    /// A ring needs at least two points to define the phantom neighbors.
    #[error("ring has {len} point(s), need at least 2")]
    TooShort {
        /// Offending ring length.
        len: usize,
    },
    /// Equal-topology rewrite against a mesh built from a different shape.
    #[error("topology mismatch: mesh holds {mesh_points} point(s), rings supply {ring_points}")]
    TopologyMismatch {
        /// Logical points (phantoms included) the mesh was built with.
        mesh_points: usize,
        /// Logical points (phantoms included) the rewrite supplies.
        ring_points: usize,
    },
}

/// GPU-facing line mesh: three parallel buffers.
///
/// `orders.len() == vertices.len() / 3` always; `indexes` is one triangle
/// strip with two degenerate repeats separating independent rings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineMesh {
    /// Three components per duplicated vertex, four duplicates per point.
    pub vertices: Vec<f32>,
    /// One extrusion tag per duplicate, cycling `1, -1, 2, -2`.
    pub orders: Vec<f32>,
    /// Triangle-strip indices; see module docs for the offset convention.
    pub indexes: Vec<u32>,
}

impl LineMesh {
    /// Number of duplicated vertices currently in the buffer.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True when nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Drop all buffer contents, keeping allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.orders.clear();
        self.indexes.clear();
    }
}

/// Per-point coordinate forms collected while building, index-aligned with
/// the concatenated rings, so downstream consumers (extents, picking) avoid
/// re-deriving them.
#[derive(Clone, Debug, Default)]
pub struct DerivedPath {
    /// Cartesian position per real point.
    pub cartesian: Vec<Vec3>,
    /// Geodetic form per real point; filled only when an ellipsoid is supplied.
    pub lonlat: Vec<LonLat>,
    /// Forward-mercator projection per real point; filled with `lonlat`.
    pub mercator: Vec<LonLat>,
}

impl DerivedPath {
    /// Drop all collected forms, keeping allocations.
    pub fn clear(&mut self) {
        self.cartesian.clear();
        self.lonlat.clear();
        self.mercator.clear();
    }
}

/// Append one cartesian ring to the mesh buffers.
///
/// Multi-part geometry is built by calling this once per ring against the
/// same mesh; indices stay globally unique and contiguous. When `ellipsoid`
/// is supplied, the geodetic and mercator forms of every real point are
/// collected into `derived`.
pub fn append_cartesian<P: Into<Vec3> + Copy>(
    mesh: &mut LineMesh,
    ring: &[P],
    is_closed: bool,
    ellipsoid: Option<&Ellipsoid>,
    derived: &mut DerivedPath,
) -> Result<(), PathError> {
    if ring.len() < 2 {
        return Err(PathError::TooShort { len: ring.len() });
    }
    let pts: Vec<Vec3> = ring.iter().map(|&p| p.into()).collect();
    for &p in &pts {
        derived.cartesian.push(p);
        if let Some(e) = ellipsoid {
            let ll = e.cartesian_to_geodetic(p);
            derived.lonlat.push(ll);
            derived.mercator.push(forward_mercator(ll));
        }
    }
    emit_ring(mesh, &pts, is_closed);
    Ok(())
}

/// Append one geodetic ring; cartesian positions are derived through the
/// ellipsoid and collected into `derived.cartesian` alongside the mercator
/// forms.
pub fn append_geodetic<G: Into<LonLat> + Copy>(
    mesh: &mut LineMesh,
    ring: &[G],
    is_closed: bool,
    ellipsoid: &Ellipsoid,
    derived: &mut DerivedPath,
) -> Result<(), PathError> {
    if ring.len() < 2 {
        return Err(PathError::TooShort { len: ring.len() });
    }
    let mut pts: Vec<Vec3> = Vec::with_capacity(ring.len());
    for &g in ring {
        let ll: LonLat = g.into();
        let p = ellipsoid.geodetic_to_cartesian(ll);
        derived.lonlat.push(ll);
        derived.mercator.push(forward_mercator(ll));
        derived.cartesian.push(p);
        pts.push(p);
    }
    emit_ring(mesh, &pts, is_closed);
    Ok(())
}

/// Equal-topology update: overwrite vertex positions in place.
///
/// Point counts per ring and closure must match what the mesh was built
/// from; orders and indexes are reused untouched, which is the cheap path
/// for per-frame position animation. The rewritten vertex buffer is
/// identical to a from-scratch rebuild of the same rings.
pub fn rewrite_cartesian_positions(
    mesh: &mut LineMesh,
    rings: &[Vec<Vec3>],
    is_closed: bool,
) -> Result<(), PathError> {
    let mut expected = 0usize;
    for ring in rings {
        if ring.len() < 2 {
            return Err(PathError::TooShort { len: ring.len() });
        }
        expected += ring.len() + 2;
    }
    let held = mesh.vertex_count() / COPIES_PER_POINT;
    if expected != held {
        return Err(PathError::TopologyMismatch { mesh_points: held, ring_points: expected });
    }
    let mut offset = 0usize;
    for ring in rings {
        offset = rewrite_ring(mesh, ring, is_closed, offset);
    }
    Ok(())
}

/// Phantom neighbor preceding the ring's first point.
fn phantom_before(pts: &[Vec3], is_closed: bool) -> Vec3 {
    if is_closed {
        pts[pts.len() - 1]
    } else {
        pts[0].extrapolate_past(pts[1])
    }
}

/// Phantom neighbor following the ring's last point.
fn phantom_after(pts: &[Vec3], is_closed: bool) -> Vec3 {
    if is_closed {
        pts[0]
    } else {
        pts[pts.len() - 1].extrapolate_past(pts[pts.len() - 2])
    }
}

/// Emit vertices, orders and indices for one validated ring.
fn emit_ring(mesh: &mut LineMesh, pts: &[Vec3], is_closed: bool) {
    let base = u32::try_from(mesh.vertex_count()).unwrap_or(u32::MAX);

    // Two degenerate indices open the strip for this ring; on the first
    // ring they collapse to (0, 0).
    mesh.indexes.push(base);
    mesh.indexes.push(base);

    push_point(mesh, phantom_before(pts, is_closed));

    let mut index = base;
    for &p in pts {
        push_point(mesh, p);
        for _ in 0..COPIES_PER_POINT {
            mesh.indexes.push(index);
            index += 1;
        }
    }

    if is_closed {
        // Wrap through the phantom-first duplicates: one fewer index pair
        // than the open terminator.
        mesh.indexes.push(index);
        mesh.indexes.push(index + 1);
    } else {
        let last = index - 1;
        for _ in 0..COPIES_PER_POINT {
            mesh.indexes.push(last);
        }
    }

    push_point(mesh, phantom_after(pts, is_closed));
}

/// Overwrite one ring's vertex positions starting at logical point `offset`.
/// Returns the offset past this ring.
fn rewrite_ring(mesh: &mut LineMesh, pts: &[Vec3], is_closed: bool, offset: usize) -> usize {
    let mut at = offset;
    write_point(mesh, at, phantom_before(pts, is_closed));
    at += 1;
    for &p in pts {
        write_point(mesh, at, p);
        at += 1;
    }
    write_point(mesh, at, phantom_after(pts, is_closed));
    at + 1
}

fn push_point(mesh: &mut LineMesh, p: Vec3) {
    let [x, y, z] = p.to_f32();
    for _ in 0..COPIES_PER_POINT {
        mesh.vertices.push(x);
        mesh.vertices.push(y);
        mesh.vertices.push(z);
    }
    mesh.orders.extend_from_slice(&ORDER_CYCLE);
}

fn write_point(mesh: &mut LineMesh, point_index: usize, p: Vec3) {
    let [x, y, z] = p.to_f32();
    let start = point_index * COPIES_PER_POINT * 3;
    for c in 0..COPIES_PER_POINT {
        let at = start + c * 3;
        mesh.vertices[at] = x;
        mesh.vertices[at + 1] = y;
        mesh.vertices[at + 2] = z;
    }
}
