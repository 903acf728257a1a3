//! Polyline entity: path ownership, style attributes, and the per-buffer
//! GPU resource state machine.
//!
//! An entity is created detached with its path stored raw; attaching to a
//! render context builds the line mesh and marks both buffers `Dirty`. The
//! renderer's upload-on-draw is the only transition back to `Clean`;
//! detaching parks both buffers in `Detached`.

use smallvec::SmallVec;

use crate::ident::IdGenerator;
use crate::polyline::{
    append_cartesian, append_geodetic, rewrite_cartesian_positions, DerivedPath, LineMesh,
    PathError,
};
use geo::{Ellipsoid, Extent, LonLat, Vec3};

/// One ring of a (possibly multi-part) polyline path.
pub type Ring = Vec<Vec3>;

/// Most polylines are single-ring; keep that case inline.
pub type Rings = SmallVec<[Ring; 1]>;

/// Geodetic counterpart of [`Rings`].
pub type GeoRings = SmallVec<[Vec<LonLat>; 1]>;

/// Lifecycle of one GPU-owned buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceState {
    /// Uploaded and current.
    Clean,
    /// CPU data changed since last upload; resolved by upload-on-draw.
    Dirty,
    /// No render context attached; nothing to upload to.
    Detached,
}

/// Which of the polyline's GPU buffers is being addressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// Vertex positions and order tags.
    Vertices,
    /// Triangle-strip index buffer.
    Indexes,
}

/// GPU-facing operations on an entity that was never attached.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntityError {
    /// Buffer operation requested before a render context was attached.
    #[error("polyline {id} has no render context attached")]
    Detached {
        /// Offending entity id.
        id: u64,
    },
}

/// The authoritative coordinate form a path was supplied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PathForm {
    Cartesian,
    Geodetic,
}

/// A thick mitered line strip over the globe.
pub struct Polyline {
    id: u64,
    thickness: f32,
    color: [f32; 4],
    visible: bool,
    is_closed: bool,
    picking_color: [f32; 3],
    ellipsoid: Option<Ellipsoid>,
    form: PathForm,
    rings_cartesian: Rings,
    rings_geodetic: GeoRings,
    derived: DerivedPath,
    mesh: LineMesh,
    vertices_state: ResourceState,
    indexes_state: ResourceState,
    attached: bool,
}

impl Polyline {
    /// Detached polyline from cartesian rings. Rings are validated now;
    /// the mesh is built on first attach.
    ///
    /// An ellipsoid makes the geodetic/mercator forms of every point
    /// available to downstream consumers after the build.
    pub fn from_cartesian(
        ids: &IdGenerator,
        rings: Rings,
        is_closed: bool,
        ellipsoid: Option<Ellipsoid>,
    ) -> Result<Self, PathError> {
        validate_ring_lengths(rings.iter().map(Vec::len))?;
        Ok(Self {
            id: ids.next_id(),
            thickness: 1.5,
            color: [1.0, 1.0, 1.0, 1.0],
            visible: true,
            is_closed,
            picking_color: [0.0, 0.0, 0.0],
            ellipsoid,
            form: PathForm::Cartesian,
            rings_cartesian: rings,
            rings_geodetic: SmallVec::new(),
            derived: DerivedPath::default(),
            mesh: LineMesh::default(),
            vertices_state: ResourceState::Detached,
            indexes_state: ResourceState::Detached,
            attached: false,
        })
    }

    /// Detached polyline from geodetic rings; cartesian positions are
    /// derived through the ellipsoid when the mesh is built.
    pub fn from_geodetic(
        ids: &IdGenerator,
        rings: GeoRings,
        is_closed: bool,
        ellipsoid: Ellipsoid,
    ) -> Result<Self, PathError> {
        validate_ring_lengths(rings.iter().map(Vec::len))?;
        Ok(Self {
            id: ids.next_id(),
            thickness: 1.5,
            color: [1.0, 1.0, 1.0, 1.0],
            visible: true,
            is_closed,
            picking_color: [0.0, 0.0, 0.0],
            ellipsoid: Some(ellipsoid),
            form: PathForm::Geodetic,
            rings_cartesian: SmallVec::new(),
            rings_geodetic: rings,
            derived: DerivedPath::default(),
            mesh: LineMesh::default(),
            vertices_state: ResourceState::Detached,
            indexes_state: ResourceState::Detached,
            attached: false,
        })
    }

    /// Monotonic identity.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Line thickness in screen pixels.
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Set line thickness in screen pixels (uniform-only; buffers unaffected).
    pub fn set_thickness(&mut self, px: f32) {
        self.thickness = px;
    }

    /// RGBA color.
    #[must_use]
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Set RGBA color (uniform-only; buffers unaffected).
    pub fn set_color(&mut self, rgba: [f32; 4]) {
        self.color = rgba;
    }

    /// Visibility flag; invisible polylines draw as a no-op.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the polyline.
    pub fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Ring closure flag.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Solid fill color used by the picking pass.
    #[must_use]
    pub fn picking_color(&self) -> [f32; 3] {
        self.picking_color
    }

    /// Set the picking color (allocation policy is the caller's).
    pub fn set_picking_color(&mut self, rgb: [f32; 3]) {
        self.picking_color = rgb;
    }

    /// The built line mesh; empty until first attach or `ensure_mesh`.
    #[must_use]
    pub fn mesh(&self) -> &LineMesh {
        &self.mesh
    }

    /// Derived per-point coordinate forms from the last build.
    #[must_use]
    pub fn derived(&self) -> &DerivedPath {
        &self.derived
    }

    /// Cartesian rings from the last build (for geodetic paths, derived).
    #[must_use]
    pub fn rings_cartesian(&self) -> &Rings {
        &self.rings_cartesian
    }

    /// Assign a render context: builds the mesh if needed and marks both
    /// buffers dirty for the first upload.
    pub fn attach(&mut self) -> Result<(), PathError> {
        if self.mesh.is_empty() {
            self.rebuild_mesh()?;
        }
        self.attached = true;
        self.vertices_state = ResourceState::Dirty;
        self.indexes_state = ResourceState::Dirty;
        Ok(())
    }

    /// Drop the render context; buffer handles on the renderer side must be
    /// released by the owner of those handles.
    pub fn detach(&mut self) {
        self.attached = false;
        self.vertices_state = ResourceState::Detached;
        self.indexes_state = ResourceState::Detached;
    }

    /// True once a render context is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Build (or rebuild) the mesh without attaching; useful for headless
    /// consumers of the buffers.
    pub fn ensure_mesh(&mut self) -> Result<(), PathError> {
        if self.mesh.is_empty() {
            self.rebuild_mesh()?;
        }
        Ok(())
    }

    /// Replace the whole path. Rebuilds all three buffers and marks both
    /// GPU buffers dirty; on error the previous path and mesh survive.
    pub fn set_path(&mut self, rings: Rings, is_closed: bool) -> Result<(), PathError> {
        validate_ring_lengths(rings.iter().map(Vec::len))?;
        self.form = PathForm::Cartesian;
        self.rings_cartesian = rings;
        self.rings_geodetic.clear();
        self.is_closed = is_closed;
        self.rebuild_mesh()?;
        self.mark_mutated(BufferKind::Vertices);
        self.mark_mutated(BufferKind::Indexes);
        Ok(())
    }

    /// Replace the whole path with geodetic rings.
    pub fn set_path_geodetic(&mut self, rings: GeoRings, is_closed: bool) -> Result<(), PathError> {
        validate_ring_lengths(rings.iter().map(Vec::len))?;
        self.form = PathForm::Geodetic;
        self.rings_geodetic = rings;
        self.rings_cartesian.clear();
        self.is_closed = is_closed;
        self.rebuild_mesh()?;
        self.mark_mutated(BufferKind::Vertices);
        self.mark_mutated(BufferKind::Indexes);
        Ok(())
    }

    /// Equal-topology update: same ring count, same point counts, same
    /// closure, only positions change. Overwrites vertex positions in
    /// place and leaves the index buffer untouched (and clean).
    pub fn set_path_equal_topology(&mut self, rings: Rings) -> Result<(), PathError> {
        if self.mesh.is_empty() {
            // Nothing built yet; treat as a plain path replacement.
            return self.set_path(rings, self.is_closed);
        }
        // Totals alone are not enough for multipart paths: the index
        // buffer encodes where one ring ends and the next begins.
        let same_split = rings.len() == self.rings_cartesian.len()
            && rings.iter().zip(&self.rings_cartesian).all(|(a, b)| a.len() == b.len());
        if !same_split {
            let held = self.mesh.vertex_count() / crate::polyline::COPIES_PER_POINT;
            let supplied = rings.iter().map(|r| r.len() + 2).sum();
            return Err(PathError::TopologyMismatch { mesh_points: held, ring_points: supplied });
        }
        rewrite_cartesian_positions(&mut self.mesh, &rings, self.is_closed)?;
        self.form = PathForm::Cartesian;
        self.rings_cartesian = rings;
        self.rings_geodetic.clear();
        self.rederive_points();
        self.mark_mutated(BufferKind::Vertices);
        Ok(())
    }

    /// Geographic bounding extent of the path, from the derived geodetic
    /// forms. Empty when no ellipsoid was available to derive them.
    #[must_use]
    pub fn bounding_extent(&self) -> Extent {
        let mut e = Extent::empty();
        for ll in &self.derived.lonlat {
            e.expand(*ll);
        }
        e
    }

    /// State of one GPU buffer.
    #[must_use]
    pub fn buffer_state(&self, kind: BufferKind) -> ResourceState {
        match kind {
            BufferKind::Vertices => self.vertices_state,
            BufferKind::Indexes => self.indexes_state,
        }
    }

    /// Renderer-side query: does this buffer need an upload before drawing?
    ///
    /// Errors when no render context is attached; drawing a detached
    /// entity is a caller bug, not a silent no-op.
    pub fn needs_upload(&self, kind: BufferKind) -> Result<bool, EntityError> {
        if !self.attached {
            return Err(EntityError::Detached { id: self.id });
        }
        Ok(self.buffer_state(kind) == ResourceState::Dirty)
    }

    /// Renderer-side acknowledgement that the buffer was uploaded. The only
    /// transition out of `Dirty`.
    pub fn mark_uploaded(&mut self, kind: BufferKind) {
        match kind {
            BufferKind::Vertices => self.vertices_state = ResourceState::Clean,
            BufferKind::Indexes => self.indexes_state = ResourceState::Clean,
        }
    }

    fn mark_mutated(&mut self, kind: BufferKind) {
        if !self.attached {
            return;
        }
        match kind {
            BufferKind::Vertices => self.vertices_state = ResourceState::Dirty,
            BufferKind::Indexes => self.indexes_state = ResourceState::Dirty,
        }
    }

    /// Rebuild all three mesh buffers from the authoritative path into a
    /// staging mesh, swapping on success so a failed rebuild cannot corrupt
    /// buffers already uploaded.
    fn rebuild_mesh(&mut self) -> Result<(), PathError> {
        let mut mesh = LineMesh::default();
        let mut derived = DerivedPath::default();
        match self.form {
            PathForm::Cartesian => {
                for ring in &self.rings_cartesian {
                    append_cartesian(
                        &mut mesh,
                        ring,
                        self.is_closed,
                        self.ellipsoid.as_ref(),
                        &mut derived,
                    )?;
                }
            }
            PathForm::Geodetic => {
                let Some(ellipsoid) = self.ellipsoid else {
                    // Geodetic construction always stores an ellipsoid.
                    return Ok(());
                };
                for ring in &self.rings_geodetic {
                    append_geodetic(&mut mesh, ring, self.is_closed, &ellipsoid, &mut derived)?;
                }
                // Cache the derived cartesian rings for later equal-topology
                // updates and extent queries.
                let mut at = 0usize;
                self.rings_cartesian.clear();
                for ring in &self.rings_geodetic {
                    self.rings_cartesian.push(derived.cartesian[at..at + ring.len()].to_vec());
                    at += ring.len();
                }
            }
        }
        self.mesh = mesh;
        self.derived = derived;
        Ok(())
    }

    /// Refresh the derived coordinate forms after an in-place position
    /// rewrite (the mesh itself was already updated).
    fn rederive_points(&mut self) {
        self.derived.clear();
        for ring in &self.rings_cartesian {
            for &p in ring {
                self.derived.cartesian.push(p);
                if let Some(e) = &self.ellipsoid {
                    let ll = e.cartesian_to_geodetic(p);
                    self.derived.lonlat.push(ll);
                    self.derived.mercator.push(geo::forward_mercator(ll));
                }
            }
        }
    }
}

fn validate_ring_lengths<I: Iterator<Item = usize>>(lens: I) -> Result<(), PathError> {
    for len in lens {
        if len < 2 {
            return Err(PathError::TooShort { len });
        }
    }
    Ok(())
}
