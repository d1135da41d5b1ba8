//! The incremental Delaunay/Voronoi diagram.
//!
//! A [`Diagram`] owns an append-only registry of [`Site`]s and an arena of
//! [`Vertex`]es, each vertex being one tetrahedron of the Delaunay triangulation
//! (a finite Voronoi vertex) or one hull triangle joined to the point at infinity
//! (a sentinel). Points are inserted one at a time with a Bowyer-Watson style
//! cavity rebuild; queries walk the vertex graph.

mod insert;
mod locate;
mod query;
mod render;
mod validate;

pub use locate::Location;
pub use render::VertexView;

use rand::prelude::*;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::accuracy::Accuracy;
use crate::bounds::BoundingBox;
use crate::error::DiagramError;
use crate::geometry::{self, Point3};
use crate::site::{OwnerTag, Site, SiteFlags, SiteId};
use crate::vertex::{Corners, FaceKey, Vertex, VertexKey, face_key};

/// An incremental 3D Delaunay triangulation and its dual Voronoi diagram.
///
/// The diagram is single-threaded with respect to mutation: an insertion must
/// finish before any query runs. Keys and chains returned by queries borrow
/// nothing, but they describe the graph as it was and may go stale after the
/// next insertion.
#[derive(Clone, Debug)]
pub struct Diagram {
    pub(crate) bounds: BoundingBox<3>,
    pub(crate) accuracy: Accuracy,
    pub(crate) sites: Vec<Site>,
    pub(crate) vertices: SlotMap<VertexKey, Vertex>,
    /// Entry point of the next walk, the most recently built region.
    pub(crate) last: Option<VertexKey>,
    /// Registered sites not yet linked into the triangulation.
    pub(crate) pending: Vec<SiteId>,
}

impl Diagram {
    /// Creates an empty diagram bound to `bounds`, using the process-wide accuracy.
    pub fn new(bounds: BoundingBox<3>) -> Result<Self, DiagramError> {
        Self::with_accuracy(bounds, Accuracy::global())
    }

    /// Creates an empty diagram with an explicit tolerance.
    pub fn with_accuracy(bounds: BoundingBox<3>, accuracy: Accuracy) -> Result<Self, DiagramError> {
        if !bounds.is_valid() {
            return Err(DiagramError::InvalidParameter {
                name: "bounds",
                value: bounds.volume(),
            });
        }
        Ok(Self {
            bounds,
            accuracy,
            sites: Vec::new(),
            vertices: SlotMap::with_key(),
            last: None,
            pending: Vec::new(),
        })
    }

    /// Builds a diagram directly from one tetrahedron.
    ///
    /// # Errors
    ///
    /// [`DiagramError::CoplanarSites`] if the four points are coplanar within tolerance,
    /// [`DiagramError::OutsideBounds`] if any of them lies outside `bounds`.
    pub fn from_tetrahedron(bounds: BoundingBox<3>, points: [Point3; 4]) -> Result<Self, DiagramError> {
        Self::from_tetrahedron_with_accuracy(bounds, points, Accuracy::global())
    }

    pub fn from_tetrahedron_with_accuracy(
        bounds: BoundingBox<3>,
        points: [Point3; 4],
        accuracy: Accuracy,
    ) -> Result<Self, DiagramError> {
        let mut diagram = Self::with_accuracy(bounds, accuracy)?;
        for p in &points {
            diagram.check_point(p)?;
        }
        if !diagram.spans_volume(&points) {
            return Err(DiagramError::CoplanarSites);
        }
        let ids = points.map(|p| diagram.register(p, OwnerTag::default()));
        diagram.build_initial(ids)?;
        Ok(diagram)
    }

    /// True once the diagram holds at least one tetrahedron and can be queried.
    pub fn exists(&self) -> bool {
        self.last.is_some()
    }

    /// Number of registered sites, linked or pending.
    pub fn point_count(&self) -> usize {
        self.sites.len()
    }

    /// Number of vertices, sentinels included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn sentinel_count(&self) -> usize {
        self.vertices.values().filter(|v| v.is_sentinel()).count()
    }

    pub fn interior_count(&self) -> usize {
        self.vertices.len() - self.sentinel_count()
    }

    pub fn bounds(&self) -> &BoundingBox<3> {
        &self.bounds
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.index())
    }

    pub fn position(&self, id: SiteId) -> Option<Point3> {
        self.site(id).map(|s| s.position)
    }

    /// All registered sites in insertion order.
    pub fn sites(&self) -> impl Iterator<Item = (SiteId, &Site)> + '_ {
        self.sites.iter().enumerate().map(|(i, s)| (SiteId(i as u32), s))
    }

    /// Sites that are registered but not part of the triangulation yet.
    pub fn pending_sites(&self) -> &[SiteId] {
        &self.pending
    }

    pub fn hull_sites(&self) -> Vec<SiteId> {
        self.sites()
            .filter(|(_, s)| s.is_on_hull())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn vertex(&self, key: VertexKey) -> Option<&Vertex> {
        self.vertices.get(key)
    }

    /// Sentinel vertices at infinity, one per hull triangle.
    pub fn sentinels(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.iter().filter(|(_, v)| v.is_sentinel()).map(|(k, _)| k)
    }

    /// The vertex the next walk starts from.
    ///
    /// Only valid until the next insertion, which may delete it.
    pub fn walk_start(&self) -> Option<VertexKey> {
        self.last
    }

    /// Inserts `count` uniformly random sites inside the bounds.
    ///
    /// Degenerate draws are skipped, so fewer than `count` sites may be added.
    pub fn insert_random(&mut self, count: usize, seed: u64) -> Vec<SiteId> {
        let mut rng = StdRng::seed_from_u64(seed);
        let size = self.bounds.size();
        let mut inserted = Vec::with_capacity(count);
        for _ in 0..count {
            let p = [
                self.bounds.min[0] + rng.r#gen::<f64>() * size[0],
                self.bounds.min[1] + rng.r#gen::<f64>() * size[1],
                self.bounds.min[2] + rng.r#gen::<f64>() * size[2],
            ];
            match self.insert(p) {
                Ok(id) => inserted.push(id),
                Err(err) => tracing::warn!(?p, %err, "random site rejected"),
            }
        }
        inserted
    }

    // --- tolerances ---

    #[inline]
    pub(crate) fn eps(&self) -> f64 {
        self.accuracy.value()
    }

    /// Margin on the power of a point with respect to a circumsphere of squared
    /// radius `radius_sq`.
    ///
    /// Grows with the sphere: the power `r² - |p - c|²` of a point near a huge
    /// sphere carries a rounding error proportional to `r²`.
    #[inline]
    pub(crate) fn sphere_margin(&self, radius_sq: f64) -> f64 {
        self.accuracy.value() * (self.bounds.diagonal() + radius_sq.sqrt()) + 4.0 * f64::EPSILON * radius_sq
    }

    #[inline]
    pub(crate) fn coincident(&self, a: &Point3, b: &Point3) -> bool {
        geometry::dist_sq(a, b) <= self.eps() * self.eps()
    }

    #[inline]
    pub(crate) fn pos(&self, id: SiteId) -> &Point3 {
        &self.sites[id.index()].position
    }

    pub(crate) fn check_point(&self, p: &Point3) -> Result<(), DiagramError> {
        if !p.iter().all(|c| c.is_finite()) {
            return Err(DiagramError::NonFinitePoint { point: *p });
        }
        if !self.bounds.contains(p, self.eps()) {
            return Err(DiagramError::OutsideBounds { point: *p });
        }
        Ok(())
    }

    /// True if the four points are not coplanar within tolerance.
    pub(crate) fn spans_volume(&self, p: &[Point3; 4]) -> bool {
        if geometry::line_distance(&p[0], &p[1], &p[2]) <= self.eps() {
            return false;
        }
        geometry::face_height(&p[0], &p[1], &p[2], &p[3]).is_some_and(|h| h.abs() > self.eps())
    }

    pub(crate) fn register(&mut self, position: Point3, owner: OwnerTag) -> SiteId {
        let id = SiteId(self.sites.len() as u32);
        self.sites.push(Site::new(position, owner));
        id
    }

    /// Builds the first tetrahedron and the four sentinels closing it.
    pub(crate) fn build_initial(&mut self, ids: [SiteId; 4]) -> Result<(), DiagramError> {
        let p = ids.map(|id| *self.pos(id));
        let (centre, radius_sq) =
            geometry::circumsphere(&p[0], &p[1], &p[2], &p[3]).ok_or(DiagramError::CoplanarSites)?;

        let mut cells = vec![Vertex::interior(ids, centre, radius_sq)];
        for i in 0..4 {
            let face = cells[0].face(i);
            let mut real = [ids[0]; 3];
            for (slot, c) in real.iter_mut().zip(face.iter()) {
                *slot = c.ok_or_else(|| DiagramError::InconsistentCavity {
                    reason: "initial face at infinity".into(),
                })?;
            }
            cells.push(Vertex::boundary(real));
        }

        let corners: Vec<Corners> = cells.iter().map(|c| c.corners()).collect();
        let links = match_faces(&corners, &[None; 5])?;

        let keys: Vec<VertexKey> = cells.into_iter().map(|c| self.vertices.insert(c)).collect();
        for (i, key) in keys.iter().enumerate() {
            for f in 0..4 {
                if let Some((j, _)) = links[i][f] {
                    self.vertices[*key].neighbours[f] = keys[j];
                }
            }
        }

        for id in ids {
            let site = &mut self.sites[id.index()];
            site.vertex = Some(keys[0]);
            site.flags.insert(SiteFlags::HULL);
            site.flags.remove(SiteFlags::PENDING);
        }
        self.pending.retain(|id| !ids.contains(id));
        self.last = Some(keys[0]);
        tracing::debug!(?ids, "built initial tetrahedron");
        Ok(())
    }

    pub(crate) fn vertex_neighbours(&self, key: VertexKey) -> Option<[VertexKey; 4]> {
        self.vertices.get(key).map(|v| v.neighbours)
    }

    /// Any live vertex, used when the cached walk start is gone.
    pub(crate) fn any_vertex(&self) -> Option<VertexKey> {
        self.last
            .filter(|k| self.vertices.contains_key(*k))
            .or_else(|| self.vertices.keys().next())
    }
}

/// Pairs up the faces of a set of cells by their corner sets.
///
/// `external[i]` names a face of cell `i` that is linked from outside the set and
/// must not be matched. Every other face must be shared with exactly one other
/// cell of the set. Returns, per cell and face, the matching `(cell, face)`.
pub(crate) fn match_faces(
    cells: &[Corners],
    external: &[Option<usize>],
) -> Result<Vec<[Option<(usize, usize)>; 4]>, DiagramError> {
    let mut open: FxHashMap<FaceKey, (usize, usize)> = FxHashMap::default();
    let mut links = vec![[None; 4]; cells.len()];

    for (i, corners) in cells.iter().enumerate() {
        for f in 0..4 {
            if external.get(i).copied().flatten() == Some(f) {
                continue;
            }
            let mut face = [None; 3];
            let mut k = 0;
            for (j, c) in corners.iter().enumerate() {
                if j != f {
                    face[k] = *c;
                    k += 1;
                }
            }
            let key = face_key(face);
            match open.remove(&key) {
                Some((other, other_face)) => {
                    links[i][f] = Some((other, other_face));
                    links[other][other_face] = Some((i, f));
                }
                None => {
                    open.insert(key, (i, f));
                }
            }
        }
    }

    if let Some((face, _)) = open.iter().next() {
        return Err(DiagramError::InconsistentCavity {
            reason: format!("{} unmatched faces, e.g. {:?}", open.len(), face),
        });
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn unit_bounds() -> BoundingBox<3> {
        BoundingBox::new([-1.0, -1.0, -1.0], [2.0, 2.0, 2.0])
    }

    pub(crate) fn corner_tetrahedron() -> Diagram {
        Diagram::from_tetrahedron_with_accuracy(
            unit_bounds(),
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            Accuracy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_diagram_does_not_exist() {
        let d = Diagram::with_accuracy(unit_bounds(), Accuracy::default()).unwrap();
        assert!(!d.exists());
        assert_eq!(d.point_count(), 0);
        assert_eq!(d.vertex_count(), 0);
        assert_eq!(d.walk_start(), None);
    }

    #[test]
    fn test_invalid_bounds_are_rejected() {
        let flat = BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        assert!(matches!(
            Diagram::with_accuracy(flat, Accuracy::default()),
            Err(DiagramError::InvalidParameter { name: "bounds", .. })
        ));
    }

    #[test]
    fn test_initial_tetrahedron_has_four_sentinels() {
        let d = corner_tetrahedron();
        assert!(d.exists());
        assert_eq!(d.point_count(), 4);
        assert_eq!(d.interior_count(), 1);
        assert_eq!(d.sentinel_count(), 4);
        assert_eq!(d.hull_sites().len(), 4);
        d.check_links().unwrap();
    }

    #[test]
    fn test_coplanar_initial_tetrahedron_fails() {
        // three collinear points plus one off the line: all four lie in z = 0
        let res = Diagram::from_tetrahedron_with_accuracy(
            unit_bounds(),
            [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Accuracy::default(),
        );
        assert!(matches!(res, Err(DiagramError::CoplanarSites)));
    }

    #[test]
    fn test_initial_tetrahedron_outside_bounds_fails() {
        let res = Diagram::from_tetrahedron_with_accuracy(
            unit_bounds(),
            [[0.0, 0.0, 0.0], [5.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            Accuracy::default(),
        );
        assert!(matches!(res, Err(DiagramError::OutsideBounds { .. })));
    }

    #[test]
    fn test_match_faces_reports_open_faces() {
        let a = [SiteId(0), SiteId(1), SiteId(2), SiteId(3)].map(Some);
        let res = match_faces(&[a], &[None]);
        assert!(matches!(res, Err(DiagramError::InconsistentCavity { .. })));
    }
}
