use slotmap::Key;

use crate::geometry::Point3;
use crate::site::SiteId;

slotmap::new_key_type! {
    /// Stable handle of a vertex in the diagram's vertex arena.
    ///
    /// Keys of deleted vertices are never handed out again for a different vertex,
    /// so a stale key simply fails to resolve.
    pub struct VertexKey;
}

/// Corner list of a vertex, `None` standing for the point at infinity.
pub type Corners = [Option<SiteId>; 4];

/// Three corners of a face, sorted so both sides of a face produce the same key.
pub type FaceKey = [Option<SiteId>; 3];

/// What a vertex of the Voronoi diagram stands for.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexKind {
    /// A Delaunay tetrahedron; the Voronoi vertex sits at its circumcentre.
    Interior {
        sites: [SiteId; 4],
        centre: Point3,
        radius_sq: f64,
    },
    /// A hull triangle joined to the point at infinity, standing for an unbounded
    /// direction of the diagram. Corner 0 is the point at infinity and corners
    /// 1..=3 are `sites[0..3]`.
    Boundary { sites: [SiteId; 3] },
}

/// A 0-cell of the Voronoi diagram, dual to one (possibly infinite) tetrahedron.
///
/// Face `i` is the face opposite corner `i`, and `neighbours[i]` is the vertex sharing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub kind: VertexKind,
    pub(crate) neighbours: [VertexKey; 4],
}

impl Vertex {
    pub(crate) fn interior(sites: [SiteId; 4], centre: Point3, radius_sq: f64) -> Self {
        Self {
            kind: VertexKind::Interior { sites, centre, radius_sq },
            neighbours: [VertexKey::null(); 4],
        }
    }

    pub(crate) fn boundary(sites: [SiteId; 3]) -> Self {
        Self {
            kind: VertexKind::Boundary { sites },
            neighbours: [VertexKey::null(); 4],
        }
    }

    /// True for vertices at infinity.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        matches!(self.kind, VertexKind::Boundary { .. })
    }

    #[inline]
    pub fn corners(&self) -> Corners {
        match &self.kind {
            VertexKind::Interior { sites, .. } => sites.map(Some),
            VertexKind::Boundary { sites } => [None, Some(sites[0]), Some(sites[1]), Some(sites[2])],
        }
    }

    /// The real (finite) corners of this vertex.
    pub fn sites(&self) -> &[SiteId] {
        match &self.kind {
            VertexKind::Interior { sites, .. } => sites,
            VertexKind::Boundary { sites } => sites,
        }
    }

    #[inline]
    pub fn has_site(&self, site: SiteId) -> bool {
        self.sites().contains(&site)
    }

    /// Corner index of `site`, if it is a corner.
    pub fn corner_of(&self, site: SiteId) -> Option<usize> {
        self.corners().iter().position(|c| *c == Some(site))
    }

    /// Corners of face `i`, in corner order.
    pub fn face(&self, i: usize) -> [Option<SiteId>; 3] {
        let corners = self.corners();
        let mut face = [None; 3];
        let mut k = 0;
        for (j, c) in corners.iter().enumerate() {
            if j != i {
                face[k] = *c;
                k += 1;
            }
        }
        face
    }

    pub fn face_key(&self, i: usize) -> FaceKey {
        let mut key = self.face(i);
        key.sort_unstable();
        key
    }

    #[inline]
    pub fn neighbour(&self, i: usize) -> VertexKey {
        self.neighbours[i]
    }

    pub fn neighbours(&self) -> &[VertexKey; 4] {
        &self.neighbours
    }

    /// Face index across which `other` is a neighbour.
    pub fn slot_of(&self, other: VertexKey) -> Option<usize> {
        self.neighbours.iter().position(|n| *n == other)
    }

    /// Circumcentre, `None` for vertices at infinity.
    pub fn centre(&self) -> Option<Point3> {
        match &self.kind {
            VertexKind::Interior { centre, .. } => Some(*centre),
            VertexKind::Boundary { .. } => None,
        }
    }

    pub fn radius_sq(&self) -> Option<f64> {
        match &self.kind {
            VertexKind::Interior { radius_sq, .. } => Some(*radius_sq),
            VertexKind::Boundary { .. } => None,
        }
    }
}

/// Sorted face key of an arbitrary triple of corners.
pub(crate) fn face_key(mut corners: [Option<SiteId>; 3]) -> FaceKey {
    corners.sort_unstable();
    corners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: [u32; 4]) -> [SiteId; 4] {
        v.map(SiteId)
    }

    #[test]
    fn test_boundary_corners_put_infinity_first() {
        let v = Vertex::boundary([SiteId(4), SiteId(2), SiteId(9)]);
        assert!(v.is_sentinel());
        assert_eq!(v.corners(), [None, Some(SiteId(4)), Some(SiteId(2)), Some(SiteId(9))]);
        assert_eq!(v.face(0), [Some(SiteId(4)), Some(SiteId(2)), Some(SiteId(9))]);
        assert_eq!(v.face(2), [None, Some(SiteId(4)), Some(SiteId(9))]);
        assert_eq!(v.corner_of(SiteId(9)), Some(3));
        assert_eq!(v.centre(), None);
    }

    #[test]
    fn test_face_keys_match_regardless_of_order() {
        let a = Vertex::interior(ids([0, 1, 2, 3]), [0.0; 3], 1.0);
        let b = Vertex::interior(ids([3, 2, 1, 7]), [0.0; 3], 1.0);
        // face of a opposite 0 is {1,2,3}, face of b opposite 7 is {3,2,1}
        assert_eq!(a.face_key(0), b.face_key(3));
        assert_ne!(a.face_key(1), b.face_key(3));
    }

    #[test]
    fn test_sites_and_membership() {
        let v = Vertex::interior(ids([5, 6, 7, 8]), [1.0, 2.0, 3.0], 4.0);
        assert!(v.has_site(SiteId(7)));
        assert!(!v.has_site(SiteId(1)));
        assert_eq!(v.sites().len(), 4);
        assert_eq!(v.radius_sq(), Some(4.0));
    }
}
