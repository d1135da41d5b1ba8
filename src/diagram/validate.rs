//! Consistency checks over a whole diagram.
//!
//! These are linear or quadratic in the diagram size and meant for tests,
//! debugging and snapshot restoration, not for the insertion path.

use rayon::prelude::*;

use super::Diagram;
use crate::error::DiagramError;
use crate::geometry;
use crate::site::SiteId;
use crate::vertex::{VertexKey, VertexKind};

impl Diagram {
    /// Pairs of (tetrahedron, site) where a linked site other than the four
    /// corners lies inside the circumsphere by more than the tolerance. Empty for
    /// a valid diagram.
    pub fn delaunay_violations(&self) -> Vec<(VertexKey, SiteId)> {
        let spheres: Vec<(VertexKey, [SiteId; 4], [f64; 3], f64)> = self
            .vertices
            .iter()
            .filter_map(|(k, v)| match &v.kind {
                VertexKind::Interior { sites, centre, radius_sq } => Some((k, *sites, *centre, *radius_sq)),
                VertexKind::Boundary { .. } => None,
            })
            .collect();

        spheres
            .par_iter()
            .flat_map_iter(|(key, corners, centre, radius_sq)| {
                let margin = self.sphere_margin(*radius_sq);
                self.sites()
                    .filter(move |(id, s)| !s.is_pending() && !corners.contains(id))
                    .filter(move |(_, s)| geometry::power(centre, *radius_sq, &s.position) > margin)
                    .map(move |(id, _)| (*key, id))
            })
            .collect()
    }

    /// Verifies that every neighbour link is reciprocated and that both sides
    /// agree on the corners of the shared face.
    pub fn check_links(&self) -> Result<(), DiagramError> {
        for (key, vertex) in &self.vertices {
            for (face, &n) in vertex.neighbours.iter().enumerate() {
                let broken = DiagramError::BrokenLink {
                    vertex: key,
                    neighbour: n,
                    face,
                };
                let Some(other) = self.vertices.get(n) else {
                    return Err(broken);
                };
                let Some(back) = other.slot_of(key) else {
                    return Err(broken);
                };
                if vertex.face_key(face) != other.face_key(back) {
                    return Err(broken);
                }
            }
        }
        Ok(())
    }

    /// Verifies that every linked site caches a live vertex it is a corner of.
    pub fn check_territory_cache(&self) -> Result<(), DiagramError> {
        for (id, site) in self.sites() {
            if site.is_pending() {
                continue;
            }
            let valid = site
                .vertex
                .and_then(|k| self.vertices.get(k))
                .is_some_and(|v| v.has_site(id));
            if !valid {
                return Err(DiagramError::InconsistentCavity {
                    reason: format!("site {id:?} caches a vertex it does not belong to"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::corner_tetrahedron;
    use super::*;

    #[test]
    fn test_fresh_tetrahedron_is_valid() {
        let d = corner_tetrahedron();
        assert!(d.delaunay_violations().is_empty());
        d.check_links().unwrap();
        d.check_territory_cache().unwrap();
    }

    #[test]
    fn test_broken_link_is_reported() {
        let mut d = corner_tetrahedron();
        let sentinel = d.sentinels().next().unwrap();
        let inner = d.vertices[sentinel].neighbours[0];
        let slot = d.vertices[inner].slot_of(sentinel).unwrap();
        // point the tetrahedron back at itself instead of the sentinel
        d.vertices[inner].neighbours[slot] = inner;
        assert!(matches!(d.check_links(), Err(DiagramError::BrokenLink { .. })));
    }

    #[test]
    fn test_violation_is_reported() {
        let mut d = corner_tetrahedron();
        // register a site inside the circumsphere without linking it
        d.register([0.2, 0.2, 0.2], Default::default());
        let violations = d.delaunay_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].1, SiteId(4));
    }

    #[test]
    fn test_thin_tetrahedron_corners_are_not_violations() {
        // nearly flat: the circumsphere has a radius of about 2.5e5
        let d = Diagram::from_tetrahedron_with_accuracy(
            super::super::tests::unit_bounds(),
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.5, 0.5, 1e-6]],
            Default::default(),
        )
        .unwrap();
        let radius_sq = d.vertices().find_map(|v| v.radius_sq).unwrap();
        assert!(radius_sq > 1e10);
        assert!(d.delaunay_violations().is_empty());
    }

    #[test]
    fn test_stale_cache_is_reported() {
        let mut d = corner_tetrahedron();
        let sentinel = d.sentinels().find(|&k| !d.vertices[k].has_site(SiteId(0))).unwrap();
        d.sites[0].vertex = Some(sentinel);
        assert!(d.check_territory_cache().is_err());
    }
}
