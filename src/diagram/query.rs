//! Read-only queries over the vertex graph.

use rustc_hash::FxHashSet;

use super::Diagram;
use crate::error::DiagramError;
use crate::geometry::{self, Point3};
use crate::site::SiteId;
use crate::traversal::{Marks, flood};
use crate::vertex::VertexKey;

impl Diagram {
    /// The site whose Voronoi cell contains `point`.
    ///
    /// Points outside the hull (but inside the box) resolve to the nearest hull site.
    pub fn nearest_site(&self, point: &Point3) -> Result<SiteId, DiagramError> {
        let location = self.locate(point)?;
        self.descend_to_nearest(location.vertex, point)
            .ok_or(DiagramError::EmptyDiagram)
    }

    /// Distinct sites sharing a Voronoi face with `site`, in no particular order.
    pub fn neighbours(&self, site: SiteId) -> Result<Vec<SiteId>, DiagramError> {
        self.guard(site)?;
        Ok(self.star_neighbours(site))
    }

    /// Every vertex of the Voronoi cell of `site`, sentinels included.
    ///
    /// A site on the hull has an unbounded cell; its territory then contains the
    /// sentinels standing for the unbounded directions.
    pub fn territory(&self, site: SiteId) -> Result<Vec<VertexKey>, DiagramError> {
        self.guard(site)?;
        Ok(self.star(site))
    }

    /// Vertices shared by the cells of `a` and `b`: the Voronoi face between them,
    /// or nothing if the two sites are not neighbours.
    pub fn contiguity(&self, a: SiteId, b: SiteId) -> Result<Vec<VertexKey>, DiagramError> {
        self.guard(a)?;
        self.guard(b)?;
        Ok(self
            .star(a)
            .into_iter()
            .filter(|&k| self.vertices[k].has_site(b))
            .collect())
    }

    fn guard(&self, site: SiteId) -> Result<(), DiagramError> {
        if !self.exists() {
            return Err(DiagramError::EmptyDiagram);
        }
        if site.index() >= self.sites.len() {
            return Err(DiagramError::UnknownSite(site));
        }
        Ok(())
    }

    /// All vertices having `site` as a corner. Empty for pending sites.
    pub(crate) fn star(&self, site: SiteId) -> Vec<VertexKey> {
        let Some(entry) = self.sites.get(site.index()).and_then(|s| s.vertex) else {
            return Vec::new();
        };

        let start = match self.vertices.get(entry) {
            Some(v) if v.has_site(site) => entry,
            _ => {
                tracing::warn!(?site, "stale territory cache, scanning vertices");
                match self.vertices.iter().find(|(_, v)| v.has_site(site)) {
                    Some((key, _)) => key,
                    None => return Vec::new(),
                }
            }
        };

        let mut marks = Marks::new();
        flood(
            start,
            &mut marks,
            |k| self.vertex_neighbours(k),
            |k| self.vertices[k].has_site(site),
        )
    }

    fn star_neighbours(&self, site: SiteId) -> Vec<SiteId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for key in self.star(site) {
            for &s in self.vertices[key].sites() {
                if s != site && seen.insert(s) {
                    out.push(s);
                }
            }
        }
        out
    }

    /// Greedy descent over the Delaunay graph towards `point`, starting from the
    /// closest corner of `start`.
    pub(crate) fn descend_to_nearest(&self, start: VertexKey, point: &Point3) -> Option<SiteId> {
        let vertex = self.vertices.get(start)?;
        let distance = |s: SiteId| geometry::dist_sq(self.pos(s), point);

        let mut best = vertex
            .sites()
            .iter()
            .copied()
            .min_by(|&a, &b| distance(a).total_cmp(&distance(b)))?;
        let mut best_d = distance(best);

        // each step strictly decreases the distance, so the loop ends
        loop {
            let closer = self
                .star_neighbours(best)
                .into_iter()
                .map(|s| (s, distance(s)))
                .filter(|&(_, d)| d < best_d)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            match closer {
                Some((s, d)) => {
                    best = s;
                    best_d = d;
                }
                None => return Some(best),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{corner_tetrahedron, unit_bounds};
    use super::*;
    use crate::accuracy::Accuracy;

    #[test]
    fn test_nearest_site_of_corners() {
        let d = corner_tetrahedron();
        assert_eq!(d.nearest_site(&[0.05, 0.05, 0.05]).unwrap(), SiteId(0));
        assert_eq!(d.nearest_site(&[0.9, 0.0, 0.1]).unwrap(), SiteId(1));
        // beyond the hull
        assert_eq!(d.nearest_site(&[1.9, 0.5, -0.5]).unwrap(), SiteId(1));
    }

    #[test]
    fn test_neighbours_of_lone_tetrahedron() {
        let d = corner_tetrahedron();
        let mut n = d.neighbours(SiteId(0)).unwrap();
        n.sort();
        assert_eq!(n, vec![SiteId(1), SiteId(2), SiteId(3)]);
        // one tetrahedron and the three sentinels of the faces touching the corner
        assert_eq!(d.territory(SiteId(0)).unwrap().len(), 4);
    }

    #[test]
    fn test_contiguity_only_has_shared_vertices() {
        let mut d = corner_tetrahedron();
        d.insert_random(40, 3);
        let a = SiteId(0);
        for b in d.neighbours(a).unwrap() {
            let shared = d.contiguity(a, b).unwrap();
            assert!(!shared.is_empty());
            for k in shared {
                let v = d.vertex(k).unwrap();
                assert!(v.has_site(a) && v.has_site(b));
            }
        }
    }

    #[test]
    fn test_queries_are_repeatable() {
        let mut d = corner_tetrahedron();
        d.insert_random(30, 11);
        let first = d.territory(SiteId(5)).unwrap();
        let second = d.territory(SiteId(5)).unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_query_errors() {
        let d = Diagram::with_accuracy(unit_bounds(), Accuracy::default()).unwrap();
        assert!(matches!(d.neighbours(SiteId(0)), Err(DiagramError::EmptyDiagram)));

        let d = corner_tetrahedron();
        assert!(matches!(d.territory(SiteId(9)), Err(DiagramError::UnknownSite(SiteId(9)))));
    }
}
