//! Enumeration of vertices and edges for drawing.

use rustc_hash::FxHashSet;

use super::Diagram;
use crate::geometry::Point3;
use crate::site::SiteId;
use crate::vertex::{Corners, VertexKey};

/// Read-only snapshot of one vertex, enough to draw the triangulation or its dual.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexView {
    pub key: VertexKey,
    pub sentinel: bool,
    /// Circumcentre; `None` for sentinels.
    pub position: Option<Point3>,
    pub radius_sq: Option<f64>,
    pub corners: Corners,
    pub neighbours: [VertexKey; 4],
}

impl Diagram {
    pub fn vertices(&self) -> impl Iterator<Item = VertexView> + '_ {
        self.vertices.iter().map(|(key, v)| VertexView {
            key,
            sentinel: v.is_sentinel(),
            position: v.centre(),
            radius_sq: v.radius_sq(),
            corners: v.corners(),
            neighbours: v.neighbours,
        })
    }

    /// Delaunay edges as site pairs `(a, b)` with `a < b`, each listed once.
    pub fn edges(&self) -> Vec<(SiteId, SiteId)> {
        let mut seen = FxHashSet::default();
        for v in self.vertices.values() {
            let sites = v.sites();
            for (i, &a) in sites.iter().enumerate() {
                for &b in &sites[i + 1..] {
                    seen.insert(if a < b { (a, b) } else { (b, a) });
                }
            }
        }
        let mut edges: Vec<_> = seen.into_iter().collect();
        edges.sort_unstable();
        edges
    }

    /// Voronoi edges between finite vertices, as pairs of circumcentres.
    ///
    /// Edges running off to a sentinel are unbounded and left out.
    pub fn voronoi_edges(&self) -> Vec<(Point3, Point3)> {
        let mut edges = Vec::new();
        for (key, v) in &self.vertices {
            let Some(a) = v.centre() else { continue };
            for &n in &v.neighbours {
                if key >= n {
                    continue;
                }
                if let Some(b) = self.vertices.get(n).and_then(|w| w.centre()) {
                    edges.push((a, b));
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::super::tests::corner_tetrahedron;

    #[test]
    fn test_vertex_views_cover_all_vertices() {
        let d = corner_tetrahedron();
        let views: Vec<_> = d.vertices().collect();
        assert_eq!(views.len(), 5);
        assert_eq!(views.iter().filter(|v| v.sentinel).count(), 4);
        let finite = views.iter().find(|v| !v.sentinel).unwrap();
        assert_relative_eq!(finite.radius_sq.unwrap(), 0.75, epsilon = 1e-12);
        assert!(finite.corners.iter().all(|c| c.is_some()));
    }

    #[test]
    fn test_edges_of_tetrahedron() {
        let mut d = corner_tetrahedron();
        assert_eq!(d.edges().len(), 6);
        assert!(d.voronoi_edges().is_empty());

        d.insert([0.2, 0.2, 0.2]).unwrap();
        // four new edges to the centre, the six hull edges remain
        assert_eq!(d.edges().len(), 10);
        // four finite tetrahedra around the centre share six faces
        assert_eq!(d.voronoi_edges().len(), 6);
    }
}
