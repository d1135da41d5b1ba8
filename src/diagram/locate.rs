//! Point location by walking across faces.

use super::Diagram;
use crate::error::DiagramError;
use crate::geometry::{self, Point3};
use crate::site::SiteId;
use crate::vertex::{VertexKey, VertexKind};

/// Result of locating a point in the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    /// The tetrahedron containing the point, or the sentinel whose hull
    /// triangle the point lies beyond.
    pub vertex: VertexKey,
    /// The point is outside the hull of the linked sites (but inside the box).
    pub outside_hull: bool,
}

impl Diagram {
    /// Locates `point`, starting from the cached walk start.
    pub fn locate(&self, point: &Point3) -> Result<Location, DiagramError> {
        let start = self.any_vertex().ok_or(DiagramError::EmptyDiagram)?;
        self.walk(start, point)
    }

    /// Walks from `start` towards `point`, crossing any face the point lies beyond.
    ///
    /// The walk never mutates the diagram. It is bounded by the number of vertices;
    /// should rounding make it circle, a linear scan takes over.
    pub fn walk(&self, start: VertexKey, point: &Point3) -> Result<Location, DiagramError> {
        let mut current = match self.vertices.get(start) {
            Some(v) if v.is_sentinel() => v.neighbours[0],
            Some(_) => start,
            None => self.any_vertex().ok_or(DiagramError::EmptyDiagram)?,
        };

        let limit = self.vertices.len() + 1;
        for step in 0..limit {
            let vertex = &self.vertices[current];
            let sites = match &vertex.kind {
                VertexKind::Interior { sites, .. } => sites,
                VertexKind::Boundary { .. } => {
                    return Ok(Location {
                        vertex: current,
                        outside_hull: true,
                    });
                }
            };

            let mut next = None;
            for j in 0..4 {
                // rotating the first face tested keeps degenerate walks from ping-ponging
                let i = (j + step) % 4;
                let side = self.side_of_face(sites, i, point);
                let neighbour = vertex.neighbours[i];
                let crossing = if self.vertices[neighbour].is_sentinel() {
                    side < -self.eps()
                } else {
                    side < 0.0
                };
                if crossing {
                    next = Some(neighbour);
                    break;
                }
            }

            match next {
                Some(n) => current = n,
                None => {
                    return Ok(Location {
                        vertex: current,
                        outside_hull: false,
                    });
                }
            }
        }

        tracing::warn!(?point, limit, "walk exceeded its step limit, falling back to a scan");
        self.scan_locate(point).ok_or(DiagramError::EmptyDiagram)
    }

    /// Signed distance of `point` from face `i` of a tetrahedron, positive on the
    /// side of the opposite corner.
    pub(crate) fn side_of_face(&self, sites: &[SiteId; 4], i: usize, point: &Point3) -> f64 {
        let [a, b, c] = face_points(self, sites, i);
        let opposite = self.pos(sites[i]);
        let h_p = geometry::face_height(&a, &b, &c, point).unwrap_or(0.0);
        let h_q = geometry::face_height(&a, &b, &c, opposite).unwrap_or(0.0);
        h_p * h_q.signum()
    }

    /// Brute-force location, used only when the walk fails to settle.
    fn scan_locate(&self, point: &Point3) -> Option<Location> {
        let eps = self.eps();
        let mut outside = None;
        for (key, vertex) in &self.vertices {
            match &vertex.kind {
                VertexKind::Interior { sites, .. } => {
                    if (0..4).all(|i| self.side_of_face(sites, i, point) >= -eps) {
                        return Some(Location {
                            vertex: key,
                            outside_hull: false,
                        });
                    }
                }
                VertexKind::Boundary { .. } => {
                    if outside.is_none() && self.beyond_hull_face(key, point).is_some_and(|h| h < -eps) {
                        outside = Some(Location {
                            vertex: key,
                            outside_hull: true,
                        });
                    }
                }
            }
        }
        outside.or_else(|| {
            self.any_vertex().map(|vertex| Location {
                vertex,
                outside_hull: false,
            })
        })
    }

    /// Signed distance of `point` from the hull triangle of a sentinel, positive on
    /// the hull side and negative beyond it.
    pub(crate) fn beyond_hull_face(&self, sentinel: VertexKey, point: &Point3) -> Option<f64> {
        let vertex = self.vertices.get(sentinel)?;
        let VertexKind::Boundary { sites } = &vertex.kind else {
            return None;
        };
        let inner_key = vertex.neighbours[0];
        let inner = self.vertices.get(inner_key)?;
        let VertexKind::Interior { sites: inner_sites, .. } = &inner.kind else {
            return None;
        };
        let slot = inner.slot_of(sentinel)?;
        let [a, b, c] = sites.map(|s| *self.pos(s));
        let h_p = geometry::face_height(&a, &b, &c, point)?;
        let h_q = geometry::face_height(&a, &b, &c, self.pos(inner_sites[slot]))?;
        Some(h_p * h_q.signum())
    }
}

fn face_points(diagram: &Diagram, sites: &[SiteId; 4], i: usize) -> [Point3; 3] {
    let mut face = [[0.0; 3]; 3];
    let mut k = 0;
    for (j, s) in sites.iter().enumerate() {
        if j != i {
            face[k] = *diagram.pos(*s);
            k += 1;
        }
    }
    face
}
