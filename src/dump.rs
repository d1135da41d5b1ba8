//! Textual dump and restore of a whole diagram.
//!
//! The dump is JSON. Vertex keys are replaced by dense indices so a dump does not
//! depend on the arena's slot history; circumspheres are recomputed on restore.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::accuracy::Accuracy;
use crate::bounds::BoundingBox;
use crate::diagram::Diagram;
use crate::error::DiagramError;
use crate::geometry::{self, Point3};
use crate::site::{OwnerTag, Site, SiteFlags, SiteId};
use crate::vertex::{Vertex, VertexKey, VertexKind};

/// Format version written into every dump.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub position: Point3,
    pub owner: OwnerTag,
    pub flags: SiteFlags,
    /// Index of the cached territory vertex.
    pub vertex: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VertexRecord {
    Interior { sites: [SiteId; 4], neighbours: [usize; 4] },
    Boundary { sites: [SiteId; 3], neighbours: [usize; 4] },
}

/// Serializable image of a [`Diagram`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub bounds: BoundingBox<3>,
    pub accuracy: Accuracy,
    pub sites: Vec<SiteRecord>,
    pub vertices: Vec<VertexRecord>,
    pub last: Option<usize>,
    pub pending: Vec<SiteId>,
}

impl Diagram {
    pub fn to_snapshot(&self) -> Snapshot {
        let index: FxHashMap<VertexKey, usize> = self.vertices.keys().enumerate().map(|(i, k)| (k, i)).collect();
        let dense = |k: VertexKey| index.get(&k).copied();

        let vertices = self
            .vertices
            .values()
            .map(|v| {
                // a dangling link becomes an out-of-range index, rejected on restore
                let neighbours = v.neighbours.map(|n| dense(n).unwrap_or(usize::MAX));
                match &v.kind {
                    VertexKind::Interior { sites, .. } => VertexRecord::Interior {
                        sites: *sites,
                        neighbours,
                    },
                    VertexKind::Boundary { sites } => VertexRecord::Boundary {
                        sites: *sites,
                        neighbours,
                    },
                }
            })
            .collect();

        let sites = self
            .sites
            .iter()
            .map(|s| SiteRecord {
                position: s.position,
                owner: s.owner,
                flags: s.flags,
                vertex: s.vertex.and_then(dense),
            })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION,
            bounds: self.bounds,
            accuracy: self.accuracy,
            sites,
            vertices,
            last: self.last.and_then(dense),
            pending: self.pending.clone(),
        }
    }

    /// Rebuilds a diagram from a snapshot, validating every link.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, DiagramError> {
        let invalid = |reason: String| DiagramError::InvalidSnapshot { reason };

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(invalid(format!("unsupported version {}", snapshot.version)));
        }

        let accuracy = Accuracy::new(snapshot.accuracy.value())?;
        let mut diagram = Diagram::with_accuracy(snapshot.bounds, accuracy)?;
        let site_count = snapshot.sites.len();
        let vertex_count = snapshot.vertices.len();

        let mut vertices: SlotMap<VertexKey, Vertex> = SlotMap::with_capacity_and_key(vertex_count);
        let mut keys = Vec::with_capacity(vertex_count);
        let mut links = Vec::with_capacity(vertex_count);

        for (i, record) in snapshot.vertices.iter().enumerate() {
            let (sites, neighbours): (&[SiteId], [usize; 4]) = match record {
                VertexRecord::Interior { sites, neighbours } => (&sites[..], *neighbours),
                VertexRecord::Boundary { sites, neighbours } => (&sites[..], *neighbours),
            };
            if let Some(s) = sites.iter().find(|s| s.index() >= site_count) {
                return Err(invalid(format!("vertex {i} refers to unknown site {s:?}")));
            }
            if let Some(n) = neighbours.iter().find(|&&n| n >= vertex_count) {
                return Err(invalid(format!("vertex {i} refers to unknown vertex {n}")));
            }

            let vertex = match record {
                VertexRecord::Interior { sites, .. } => {
                    let p = sites.map(|s| snapshot.sites[s.index()].position);
                    let (centre, radius_sq) = geometry::circumsphere(&p[0], &p[1], &p[2], &p[3])
                        .ok_or_else(|| invalid(format!("vertex {i} is a flat tetrahedron")))?;
                    Vertex::interior(*sites, centre, radius_sq)
                }
                VertexRecord::Boundary { sites, .. } => Vertex::boundary(*sites),
            };
            keys.push(vertices.insert(vertex));
            links.push(neighbours);
        }

        for (key, neighbours) in keys.iter().zip(&links) {
            vertices[*key].neighbours = neighbours.map(|n| keys[n]);
        }

        let resolve = |i: Option<usize>, what: &str| -> Result<Option<VertexKey>, DiagramError> {
            match i {
                None => Ok(None),
                Some(i) => keys
                    .get(i)
                    .copied()
                    .map(Some)
                    .ok_or_else(|| invalid(format!("{what} refers to unknown vertex {i}"))),
            }
        };

        for (i, record) in snapshot.sites.iter().enumerate() {
            let mut site = Site::new(record.position, record.owner);
            site.flags = record.flags;
            site.vertex = resolve(record.vertex, &format!("site {i}"))?;
            diagram.sites.push(site);
        }
        if let Some(s) = snapshot.pending.iter().find(|s| s.index() >= site_count) {
            return Err(invalid(format!("unknown pending site {s:?}")));
        }

        diagram.last = resolve(snapshot.last, "walk start")?;
        diagram.vertices = vertices;
        diagram.pending = snapshot.pending;

        if diagram.last.is_none() && !diagram.vertices.is_empty() {
            diagram.last = diagram.any_vertex();
        }
        diagram.check_links()?;
        diagram.check_territory_cache()?;
        tracing::debug!(
            sites = diagram.sites.len(),
            vertices = diagram.vertices.len(),
            "restored diagram"
        );
        Ok(diagram)
    }

    /// Serializes the whole diagram to JSON.
    pub fn dump(&self) -> Result<String, DiagramError> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    /// Reads a diagram written by [`Diagram::dump`].
    pub fn restore(json: &str) -> Result<Self, DiagramError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagram {
        let mut d = Diagram::with_accuracy(
            BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            Accuracy::default(),
        )
        .unwrap();
        d.insert_random(50, 5);
        d
    }

    #[test]
    fn test_restored_diagram_answers_the_same_queries() {
        let d = sample();
        let restored = Diagram::restore(&d.dump().unwrap()).unwrap();
        assert_eq!(restored.point_count(), d.point_count());
        assert_eq!(restored.vertex_count(), d.vertex_count());
        assert_eq!(restored.hull_sites(), d.hull_sites());
        assert_eq!(restored.edges(), d.edges());
        for q in [[0.1, 0.2, 0.3], [0.9, 0.5, 0.5], [0.5, 0.5, 0.5]] {
            assert_eq!(restored.nearest_site(&q).unwrap(), d.nearest_site(&q).unwrap());
        }
    }

    #[test]
    fn test_restored_diagram_accepts_insertions() {
        let d = sample();
        let mut restored = Diagram::restore(&d.dump().unwrap()).unwrap();
        restored.insert([0.42, 0.17, 0.66]).unwrap();
        restored.check_links().unwrap();
        assert!(restored.delaunay_violations().is_empty());
    }

    #[test]
    fn test_empty_diagram_round_trips() {
        let d = Diagram::with_accuracy(BoundingBox::new([0.0; 3], [1.0; 3]), Accuracy::default()).unwrap();
        let restored = Diagram::restore(&d.dump().unwrap()).unwrap();
        assert!(!restored.exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_rejected() {
        let d = sample();
        let mut snapshot = d.to_snapshot();
        if let VertexRecord::Interior { neighbours, .. } | VertexRecord::Boundary { neighbours, .. } =
            &mut snapshot.vertices[0]
        {
            neighbours[0] = neighbours[1];
        }
        assert!(matches!(
            Diagram::from_snapshot(snapshot),
            Err(DiagramError::BrokenLink { .. })
        ));

        assert!(matches!(Diagram::restore("{ not json"), Err(DiagramError::Dump(_))));

        let mut snapshot = d.to_snapshot();
        snapshot.version = 99;
        assert!(matches!(
            Diagram::from_snapshot(snapshot),
            Err(DiagramError::InvalidSnapshot { .. })
        ));
    }
}
