use crate::site::SiteId;
use crate::vertex::VertexKey;

/// Errors reported by diagram construction, insertion and queries.
///
/// A failed insertion never changes the diagram: the vertex graph and the
/// site registry are exactly as they were before the call.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// The diagram has no tetrahedron yet, so there is nothing to walk or query.
    #[error("diagram is empty: fewer than four non-coplanar sites have been inserted")]
    EmptyDiagram,

    #[error("point {point:?} lies outside the diagram bounds")]
    OutsideBounds { point: [f64; 3] },

    #[error("point {point:?} is not finite")]
    NonFinitePoint { point: [f64; 3] },

    /// The four sites of an initial tetrahedron are coplanar within tolerance.
    #[error("initial sites are coplanar within tolerance")]
    CoplanarSites,

    /// A cavity face would produce a flat or inverted tetrahedron with the new site.
    #[error("new site is coplanar with cavity face {face:?}, tetrahedron would be degenerate")]
    DegenerateTetrahedron { face: [Option<SiteId>; 3] },

    #[error("cavity is inconsistent: {reason}")]
    InconsistentCavity { reason: String },

    #[error("unknown site {0:?}")]
    UnknownSite(SiteId),

    #[error("vertex {vertex:?} lists {neighbour:?} across face {face}, but the link is not reciprocated")]
    BrokenLink {
        vertex: VertexKey,
        neighbour: VertexKey,
        face: usize,
    },

    #[error("dump failed: {0}")]
    Dump(#[from] serde_json::Error),

    #[error("snapshot is invalid: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("invalid value {value} for {name}")]
    InvalidParameter { name: &'static str, value: f64 },
}
