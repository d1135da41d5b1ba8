//! # voroinc
//!
//! `voroinc` is a Rust library for incremental 3D Delaunay triangulations and their dual
//! Voronoi diagrams, designed to be used in Rust as well as compiled to WebAssembly (WASM).
//! Sites are inserted one at a time; each insertion rebuilds only the cavity of tetrahedra
//! whose circumsphere the new site violates.
//!
//! ## Features
//!
//! - **Incremental**: Bowyer-Watson insertion with a face-crossing walk for point location.
//! - **Queries**: nearest site, neighbouring sites, the territory (Voronoi cell) of a site and
//!   the contiguity (shared boundary) of two sites.
//! - **Tolerant**: a configurable accuracy decides coincidence, coplanarity and in-sphere ties;
//!   failed insertions leave the diagram untouched.
//! - **Solid sampling**: populate a diagram from the boundary of a solid (sphere, cuboid,
//!   cylinder, torus, half-space or their intersection).
//! - **WASM-first**: Built with `wasm-bindgen` for integration with JavaScript and TypeScript.
//!
//! ## Example
//!
//! ```
//! use voroinc::{BoundingBox, Diagram};
//!
//! let mut diagram = Diagram::new(BoundingBox::new([0.0; 3], [1.0; 3])).unwrap();
//! for p in [[0.1, 0.1, 0.1], [0.9, 0.1, 0.1], [0.1, 0.9, 0.1], [0.1, 0.1, 0.9], [0.5, 0.5, 0.5]] {
//!     diagram.insert(p).unwrap();
//! }
//! let centre = diagram.nearest_site(&[0.45, 0.5, 0.55]).unwrap();
//! assert_eq!(diagram.neighbours(centre).unwrap().len(), 4);
//! ```
//!
//! See the `demos/` directory for SVG plotting and solid sampling.
//!
//! ## Main Interface
//!
//! The primary entry point is the [`Diagram`] struct, which owns the sites and vertices.

pub mod accuracy;
mod bounds;
mod diagram;
pub mod dump;
mod error;
pub mod geometry;
mod site;
pub mod solid;
mod traversal;
mod vertex;
pub mod wasm;

pub use accuracy::{Accuracy, DEFAULT_ACCURACY, get_accuracy, set_accuracy};
pub use bounds::BoundingBox;
pub use diagram::{Diagram, Location, VertexView};
pub use dump::Snapshot;
pub use error::DiagramError;
pub use site::{OwnerTag, Site, SiteFlags, SiteId};
pub use solid::geometries::{CuboidSolid, CylinderSolid, HalfSpaceSolid, Intersection, SphereSolid, TorusSolid};
pub use solid::{SampleOptions, Solid, sample_solid};
pub use traversal::{Marks, flood};
pub use vertex::{Corners, Vertex, VertexKey, VertexKind};
pub use wasm::DiagramWasm;
