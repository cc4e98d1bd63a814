//! Half-edge mesh refinement for extracted contour surfaces.
//!
//! This crate turns a welded triangle soup into an editable half-edge
//! mesh and provides the refinement passes that prepare it for
//! simulation:
//!
//! - **Stitching**: [`Mesh::from_soup`] builds half-edge connectivity
//!   from shared vertex indices, pairing interior edges and leaving
//!   boundary edges self-paired.
//! - **Subdivision**: [`Mesh::subdivide`] splits coarse edges at their
//!   midpoints until nothing is marked or refinement stalls.
//! - **Melting**: [`Mesh::edge_melt`] collapses the shortest edges below
//!   a threshold, coarsening oversampled regions.
//! - **Validation**: [`Mesh::check_topology`] recomputes normals, merges
//!   near-duplicate vertices, and reports winding and duplicate-face
//!   defects.
//! - **Relaxation forces**: [`Mesh::compute_bins`] accumulates pairwise
//!   repulsion between nearby vertices through a coarse spatial binning.
//!
//! Mesh elements live in generational arenas: handles returned from one
//! editing pass are invalidated by deletion and cannot silently alias a
//! recycled slot.
//!
//! # Example
//!
//! ```
//! use contour_mesh::Mesh;
//! use contour_types::{Point3, TriangleSoup};
//!
//! let soup = TriangleSoup::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//! let mut mesh = Mesh::from_soup(&soup)?;
//! let created = mesh.subdivide(0.75)?;
//! assert!(created > 0);
//! # Ok::<(), contour_mesh::MeshError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

mod arena;
mod bins;
mod error;
mod melt;
mod mesh;
mod subdivide;
mod topology;

pub use arena::{Arena, ArenaKey, EdgeId, FaceId, VertexId};
pub use error::{MeshError, MeshResult};
pub use mesh::{HalfEdge, Mesh, MeshFace, MeshVertex};
pub use topology::TopologyReport;

// Re-exported geometry types used in the public API
pub use nalgebra::{Point3, Vector3};
