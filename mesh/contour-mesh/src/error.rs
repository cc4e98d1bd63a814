//! Error types for half-edge mesh operations.

use thiserror::Error;

/// Errors that can occur while building or editing a half-edge mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A triangle referenced a vertex index outside the soup.
    #[error("triangle references vertex {index} but only {vertex_count} vertices exist")]
    InvalidIndex {
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices available.
        vertex_count: usize,
    },

    /// The mesh connectivity violated a structural invariant.
    #[error("corrupt topology: {details}")]
    CorruptTopology {
        /// Description of the violated invariant.
        details: String,
    },
}

/// Result alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
