//! Vector index clients for docrag.
//!
//! The index is an external nearest-neighbor service behind the
//! [`docrag_core::VectorIndex`] trait. Two implementations:
//!
//! - [`QdrantIndex`]: the production boundary, a thin REST client over a
//!   Qdrant collection (cosine distance, payload-filtered search).
//! - [`MemoryIndex`]: brute-force cosine scan for tests and development.
//!
//! Multi-document filters are logical OR everywhere: a hit matches when its
//! `document_id` equals any id in the filter set.

pub mod memory;
pub mod qdrant;

pub use memory::MemoryIndex;
pub use qdrant::QdrantIndex;
