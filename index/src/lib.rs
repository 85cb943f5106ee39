//! Nearest-neighbor text index over fixed-size overlapping chunks of a
//! source document, cached by content fingerprint so repeated startups
//! against an unchanged document skip the expensive embedding pass.

pub mod cache;
pub mod chunker;
pub mod errors;
pub mod store;

pub use cache::{fingerprint, load_cached, load_or_build, store_cached};
pub use chunker::chunk_text;
pub use errors::{IndexError, IndexResult};
pub use store::{cosine_similarity, IndexedChunk, VectorIndex};
