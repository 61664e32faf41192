//! Retrieval collaborators.
//!
//! Extraction results feed two consumers: a storage pipeline that embeds
//! chunks into a vector index, and a query pipeline that answers questions
//! from either the raw chunks or the index. The embedding, index and language
//! model backends are traits; HTTP clients for concrete providers live
//! outside this crate.
//!
//! Mutable state (credentials, query history, the current page context) is
//! held in explicit objects owned by the caller.

mod query;
mod service;
mod storage;

pub use query::{
    ContextTicket, PageContextSlot, QueryHistory, QueryPipeline, QueryRecord, QuerySettings,
    SourceRef, HISTORY_LIMIT,
};
pub use service::{
    explain_status, normalize_index_host, with_timeout, AnswerModel, Embedder, ServiceError,
    ServiceSettings, VectorIndex, VectorMatch, VectorMetadata, VectorRecord,
};
pub use storage::{StoragePipeline, StorageSettings, UploadOutcome};
