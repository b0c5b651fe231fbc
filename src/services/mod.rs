// OriginCheck Core Services

pub mod text_processor;
pub mod config_store;
pub mod providers;
pub mod detection;
pub mod document;
pub mod rewrite;
pub mod sentence_segmenter;

pub use text_processor::*;
pub use config_store::*;
pub use providers::*;
pub use sentence_segmenter::*;

pub use detection::{aggregate_verdicts, check_originality, compute_score, OriginalityProber};
pub use document::extract_document_text;
pub use rewrite::{FallbackRewriter, HybridRewriter, RewriteEngine, RewriteError};
