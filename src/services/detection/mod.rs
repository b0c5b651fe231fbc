// Detection Module
// Verbatim-overlap checking organized into:
// - prober: concurrent exact-phrase lookups, one per sentence
// - aggregation: document score and presentation band
// - pipeline: segment -> probe -> aggregate

pub mod aggregation;
pub mod pipeline;
pub mod prober;

pub use aggregation::{aggregate_verdicts, compute_score};
pub use pipeline::check_originality;
pub use prober::{classify, exact_phrase_query, OriginalityProber};
