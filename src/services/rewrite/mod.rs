// Rewrite Module
// - engine: six-layer local rewriter
// - hybrid: primary service with engine and static fallbacks
// - resources / focus_rules / random: shared tables and the random seam

pub mod engine;
pub mod focus_rules;
pub mod hybrid;
pub mod random;
pub mod resources;

pub use engine::{FallbackRewriter, RewriteEngine, RewriteError, RewriteLayer, ENGINE_SUFFIX};
pub use hybrid::{static_fallback, HybridRewriter, PRIMARY_SUFFIX};
pub use random::{RandomSource, RngSource};
