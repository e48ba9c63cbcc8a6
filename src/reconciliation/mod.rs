pub mod dedup;
pub mod enrichment;
pub mod legs;
