pub mod exposure;
pub mod ranking;
