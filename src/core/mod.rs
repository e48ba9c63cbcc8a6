pub mod entity;
pub mod error;
pub mod index;
pub mod leg;
pub mod trade;
