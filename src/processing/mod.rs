pub mod statistics;
pub mod transforms;
