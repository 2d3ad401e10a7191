pub mod datetime;
pub mod labradar;
pub mod loader;
pub mod magnetospeed;
pub mod parser;
