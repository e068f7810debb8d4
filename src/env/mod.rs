pub mod loader;
pub mod scan;
