pub mod comparison;
pub(crate) mod draw;
pub mod group;
pub mod style;
