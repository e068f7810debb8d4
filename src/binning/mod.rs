pub mod binner;
pub mod table;
