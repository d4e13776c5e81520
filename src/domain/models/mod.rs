pub mod delivery;
pub mod payload;
pub mod probe;
