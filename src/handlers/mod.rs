pub mod operators;
pub mod public;
