pub mod color;
pub mod label;
pub mod pie;
pub mod search;
pub mod styles;
