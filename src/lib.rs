pub mod annotate;
pub mod assets;
pub mod io;
pub mod metadata;
pub mod render;
pub mod scalebar;
pub mod tooltip;
pub mod tree;
