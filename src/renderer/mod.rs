//! WebGPU rendering module
//!
//! Draws flat-colored triangles in logical canvas space (600x400, y down).
//! Text lives in the DOM HUD, not here.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::scene_vertices;
pub use vertex::Vertex;
