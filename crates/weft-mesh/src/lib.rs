//! # weft-mesh
//!
//! Procedural cloth topology and solver-ready mesh descriptions.
//!
//! ## Key Types
//!
//! - [`ClothTopology`]: Raw output of the procedural generators.
//! - [`MeshDescription`]: Points, triangles/quads and per-point inverse mass
//!   handed to a physics backend for cooking, plus the parallel [`RenderMesh`].
//! - [`RenderMesh`]: SoA position/normal/UV buffers read by the renderer.
//! - [`Adjacency`]: Edge and wing-vertex queries used by fabric cooking.
//!
//! Flat-file ingestion of positions/indices lives in [`io`].

pub mod adjacency;
pub mod description;
pub mod generators;
pub mod io;
pub mod normals;
pub mod proxies;
pub mod render;
pub mod topology;

pub use adjacency::Adjacency;
pub use description::{IndexBuffer, MeshDescription, PositionBuffer};
pub use generators::{generate_cylinder, generate_plane, CylinderDesc, PlaneDesc};
pub use render::RenderMesh;
pub use topology::ClothTopology;
