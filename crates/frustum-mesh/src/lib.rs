//! # frustum-mesh
//!
//! Host-side triangle meshes and the ways to obtain one.
//!
//! ## Key Types
//!
//! - [`Mesh`]: Positions plus triangle indices, validated and uploadable
//!   into a device [`DynamicMatrix`](frustum_math::DynamicMatrix).
//! - [`obj`]: Wavefront OBJ reader (vertices and faces only).
//! - [`generators`]: Built-in shapes used when no mesh file is given.

pub mod generators;
pub mod mesh;
pub mod obj;

pub use mesh::Mesh;
