//! # frustum-render
//!
//! Everything between a loaded mesh and a list of screen triangles.
//!
//! Provides the [`Camera`], the fixed [`Projection`] transforms, the
//! [`Object3D`] pipeline, a [`FrameLoop`] that drives them, and a
//! pluggable [`Renderer`] trait with a [`HeadlessRenderer`] stub and a
//! [`JsonFrameExporter`].

pub mod camera;
pub mod config;
pub mod frame_loop;
pub mod json_exporter;
pub mod object;
pub mod projection;
pub mod renderer;

pub use camera::{Camera, CameraMotion};
pub use config::RendererConfig;
pub use frame_loop::FrameLoop;
pub use json_exporter::{ExportData, JsonFrameExporter};
pub use object::{face_color, Object3D, ScreenFrame, ScreenTriangle};
pub use projection::Projection;
pub use renderer::{HeadlessRenderer, Renderer};
