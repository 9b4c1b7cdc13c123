//! WebGPU rendering module
//!
//! Uses SDF (Signed Distance Fields) raymarched in the fragment shader.

pub mod scene;
pub mod sdf_pipeline;

pub use scene::{ModelCache, SceneData};
pub use sdf_pipeline::SdfRenderState;
