//! WebGPU rendering module
//!
//! Reads simulation state only; nothing here feeds back into gameplay.

pub mod camera;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use camera::FollowCamera;
pub use pipeline::RenderState;
pub use vertex::Vertex;

/// Failures while bringing up the GPU
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no texture formats")]
    NoSurfaceFormat,
}
