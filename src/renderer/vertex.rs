//! Vertex types for 3D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Lit vertex with position, normal and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scene elements that don't come from a level palette
pub mod colors {
    pub const SHIP_HULL: [f32; 4] = [0.85, 0.85, 0.9, 1.0];
    pub const SHIP_COCKPIT: [f32; 4] = [0.2, 0.6, 1.0, 1.0];
    pub const SHIP_ENGINE: [f32; 4] = [1.0, 0.5, 0.1, 1.0];
    pub const TUNNEL_SHELL: [f32; 4] = [0.35, 0.35, 0.45, 1.0];
    /// Finish line stripe past the last row
    pub const FINISH: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.06, 1.0];
}
