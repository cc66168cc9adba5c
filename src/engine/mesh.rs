// 2D triangle-mesh assembly for the map layers.
//
// Everything the map draws is flat-colored triangles: thick polylines
// (river, roads), rotated quads (buildings, parks, backdrop grid), and
// discs (traffic dots, round line joins). One MeshBuilder per layer,
// uploaded as a single vertex/index buffer pair.

use glam::Vec2;

/// GPU-ready vertex: world-space position plus straight-alpha color.
///   @location(0) position: vec2<f32>
///   @location(1) color:    vec4<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl GpuVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Disc tessellation resolution.
const DISC_SEGMENTS: u32 = 16;

#[derive(Default)]
pub struct MeshBuilder {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Cast vertex slice to raw bytes for wgpu buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Cast index slice to raw bytes for wgpu buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn push_vertex(&mut self, position: Vec2, color: [f32; 4]) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(GpuVertex {
            position: position.to_array(),
            color,
        });
        idx
    }

    /// Two triangles over four corners given in winding order.
    pub fn push_quad(&mut self, corners: [Vec2; 4], color: [f32; 4]) {
        let base = self.push_vertex(corners[0], color);
        self.push_vertex(corners[1], color);
        self.push_vertex(corners[2], color);
        self.push_vertex(corners[3], color);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Axis-aligned w x h rectangle rotated by `angle` about `center`.
    pub fn push_rect(&mut self, center: Vec2, size: Vec2, angle: f32, color: [f32; 4]) {
        let (s, c) = angle.sin_cos();
        let h = size / 2.0;
        let rot = |p: Vec2| center + Vec2::new(p.x * c - p.y * s, p.x * s + p.y * c);
        self.push_quad(
            [
                rot(Vec2::new(-h.x, -h.y)),
                rot(Vec2::new(h.x, -h.y)),
                rot(Vec2::new(h.x, h.y)),
                rot(Vec2::new(-h.x, h.y)),
            ],
            color,
        );
    }

    /// Triangle-fan disc.
    pub fn push_disc(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let center_idx = self.push_vertex(center, color);
        let first = self.vertices.len() as u32;
        for i in 0..DISC_SEGMENTS {
            let a = i as f32 / DISC_SEGMENTS as f32 * std::f32::consts::TAU;
            self.push_vertex(center + Vec2::from_angle(a) * radius, color);
        }
        for i in 0..DISC_SEGMENTS {
            let next = (i + 1) % DISC_SEGMENTS;
            self.indices
                .extend_from_slice(&[center_idx, first + i, first + next]);
        }
    }

    /// Single thick line segment as a quad.
    pub fn push_segment(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        let dir = b - a;
        let len = dir.length();
        if len <= f32::EPSILON {
            return;
        }
        let n = Vec2::new(-dir.y, dir.x) / len * (width / 2.0);
        self.push_quad([a - n, b - n, b + n, a + n], color);
    }

    /// Thick polyline with round joins and caps: one quad per segment
    /// plus a disc at every point.
    pub fn push_polyline(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        if points.len() < 2 {
            return;
        }
        for pair in points.windows(2) {
            self.push_segment(pair[0], pair[1], width, color);
        }
        for p in points {
            self.push_disc(*p, width / 2.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn quad_tessellates_to_two_triangles() {
        let mut mesh = MeshBuilder::new();
        mesh.push_quad(
            [
                Vec2::ZERO,
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            WHITE,
        );
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.index_count(), 6);
    }

    #[test]
    fn degenerate_segment_is_skipped() {
        let mut mesh = MeshBuilder::new();
        mesh.push_segment(Vec2::ONE, Vec2::ONE, 4.0, WHITE);
        assert!(mesh.is_empty());
    }

    #[test]
    fn polyline_needs_two_points() {
        let mut mesh = MeshBuilder::new();
        mesh.push_polyline(&[Vec2::ZERO], 4.0, WHITE);
        assert!(mesh.is_empty());

        mesh.push_polyline(&[Vec2::ZERO, Vec2::new(10.0, 0.0)], 4.0, WHITE);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn rect_rotation_moves_corners() {
        let mut a = MeshBuilder::new();
        let mut b = MeshBuilder::new();
        a.push_rect(Vec2::ZERO, Vec2::new(10.0, 2.0), 0.0, WHITE);
        b.push_rect(Vec2::ZERO, Vec2::new(10.0, 2.0), 1.0, WHITE);
        assert_ne!(a.vertices[0].position, b.vertices[0].position);
    }

    #[test]
    fn byte_lengths_match_counts() {
        let mut mesh = MeshBuilder::new();
        mesh.push_disc(Vec2::ZERO, 3.0, WHITE);
        assert_eq!(
            mesh.vertex_bytes().len(),
            mesh.vertices.len() * std::mem::size_of::<GpuVertex>()
        );
        assert_eq!(mesh.index_bytes().len(), mesh.indices.len() * 4);
    }
}
