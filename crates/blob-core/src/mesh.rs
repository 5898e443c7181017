//! Sphere mesh the displacement engine deforms every frame.
//!
//! The base (undisplaced) positions are kept alongside the current vertex
//! buffer so displacement is always computed from the original shape rather
//! than accumulating error frame over frame.

use glam::Vec3;

/// Interleaved vertex layout shared with both renderers.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

pub struct BlobMesh {
    base: Vec<Vec3>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl BlobMesh {
    /// Build a UV sphere. Rows run pole to pole; each row holds
    /// `width_segments + 1` vertices with a duplicated seam column.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let w = width_segments.max(3);
        let h = height_segments.max(2);

        let mut base = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
        let mut vertices = Vec::with_capacity(base.capacity());
        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let theta = v * std::f32::consts::PI;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * std::f32::consts::TAU;
                let p = Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                base.push(p);
                vertices.push(Vertex {
                    position: p.to_array(),
                    normal: (p / radius.max(f32::EPSILON)).to_array(),
                });
            }
        }

        // Two triangles per grid cell, collapsing the degenerate cells at the
        // poles to a single triangle.
        let mut indices = Vec::with_capacity((w * h * 6) as usize);
        let row = w + 1;
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            base,
            vertices,
            indices,
        }
    }

    pub fn base_positions(&self) -> &[Vec3] {
        &self.base
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn set_position(&mut self, i: usize, p: Vec3) {
        self.vertices[i].position = p.to_array();
    }

    /// Flat recomputation of vertex normals from the current positions:
    /// accumulate area-weighted face normals, then normalize.
    pub fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from(self.vertices[a].position);
            let pb = Vec3::from(self.vertices[b].position);
            let pc = Vec3::from(self.vertices[c].position);
            let face = (pb - pa).cross(pc - pa);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }
        for (vertex, n) in self.vertices.iter_mut().zip(accum) {
            // Degenerate fans (zero area) keep their previous normal.
            if n.length_squared() > f32::EPSILON {
                vertex.normal = n.normalize().to_array();
            }
        }
    }
}
