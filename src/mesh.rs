use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use thiserror::Error;

/// Vertex layout uploaded to the GPU: position followed by color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("mesh has {positions} positions but {colors} colors")]
    ColorCountMismatch { positions: usize, colors: usize },
    #[error("mesh vertex count {0} is not a multiple of three")]
    IncompleteTriangle(usize),
}

/// Immutable triangle list with one color per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, colors: Vec<Vec3>) -> Result<Self, MeshError> {
        if positions.len() != colors.len() {
            return Err(MeshError::ColorCountMismatch {
                positions: positions.len(),
                colors: colors.len(),
            });
        }
        if positions.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(positions.len()));
        }
        Ok(Self { positions, colors })
    }

    /// The twelve-triangle shape drawn by the demo, flat shaded per triangle.
    pub fn colored_cube() -> Self {
        let positions = CUBE_POSITIONS.iter().copied().map(Vec3::from_array).collect();
        let colors = CUBE_TRIANGLE_COLORS
            .iter()
            .flat_map(|color| [Vec3::from_array(*color); 3])
            .collect();
        Self { positions, colors }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Interleaves positions and colors into the GPU vertex layout.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(position, color)| Vertex {
                position: position.to_array(),
                color: color.to_array(),
            })
            .collect()
    }
}

const CUBE_POSITIONS: [[f32; 3]; 36] = [
    [-1.0, -1.0, -1.0],
    [0.0, 0.0, -1.0],
    [0.0, 1.0, -1.0],
    //
    [0.0, 0.0, -1.0],
    [1.0, -1.0, -1.0],
    [0.0, 1.0, -1.0],
    //
    [-1.0, -1.0, 1.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    //
    [0.0, 0.0, 1.0],
    [1.0, -1.0, 1.0],
    [0.0, 1.0, 1.0],
    //
    [-1.0, -1.0, -1.0],
    [0.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    //
    [0.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [0.0, 1.0, 1.0],
    //
    [-1.0, -1.0, -1.0],
    [0.0, 0.0, -1.0],
    [-1.0, -1.0, 1.0],
    //
    [0.0, 0.0, -1.0],
    [-1.0, -1.0, 1.0],
    [0.0, 0.0, 1.0],
    //
    [0.0, 0.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    //
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [1.0, -1.0, 1.0],
    //
    [1.0, -1.0, -1.0],
    [0.0, 1.0, -1.0],
    [1.0, -1.0, 1.0],
    //
    [0.0, 1.0, -1.0],
    [1.0, -1.0, 1.0],
    [0.0, 1.0, 1.0],
];

const CUBE_TRIANGLE_COLORS: [[f32; 3]; 12] = [
    [0.588, 1.0, 0.506],
    [0.588, 1.0, 0.506],
    [0.196, 0.803, 0.196],
    [0.196, 0.803, 0.196],
    [0.498, 1.0, 0.831],
    [0.0, 0.980, 0.604],
    [0.678, 1.0, 0.184],
    [0.437, 0.902, 0.190],
    [0.678, 1.0, 0.184],
    [0.437, 0.902, 0.190],
    [0.498, 1.0, 0.831],
    [0.0, 0.980, 0.604],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_twelve_flat_triangles() {
        let mesh = Mesh::colored_cube();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.triangle_count(), 12);
        for triangle in mesh.colors().chunks(3) {
            assert_eq!(triangle[0], triangle[1]);
            assert_eq!(triangle[1], triangle[2]);
        }
    }

    #[test]
    fn cube_fits_in_unit_box() {
        let mesh = Mesh::colored_cube();
        assert!(mesh
            .positions()
            .iter()
            .all(|p| p.abs().max_element() <= 1.0));
    }

    #[test]
    fn vertices_interleave_position_and_color() {
        let mesh = Mesh::colored_cube();
        let vertices = mesh.vertices();
        assert_eq!(vertices.len(), 36);
        assert_eq!(vertices[0].position, [-1.0, -1.0, -1.0]);
        assert_eq!(vertices[0].color, [0.588, 1.0, 0.506]);
        assert_eq!(vertices[35].position, [0.0, 1.0, 1.0]);
        assert_eq!(vertices[35].color, [0.0, 0.980, 0.604]);
        assert_eq!(
            bytemuck::cast_slice::<Vertex, u8>(&vertices).len(),
            36 * std::mem::size_of::<[f32; 6]>()
        );
    }

    #[test]
    fn mismatched_tables_are_rejected() {
        let err = Mesh::new(vec![Vec3::ZERO; 3], vec![Vec3::ONE; 2]).unwrap_err();
        assert_eq!(
            err,
            MeshError::ColorCountMismatch {
                positions: 3,
                colors: 2
            }
        );
        let err = Mesh::new(vec![Vec3::ZERO; 4], vec![Vec3::ONE; 4]).unwrap_err();
        assert_eq!(err, MeshError::IncompleteTriangle(4));
    }

    #[test]
    fn valid_tables_are_accepted() {
        let mesh = Mesh::new(vec![Vec3::X, Vec3::Y, Vec3::Z], vec![Vec3::ONE; 3]).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }
}
