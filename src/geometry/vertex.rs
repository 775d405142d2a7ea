// ============================================
// Belt Vertex - Вершины ленты для рендера
// ============================================
// Формат как у вершин чанков: #[repr(C)] + Pod, чтобы буфер можно было
// отдать в GPU без копирования.

use bytemuck::{Pod, Zeroable};
use ultraviolet::Vec3;

use super::edges::BeltEdges;

/// Вершина ленты в мировых координатах
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BeltVertex {
    pub position: [f32; 3],
    /// Координата текстуры вдоль ленты (анимация сдвигает её)
    pub tex: f32,
    /// +1 для верхней ветви, -1 для нижней
    pub normal_z: f32,
}

impl BeltVertex {
    pub fn new(position: Vec3, tex: f32, normal_z: f32) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            tex,
            normal_z,
        }
    }
}

/// Полосы треугольников верхней и нижней ветви одного блока
#[derive(Debug, Clone, Default)]
pub struct BeltMesh {
    pub top: Vec<BeltVertex>,
    pub bottom: Vec<BeltVertex>,
}

impl BeltMesh {
    /// Чередует левую и правую кромки: L0 R0 L1 R1 ...
    /// `to_world` переводит локальную точку блока в мир.
    pub fn from_edges(edges: &BeltEdges, to_world: impl Fn(Vec3) -> Vec3) -> Self {
        let strip = |left: &[Vec3], right: &[Vec3], tex: &[f32], normal_z: f32| {
            let mut out = Vec::with_capacity(left.len() * 2);
            for ((l, r), t) in left.iter().zip(right).zip(tex) {
                out.push(BeltVertex::new(to_world(*l), *t, normal_z));
                out.push(BeltVertex::new(to_world(*r), *t, normal_z));
            }
            out
        };
        Self {
            top: strip(&edges.top_left, &edges.top_right, &edges.top_tex, 1.0),
            bottom: strip(&edges.bottom_left, &edges.bottom_right, &edges.bottom_tex, -1.0),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.top.len() + self.bottom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.bottom.is_empty()
    }

    pub fn top_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.top)
    }

    pub fn bottom_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BeltGeometry, BeltShape, NeighborLinks, DEFAULT_BEND_SEGMENTS};

    #[test]
    fn test_strip_interleaves_edges() {
        let edges = BeltGeometry::edges(BeltShape::Flat, NeighborLinks::BOTH, DEFAULT_BEND_SEGMENTS);
        let offset = Vec3::new(2.0, 3.0, 0.25);
        let mesh = BeltMesh::from_edges(&edges, |p| p + offset);

        assert_eq!(mesh.top.len(), 4);
        assert_eq!(mesh.top[0].position, [1.625, 2.5, 0.625]);
        assert_eq!(mesh.top[1].position, [2.375, 2.5, 0.625]);
        assert_eq!(mesh.top[2].tex, 8.0);
        assert!(mesh.bottom.iter().all(|v| v.normal_z == -1.0));
    }

    #[test]
    fn test_bytes_layout() {
        assert_eq!(std::mem::size_of::<BeltVertex>(), 20);
        let edges = BeltGeometry::edges(BeltShape::BendLeft, NeighborLinks::NONE, 4);
        let mesh = BeltMesh::from_edges(&edges, |p| p);
        assert_eq!(mesh.top_bytes().len(), mesh.top.len() * 20);
        assert_eq!(mesh.bottom_bytes().len(), mesh.bottom.len() * 20);
        assert_eq!(mesh.vertex_count(), mesh.top.len() + mesh.bottom.len());
        assert!(!mesh.is_empty());
    }
}
