// ============================================
// Shape Factory - Кэш коллайдеров конвейера
// ============================================
// Форма блока зависит только от вида ленты, ориентации, соседей и крыши,
// поэтому одинаковые блоки делят один SharedShape (Arc внутри).

use std::collections::HashMap;

use rapier3d::prelude::*;
use ultraviolet::Vec3;

use crate::blocks::Orientation;
use crate::geometry::{BeltEdges, BeltGeometry, BeltShape, Hexahedron, HullBuilder, NeighborLinks, HALF_BLOCK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ShapeKey {
    shape: BeltShape,
    orientation: Orientation,
    links: NeighborLinks,
    roof: bool,
}

/// Составные формы конвейерных блоков
pub struct ShapeFactory {
    segments: u32,
    cache: HashMap<ShapeKey, SharedShape>,
}

impl ShapeFactory {
    pub fn new(segments: u32) -> Self {
        Self {
            segments,
            cache: HashMap::new(),
        }
    }

    /// Лента + корпус (+ крыша) одним составным коллайдером,
    /// в мировых осях относительно основания ячейки
    pub fn conveyor(&mut self, shape: BeltShape, orientation: Orientation, links: NeighborLinks, roof: bool) -> SharedShape {
        let key = ShapeKey { shape, orientation, links, roof };
        let segments = self.segments;
        self.cache
            .entry(key)
            .or_insert_with(|| build_conveyor(key, segments))
            .clone()
    }

    /// Опора: сплошной куб на всю ячейку
    pub fn support() -> SharedShape {
        SharedShape::cuboid(HALF_BLOCK, HALF_BLOCK, HALF_BLOCK)
    }

    /// Форм в кэше
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn to_point(orientation: Orientation, p: Vec3) -> Point<Real> {
    let p = orientation.rotate_point(p);
    point![p.x, p.y, p.z]
}

fn hull_of(orientation: Orientation, points: impl Iterator<Item = Vec3>) -> Option<SharedShape> {
    let points: Vec<Point<Real>> = points.map(|p| to_point(orientation, p)).collect();
    SharedShape::convex_hull(&points)
}

/// Ленту рампы нельзя брать одной выпуклой оболочкой: излом профиля
/// у валиков срезался бы хордой. Такую ленту режем на плиты по сегментам
/// кромок; нижняя кромка идёт в обратном порядке.
fn belt_slabs(orientation: Orientation, edges: &BeltEdges) -> Vec<SharedShape> {
    let n = edges.top_left.len().min(edges.bottom_left.len());
    (0..n.saturating_sub(1))
        .filter_map(|i| {
            let (j, k) = (n - 1 - i, n - 2 - i);
            let points = [
                edges.top_left[i],
                edges.top_left[i + 1],
                edges.top_right[i],
                edges.top_right[i + 1],
                edges.bottom_left[j],
                edges.bottom_left[k],
                edges.bottom_right[j],
                edges.bottom_right[k],
            ];
            hull_of(orientation, points.into_iter())
        })
        .collect()
}

fn build_conveyor(key: ShapeKey, segments: u32) -> SharedShape {
    let edges = BeltGeometry::edges(key.shape, key.links, segments);
    let mut pieces: Vec<Hexahedron> = HullBuilder::hull(key.shape, segments);
    if key.roof {
        pieces.extend(HullBuilder::roof(key.shape));
    }

    let mut parts = Vec::with_capacity(pieces.len() + 1);
    if key.shape.is_ramp() {
        parts.extend(belt_slabs(key.orientation, &edges).into_iter().map(|slab| (Isometry::identity(), slab)));
    } else if let Some(belt) = hull_of(key.orientation, edges.all_points().copied()) {
        parts.push((Isometry::identity(), belt));
    }
    for piece in &pieces {
        match hull_of(key.orientation, piece.corners.iter().copied()) {
            Some(hull) => parts.push((Isometry::identity(), hull)),
            None => log::warn!("degenerate hull piece for {:?}", key.shape),
        }
    }
    log::debug!(
        "conveyor shape {:?}/{:?} links {:?} roof {}: {} parts",
        key.shape,
        key.orientation,
        key.links,
        key.roof,
        parts.len()
    );
    SharedShape::compound(parts)
}
