// ============================================
// Belt Edges - Кромки видимой ленты
// ============================================
// Путь кромки: задний конец -> дуга поворота -> передний конец.
// Конец без соседа огибает валик, конец с соседом обрезается ровно
// по границе ячейки. Количество точек не зависит от стороны, чтобы
// левую и правую кромку можно было склеить в полосу треугольников.

use std::f32::consts::{FRAC_PI_2, PI};
use ultraviolet::Vec3;

use crate::blocks::Orientation;
use super::arc::{push_xy_arc, push_yz_arc};
use super::shape::{BeltShape, NeighborLinks, Turn};
use super::{BELT_HALF_WIDTH, CAP_SEGMENTS, HALF_BLOCK, ROLLER_OFFSET, ROLLER_RADIUS, TEXTURE_SCALE, Z_DELTA};

/// Боковая кромка ленты
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn lateral(self) -> f32 {
        match self {
            Side::Left => -BELT_HALF_WIDTH,
            Side::Right => BELT_HALF_WIDTH,
        }
    }
}

/// Верхняя (несущая) или нижняя (обратная) ветвь ленты
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strand {
    Top,
    Bottom,
}

impl Strand {
    fn sign(self) -> f32 {
        match self {
            Strand::Top => 1.0,
            Strand::Bottom => -1.0,
        }
    }

    /// Углы огибания заднего валика (от торца к верху/низу)
    fn back_cap(self) -> (f32, f32) {
        match self {
            Strand::Top => (PI, FRAC_PI_2),
            Strand::Bottom => (PI, 3.0 * FRAC_PI_2),
        }
    }

    fn front_cap(self) -> (f32, f32) {
        match self {
            Strand::Top => (FRAC_PI_2, 0.0),
            Strand::Bottom => (3.0 * FRAC_PI_2, 2.0 * PI),
        }
    }
}

/// Все кромки и текстурные координаты одного блока
#[derive(Debug, Clone, PartialEq)]
pub struct BeltEdges {
    pub top_left: Vec<Vec3>,
    pub top_right: Vec<Vec3>,
    pub top_tex: Vec<f32>,
    pub bottom_left: Vec<Vec3>,
    pub bottom_right: Vec<Vec3>,
    pub bottom_tex: Vec<f32>,
}

impl BeltEdges {
    /// Все точки (для выпуклой оболочки ленты)
    pub fn all_points(&self) -> impl Iterator<Item = &Vec3> {
        self.top_left
            .iter()
            .chain(&self.top_right)
            .chain(&self.bottom_left)
            .chain(&self.bottom_right)
    }
}

/// Генератор геометрии ленты
pub struct BeltGeometry;

impl BeltGeometry {
    /// Верхняя кромка: от заднего конца к переднему
    pub fn top_edge(shape: BeltShape, side: Side, links: NeighborLinks, segments: u32) -> Vec<Vec3> {
        edge_path(shape, side.lateral(), Strand::Top, links, segments)
    }

    /// Нижняя кромка: от переднего конца к заднему
    pub fn bottom_edge(shape: BeltShape, side: Side, links: NeighborLinks, segments: u32) -> Vec<Vec3> {
        let mut path = edge_path(shape, side.lateral(), Strand::Bottom, links, segments);
        path.reverse();
        path
    }

    /// Текстурные координаты верхней ветви, индекс в индекс с кромками
    pub fn top_texture(shape: BeltShape, links: NeighborLinks, segments: u32) -> Vec<f32> {
        Self::texture_progression(&edge_path(shape, 0.0, Strand::Top, links, segments))
    }

    pub fn bottom_texture(shape: BeltShape, links: NeighborLinks, segments: u32) -> Vec<f32> {
        let mut center = edge_path(shape, 0.0, Strand::Bottom, links, segments);
        center.reverse();
        Self::texture_progression(&center)
    }

    /// Накопленная длина полилинии × TEXTURE_SCALE
    pub fn texture_progression(points: &[Vec3]) -> Vec<f32> {
        let mut length = 0.0;
        let mut texs = Vec::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                length += (*p - points[i - 1]).mag();
            }
            texs.push(length * TEXTURE_SCALE);
        }
        texs
    }

    /// Полный набор кромок блока
    pub fn edges(shape: BeltShape, links: NeighborLinks, segments: u32) -> BeltEdges {
        BeltEdges {
            top_left: Self::top_edge(shape, Side::Left, links, segments),
            top_right: Self::top_edge(shape, Side::Right, links, segments),
            top_tex: Self::top_texture(shape, links, segments),
            bottom_left: Self::bottom_edge(shape, Side::Left, links, segments),
            bottom_right: Self::bottom_edge(shape, Side::Right, links, segments),
            bottom_tex: Self::bottom_texture(shape, links, segments),
        }
    }
}

/// Путь кромки с боковым смещением `lateral` от заднего конца к переднему
fn edge_path(shape: BeltShape, lateral: f32, strand: Strand, links: NeighborLinks, segments: u32) -> Vec<Vec3> {
    assert!(segments >= 1, "bend needs at least one segment");
    let (back_c, front_c) = shape.roller_centers();
    let offset = strand.sign() * ROLLER_RADIUS;
    let mut path = Vec::new();

    // Задний конец
    if links.upstream || shape.squared_back() {
        let inset = if shape.squared_back() { 2.0 * Z_DELTA } else { 0.0 };
        path.push(Vec3::new(lateral, -HALF_BLOCK + inset, back_c + offset));
        // У рампы ровный участок до валика, дальше подъём
        if shape.is_ramp() {
            path.push(Vec3::new(lateral, -ROLLER_OFFSET, back_c + offset));
        }
    } else {
        let (from, to) = strand.back_cap();
        push_yz_arc(&mut path, lateral, -ROLLER_OFFSET, back_c, ROLLER_RADIUS, from, to, CAP_SEGMENTS);
    }

    // Дуга поворота вокруг внутреннего угла
    let z = back_c + offset;
    match shape.turn() {
        Turn::Straight => {}
        Turn::Right => {
            let (cx, cy) = (ROLLER_OFFSET, -ROLLER_OFFSET);
            push_xy_arc(&mut path, cx, cy, z, (lateral - cx).abs(), PI, FRAC_PI_2, segments);
        }
        Turn::Left => {
            let (cx, cy) = (-ROLLER_OFFSET, -ROLLER_OFFSET);
            push_xy_arc(&mut path, cx, cy, z, (lateral - cx).abs(), 0.0, FRAC_PI_2, segments);
        }
    }

    // Передний конец строится как у прямой ленты и поворачивается в сторону выхода
    let mut front = Vec::new();
    if links.downstream || shape.squared_front() {
        let inset = if shape.squared_front() { 2.0 * Z_DELTA } else { 0.0 };
        if shape.is_ramp() {
            front.push(Vec3::new(lateral, ROLLER_OFFSET, front_c + offset));
        }
        front.push(Vec3::new(lateral, HALF_BLOCK - inset, front_c + offset));
    } else {
        let (from, to) = strand.front_cap();
        push_yz_arc(&mut front, lateral, ROLLER_OFFSET, front_c, ROLLER_RADIUS, from, to, CAP_SEGMENTS);
    }
    let exit_frame = match shape.turn() {
        Turn::Straight => Orientation::Up,
        Turn::Left => Orientation::Left,
        Turn::Right => Orientation::Right,
    };
    path.extend(front.into_iter().map(|p| exit_frame.rotate_point(p)));

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockKind, BlockPos};
    use crate::geometry::DEFAULT_BEND_SEGMENTS;

    const SEG: u32 = DEFAULT_BEND_SEGMENTS;

    fn world_top(block: &Block, side: Side, links: NeighborLinks) -> Vec<Vec3> {
        let shape = BeltShape::of(&block.kind).unwrap();
        BeltGeometry::top_edge(shape, side, links, SEG)
            .into_iter()
            .map(|p| block.local_to_world(p))
            .collect()
    }

    fn world_bottom(block: &Block, side: Side, links: NeighborLinks) -> Vec<Vec3> {
        let shape = BeltShape::of(&block.kind).unwrap();
        BeltGeometry::bottom_edge(shape, side, links, SEG)
            .into_iter()
            .map(|p| block.local_to_world(p))
            .collect()
    }

    /// Передний конец `a` совпадает с задним концом `b` бит в бит
    fn assert_seamless(a: &Block, b: &Block) {
        let a_links = NeighborLinks::new(false, true);
        let b_links = NeighborLinks::new(true, false);
        for side in [Side::Left, Side::Right] {
            let a_top = world_top(a, side, a_links);
            let b_top = world_top(b, side, b_links);
            assert_eq!(a_top.last(), b_top.first(), "top {:?}", side);

            // Нижняя кромка идёт спереди назад
            let a_bottom = world_bottom(a, side, a_links);
            let b_bottom = world_bottom(b, side, b_links);
            assert_eq!(a_bottom.first(), b_bottom.last(), "bottom {:?}", side);
        }
    }

    fn block(x: i32, y: i32, z: i32, o: Orientation, kind: BlockKind) -> Block {
        Block::new(BlockPos::new(x, y, z), o, kind)
    }

    #[test]
    fn test_isolated_flat_has_both_caps() {
        for side in [Side::Left, Side::Right] {
            let top = BeltGeometry::top_edge(BeltShape::Flat, side, NeighborLinks::NONE, SEG);
            assert_eq!(top.len(), 2 * (CAP_SEGMENTS as usize + 1));
            let l = side.lateral();
            // Начинается на торце заднего валика, кончается на торце переднего
            assert_eq!(top[0], Vec3::new(l, -0.5, 0.25));
            assert_eq!(top[CAP_SEGMENTS as usize], Vec3::new(l, -0.375, 0.375));
            assert_eq!(top[CAP_SEGMENTS as usize + 1], Vec3::new(l, 0.375, 0.375));
            assert_eq!(*top.last().unwrap(), Vec3::new(l, 0.5, 0.25));
        }
    }

    #[test]
    fn test_linked_flat_is_two_points() {
        let top = BeltGeometry::top_edge(BeltShape::Flat, Side::Left, NeighborLinks::BOTH, SEG);
        assert_eq!(top, vec![Vec3::new(-0.375, -0.5, 0.375), Vec3::new(-0.375, 0.5, 0.375)]);
        let bottom = BeltGeometry::bottom_edge(BeltShape::Flat, Side::Left, NeighborLinks::BOTH, SEG);
        assert_eq!(bottom, vec![Vec3::new(-0.375, 0.5, 0.125), Vec3::new(-0.375, -0.5, 0.125)]);
        assert_eq!(BeltGeometry::top_texture(BeltShape::Flat, NeighborLinks::BOTH, SEG), vec![0.0, 8.0]);
    }

    #[test]
    fn test_linked_ramp_follows_profile() {
        for shape in [BeltShape::Ascending, BeltShape::Descending] {
            let top = BeltGeometry::top_edge(shape, Side::Right, NeighborLinks::BOTH, SEG);
            assert_eq!(top.len(), 4, "{:?}", shape);
            for p in &top {
                assert_eq!(p.z, shape.top_at(p.y), "{:?} at y {}", shape, p.y);
            }
            let (back, front) = shape.belt_tops();
            assert_eq!(top[1], Vec3::new(0.375, -0.375, back));
            assert_eq!(top[2], Vec3::new(0.375, 0.375, front));

            let bottom = BeltGeometry::bottom_edge(shape, Side::Left, NeighborLinks::BOTH, SEG);
            assert_eq!(bottom.len(), top.len());
        }
    }

    #[test]
    fn test_one_sided_link_squares_only_that_end() {
        let links = NeighborLinks::new(false, true);
        let top = BeltGeometry::top_edge(BeltShape::Flat, Side::Right, links, SEG);
        assert_eq!(top.len(), CAP_SEGMENTS as usize + 2);
        assert_eq!(top[0], Vec3::new(0.375, -0.5, 0.25));
        assert_eq!(*top.last().unwrap(), Vec3::new(0.375, 0.5, 0.375));
    }

    #[test]
    fn test_texture_aligned_with_edges() {
        for shape in BeltShape::ALL {
            for links in [NeighborLinks::NONE, NeighborLinks::BOTH, NeighborLinks::new(true, false)] {
                let edges = BeltGeometry::edges(shape, links, SEG);
                assert_eq!(edges.top_left.len(), edges.top_right.len());
                assert_eq!(edges.top_left.len(), edges.top_tex.len());
                assert_eq!(edges.bottom_left.len(), edges.bottom_right.len());
                assert_eq!(edges.bottom_left.len(), edges.bottom_tex.len());
                assert_eq!(edges.top_tex[0], 0.0);
                assert!(edges.top_tex.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }

    #[test]
    fn test_flat_cap_texture_matches_straight_run() {
        let tex = BeltGeometry::top_texture(BeltShape::Flat, NeighborLinks::NONE, SEG);
        let cap = CAP_SEGMENTS as usize;
        // Между валиками ровно 0.75 ленты = 6 единиц текстуры
        assert!((tex[cap + 1] - tex[cap] - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_flat_to_flat_seam() {
        let a = block(2, 2, 0, Orientation::Right, BlockKind::Flat);
        let b = block(3, 2, 0, Orientation::Right, BlockKind::Flat);
        assert_seamless(&a, &b);
    }

    #[test]
    fn test_flat_to_bend_seam() {
        for o in Orientation::ALL {
            let a = block(5, 5, 0, o, BlockKind::Flat);
            let (dx, dy) = o.dir();
            let bend_r = block(5 + dx, 5 + dy, 0, o, BlockKind::BendRight);
            let bend_l = block(5 + dx, 5 + dy, 0, o, BlockKind::BendLeft);
            assert_seamless(&a, &bend_r);
            assert_seamless(&a, &bend_l);

            // И из поворота дальше в новом направлении
            let out_r = o.rotate_right();
            let (rx, ry) = out_r.dir();
            let after_r = block(5 + dx + rx, 5 + dy + ry, 0, out_r, BlockKind::Flat);
            assert_seamless(&bend_r, &after_r);

            let out_l = o.rotate_left();
            let (lx, ly) = out_l.dir();
            let after_l = block(5 + dx + lx, 5 + dy + ly, 0, out_l, BlockKind::Flat);
            assert_seamless(&bend_l, &after_l);
        }
    }

    #[test]
    fn test_ramp_seams() {
        let a = block(1, 0, 0, Orientation::Right, BlockKind::Flat);
        let up = block(2, 0, 0, Orientation::Right, BlockKind::Ascending);
        let b = block(3, 0, 1, Orientation::Right, BlockKind::Flat);
        assert_seamless(&a, &up);
        assert_seamless(&up, &b);

        let a = block(1, 0, 1, Orientation::Up, BlockKind::Flat);
        let down = block(1, 1, 0, Orientation::Up, BlockKind::Descending);
        let b = block(1, 2, 0, Orientation::Up, BlockKind::Flat);
        assert_seamless(&a, &down);
        assert_seamless(&down, &b);
    }

    #[test]
    fn test_entry_and_exit_are_squared_and_inset() {
        let entry = BeltGeometry::top_edge(BeltShape::Entry, Side::Left, NeighborLinks::NONE, SEG);
        assert_eq!(entry[0].y, -0.5 + 2.0 * Z_DELTA);
        let exit = BeltGeometry::top_edge(BeltShape::Exit, Side::Left, NeighborLinks::NONE, SEG);
        assert_eq!(exit.last().unwrap().y, 0.5 - 2.0 * Z_DELTA);
    }

    #[test]
    fn test_bend_inner_edge_collapses_to_corner() {
        let right = BeltGeometry::top_edge(BeltShape::BendRight, Side::Right, NeighborLinks::BOTH, SEG);
        let corner = Vec3::new(0.375, -0.375, 0.375);
        assert!(right[1..right.len() - 1].iter().all(|p| *p == corner));
        assert_eq!(*right.last().unwrap(), Vec3::new(0.5, -0.375, 0.375));
    }
}
