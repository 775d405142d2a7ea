// ============================================
// Hull - Корпус вокруг ленты (стены, пол, крыша)
// ============================================
// Корпус собирается из шестигранников: у каждого 8 вершин и 6 граней,
// поэтому любой кусок замкнут сам по себе и сразу годится как
// выпуклая оболочка для физики.

use std::f32::consts::{FRAC_PI_2, PI};
use ultraviolet::Vec3;

use super::shape::{BeltShape, Turn};
use super::{BELT_HALF_WIDTH, HALF_BLOCK, ROLLER_OFFSET, Z_DELTA};
use super::arc::snapped_cos_sin;

/// Верх пола под лентой
const FLOOR_TOP: f32 = 0.125;
/// Насколько стены выше ленты
const WALL_RISE: f32 = 0.25;
/// Толщина стены
const WALL_THICKNESS: f32 = HALF_BLOCK - BELT_HALF_WIDTH;
/// Потолок над самой высокой точкой ленты
const CEILING_GAP: f32 = 0.375;
const CEILING_THICKNESS: f32 = 0.125;
/// Толщина задней стенки входа
const ENTRY_PLATE: f32 = 0.0625;

/// Грани шестигранника, обход против часовой снаружи
const FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // низ
    [4, 5, 6, 7], // верх
    [0, 1, 5, 4], // y-
    [2, 3, 7, 6], // y+
    [0, 4, 7, 3], // x-
    [1, 2, 6, 5], // x+
];

/// Выпуклый шестигранник. Вершины 0..4 - нижнее кольцо, 4..8 - верхнее.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hexahedron {
    pub corners: [Vec3; 8],
}

impl Hexahedron {
    /// Приводит обход к правому, чтобы грани смотрели наружу
    pub fn new(corners: [Vec3; 8]) -> Self {
        let handed = (corners[1] - corners[0])
            .cross(corners[3] - corners[0])
            .dot(corners[4] - corners[0]);
        if handed < 0.0 {
            Self { corners: swap_x(corners) }
        } else {
            Self { corners }
        }
    }

    /// Прямоугольный блок
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        Self::new([
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ])
    }

    /// Стенка вдоль y со скошенным верхом: высота top_back на y0, top_front на y1
    fn sloped_wall(x0: f32, x1: f32, y0: f32, y1: f32, bottom: f32, top_back: f32, top_front: f32) -> Self {
        Self::new([
            Vec3::new(x0, y0, bottom),
            Vec3::new(x1, y0, bottom),
            Vec3::new(x1, y1, bottom),
            Vec3::new(x0, y1, bottom),
            Vec3::new(x0, y0, top_back),
            Vec3::new(x1, y0, top_back),
            Vec3::new(x1, y1, top_front),
            Vec3::new(x0, y1, top_front),
        ])
    }

    /// Четыре грани по 4 точки
    pub fn quads(&self) -> [[Vec3; 4]; 6] {
        FACES.map(|face| face.map(|i| self.corners[i]))
    }

    pub fn center(&self) -> Vec3 {
        self.corners.iter().fold(Vec3::zero(), |acc, p| acc + *p) / 8.0
    }

    pub fn map(&self, f: impl Fn(Vec3) -> Vec3) -> Self {
        Self::new(self.corners.map(f))
    }

    /// Зеркально по x (поворот налево из поворота направо)
    fn mirrored_x(&self) -> Self {
        Self::new(self.corners.map(|p| Vec3::new(-p.x, p.y, p.z)))
    }
}

fn swap_x(c: [Vec3; 8]) -> [Vec3; 8] {
    [c[1], c[0], c[3], c[2], c[5], c[4], c[7], c[6]]
}

/// Корпус одного блока
pub struct HullBuilder;

impl HullBuilder {
    /// Стены и пол, без крыши, с поправкой против z-fighting
    pub fn hull(shape: BeltShape, segments: u32) -> Vec<Hexahedron> {
        let pieces = match shape.turn() {
            Turn::Straight => straight_hull(shape),
            Turn::Right => bend_right_hull(segments),
            Turn::Left => bend_right_hull(segments).iter().map(Hexahedron::mirrored_x).collect(),
        };
        apply_z_fighting_correction(&pieces)
    }

    /// Крыша: потолок и стойки по углам
    pub fn roof(shape: BeltShape) -> Vec<Hexahedron> {
        let (back_top, front_top) = shape.belt_tops();
        let ceiling = shape.max_top() + CEILING_GAP;
        let lo = -HALF_BLOCK;
        let hi = HALF_BLOCK;
        let inner = BELT_HALF_WIDTH;

        let mut pieces = vec![Hexahedron::cuboid(
            Vec3::new(lo, lo, ceiling),
            Vec3::new(hi, hi, ceiling + CEILING_THICKNESS),
        )];

        // (x, y, верх стены под стойкой); у поворота нет внешнего угла
        let mut posts = vec![
            (lo, lo, back_top),
            (inner, lo, back_top),
            (lo, inner, front_top),
            (inner, inner, front_top),
        ];
        match shape.turn() {
            Turn::Straight => {}
            Turn::Right => posts.retain(|&(x, y, _)| !(x == lo && y == inner)),
            Turn::Left => posts.retain(|&(x, y, _)| !(x == inner && y == inner)),
        }
        for (x, y, top) in posts {
            pieces.push(Hexahedron::cuboid(
                Vec3::new(x, y, top + WALL_RISE),
                Vec3::new(x + WALL_THICKNESS, y + WALL_THICKNESS, ceiling),
            ));
        }
        apply_z_fighting_correction(&pieces)
    }

    /// Точки граней корпуса, по 4 на грань
    pub fn hull_points(shape: BeltShape, segments: u32) -> Vec<Vec3> {
        flatten(&Self::hull(shape, segments))
    }

    pub fn hull_roof_points(shape: BeltShape) -> Vec<Vec3> {
        flatten(&Self::roof(shape))
    }
}

fn flatten(pieces: &[Hexahedron]) -> Vec<Vec3> {
    pieces
        .iter()
        .flat_map(|h| h.quads().into_iter().flatten())
        .collect()
}

/// Пол и две боковые стены; у рамп стены идут вдоль уклона
fn straight_hull(shape: BeltShape) -> Vec<Hexahedron> {
    let (back_top, front_top) = shape.belt_tops();
    let lo = -HALF_BLOCK;
    let hi = HALF_BLOCK;
    let inner = BELT_HALF_WIDTH;

    let mut pieces = vec![Hexahedron::cuboid(Vec3::new(lo, lo, 0.0), Vec3::new(hi, hi, FLOOR_TOP))];

    for (x0, x1) in [(lo, -inner), (inner, hi)] {
        if back_top == front_top {
            pieces.push(Hexahedron::cuboid(
                Vec3::new(x0, lo, FLOOR_TOP),
                Vec3::new(x1, hi, back_top + WALL_RISE),
            ));
        } else {
            let (b, f) = (back_top + WALL_RISE, front_top + WALL_RISE);
            pieces.push(Hexahedron::sloped_wall(x0, x1, lo, -ROLLER_OFFSET, FLOOR_TOP, b, b));
            pieces.push(Hexahedron::sloped_wall(x0, x1, -ROLLER_OFFSET, ROLLER_OFFSET, FLOOR_TOP, b, f));
            pieces.push(Hexahedron::sloped_wall(x0, x1, ROLLER_OFFSET, hi, FLOOR_TOP, f, f));
        }
    }

    if shape.squared_back() {
        // Задняя стенка над лентой входа, чтобы багаж не уходил назад
        pieces.push(Hexahedron::cuboid(
            Vec3::new(-inner, lo, back_top),
            Vec3::new(inner, lo + ENTRY_PLATE, back_top + WALL_RISE),
        ));
    }
    pieces
}

/// Поворот направо: внешняя дуговая стена вокруг внутреннего угла
fn bend_right_hull(segments: u32) -> Vec<Hexahedron> {
    assert!(segments >= 1, "bend needs at least one segment");
    let lo = -HALF_BLOCK;
    let hi = HALF_BLOCK;
    let inner = BELT_HALF_WIDTH;
    let top = BeltShape::BendRight.max_top() + WALL_RISE;
    let (cx, cy) = (ROLLER_OFFSET, -ROLLER_OFFSET);
    let r_in = 2.0 * ROLLER_OFFSET;
    let r_out = r_in + WALL_THICKNESS;

    let mut pieces = vec![
        Hexahedron::cuboid(Vec3::new(lo, lo, 0.0), Vec3::new(hi, hi, FLOOR_TOP)),
        // Стенка у входа (внешняя сторона)
        Hexahedron::cuboid(Vec3::new(lo, lo, FLOOR_TOP), Vec3::new(-inner, -inner, top)),
        // Стенка у выхода (внешняя сторона)
        Hexahedron::cuboid(Vec3::new(inner, inner, FLOOR_TOP), Vec3::new(hi, hi, top)),
        // Внутренний угловой столб
        Hexahedron::cuboid(Vec3::new(inner, lo, FLOOR_TOP), Vec3::new(hi, -inner, top)),
    ];

    let point = |r: f32, a: f32, z: f32| {
        let (cos, sin) = snapped_cos_sin(a);
        Vec3::new(cx + r * cos, cy + r * sin, z)
    };
    for i in 0..segments {
        let a0 = PI - FRAC_PI_2 * (i as f32 / segments as f32);
        let a1 = if i + 1 == segments {
            FRAC_PI_2
        } else {
            PI - FRAC_PI_2 * ((i + 1) as f32 / segments as f32)
        };
        pieces.push(Hexahedron::new([
            point(r_in, a0, FLOOR_TOP),
            point(r_out, a0, FLOOR_TOP),
            point(r_out, a1, FLOOR_TOP),
            point(r_in, a1, FLOOR_TOP),
            point(r_in, a0, top),
            point(r_out, a0, top),
            point(r_out, a1, top),
            point(r_in, a1, top),
        ]));
    }
    pieces
}

/// Сжать корпус к центру блока на Z_DELTA, чтобы грани не совпадали
/// с полом, соседними корпусами и лентой
pub fn apply_z_fighting_correction(pieces: &[Hexahedron]) -> Vec<Hexahedron> {
    let center = Vec3::new(0.0, 0.0, HALF_BLOCK);
    let factor = 1.0 - Z_DELTA;
    pieces
        .iter()
        .map(|h| h.map(|p| center + (p - center) * factor))
        .collect()
}
