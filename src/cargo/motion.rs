// ============================================
// Belt Motion - Движение багажа по ленте блока
// ============================================
// Путь вдоль средней линии в локальной системе блока. Прямые и рампы:
// от y = -0.5 до y = 0.5. Поворот: прямой участок до оси валика,
// четверть окружности вокруг внутреннего угла, прямой участок до края.

use std::f32::consts::{FRAC_PI_2, PI};
use ultraviolet::{Vec2, Vec3};

use crate::geometry::{bend_pivot_radius, BeltShape, Turn, BELT_HALF_WIDTH, HALF_BLOCK, ROLLER_OFFSET};

/// Прямой участок поворота до/после дуги
const BEND_MARGIN: f32 = HALF_BLOCK - ROLLER_OFFSET;
/// Допуск на границе ячейки при проекции
const EDGE_SLACK: f32 = 1e-4;

/// Точка пути багажа
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Позиция на верху ленты (локально)
    pub position: Vec3,
    /// Направление движения в плоскости XY (локально, единичное)
    pub heading: Vec2,
}

/// Проекция точки на путь блока
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCoord {
    pub distance: f32,
    pub lateral: f32,
}

pub struct BeltMotion;

impl BeltMotion {
    /// Точка пути на расстоянии `distance` со смещением `lateral` вправо
    pub fn point(shape: BeltShape, distance: f32, lateral: f32) -> PathPoint {
        let s = distance.clamp(0.0, shape.path_length());
        let arc = bend_pivot_radius() * FRAC_PI_2;

        match shape.turn() {
            Turn::Straight => {
                let y = -HALF_BLOCK + s;
                PathPoint {
                    position: Vec3::new(lateral, y, shape.top_at(y)),
                    heading: Vec2::new(0.0, 1.0),
                }
            }
            Turn::Right => {
                let top = shape.max_top();
                if s <= BEND_MARGIN {
                    PathPoint {
                        position: Vec3::new(lateral, -HALF_BLOCK + s, top),
                        heading: Vec2::new(0.0, 1.0),
                    }
                } else if s <= BEND_MARGIN + arc {
                    let angle = PI - (s - BEND_MARGIN) / bend_pivot_radius();
                    let radius = bend_pivot_radius() - lateral;
                    let (sin, cos) = angle.sin_cos();
                    PathPoint {
                        position: Vec3::new(ROLLER_OFFSET + radius * cos, -ROLLER_OFFSET + radius * sin, top),
                        heading: Vec2::new(sin, -cos),
                    }
                } else {
                    let t = s - BEND_MARGIN - arc;
                    PathPoint {
                        position: Vec3::new(ROLLER_OFFSET + t, -lateral, top),
                        heading: Vec2::new(1.0, 0.0),
                    }
                }
            }
            Turn::Left => {
                let top = shape.max_top();
                if s <= BEND_MARGIN {
                    PathPoint {
                        position: Vec3::new(lateral, -HALF_BLOCK + s, top),
                        heading: Vec2::new(0.0, 1.0),
                    }
                } else if s <= BEND_MARGIN + arc {
                    let angle = (s - BEND_MARGIN) / bend_pivot_radius();
                    let radius = bend_pivot_radius() + lateral;
                    let (sin, cos) = angle.sin_cos();
                    PathPoint {
                        position: Vec3::new(-ROLLER_OFFSET + radius * cos, -ROLLER_OFFSET + radius * sin, top),
                        heading: Vec2::new(-sin, cos),
                    }
                } else {
                    let t = s - BEND_MARGIN - arc;
                    PathPoint {
                        position: Vec3::new(-ROLLER_OFFSET - t, lateral, top),
                        heading: Vec2::new(-1.0, 0.0),
                    }
                }
            }
        }
    }

    /// Ближайшая точка пути к локальной точке `p`.
    /// None, если точка вне полосы ленты.
    pub fn locate(shape: BeltShape, p: Vec3) -> Option<PathCoord> {
        if p.x.abs() > HALF_BLOCK + EDGE_SLACK || p.y.abs() > HALF_BLOCK + EDGE_SLACK {
            return None;
        }
        let arc = bend_pivot_radius() * FRAC_PI_2;

        let coord = match shape.turn() {
            Turn::Straight => PathCoord { distance: p.y + HALF_BLOCK, lateral: p.x },
            _ if p.y < -ROLLER_OFFSET => PathCoord { distance: p.y + HALF_BLOCK, lateral: p.x },
            Turn::Right if p.x > ROLLER_OFFSET => PathCoord {
                distance: BEND_MARGIN + arc + (p.x - ROLLER_OFFSET),
                lateral: -p.y,
            },
            Turn::Left if p.x < -ROLLER_OFFSET => PathCoord {
                distance: BEND_MARGIN + arc + (-ROLLER_OFFSET - p.x),
                lateral: p.y,
            },
            Turn::Right => {
                let d = Vec2::new(p.x - ROLLER_OFFSET, p.y + ROLLER_OFFSET);
                let angle = d.y.atan2(d.x).clamp(FRAC_PI_2, PI);
                PathCoord {
                    distance: BEND_MARGIN + (PI - angle) * bend_pivot_radius(),
                    lateral: bend_pivot_radius() - d.mag(),
                }
            }
            Turn::Left => {
                let d = Vec2::new(p.x + ROLLER_OFFSET, p.y + ROLLER_OFFSET);
                let angle = d.y.atan2(d.x).clamp(0.0, FRAC_PI_2);
                PathCoord {
                    distance: BEND_MARGIN + angle * bend_pivot_radius(),
                    lateral: d.mag() - bend_pivot_radius(),
                }
            }
        };

        (coord.lateral.abs() <= BELT_HALF_WIDTH).then_some(PathCoord {
            distance: coord.distance.clamp(0.0, shape.path_length()),
            ..coord
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).mag() < 1e-5
    }

    #[test]
    fn test_straight_path() {
        let start = BeltMotion::point(BeltShape::Flat, 0.0, 0.1);
        assert_eq!(start.position, Vec3::new(0.1, -0.5, 0.375));
        let end = BeltMotion::point(BeltShape::Ascending, 1.0, 0.0);
        assert_eq!(end.position, Vec3::new(0.0, 0.5, 0.625));
        // За концом пути точка не уходит
        assert_eq!(BeltMotion::point(BeltShape::Flat, 3.0, 0.0), BeltMotion::point(BeltShape::Flat, 1.0, 0.0));
    }

    #[test]
    fn test_bend_ends_at_exit_side() {
        let len = BeltShape::BendRight.path_length();
        let end = BeltMotion::point(BeltShape::BendRight, len, 0.0);
        assert!(close(end.position, Vec3::new(0.5, 0.0, 0.375)));
        assert_eq!(end.heading, Vec2::new(1.0, 0.0));

        let end = BeltMotion::point(BeltShape::BendLeft, len, 0.1);
        assert!(close(end.position, Vec3::new(-0.5, 0.1, 0.375)));
        assert_eq!(end.heading, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_bend_path_is_continuous() {
        for shape in [BeltShape::BendLeft, BeltShape::BendRight] {
            let len = shape.path_length();
            let steps = 200;
            let mut prev = BeltMotion::point(shape, 0.0, 0.2).position;
            for i in 1..=steps {
                let next = BeltMotion::point(shape, len * i as f32 / steps as f32, 0.2).position;
                assert!((next - prev).mag() < 0.02, "{:?} jump at {}", shape, i);
                prev = next;
            }
        }
    }

    #[test]
    fn test_locate_inverts_point() {
        for shape in BeltShape::ALL {
            let len = shape.path_length();
            for i in 0..=10 {
                for lateral in [-0.3, 0.0, 0.25] {
                    let distance = len * i as f32 / 10.0;
                    let p = BeltMotion::point(shape, distance, lateral).position;
                    let coord = BeltMotion::locate(shape, p).unwrap();
                    assert!((coord.distance - distance).abs() < 1e-4, "{:?} {} {}", shape, distance, lateral);
                    assert!((coord.lateral - lateral).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_locate_rejects_outside_belt() {
        assert!(BeltMotion::locate(BeltShape::Flat, Vec3::new(0.45, 0.0, 0.4)).is_none());
        assert!(BeltMotion::locate(BeltShape::Flat, Vec3::new(0.0, 0.7, 0.4)).is_none());
        // Внешний угол поворота не покрыт лентой
        assert!(BeltMotion::locate(BeltShape::BendRight, Vec3::new(-0.45, 0.45, 0.4)).is_none());
    }
}
