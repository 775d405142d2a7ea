// ============================================
// Arc - Дуги валиков и поворотов
// ============================================

use std::f32::consts::FRAC_PI_2;
use ultraviolet::Vec3;

/// cos/sin с точными значениями на углах, кратных π/2.
/// Концы дуг попадают ровно в 0 и ±1, стыки блоков сходятся бит в бит.
pub fn snapped_cos_sin(angle: f32) -> (f32, f32) {
    let quarters = angle / FRAC_PI_2;
    let nearest = quarters.round();
    if (quarters - nearest).abs() < 1e-5 {
        match (nearest as i32).rem_euclid(4) {
            0 => (1.0, 0.0),
            1 => (0.0, 1.0),
            2 => (-1.0, 0.0),
            _ => (0.0, -1.0),
        }
    } else {
        (angle.cos(), angle.sin())
    }
}

fn arc_angle(from: f32, to: f32, i: u32, segments: u32) -> f32 {
    if i == segments {
        to
    } else {
        from + (to - from) * (i as f32 / segments as f32)
    }
}

/// Дуга в плоскости YZ вокруг оси, параллельной x (валик).
/// Точки (x, yc + r·cos a, zc + r·sin a), оба конца включены.
pub fn push_yz_arc(out: &mut Vec<Vec3>, x: f32, yc: f32, zc: f32, r: f32, from: f32, to: f32, segments: u32) {
    assert!(segments >= 1, "arc needs at least one segment");
    for i in 0..=segments {
        let (cos, sin) = snapped_cos_sin(arc_angle(from, to, i, segments));
        out.push(Vec3::new(x, yc + r * cos, zc + r * sin));
    }
}

/// Дуга в плоскости XY на высоте z (поворот ленты)
pub fn push_xy_arc(out: &mut Vec<Vec3>, cx: f32, cy: f32, z: f32, r: f32, from: f32, to: f32, segments: u32) {
    assert!(segments >= 1, "arc needs at least one segment");
    for i in 0..=segments {
        let (cos, sin) = snapped_cos_sin(arc_angle(from, to, i, segments));
        out.push(Vec3::new(cx + r * cos, cy + r * sin, z));
    }
}
