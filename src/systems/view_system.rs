// ============================================
// View System - Данные для внешнего рендера
// ============================================
// Сам рендер живёт снаружи. Здесь только вершины лент в мире, позы
// багажа и пульсация подсвеченного блока.

use std::f64::consts::TAU;
use ultraviolet::{Rotor3, Vec3};

use crate::blocks::{BlockPos, LuggageColor};
use crate::cargo::CargoId;
use crate::geometry::{BeltGeometry, BeltMesh, BeltShape, NeighborLinks, HALF_BLOCK, TEXTURE_SCALE};
use crate::state::SimulationContext;
use crate::topology::ConveyorTopology;

/// Амплитуда пульсации блока под удалением
const PULSE_AMPLITUDE: f64 = 0.05;
/// Пульсаций в секунду
const PULSE_RATE: f64 = 2.0;

/// Багаж для отрисовки
#[derive(Debug, Clone, PartialEq)]
pub struct CargoView {
    pub id: CargoId,
    pub position: Vec3,
    pub rotation: Rotor3,
    pub color: Option<LuggageColor>,
    pub half_extents: [f32; 3],
}

impl CargoView {
    /// Цвет для шейдера; багаж без цвета серый
    pub fn rgb(&self) -> [f32; 3] {
        self.color.map_or([0.5, 0.5, 0.5], |c| c.rgb())
    }
}

/// Система представления
pub struct ViewSystem;

impl ViewSystem {
    /// Вершины ленты одного блока в мировых координатах
    pub fn belt_mesh(ctx: &SimulationContext, pos: BlockPos) -> Option<BeltMesh> {
        let block = ctx.grid.get_at(pos)?;
        let shape = BeltShape::of(&block.kind)?;
        let links = NeighborLinks::from(ConveyorTopology::neighbors(&ctx.grid, pos));
        let edges = BeltGeometry::edges(shape, links, ctx.config.bend_segments);

        // Масштаб вокруг центра блока (пульсация)
        let center = Vec3::new(0.0, 0.0, HALF_BLOCK);
        let scale = block.scale;
        Some(BeltMesh::from_edges(&edges, |p| block.local_to_world(center + (p - center) * scale)))
    }

    /// Все ленты поля в порядке обхода сетки
    pub fn belt_meshes(ctx: &SimulationContext) -> Vec<(BlockPos, BeltMesh)> {
        ctx.grid
            .iter()
            .filter_map(|b| Self::belt_mesh(ctx, b.pos).map(|mesh| (b.pos, mesh)))
            .collect()
    }

    pub fn cargo_views(ctx: &SimulationContext) -> Vec<CargoView> {
        ctx.cargo
            .values()
            .map(|c| CargoView {
                id: c.id,
                position: c.position,
                rotation: c.rotation,
                color: c.color,
                half_extents: ctx.config.cargo_half_extents,
            })
            .collect()
    }

    /// Пульсация подсвеченного блока, остальные в масштабе 1
    pub fn pulse(ctx: &mut SimulationContext, time: f64) {
        let highlight = ctx.grid.highlight();
        let scale = (1.0 + PULSE_AMPLITUDE * (TAU * time * PULSE_RATE).sin()) as f32;
        for block in ctx.grid.iter_mut() {
            block.scale = if Some(block.pos) == highlight { scale } else { 1.0 };
        }
    }

    /// Сдвиг текстуры ленты к моменту `ctx.time`, в пределах одного повтора
    pub fn texture_offset(ctx: &SimulationContext) -> f32 {
        let travelled = ctx.time * ctx.config.belt_speed as f64 * TEXTURE_SCALE as f64;
        travelled.rem_euclid(1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockKind, Orientation};
    use crate::cargo::Cargo;
    use crate::geometry::CAP_SEGMENTS;
    use crate::state::SimConfig;
    use crate::systems::EditSystem;

    fn ctx() -> SimulationContext {
        SimulationContext::new(SimConfig::default(), 10, 10, 4)
    }

    fn flat(x: i32, y: i32) -> Block {
        Block::new(BlockPos::new(x, y, 0), Orientation::Right, BlockKind::Flat)
    }

    #[test]
    fn test_lone_flat_has_capped_strips() {
        let mut ctx = ctx();
        EditSystem::add_block(&mut ctx, flat(2, 2)).unwrap();
        let mesh = ViewSystem::belt_mesh(&ctx, BlockPos::new(2, 2, 0)).unwrap();

        // Две кромки по 2 × (CAP_SEGMENTS + 1) точек
        assert_eq!(mesh.top.len(), 2 * 2 * (CAP_SEGMENTS as usize + 1));
        // Локальная +y смотрит в +x: первая левая точка на заднем торце
        assert_eq!(mesh.top[0].position, [1.5, 2.375, 0.25]);
        assert_eq!(mesh.top[1].position, [1.5, 1.625, 0.25]);
    }

    #[test]
    fn test_linked_flats_meet_flush() {
        let mut ctx = ctx();
        EditSystem::add_block(&mut ctx, flat(2, 2)).unwrap();
        EditSystem::add_block(&mut ctx, flat(3, 2)).unwrap();
        let a = ViewSystem::belt_mesh(&ctx, BlockPos::new(2, 2, 0)).unwrap();
        let b = ViewSystem::belt_mesh(&ctx, BlockPos::new(3, 2, 0)).unwrap();

        // Общий торец без скругления, точки совпадают бит в бит
        let a_end = &a.top[a.top.len() - 2..];
        let b_start = &b.top[..2];
        assert_eq!(a_end[0].position, b_start[0].position);
        assert_eq!(a_end[1].position, b_start[1].position);
        assert_eq!(a_end[0].position, [2.5, 2.375, 0.375]);
        // Дальние концы по-прежнему скруглены
        assert_eq!(a.top[0].position, [1.5, 2.375, 0.25]);
        assert_eq!(b.top[b.top.len() - 1].position, [3.5, 1.625, 0.25]);
        assert_eq!(ViewSystem::belt_meshes(&ctx).len(), 2);
    }

    #[test]
    fn test_support_has_no_belt() {
        let mut ctx = ctx();
        let support = Block::new(BlockPos::new(1, 1, 0), Orientation::Up, BlockKind::Support);
        EditSystem::add_block(&mut ctx, support).unwrap();
        assert!(ViewSystem::belt_mesh(&ctx, BlockPos::new(1, 1, 0)).is_none());
        assert!(ViewSystem::belt_mesh(&ctx, BlockPos::new(5, 5, 0)).is_none());
    }

    #[test]
    fn test_pulse_only_highlighted() {
        let mut ctx = ctx();
        EditSystem::add_block(&mut ctx, flat(1, 1)).unwrap();
        EditSystem::add_block(&mut ctx, flat(4, 4)).unwrap();
        EditSystem::hover(&mut ctx, Some(BlockPos::new(1, 1, 0)));

        ViewSystem::pulse(&mut ctx, 0.125);
        assert!((ctx.grid.get(1, 1, 0).unwrap().scale - 1.05).abs() < 1e-6);
        assert_eq!(ctx.grid.get(4, 4, 0).unwrap().scale, 1.0);

        EditSystem::hover(&mut ctx, None);
        ViewSystem::pulse(&mut ctx, 0.125);
        assert_eq!(ctx.grid.get(1, 1, 0).unwrap().scale, 1.0);
    }

    #[test]
    fn test_cargo_views_carry_color() {
        let mut ctx = ctx();
        let id = ctx.next_cargo_id();
        ctx.cargo.insert(id, Cargo::new(id, Vec3::new(1.0, 2.0, 3.0), Some(LuggageColor::Red)));
        let other = ctx.next_cargo_id();
        ctx.cargo.insert(other, Cargo::new(other, Vec3::zero(), None));

        let views = ViewSystem::cargo_views(&ctx);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(views[0].rgb(), LuggageColor::Red.rgb());
        assert_eq!(views[1].rgb(), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_texture_offset_wraps() {
        let mut ctx = ctx();
        assert_eq!(ViewSystem::texture_offset(&ctx), 0.0);
        ctx.time = 0.0625;
        assert!((ViewSystem::texture_offset(&ctx) - 0.5).abs() < 1e-6);
        ctx.time = 0.125;
        assert!(ViewSystem::texture_offset(&ctx).abs() < 1e-6);
    }
}
