// ============================================
// Edit System - Установка и удаление блоков
// ============================================
// Порядок всегда один: правка сетки -> соседи -> тела физики.
// Тело пересобирается только после того, как сетка уже изменена.

use ultraviolet::Vec3;

use crate::blocks::{Block, BlockPos};
use crate::geometry::NeighborLinks;
use crate::grid::GridError;
use crate::state::{SimEvent, SimulationContext};
use crate::topology::{ConveyorTopology, NeighborPair};

/// Система редактирования
pub struct EditSystem;

impl EditSystem {
    /// Поставить блок. Занятая ячейка заменяется всегда, пустая - только
    /// пока не достигнут лимит. Возвращает вытесненный блок.
    pub fn add_block(ctx: &mut SimulationContext, block: Block) -> Result<Option<Block>, GridError> {
        let pos = block.pos;
        if !ctx.grid.in_bounds(pos.x, pos.y, pos.z) {
            log::warn!("rejected block outside the field at {:?}", pos);
            return Err(GridError::OutOfBounds(pos));
        }

        if let Some(other) = ctx.grid.overlapping(pos, block.height()) {
            log::warn!("block at {:?} would overlap block at {:?}", pos, other);
            return Err(GridError::Overlap { pos, other });
        }

        let replacing = ctx.grid.get_at(pos).is_some();
        if !replacing && block.deletable && !ctx.below_limit() {
            let limit = ctx.block_limit.unwrap_or(0);
            log::warn!("block limit {} reached, {:?} not placed", limit, pos);
            return Err(GridError::LimitReached(limit));
        }

        let before = ConveyorTopology::neighbors(&ctx.grid, pos);
        let previous = ctx.grid.set(block)?;

        if let Some(old) = &previous {
            Self::release_cargo_on(ctx, pos);
            ctx.physics.remove_block(pos);
            ctx.generated.remove(&pos);
            ctx.push_event(SimEvent::BlockRemoved(old.clone()));
        }
        log::debug!("placed block at {:?} (replaced: {})", pos, previous.is_some());

        Self::refresh(ctx, pos, before);
        Ok(previous)
    }

    /// Убрать блок игрока
    pub fn remove_block(ctx: &mut SimulationContext, pos: BlockPos) -> Result<Block, GridError> {
        if !ctx.grid.in_bounds(pos.x, pos.y, pos.z) {
            return Err(GridError::OutOfBounds(pos));
        }
        match ctx.grid.get_at(pos) {
            None => {
                log::warn!("nothing to remove at {:?}", pos);
                return Err(GridError::EmptyCell(pos));
            }
            Some(block) if !block.deletable => {
                log::warn!("block at {:?} is part of the level", pos);
                return Err(GridError::NotDeletable(pos));
            }
            Some(_) => {}
        }

        let before = ConveyorTopology::neighbors(&ctx.grid, pos);
        let removed = ctx.grid.remove(pos.x, pos.y, pos.z)?;

        Self::release_cargo_on(ctx, pos);
        ctx.physics.remove_block(pos);
        ctx.generated.remove(&pos);
        ctx.push_event(SimEvent::BlockRemoved(removed.clone()));
        log::debug!("removed block at {:?}", pos);

        Self::refresh(ctx, pos, before);
        Ok(removed)
    }

    /// Подсветка блока под курсором в режиме удаления
    pub fn hover(ctx: &mut SimulationContext, pos: Option<BlockPos>) {
        let target = pos.and_then(|p| ctx.grid.get_fuzzy(p.x, p.y, p.z)).map(|b| b.pos);
        ctx.grid.set_highlight(target);
    }

    /// Пересобрать тела всех ячеек, затронутых правкой `pos`
    pub fn refresh(ctx: &mut SimulationContext, pos: BlockPos, before: NeighborPair) {
        for cell in ConveyorTopology::affected_cells(&ctx.grid, pos, before) {
            Self::rebuild(ctx, cell);
        }
    }

    /// Пересобрать все тела (после загрузки уровня)
    pub fn rebuild_all(ctx: &mut SimulationContext) {
        let cells: Vec<BlockPos> = ctx.grid.iter().map(|b| b.pos).collect();
        for cell in cells {
            Self::rebuild(ctx, cell);
        }
    }

    /// Тело одной ячейки по текущим соседям и крыше
    fn rebuild(ctx: &mut SimulationContext, cell: BlockPos) {
        let Some(block) = ctx.grid.get_at(cell) else {
            ctx.physics.remove_block(cell);
            return;
        };
        let links = NeighborLinks::from(ConveyorTopology::neighbors(&ctx.grid, cell));
        let roof = Self::has_roof(ctx, cell);
        ctx.physics.rebuild_block(block, links, roof);
    }

    /// Есть ли блок выше в том же столбце
    pub fn has_roof(ctx: &SimulationContext, cell: BlockPos) -> bool {
        let [_, _, top] = ctx.grid.dimensions();
        ctx.grid
            .first_below_height(cell.x, cell.y, top as i32)
            .is_some_and(|b| b.pos.z > cell.z)
    }

    /// Багаж на убранном блоке падает свободно
    fn release_cargo_on(ctx: &mut SimulationContext, pos: BlockPos) {
        for cargo in ctx.cargo.values_mut() {
            if cargo.supporting() == Some(pos) {
                cargo.release(Vec3::zero());
                ctx.physics.release_cargo(cargo.id, Vec3::zero());
                log::debug!("cargo {:?} released from removed block {:?}", cargo.id, pos);
            }
        }
    }
}
