// ============================================
// Neighbors - Вывод соседей ленты
// ============================================
// Сосед принимается только если `connects` выполняется в обе стороны
// одним и тем же предикатом, поэтому связь всегда симметрична.

use crate::blocks::{Block, BlockKind, BlockPos};
use crate::grid::BlockGrid;

/// Соседи ленты: откуда приходит груз и куда уходит.
/// Не хранится, пересчитывается при каждом изменении сетки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborPair {
    pub upstream: Option<BlockPos>,
    pub downstream: Option<BlockPos>,
}

impl NeighborPair {
    pub fn cells(&self) -> impl Iterator<Item = BlockPos> {
        self.upstream.into_iter().chain(self.downstream)
    }
}

/// Вывод топологии конвейера
pub struct ConveyorTopology;

impl ConveyorTopology {
    /// Переходит ли лента из `a` в `b`
    pub fn connects(a: &Block, b: &Block) -> bool {
        if !a.is_belt() || !b.is_belt() {
            return false;
        }
        if matches!(a.kind, BlockKind::Exit(_)) || matches!(b.kind, BlockKind::Entry(_)) {
            return false;
        }

        let out = a.out_orientation();
        let ahead = a.pos.step(out, b.pos.z);
        ahead == b.pos
            && b.in_orientation() == out
            && a.out_level() == b.in_level()
    }

    /// Следующий блок ленты. Кандидаты: ровно на уровне выхода
    /// и на четверть ниже (если следующий блок - спуск).
    pub fn downstream<'a>(grid: &'a BlockGrid, block: &Block) -> Option<&'a Block> {
        let out = block.out_orientation();
        let level = block.out_level();
        [level, level - 1]
            .into_iter()
            .filter_map(|z| grid.get_at(block.pos.step(out, z)))
            .find(|candidate| Self::connects(block, candidate))
    }

    /// Предыдущий блок ленты
    pub fn upstream<'a>(grid: &'a BlockGrid, block: &Block) -> Option<&'a Block> {
        let back = block.in_orientation().rotate_left().rotate_left();
        let level = block.in_level();
        [level, level - 1]
            .into_iter()
            .filter_map(|z| grid.get_at(block.pos.step(back, z)))
            .find(|candidate| Self::connects(candidate, block))
    }

    /// Соседи блока в ячейке `pos`. Пусто, если там не лента.
    /// Без побочных эффектов: повторный вызов даёт тот же результат.
    pub fn neighbors(grid: &BlockGrid, pos: BlockPos) -> NeighborPair {
        match grid.get_at(pos) {
            Some(block) if block.is_belt() => NeighborPair {
                upstream: Self::upstream(grid, block).map(|b| b.pos),
                downstream: Self::downstream(grid, block).map(|b| b.pos),
            },
            _ => NeighborPair::default(),
        }
    }

    /// Ячейки, которым нужна новая геометрия после правки `pos`:
    /// сама ячейка, её соседи до и после правки и блок под ней (крыша).
    pub fn affected_cells(grid: &BlockGrid, pos: BlockPos, before: NeighborPair) -> Vec<BlockPos> {
        let after = Self::neighbors(grid, pos);
        let below = grid.first_below_height(pos.x, pos.y, pos.z).map(|b| b.pos);

        let mut cells = vec![pos];
        for cell in before.cells().chain(after.cells()).chain(below) {
            if !cells.contains(&cell) {
                cells.push(cell);
            }
        }
        cells
    }
}
