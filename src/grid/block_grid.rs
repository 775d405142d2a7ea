// ============================================
// Block Grid - Хранение блоков в плотном массиве
// ============================================
// Одна ячейка = один блок. z в четвертях уровня, поэтому блок высотой 4
// занимает 4 ячейки по z, но хранится только в нижней.

use ndshape::{RuntimeShape, Shape};

use crate::blocks::{Block, BlockPos, LEVELS_PER_UNIT};
use super::error::GridError;

/// Плотная 3D сетка блоков
pub struct BlockGrid {
    shape: RuntimeShape<u32, 3>,
    cells: Vec<Option<Block>>,

    /// Количество занятых ячеек
    count: usize,

    /// Ячейка под курсором в режиме удаления
    highlight: Option<BlockPos>,
}

impl BlockGrid {
    /// Поле length × width × height визуальных единиц
    pub fn new(length: u32, width: u32, height: u32) -> Self {
        let shape = RuntimeShape::<u32, 3>::new([length, width, height * LEVELS_PER_UNIT as u32]);
        let total = shape.size() as usize;
        Self {
            shape,
            cells: vec![None; total],
            count: 0,
            highlight: None,
        }
    }

    /// Размеры в ячейках [x, y, z]
    pub fn dimensions(&self) -> [u32; 3] {
        self.shape.as_array()
    }

    /// Размеры поля в визуальных единицах [length, width, height]
    pub fn field_size(&self) -> [u32; 3] {
        let [x, y, z] = self.dimensions();
        [x, y, z / LEVELS_PER_UNIT as u32]
    }

    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        let [sx, sy, sz] = self.dimensions();
        x >= 0 && y >= 0 && z >= 0
            && (x as u32) < sx
            && (y as u32) < sy
            && (z as u32) < sz
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        Some(self.shape.linearize([x as u32, y as u32, z as u32]) as usize)
    }

    /// Блок ровно в этой ячейке
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        self.index(x, y, z).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_at(&self, pos: BlockPos) -> Option<&Block> {
        self.get(pos.x, pos.y, pos.z)
    }

    /// Блок, чей объём покрывает высоту z. Ищем вниз до первого блока.
    pub fn get_fuzzy(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        for z2 in (0..=z).rev() {
            if let Some(block) = self.get(x, y, z2) {
                return (z2 + block.height() > z).then_some(block);
            }
        }
        None
    }

    /// Первый блок строго ниже z
    pub fn first_below_height(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        let [_, _, sz] = self.dimensions();
        let top = z.min(sz as i32);
        (0..top).rev().find_map(|z2| self.get(x, y, z2))
    }

    /// Чужой блок, пересекающий диапазон [z, z + height).
    /// Блок в той же ячейке не мешает: его можно заменить.
    pub fn overlapping(&self, pos: BlockPos, height: i32) -> Option<BlockPos> {
        if let Some(below) = self.get_fuzzy(pos.x, pos.y, pos.z) {
            if below.pos != pos {
                return Some(below.pos);
            }
        }
        (pos.z + 1..pos.z + height)
            .find_map(|z| self.get(pos.x, pos.y, z))
            .map(|b| b.pos)
    }

    /// Поставить блок в его ячейку. Возвращает вытесненный блок,
    /// вызывающий освобождает его ресурсы.
    pub fn set(&mut self, block: Block) -> Result<Option<Block>, GridError> {
        let pos = block.pos;
        let i = self.index(pos.x, pos.y, pos.z).ok_or(GridError::OutOfBounds(pos))?;

        if let Some(other) = self.overlapping(pos, block.height()) {
            return Err(GridError::Overlap { pos, other });
        }

        let previous = self.cells[i].replace(block);
        if previous.is_none() {
            self.count += 1;
        }
        Ok(previous)
    }

    /// Убрать блок. Пустая ячейка - ошибка, а не тихий no-op.
    pub fn remove(&mut self, x: i32, y: i32, z: i32) -> Result<Block, GridError> {
        let pos = BlockPos::new(x, y, z);
        let i = self.index(x, y, z).ok_or(GridError::OutOfBounds(pos))?;
        let block = self.cells[i].take().ok_or(GridError::EmptyCell(pos))?;

        self.count -= 1;
        if self.highlight == Some(pos) {
            self.highlight = None;
        }
        Ok(block)
    }

    /// Подсветить ячейку (только для рендера)
    pub fn set_highlight(&mut self, pos: Option<BlockPos>) {
        self.highlight = pos;
    }

    pub fn highlight(&self) -> Option<BlockPos> {
        self.highlight
    }

    /// Все блоки в порядке обхода: x быстрее всего, затем y, затем z
    pub fn iter(&self) -> impl Iterator<Item = &Block> + '_ {
        self.cells.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block> + '_ {
        self.cells.iter_mut().flatten()
    }

    /// Количество блоков
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
