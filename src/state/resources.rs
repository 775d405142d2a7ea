// ============================================
// Resources - Состояние одной симуляции
// ============================================
// Всё, что раньше было глобальным миром: сетка, физика, багаж, счётчики.
// Системы получают его по ссылке.

use std::collections::BTreeMap;

use crate::blocks::{Block, BlockPos};
use crate::cargo::{Cargo, CargoId};
use crate::grid::BlockGrid;
use crate::physics::PhysicsBridge;
use super::config::SimConfig;

/// Начальное "предыдущее" время: первый тик попадает в отметку 0
const START_TIME: f64 = -1e-6;

/// Уведомления для внешних слушателей, забираются раз в кадр
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Блок убран или заменён
    BlockRemoved(Block),
    CargoSpawned { id: CargoId, entry: BlockPos },
    CargoLost(CargoId),
    CargoArrived { id: CargoId, exit: BlockPos },
}

/// Сводка для статусной строки GUI
#[derive(Debug, Clone, PartialEq)]
pub struct SimStatus {
    pub time: f64,
    pub blocks: usize,
    /// Поставлено игроком (учитывается в лимите)
    pub placed: usize,
    /// None = без ограничения
    pub block_limit: Option<u32>,
    pub cargo_alive: usize,
    pub lost: u32,
    pub arrived: u32,
    pub arrived_per_exit: Vec<(BlockPos, u32)>,
}

pub struct SimulationContext {
    pub config: SimConfig,

    // World data
    pub grid: BlockGrid,
    pub physics: PhysicsBridge,
    pub cargo: BTreeMap<CargoId, Cargo>,

    // Level
    pub level_name: String,
    pub level_number: u32,
    pub hint: Option<String>,
    pub block_limit: Option<u32>,

    // Counters
    pub lost: u32,
    pub arrived: BTreeMap<BlockPos, u32>,
    pub generated: BTreeMap<BlockPos, u32>,

    // Timing
    pub time: f64,
    pub prev_time: f64,

    pub rng: fastrand::Rng,
    next_cargo: u64,
    events: Vec<SimEvent>,
}

impl SimulationContext {
    /// Пустое поле length × width × height визуальных единиц
    pub fn new(config: SimConfig, length: u32, width: u32, height: u32) -> Self {
        let grid = BlockGrid::new(length, width, height);
        let physics = PhysicsBridge::new(&config, grid.dimensions());
        let rng = fastrand::Rng::with_seed(config.seed);
        Self {
            config,
            grid,
            physics,
            cargo: BTreeMap::new(),
            level_name: String::new(),
            level_number: 0,
            hint: None,
            block_limit: None,
            lost: 0,
            arrived: BTreeMap::new(),
            generated: BTreeMap::new(),
            time: 0.0,
            prev_time: START_TIME,
            rng,
            next_cargo: 0,
            events: Vec::new(),
        }
    }

    pub fn next_cargo_id(&mut self) -> CargoId {
        self.next_cargo += 1;
        CargoId(self.next_cargo)
    }

    pub fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Забрать события с прошлого вызова
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Блоки игрока. Неудаляемые блоки уровня в лимит не входят.
    pub fn placed_blocks(&self) -> usize {
        self.grid.iter().filter(|b| b.deletable).count()
    }

    /// Можно ли добавить ещё блок в пустую ячейку
    pub fn below_limit(&self) -> bool {
        self.block_limit.map_or(true, |limit| (self.placed_blocks() as u64) < limit as u64)
    }

    pub fn status(&self) -> SimStatus {
        SimStatus {
            time: self.time,
            blocks: self.grid.len(),
            placed: self.placed_blocks(),
            block_limit: self.block_limit,
            cargo_alive: self.cargo.len(),
            lost: self.lost,
            arrived: self.arrived.values().sum(),
            arrived_per_exit: self.arrived.iter().map(|(pos, n)| (*pos, *n)).collect(),
        }
    }

    /// Время и счётчики в начало, багаж удалён, блоки остаются
    pub fn reset_run(&mut self) {
        let ids: Vec<CargoId> = self.cargo.keys().copied().collect();
        for id in ids {
            self.physics.remove_cargo(id);
        }
        self.cargo.clear();
        self.lost = 0;
        self.arrived.clear();
        self.generated.clear();
        self.time = 0.0;
        self.prev_time = START_TIME;
        self.rng = fastrand::Rng::with_seed(self.config.seed);
        self.physics.skip_to_time(0.0);
        self.physics.take_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockKind, Orientation};

    #[test]
    fn test_status_counts() {
        let mut ctx = SimulationContext::new(SimConfig::default(), 10, 10, 4);
        ctx.grid.set(Block::new(BlockPos::new(1, 1, 0), Orientation::Up, BlockKind::Flat)).unwrap();
        ctx.arrived.insert(BlockPos::new(4, 4, 0), 2);
        ctx.arrived.insert(BlockPos::new(5, 4, 0), 1);
        ctx.lost = 3;
        ctx.block_limit = Some(5);

        let status = ctx.status();
        assert_eq!(status.blocks, 1);
        assert_eq!(status.block_limit, Some(5));
        assert_eq!(status.arrived, 3);
        assert_eq!(status.lost, 3);
        assert_eq!(status.arrived_per_exit.len(), 2);
    }

    #[test]
    fn test_ids_and_events() {
        let mut ctx = SimulationContext::new(SimConfig::default(), 4, 4, 1);
        assert_eq!(ctx.next_cargo_id(), CargoId(1));
        assert_eq!(ctx.next_cargo_id(), CargoId(2));
        ctx.push_event(SimEvent::CargoLost(CargoId(1)));
        assert_eq!(ctx.take_events().len(), 1);
        assert!(ctx.take_events().is_empty());
    }

    #[test]
    fn test_limit_counts_player_blocks() {
        let mut ctx = SimulationContext::new(SimConfig::default(), 4, 4, 1);
        assert!(ctx.below_limit());
        ctx.block_limit = Some(1);
        ctx.grid.set(Block::fixed(BlockPos::new(0, 0, 0), Orientation::Up, BlockKind::Flat)).unwrap();
        assert!(ctx.below_limit());
        ctx.grid.set(Block::new(BlockPos::new(1, 0, 0), Orientation::Up, BlockKind::Flat)).unwrap();
        assert!(!ctx.below_limit());
        assert_eq!(ctx.status().placed, 1);
        assert_eq!(ctx.status().blocks, 2);
    }
}
