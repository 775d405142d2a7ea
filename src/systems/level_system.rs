// ============================================
// Level System - Загрузка и сохранение уровня
// ============================================

use crate::level::{BlockRecord, Level, LevelError};
use crate::state::{SimConfig, SimulationContext};
use super::edit_system::EditSystem;

/// Система уровней
pub struct LevelSystem;

impl LevelSystem {
    /// Собрать новый контекст из уровня: сетка, затем все тела разом
    pub fn load(level: &Level, config: SimConfig) -> Result<SimulationContext, LevelError> {
        config.validate()?;
        let [length, width, height] = level.size;
        let interval = config.spawn_interval;
        let mut ctx = SimulationContext::new(config, length, width, height);

        ctx.level_name = level.name.clone();
        ctx.level_number = level.number;
        ctx.hint = level.hint.clone();
        ctx.block_limit = level.limit();

        for record in &level.blocks {
            let block = record.to_block(interval)?;
            if let Some(previous) = ctx.grid.set(block)? {
                log::warn!("level '{}' places two blocks at {:?}", level.name, previous.pos);
            }
        }
        EditSystem::rebuild_all(&mut ctx);

        log::info!(
            "loaded level {} '{}': {} blocks, limit {:?}",
            level.number,
            level.name,
            ctx.grid.len(),
            ctx.block_limit
        );
        Ok(ctx)
    }

    pub fn load_json(text: &str, config: SimConfig) -> Result<SimulationContext, LevelError> {
        let level = Level::from_json(text)?;
        Self::load(&level, config)
    }

    /// Текущая сетка обратно в уровень
    pub fn capture(ctx: &SimulationContext, name: &str) -> Level {
        let mut blocks: Vec<&_> = ctx.grid.iter().collect();
        blocks.sort_by_key(|b| (b.pos.z, b.pos.y, b.pos.x));

        Level {
            name: name.to_string(),
            number: ctx.level_number,
            size: ctx.grid.field_size(),
            hint: ctx.hint.clone(),
            block_limit: ctx.block_limit.map_or(-1, |limit| limit as i32),
            blocks: blocks.into_iter().map(BlockRecord::from_block).collect(),
        }
    }
}
