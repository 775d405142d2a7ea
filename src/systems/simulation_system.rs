// ============================================
// Simulation System - Багаж, лента и физика за один тик
// ============================================

use std::f32::consts::FRAC_PI_2;
use ultraviolet::{Rotor3, Vec3};

use crate::blocks::{Block, BlockPos, EntryPolicy};
use crate::cargo::{has_time_passed, BeltMotion, Cargo, CargoId, CargoState};
use crate::geometry::BeltShape;
use crate::physics::{PhysicsError, PhysicsEvent};
use crate::state::{SimEvent, SimulationContext};
use crate::topology::ConveyorTopology;

/// Допуск по высоте при захвате багажа лентой
const CAPTURE_HEIGHT: f32 = 0.1;
/// Максимальная вертикальная скорость для захвата
const CAPTURE_VZ: f32 = 0.5;
/// Отметка внутри периода, в которую срабатывает вход
const SPAWN_PHASE: f64 = 0.0;

/// Система симуляции
pub struct SimulationSystem;

impl SimulationSystem {
    /// Основной тик: появление, лента, физика, синхронизация, события
    pub fn update(ctx: &mut SimulationContext, now: f64) -> Result<(), PhysicsError> {
        if !now.is_finite() || now < ctx.time {
            log::warn!("simulation update to {} rejected (at {})", now, ctx.time);
            return Err(PhysicsError::InvalidTime { requested: now, current: ctx.time });
        }
        let dt = (now - ctx.time) as f32;

        // 1. Новый багаж на входах
        Self::spawn(ctx, now);

        // 2. Багаж на лентах
        Self::advance_scripted(ctx, dt);

        // 3. Физика
        ctx.physics.step(now)?;

        // 4. Позы свободного багажа
        for cargo in ctx.cargo.values_mut() {
            ctx.physics.sync_cargo(cargo);
        }

        // 5. Контакты
        for event in ctx.physics.take_events() {
            match event {
                PhysicsEvent::CargoLost(id) => Self::lose(ctx, id),
                PhysicsEvent::BeltContact { cargo, cell } => Self::try_capture(ctx, cargo, cell),
            }
        }

        ctx.prev_time = now;
        ctx.time = now;
        Ok(())
    }

    /// Перейти ко времени без симуляции (загрузка сохранения)
    pub fn skip_to_time(ctx: &mut SimulationContext, time: f64) {
        ctx.physics.skip_to_time(time);
        ctx.time = time;
        ctx.prev_time = time;
    }

    /// Убрать весь багаж и начать заново
    pub fn reset(ctx: &mut SimulationContext) {
        ctx.reset_run();
        log::info!("simulation reset");
    }

    // ============================================
    // Появление
    // ============================================

    fn spawn(ctx: &mut SimulationContext, now: f64) {
        // Пустой тик ничего не пересекает
        if now <= ctx.prev_time {
            return;
        }
        let entries: Vec<(BlockPos, EntryPolicy)> = ctx
            .grid
            .iter()
            .filter_map(|b| b.entry_policy().map(|p| (b.pos, p.clone())))
            .collect();

        for (pos, policy) in entries {
            let generated = ctx.generated.get(&pos).copied().unwrap_or(0);
            if !policy.allows(generated) {
                continue;
            }
            if has_time_passed(ctx.prev_time, now, policy.interval as f64, SPAWN_PHASE) {
                Self::spawn_at(ctx, pos, &policy);
            }
        }
    }

    /// Багаж над входом со случайным сдвигом
    pub fn spawn_at(ctx: &mut SimulationContext, entry: BlockPos, policy: &EntryPolicy) -> CargoId {
        let jitter = ctx.config.spawn_jitter;
        let dx = (ctx.rng.f32() * 2.0 - 1.0) * jitter;
        let dy = (ctx.rng.f32() * 2.0 - 1.0) * jitter;
        let color = match &policy.colors {
            Some(colors) if !colors.is_empty() => Some(colors[ctx.rng.usize(..colors.len())]),
            _ => None,
        };

        let id = ctx.next_cargo_id();
        let position = entry.world_base() + Vec3::new(dx, dy, ctx.config.spawn_height);
        let cargo = Cargo::new(id, position, color);
        ctx.physics.spawn_cargo(id, cargo.position, cargo.rotation, Vec3::zero());
        ctx.cargo.insert(id, cargo);
        *ctx.generated.entry(entry).or_default() += 1;
        ctx.push_event(SimEvent::CargoSpawned { id, entry });
        log::info!("cargo {:?} ({:?}) spawned at entry {:?}", id, color, entry);
        id
    }

    // ============================================
    // Лента
    // ============================================

    fn advance_scripted(ctx: &mut SimulationContext, dt: f32) {
        let step = dt * ctx.config.belt_speed;
        let ids: Vec<CargoId> = ctx
            .cargo
            .values()
            .filter(|c| !c.in_physics())
            .map(|c| c.id)
            .collect();
        for id in ids {
            Self::advance(ctx, id, step);
        }
    }

    /// Продвинуть багаж на `step` вдоль ленты, передавая его дальше по цепочке
    fn advance(ctx: &mut SimulationContext, id: CargoId, step: f32) {
        let Some(cargo) = ctx.cargo.get(&id) else { return };
        let CargoState::Scripted { cell, distance, lateral } = cargo.state else { return };
        let color = cargo.color;
        let mut cell = cell;
        let mut distance = distance + step;

        loop {
            let Some(block) = ctx.grid.get_at(cell).cloned() else {
                Self::release(ctx, id, Vec3::zero());
                return;
            };
            let Some(shape) = BeltShape::of(&block.kind) else {
                Self::release(ctx, id, Vec3::zero());
                return;
            };
            let length = shape.path_length();

            if let Some(policy) = block.exit_policy() {
                if distance >= length / 2.0 && policy.accepts(color) {
                    Self::arrive(ctx, id, cell);
                    return;
                }
            }
            if distance < length {
                Self::place(ctx, id, &block, shape, distance, lateral);
                return;
            }

            match ConveyorTopology::downstream(&ctx.grid, &block) {
                Some(next) => {
                    distance -= length;
                    cell = next.pos;
                }
                None => {
                    let velocity = Self::place(ctx, id, &block, shape, length, lateral);
                    Self::release(ctx, id, velocity);
                    return;
                }
            }
        }
    }

    /// Поставить багаж в точку пути. Возвращает скорость ленты в этой точке.
    fn place(ctx: &mut SimulationContext, id: CargoId, block: &Block, shape: BeltShape, distance: f32, lateral: f32) -> Vec3 {
        let point = BeltMotion::point(shape, distance, lateral);
        let half_height = ctx.config.cargo_half_extents[2];
        let position = block.local_to_world(point.position + Vec3::new(0.0, 0.0, half_height));
        let heading = block
            .orientation
            .rotate_point(Vec3::new(point.heading.x, point.heading.y, 0.0));
        let rotation = Rotor3::from_rotation_xy(heading.y.atan2(heading.x) - FRAC_PI_2);
        let velocity = heading * ctx.config.belt_speed;

        if let Some(cargo) = ctx.cargo.get_mut(&id) {
            cargo.position = position;
            cargo.rotation = rotation;
            cargo.velocity = velocity;
            cargo.state = CargoState::Scripted { cell: block.pos, distance, lateral };
        }
        ctx.physics.drive_cargo(id, position, rotation);
        velocity
    }

    fn release(ctx: &mut SimulationContext, id: CargoId, velocity: Vec3) {
        if let Some(cargo) = ctx.cargo.get_mut(&id) {
            cargo.release(velocity);
            ctx.physics.release_cargo(id, velocity);
            log::debug!("cargo {:?} left the belt", id);
        }
    }

    /// Свободный багаж коснулся ленты: забрать, если лежит на ней ровно
    fn try_capture(ctx: &mut SimulationContext, id: CargoId, cell: BlockPos) {
        let Some(cargo) = ctx.cargo.get(&id) else { return };
        if !cargo.in_physics() || cargo.velocity.z.abs() > CAPTURE_VZ {
            return;
        }
        let Some(block) = ctx.grid.get_at(cell).cloned() else { return };
        let Some(shape) = BeltShape::of(&block.kind) else { return };

        let local = block.world_to_local(cargo.position);
        let Some(coord) = BeltMotion::locate(shape, local) else { return };
        if coord.distance >= shape.path_length() {
            return;
        }
        let carry = BeltMotion::point(shape, coord.distance, coord.lateral).position.z + ctx.config.cargo_half_extents[2];
        if (local.z - carry).abs() > CAPTURE_HEIGHT {
            return;
        }

        Self::place(ctx, id, &block, shape, coord.distance, coord.lateral);
        log::debug!("cargo {:?} captured by belt {:?}", id, cell);
    }

    fn arrive(ctx: &mut SimulationContext, id: CargoId, exit: BlockPos) {
        ctx.cargo.remove(&id);
        ctx.physics.remove_cargo(id);
        *ctx.arrived.entry(exit).or_default() += 1;
        ctx.push_event(SimEvent::CargoArrived { id, exit });
        log::info!("cargo {:?} arrived at {:?}", id, exit);
    }

    fn lose(ctx: &mut SimulationContext, id: CargoId) {
        if ctx.cargo.remove(&id).is_some() {
            ctx.lost += 1;
            ctx.push_event(SimEvent::CargoLost(id));
            log::info!("cargo {:?} lost ({} total)", id, ctx.lost);
        }
    }
}
