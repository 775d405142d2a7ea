// ============================================
// Physics Bridge - Мир rapier3d, синхронный с сеткой
// ============================================
// Единственный владелец всех тел. Статические тела конвейеров
// пересобираются при смене соседей, тела багажа живут от появления
// до потери или прибытия. Время идёт фиксированными подшагами.

use std::collections::HashMap;

use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use thiserror::Error;
use ultraviolet::{Rotor3, Vec3};

use crate::blocks::{Block, BlockPos};
use crate::cargo::{Cargo, CargoId, CargoState};
use crate::geometry::{BeltShape, NeighborLinks, HALF_BLOCK};
use crate::state::SimConfig;
use super::body_tag::BodyTag;
use super::shapes::ShapeFactory;

/// Запас на ошибку округления при подсчёте подшагов
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PhysicsError {
    #[error("invalid simulation time {requested} (current {current})")]
    InvalidTime { requested: f64, current: f64 },
}

/// События контактов, накопленные за вызовы step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    /// Багаж коснулся пола, его тело уже удалено
    CargoLost(CargoId),
    /// Свободный багаж коснулся ленты
    BeltContact { cargo: CargoId, cell: BlockPos },
}

/// Поза тела багажа
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CargoPose {
    pub position: Vec3,
    pub rotation: Rotor3,
    pub velocity: Vec3,
}

pub struct PhysicsBridge {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    shapes: ShapeFactory,
    blocks: HashMap<BlockPos, RigidBodyHandle>,
    cargo: HashMap<CargoId, RigidBodyHandle>,

    // Общая форма и масса багажа
    cargo_shape: SharedShape,
    cargo_mass: MassProperties,
    cargo_friction: Real,
    belt_friction: Real,

    // Время: base - момент последнего skip_to_time, done - подшаги с него
    base_time: f64,
    last_time: f64,
    done: u64,
    total_substeps: u64,

    events: Vec<PhysicsEvent>,
}

impl PhysicsBridge {
    /// Мир с полом и четырьмя стенами вокруг поля `field` (в ячейках x, y)
    pub fn new(config: &SimConfig, field: [u32; 3]) -> Self {
        let params = IntegrationParameters {
            dt: config.substep,
            ..IntegrationParameters::default()
        };
        let [hx, hy, hz] = config.cargo_half_extents;
        let volume = 8.0 * hx * hy * hz;

        let mut bridge = Self {
            gravity: vector![0.0, 0.0, -config.gravity],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            shapes: ShapeFactory::new(config.bend_segments),
            blocks: HashMap::new(),
            cargo: HashMap::new(),
            cargo_shape: SharedShape::cuboid(hx, hy, hz),
            cargo_mass: MassProperties::from_cuboid(config.cargo_mass / volume, vector![hx, hy, hz]),
            cargo_friction: config.cargo_friction,
            belt_friction: config.belt_friction,
            base_time: 0.0,
            last_time: 0.0,
            done: 0,
            total_substeps: 0,
            events: Vec::new(),
        };
        bridge.add_boundaries(field);
        bridge
    }

    /// Пол z = 0 и стены по краям поля
    fn add_boundaries(&mut self, field: [u32; 3]) {
        let ground = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let far_x = field[0] as Real - HALF_BLOCK;
        let far_y = field[1] as Real - HALF_BLOCK;

        let floor = ColliderBuilder::halfspace(Vector::z_axis())
            .user_data(BodyTag::Floor.encode())
            .build();
        self.colliders.insert_with_parent(floor, ground, &mut self.bodies);

        let walls = [
            (Vector::x_axis(), vector![-HALF_BLOCK, 0.0, 0.0]),
            (-Vector::x_axis(), vector![far_x, 0.0, 0.0]),
            (Vector::y_axis(), vector![0.0, -HALF_BLOCK, 0.0]),
            (-Vector::y_axis(), vector![0.0, far_y, 0.0]),
        ];
        for (normal, at) in walls {
            let wall = ColliderBuilder::halfspace(normal)
                .translation(at)
                .user_data(BodyTag::Wall.encode())
                .build();
            self.colliders.insert_with_parent(wall, ground, &mut self.bodies);
        }
    }

    // ============================================
    // Блоки
    // ============================================

    /// Пересоздать статическое тело блока по текущим соседям.
    /// `roof` - есть ли блок выше в том же столбце.
    pub fn rebuild_block(&mut self, block: &Block, links: NeighborLinks, roof: bool) {
        self.remove_block(block.pos);

        let base = block.pos.world_base();
        let body = self.bodies.insert(
            RigidBodyBuilder::fixed()
                .translation(vector![base.x, base.y, base.z])
                .build(),
        );

        let collider = match BeltShape::of(&block.kind) {
            Some(shape) => {
                let compound = self.shapes.conveyor(shape, block.orientation, links, roof);
                ColliderBuilder::new(compound)
                    .friction(self.belt_friction)
                    .user_data(BodyTag::Belt(block.pos).encode())
                    .build()
            }
            None => ColliderBuilder::new(ShapeFactory::support())
                .translation(vector![0.0, 0.0, HALF_BLOCK])
                .user_data(BodyTag::Wall.encode())
                .build(),
        };
        self.colliders.insert_with_parent(collider, body, &mut self.bodies);
        self.blocks.insert(block.pos, body);
        log::debug!("rebuilt body of {:?} at {:?} links {:?} roof {}", block.kind.code(), block.pos, links, roof);
    }

    /// Убрать тело блока. false, если его не было.
    pub fn remove_block(&mut self, pos: BlockPos) -> bool {
        match self.blocks.remove(&pos) {
            Some(handle) => {
                self.remove_body(handle);
                true
            }
            None => false,
        }
    }

    pub fn has_block(&self, pos: BlockPos) -> bool {
        self.blocks.contains_key(&pos)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    // ============================================
    // Багаж
    // ============================================

    /// Динамическое тело багажа общей формы
    pub fn spawn_cargo(&mut self, id: CargoId, position: Vec3, rotation: Rotor3, velocity: Vec3) -> RigidBodyHandle {
        if let Some(old) = self.cargo.remove(&id) {
            self.remove_body(old);
        }
        let body = self.bodies.insert(
            RigidBodyBuilder::dynamic()
                .position(to_isometry(position, rotation))
                .linvel(vector![velocity.x, velocity.y, velocity.z])
                .build(),
        );
        let collider = ColliderBuilder::new(self.cargo_shape.clone())
            .mass_properties(self.cargo_mass)
            .friction(self.cargo_friction)
            .user_data(BodyTag::Cargo(id).encode())
            .build();
        self.colliders.insert_with_parent(collider, body, &mut self.bodies);
        self.cargo.insert(id, body);
        body
    }

    /// Убрать тело багажа (прибыл или удалён). false, если его не было.
    pub fn remove_cargo(&mut self, id: CargoId) -> bool {
        match self.cargo.remove(&id) {
            Some(handle) => {
                self.remove_body(handle);
                true
            }
            None => false,
        }
    }

    /// None после потери или удаления
    pub fn cargo_handle(&self, id: CargoId) -> Option<RigidBodyHandle> {
        self.cargo.get(&id).copied()
    }

    pub fn cargo_count(&self) -> usize {
        self.cargo.len()
    }

    pub fn cargo_pose(&self, id: CargoId) -> Option<CargoPose> {
        let body = self.bodies.get(self.cargo_handle(id)?)?;
        let t = body.translation();
        let v = body.linvel();
        Some(CargoPose {
            position: Vec3::new(t.x, t.y, t.z),
            rotation: to_rotor(body.rotation()),
            velocity: Vec3::new(v.x, v.y, v.z),
        })
    }

    /// Лента ведёт багаж сама: тело становится кинематическим
    /// и следует за заданной позой
    pub fn drive_cargo(&mut self, id: CargoId, position: Vec3, rotation: Rotor3) {
        let Some(body) = self.cargo.get(&id).and_then(|h| self.bodies.get_mut(*h)) else {
            return;
        };
        if !body.is_kinematic() {
            body.set_body_type(RigidBodyType::KinematicPositionBased, true);
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(Vector::zeros(), true);
        }
        body.set_next_kinematic_position(to_isometry(position, rotation));
    }

    /// Вернуть багаж физике с заданной скоростью
    pub fn release_cargo(&mut self, id: CargoId, velocity: Vec3) {
        let Some(body) = self.cargo.get(&id).and_then(|h| self.bodies.get_mut(*h)) else {
            return;
        };
        body.set_body_type(RigidBodyType::Dynamic, true);
        body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        body.set_angvel(Vector::zeros(), true);
    }

    /// Скопировать позу тела в свободный багаж. Лента пишет позу сама.
    pub fn sync_cargo(&self, cargo: &mut Cargo) {
        if cargo.state != CargoState::Free {
            return;
        }
        if let Some(pose) = self.cargo_pose(cargo.id) {
            cargo.position = pose.position;
            cargo.rotation = pose.rotation;
            cargo.velocity = pose.velocity;
        }
    }

    // ============================================
    // Время
    // ============================================

    /// Догнать время `time` фиксированными подшагами. Возвращает число
    /// выполненных подшагов. Общее их число зависит только от `time`.
    pub fn step(&mut self, time: f64) -> Result<u64, PhysicsError> {
        if !time.is_finite() || time < self.last_time {
            log::warn!("rejected physics step to {} (at {})", time, self.last_time);
            return Err(PhysicsError::InvalidTime { requested: time, current: self.last_time });
        }

        let dt = self.params.dt as f64;
        let target = ((time - self.base_time) / dt + STEP_EPSILON).floor() as u64;
        let cap = ((time - self.last_time) / dt).ceil() as u64 + 1;
        let count = target.saturating_sub(self.done).min(cap);

        for _ in 0..count {
            self.substep();
        }
        self.done += count;
        self.total_substeps += count;
        self.last_time = time;
        Ok(count)
    }

    /// Сдвинуть время без шагов (загрузка, сброс)
    pub fn skip_to_time(&mut self, time: f64) {
        self.base_time = time;
        self.last_time = time;
        self.done = 0;
    }

    pub fn time(&self) -> f64 {
        self.last_time
    }

    /// Подшагов с создания мира
    pub fn total_substeps(&self) -> u64 {
        self.total_substeps
    }

    fn substep(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.collect_contacts();
    }

    /// Разбор активных контактов после подшага
    fn collect_contacts(&mut self) {
        let mut lost = Vec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let tag = |h: ColliderHandle| self.colliders.get(h).and_then(|c| BodyTag::decode(c.user_data));
            let (Some(a), Some(b)) = (tag(pair.collider1), tag(pair.collider2)) else {
                continue;
            };
            match (a, b) {
                (BodyTag::Floor, BodyTag::Cargo(id)) | (BodyTag::Cargo(id), BodyTag::Floor) => lost.push(id),
                (BodyTag::Belt(cell), BodyTag::Cargo(cargo)) | (BodyTag::Cargo(cargo), BodyTag::Belt(cell)) => {
                    let event = PhysicsEvent::BeltContact { cargo, cell };
                    if !self.events.contains(&event) {
                        self.events.push(event);
                    }
                }
                _ => {}
            }
        }

        for id in lost {
            if self.remove_cargo(id) {
                log::info!("cargo {:?} hit the floor", id);
                self.events.push(PhysicsEvent::CargoLost(id));
            }
        }
    }

    /// Забрать накопленные события
    pub fn take_events(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }
}

fn to_isometry(position: Vec3, rotation: Rotor3) -> Isometry<Real> {
    let [i, j, k, w] = rotation.into_quaternion_array();
    Isometry::from_parts(
        Translation3::new(position.x, position.y, position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(w, i, j, k)),
    )
}

fn to_rotor(rotation: &UnitQuaternion<Real>) -> Rotor3 {
    let q = rotation.quaternion().coords;
    Rotor3::from_quaternion_array([q.x, q.y, q.z, q.w])
}
