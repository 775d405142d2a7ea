// ============================================
// Physics Module - Мост к rapier3d
// ============================================

mod body_tag;
mod shapes;
mod bridge;

pub use body_tag::BodyTag;
pub use shapes::ShapeFactory;
pub use bridge::{PhysicsBridge, PhysicsError, PhysicsEvent, CargoPose};
