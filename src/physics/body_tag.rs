// ============================================
// Body Tag - Категория тела в user_data коллайдера
// ============================================
// Раскладка u128:
//   [120..128) вид (1 пол, 2 стена, 3 лента, 4 багаж)
//   лента:  [0..32) x, [32..64) y, [64..96) z
//   багаж:  [0..64) id

use crate::blocks::BlockPos;
use crate::cargo::CargoId;

const KIND_SHIFT: u32 = 120;
const KIND_FLOOR: u128 = 1;
const KIND_WALL: u128 = 2;
const KIND_BELT: u128 = 3;
const KIND_CARGO: u128 = 4;

const WORD: u128 = 0xFFFF_FFFF;
const PAYLOAD: u128 = (1u128 << 96) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyTag {
    Floor,
    Wall,
    Belt(BlockPos),
    Cargo(CargoId),
}

impl BodyTag {
    pub fn encode(self) -> u128 {
        match self {
            BodyTag::Floor => KIND_FLOOR << KIND_SHIFT,
            BodyTag::Wall => KIND_WALL << KIND_SHIFT,
            BodyTag::Belt(pos) => {
                (KIND_BELT << KIND_SHIFT)
                    | (pos.x as u32 as u128)
                    | ((pos.y as u32 as u128) << 32)
                    | ((pos.z as u32 as u128) << 64)
            }
            BodyTag::Cargo(id) => (KIND_CARGO << KIND_SHIFT) | id.0 as u128,
        }
    }

    /// None для чужих или повреждённых тегов
    pub fn decode(data: u128) -> Option<Self> {
        let kind = data >> KIND_SHIFT;
        let payload = data & !(u128::MAX << KIND_SHIFT);
        match kind {
            KIND_FLOOR if payload == 0 => Some(BodyTag::Floor),
            KIND_WALL if payload == 0 => Some(BodyTag::Wall),
            KIND_BELT if payload <= PAYLOAD => {
                let x = (payload & WORD) as u32 as i32;
                let y = ((payload >> 32) & WORD) as u32 as i32;
                let z = ((payload >> 64) & WORD) as u32 as i32;
                Some(BodyTag::Belt(BlockPos::new(x, y, z)))
            }
            KIND_CARGO if payload <= u64::MAX as u128 => Some(BodyTag::Cargo(CargoId(payload as u64))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_survive_encoding() {
        let tags = [
            BodyTag::Floor,
            BodyTag::Wall,
            BodyTag::Belt(BlockPos::new(3, 7, 12)),
            BodyTag::Belt(BlockPos::new(-1, 0, -4)),
            BodyTag::Cargo(CargoId(0)),
            BodyTag::Cargo(CargoId(u64::MAX)),
        ];
        for tag in tags {
            assert_eq!(BodyTag::decode(tag.encode()), Some(tag));
        }
    }

    #[test]
    fn test_unknown_tags_are_ignored() {
        // Коллайдер без тега
        assert_eq!(BodyTag::decode(0), None);
        assert_eq!(BodyTag::decode(9u128 << KIND_SHIFT), None);
        assert_eq!(BodyTag::decode((KIND_FLOOR << KIND_SHIFT) | 5), None);
        assert_eq!(BodyTag::decode((KIND_CARGO << KIND_SHIFT) | (1u128 << 80)), None);
    }
}
