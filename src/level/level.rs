// ============================================
// Level - Уровень в JSON
// ============================================
// Формат:
// {
//   "name": "...", "number": 1, "size": [10, 10, 4],
//   "hint": "...", "block_limit": 20,
//   "blocks": [
//     { "code": "en", "x": 0, "y": 2, "z": 0, "orientation": "r",
//       "deletable": false, "count": 5, "colors": ["red", "blue"] },
//     ...
//   ]
// }
// block_limit = -1 - без ограничения; z в четвертях уровня.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blocks::{Block, BlockKind, BlockPos, EntryPolicy, ExitPolicy, LuggageColor, Orientation, LEVELS_PER_UNIT};
use crate::grid::GridError;
use crate::state::ConfigError;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown block code '{0}'")]
    UnknownCode(String),

    #[error("bad orientation '{0}'")]
    BadOrientation(String),

    #[error("unknown luggage color '{0}'")]
    BadColor(String),

    #[error("block at {0:?} is outside the level")]
    OutOfBounds(BlockPos),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn default_deletable() -> bool {
    true
}

/// Одна запись блока
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub code: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub orientation: String,
    #[serde(default = "default_deletable")]
    pub deletable: bool,
    /// Только для входа: сколько багажа сгенерировать
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,
    /// Вход: цвета генерации. Выход: принимаемые цвета.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
}

impl BlockRecord {
    /// Запись -> блок. `interval` - период генерации для входов.
    pub fn to_block(&self, interval: f32) -> Result<Block, LevelError> {
        let orientation = Orientation::from_code(&self.orientation)
            .ok_or_else(|| LevelError::BadOrientation(self.orientation.clone()))?;
        let colors = self.parse_colors()?;

        let kind = match BlockKind::from_code(&self.code) {
            Some(BlockKind::Entry(_)) => {
                // Отрицательное количество = без ограничения
                let count = self.count.and_then(|c| u32::try_from(c).ok());
                BlockKind::Entry(EntryPolicy::new(count, colors, interval))
            }
            Some(BlockKind::Exit(_)) => BlockKind::Exit(ExitPolicy::new(colors)),
            Some(kind) => kind,
            None => return Err(LevelError::UnknownCode(self.code.clone())),
        };

        let pos = BlockPos::new(self.x, self.y, self.z);
        Ok(Block {
            deletable: self.deletable,
            ..Block::new(pos, orientation, kind)
        })
    }

    fn parse_colors(&self) -> Result<Option<Vec<LuggageColor>>, LevelError> {
        let Some(names) = &self.colors else {
            return Ok(None);
        };
        names
            .iter()
            .map(|name| LuggageColor::from_name(name).ok_or_else(|| LevelError::BadColor(name.clone())))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn from_block(block: &Block) -> Self {
        let (count, colors) = match &block.kind {
            BlockKind::Entry(policy) => (
                Some(policy.count.map_or(-1, |c| c as i32)),
                policy.colors.as_ref().map(|c| color_names(c)),
            ),
            BlockKind::Exit(policy) => (None, policy.accepted.as_ref().map(|c| color_names(c))),
            _ => (None, None),
        };
        Self {
            code: block.kind.code().to_string(),
            x: block.pos.x,
            y: block.pos.y,
            z: block.pos.z,
            orientation: block.orientation.code().to_string(),
            deletable: block.deletable,
            count,
            colors,
        }
    }
}

fn color_names(colors: &[LuggageColor]) -> Vec<String> {
    colors.iter().map(|c| c.name().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    #[serde(default)]
    pub number: u32,
    /// [length, width, height] в визуальных единицах
    pub size: [u32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default = "unlimited")]
    pub block_limit: i32,
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
}

fn unlimited() -> i32 {
    -1
}

impl Level {
    /// Разобрать и проверить уровень
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Коды, ориентации, цвета и границы всех записей
    pub fn validate(&self) -> Result<(), LevelError> {
        for record in &self.blocks {
            let block = record.to_block(0.0)?;
            if !self.contains(block.pos) {
                return Err(LevelError::OutOfBounds(block.pos));
            }
        }
        Ok(())
    }

    fn contains(&self, pos: BlockPos) -> bool {
        let [length, width, height] = self.size;
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as u32) < length
            && (pos.y as u32) < width
            && (pos.z as u32) < height * LEVELS_PER_UNIT as u32
    }

    /// None = без ограничения
    pub fn limit(&self) -> Option<u32> {
        u32::try_from(self.block_limit).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "Bend",
        "number": 2,
        "size": [6, 5, 2],
        "block_limit": 10,
        "blocks": [
            { "code": "en", "x": 0, "y": 2, "z": 0, "orientation": "r", "deletable": false,
              "count": 3, "colors": ["red", "blue"] },
            { "code": "cf", "x": 1, "y": 2, "z": 0, "orientation": "r" },
            { "code": "ex", "x": 2, "y": 2, "z": 0, "orientation": "r", "deletable": false,
              "colors": ["blue"] }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let level = Level::from_json(SAMPLE).unwrap();
        assert_eq!(level.limit(), Some(10));
        assert_eq!(level.hint, None);

        let entry = level.blocks[0].to_block(4.0).unwrap();
        assert!(!entry.deletable);
        let policy = entry.entry_policy().unwrap();
        assert_eq!(policy.count, Some(3));
        assert_eq!(policy.colors, Some(vec![LuggageColor::Red, LuggageColor::Blue]));

        let flat = level.blocks[1].to_block(4.0).unwrap();
        assert!(flat.deletable);
        assert_eq!(flat.orientation, Orientation::Right);

        let exit = level.blocks[2].to_block(4.0).unwrap();
        assert!(exit.exit_policy().unwrap().accepts(Some(LuggageColor::Blue)));
        assert!(!exit.exit_policy().unwrap().accepts(Some(LuggageColor::Red)));
    }

    #[test]
    fn test_record_round_trip_through_block() {
        let level = Level::from_json(SAMPLE).unwrap();
        for record in &level.blocks {
            let block = record.to_block(4.0).unwrap();
            assert_eq!(&BlockRecord::from_block(&block), record);
        }
    }

    #[test]
    fn test_validation_errors() {
        let bad_code = SAMPLE.replace("\"cf\"", "\"zz\"");
        assert!(matches!(Level::from_json(&bad_code), Err(LevelError::UnknownCode(_))));

        let bad_orientation = SAMPLE.replace("\"orientation\": \"r\" }", "\"orientation\": \"q\" }");
        assert!(matches!(Level::from_json(&bad_orientation), Err(LevelError::BadOrientation(_))));

        let bad_color = SAMPLE.replace("[\"blue\"]", "[\"purple\"]");
        assert!(matches!(Level::from_json(&bad_color), Err(LevelError::BadColor(_))));

        let outside = SAMPLE.replace("\"x\": 2,", "\"x\": 6,");
        assert!(matches!(Level::from_json(&outside), Err(LevelError::OutOfBounds(_))));

        assert!(matches!(Level::from_json("[]"), Err(LevelError::Json(_))));
    }

    #[test]
    fn test_unlimited_defaults() {
        let level = Level::from_json(r#"{ "name": "Empty", "size": [3, 3, 1] }"#).unwrap();
        assert_eq!(level.limit(), None);
        assert!(level.blocks.is_empty());

        let record = BlockRecord {
            code: "en".into(),
            x: 0,
            y: 0,
            z: 0,
            orientation: "u".into(),
            deletable: true,
            count: Some(-1),
            colors: None,
        };
        assert_eq!(record.to_block(4.0).unwrap().entry_policy().unwrap().count, None);
    }
}
