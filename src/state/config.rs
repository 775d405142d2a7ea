// ============================================
// Config - Параметры симуляции
// ============================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Константы физики, ленты и генерации багажа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Фиксированный подшаг физики, секунды
    pub substep: f32,
    /// Ускорение свободного падения (вдоль -z)
    pub gravity: f32,
    /// Скорость ленты, единиц в секунду
    pub belt_speed: f32,
    pub belt_friction: f32,
    /// Полуразмеры общего бокса багажа
    pub cargo_half_extents: [f32; 3],
    pub cargo_mass: f32,
    pub cargo_friction: f32,
    /// Период генерации по умолчанию
    pub spawn_interval: f32,
    /// Полуразмах случайного сдвига точки появления
    pub spawn_jitter: f32,
    /// Высота появления над основанием входа
    pub spawn_height: f32,
    /// Сегментов дуги поворота
    pub bend_segments: u32,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            substep: 0.005,
            gravity: 9.81,
            belt_speed: 1.0,
            belt_friction: 1.5,
            cargo_half_extents: [0.174, 0.131, 0.030],
            cargo_mass: 20.0,
            cargo_friction: 1.1,
            spawn_interval: 4.0,
            spawn_jitter: 0.05,
            spawn_height: 0.5,
            bend_segments: 16,
            seed: 0x5EED,
        }
    }
}

impl SimConfig {
    /// Загрузить из JSON; отсутствующие поля берутся по умолчанию
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Проверка при старте: негодная геометрия или шаг - фатальны
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("substep", self.substep),
            ("belt_speed", self.belt_speed),
            ("cargo_mass", self.cargo_mass),
            ("spawn_interval", self.spawn_interval),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.cargo_half_extents.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
            return Err(ConfigError::Invalid("cargo_half_extents must be positive".into()));
        }
        if self.bend_segments < 1 {
            return Err(ConfigError::Invalid("bend_segments must be at least 1".into()));
        }
        if !self.gravity.is_finite() || self.spawn_jitter < 0.0 || self.belt_friction < 0.0 || self.cargo_friction < 0.0 {
            return Err(ConfigError::Invalid("gravity, jitter and friction must be finite and non-negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "belt_speed": 2.0, "bend_segments": 8 }"#).unwrap();
        assert_eq!(config.belt_speed, 2.0);
        assert_eq!(config.bend_segments, 8);
        assert_eq!(config.substep, 0.005);
    }

    #[test]
    fn test_rejects_degenerate_bend() {
        let err = SimConfig::from_json(r#"{ "bend_segments": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(matches!(SimConfig::from_json("{ nope"), Err(ConfigError::Json(_))));

        let config = SimConfig { substep: 0.0, ..SimConfig::default() };
        assert!(config.validate().is_err());
    }
}
