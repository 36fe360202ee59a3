//! # Config 模块
//!
//! 渲染器配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (renderer.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use invitation_runtime::Viewport;
use invitation_runtime::schema::AnimationMood;

/// 渲染器配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererConfig {
    /// 视口配置
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// 动画配置
    #[serde(default)]
    pub animation: AnimationConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 样式配置
    #[serde(default)]
    pub style: StyleConfig,
}

/// 视口配置（CSS px）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,

    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

/// 动画配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    /// 宿主环境是否偏好减弱动效
    ///
    /// 文档的 `reducedMotion` 策略为 `system` 时以此为准。
    #[serde(default)]
    pub reduced_motion: bool,

    /// 帧率，决定 headless 模拟时每帧推进的毫秒数
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// 覆盖文档的 mood，用于预览不同风格
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_override: Option<AnimationMood>,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 最低日志级别（trace / debug / info / warn / error）
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 样式配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    /// 文档未指定或指定了未知主题时使用的预设
    #[serde(default = "default_fallback_preset")]
    pub fallback_preset: String,
}

// 默认值函数
fn default_viewport_width() -> f64 {
    390.0
}

fn default_viewport_height() -> f64 {
    844.0
}

fn default_frame_rate() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fallback_preset() -> String {
    "minimal-light".to_string()
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            frame_rate: default_frame_rate(),
            mood_override: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fallback_preset: default_fallback_preset(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl RendererConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "视口尺寸必须为正数: {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }

        if self.animation.frame_rate == 0 || self.animation.frame_rate > 240 {
            return Err(ConfigError::ValidationFailed(
                "帧率必须在 1 - 240 之间".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "未知的日志级别: {}",
                self.logging.level
            )));
        }

        if self.style.fallback_preset.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "fallbackPreset 不能为空".to_string(),
            ));
        }

        Ok(())
    }

    /// 视口
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport.width, self.viewport.height)
    }

    /// 每帧毫秒数
    pub fn frame_ms(&self) -> f64 {
        1000.0 / f64::from(self.animation.frame_rate.max(1))
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RendererConfig::default();
        assert_eq!(config.viewport.width, 390.0);
        assert_eq!(config.viewport.height, 844.0);
        assert_eq!(config.animation.frame_rate, 60);
        assert_eq!(config.style.fallback_preset, "minimal-light");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: RendererConfig =
            serde_json::from_str(r#"{ "animation": { "reducedMotion": true } }"#).unwrap();
        assert!(config.animation.reduced_motion);
        assert_eq!(config.animation.frame_rate, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renderer.json");

        let mut config = RendererConfig::default();
        config.viewport.width = 428.0;
        config.animation.mood_override = Some(AnimationMood::Cinematic);
        config.save(&path).unwrap();

        let loaded = RendererConfig::load(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_or_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RendererConfig::load(dir.path().join("nope.json"));
        assert_eq!(missing, RendererConfig::default());

        let corrupt = dir.path().join("bad.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert_eq!(RendererConfig::load(&corrupt), RendererConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RendererConfig::default();

        config.viewport.width = 0.0;
        assert!(config.validate().is_err());
        config.viewport.width = 390.0;

        config.animation.frame_rate = 0;
        assert!(config.validate().is_err());
        config.animation.frame_rate = 30;

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
        assert!((config.frame_ms() - 33.333).abs() < 0.01);
    }
}
