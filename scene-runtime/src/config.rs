//! # Config 模块
//!
//! 帧循环的配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高，由宿主覆盖）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Director 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// 初始的全局时间缩放
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,

    /// 单帧 dt 的上限（秒），超出部分被截掉
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f32,

    /// 恢复后的第一帧以 `dt = 0` 推进
    #[serde(default = "default_zero_delta_after_resume")]
    pub zero_delta_after_resume: bool,

    /// 日志过滤表达式（`RUST_LOG` 语法）
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_time_scale() -> f32 {
    1.0
}

fn default_max_frame_delta() -> f32 {
    0.25
}

fn default_zero_delta_after_resume() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
            max_frame_delta: default_max_frame_delta(),
            zero_delta_after_resume: default_zero_delta_after_resume(),
            log_filter: default_log_filter(),
        }
    }
}

impl DirectorConfig {
    /// 从文件加载配置并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "配置文件加载成功");
        Ok(config)
    }

    /// 从文件加载配置，失败时使用默认配置
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "加载配置失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::Invalid {
                field: "time_scale",
                message: format!("必须是非负有限数，实际为 {}", self.time_scale),
            });
        }

        if !self.max_frame_delta.is_finite() || self.max_frame_delta <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "max_frame_delta",
                message: format!("必须是正的有限数，实际为 {}", self.max_frame_delta),
            });
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_filter",
                message: "不能为空".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DirectorConfig::default();
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.max_frame_delta, 0.25);
        assert!(config.zero_delta_after_resume);
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "time_scale": 0.5 }}"#).unwrap();

        let config = DirectorConfig::load(file.path()).unwrap();
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.max_frame_delta, 0.25);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("director.json");

        let config = DirectorConfig {
            time_scale: 2.0,
            zero_delta_after_resume: false,
            ..DirectorConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(DirectorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            DirectorConfig::load(&missing),
            Err(ConfigError::Io(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            DirectorConfig::load(&broken),
            Err(ConfigError::Parse(_))
        ));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{ "max_frame_delta": -1.0 }"#).unwrap();
        assert!(matches!(
            DirectorConfig::load(&invalid),
            Err(ConfigError::Invalid {
                field: "max_frame_delta",
                ..
            })
        ));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = DirectorConfig::load_or_default(dir.path().join("missing.json"));
        assert_eq!(config, DirectorConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = DirectorConfig::default();

        config.time_scale = -1.0;
        assert!(config.validate().is_err());

        config.time_scale = f32::NAN;
        assert!(config.validate().is_err());

        // 0 表示冻结，是合法值
        config.time_scale = 0.0;
        assert!(config.validate().is_ok());

        config.log_filter = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
