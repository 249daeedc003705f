//! # Error 模块
//!
//! 定义 scene-runtime 中使用的错误类型。
//!
//! 帧驱动路径（`update`/`tick`）永远不返回错误：移除不存在的动作、
//! 注销不存在的定时器等情况都是静默的 no-op。这里的错误只出现在
//! 构造期（动作构建器、定时器参数检查）和配置加载。

use thiserror::Error;

/// 动作构造错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    /// 组合动作的子动作列表为空
    #[error("{kind} 至少需要一个子动作")]
    EmptyComposite { kind: &'static str },

    /// 重复次数为 0
    #[error("Repeat 的次数必须大于 0")]
    ZeroRepeat,

    /// 时长无效（负数、NaN 或无穷）
    #[error("无效的时长 {duration}")]
    InvalidDuration { duration: f32 },

    /// 速度倍率无效
    #[error("无效的速度倍率 {speed}")]
    InvalidSpeed { speed: f32 },
}

/// 定时器参数错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// 间隔无效
    #[error("无效的定时器间隔 {interval}")]
    InvalidInterval { interval: f32 },

    /// 延迟无效
    #[error("无效的定时器延迟 {delay}")]
    InvalidDelay { delay: f32 },
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),

    /// 解析配置文件失败
    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 配置值无效
    #[error("配置项 '{field}' 的值无效: {message}")]
    Invalid { field: &'static str, message: String },
}

/// scene-runtime 统一错误类型
#[derive(Error, Debug)]
pub enum SceneError {
    /// 动作错误
    #[error("动作错误: {0}")]
    Action(#[from] ActionError),

    /// 调度错误
    #[error("调度错误: {0}")]
    Schedule(#[from] ScheduleError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type SceneResult<T> = Result<T, SceneError>;

/// 校验时长参数
pub(crate) fn check_duration(duration: f32) -> Result<f32, ActionError> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(duration)
    } else {
        Err(ActionError::InvalidDuration { duration })
    }
}
