//! # Director 模块
//!
//! 帧循环的上下文对象：持有一个 [`Scheduler`] 和一个 [`ActionManager`]，
//! 由宿主每帧调用 [`Director::tick`]。
//!
//! `ActionManager` 以 [`PRIORITY_SYSTEM`] 注册为调度器的 update 回调，
//! 因此动作拿到的是经过时间缩放的 `dt`，并且在所有其他 update 回调之前推进。

use tracing::{debug, trace};

use crate::action::Action;
use crate::action_manager::{ActionId, ActionManager};
use crate::config::DirectorConfig;
use crate::error::ConfigError;
use crate::scheduler::{Callback, PRIORITY_SYSTEM, Scheduler};
use crate::target::{Target, TargetId};

/// 帧循环上下文
#[derive(Debug)]
pub struct Director {
    config: DirectorConfig,
    scheduler: Scheduler,
    action_manager: ActionManager,
    /// 动作管理器在调度器中的身份
    action_manager_id: TargetId,
    paused: bool,
    /// 恢复后的第一帧以 dt = 0 推进
    skip_next_delta: bool,
    frames: u64,
    total_time: f64,
}

impl Default for Director {
    fn default() -> Self {
        Self::new()
    }
}

impl Director {
    /// 以默认配置创建
    pub fn new() -> Self {
        Self::with_valid_config(DirectorConfig::default())
    }

    /// 以给定配置创建；配置无效时返回错误
    pub fn from_config(config: DirectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: DirectorConfig) -> Self {
        let scheduler = Scheduler::new();
        scheduler.set_time_scale(config.time_scale);

        let action_manager = ActionManager::new();
        let action_manager_id = TargetId::next();
        let manager = action_manager.clone();
        scheduler.schedule_update(
            action_manager_id,
            PRIORITY_SYSTEM,
            false,
            Callback::new(move |_, dt| manager.update(dt)),
        );

        debug!(
            time_scale = config.time_scale,
            max_frame_delta = config.max_frame_delta,
            "Director 已创建"
        );

        Self {
            config,
            scheduler,
            action_manager,
            action_manager_id,
            paused: false,
            skip_next_delta: false,
            frames: 0,
            total_time: 0.0,
        }
    }

    // ========== 帧循环 ==========

    /// 推进一帧
    ///
    /// `dt` 为墙钟间隔（秒）。无效值按 0 处理，超过 `max_frame_delta` 的部分被截掉；
    /// 暂停时只计帧，不推进调度器。
    pub fn tick(&mut self, dt: f32) {
        self.frames += 1;
        if self.paused {
            trace!(frame = self.frames, "Director 已暂停，跳过推进");
            return;
        }

        let mut dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if dt > self.config.max_frame_delta {
            trace!(dt, max = self.config.max_frame_delta, "dt 超出上限，截断");
            dt = self.config.max_frame_delta;
        }
        if self.skip_next_delta {
            self.skip_next_delta = false;
            dt = 0.0;
        }

        self.total_time += f64::from(dt);
        trace!(frame = self.frames, dt, "Director tick");
        self.scheduler.update(dt);
    }

    /// 暂停：调度器不再推进
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        debug!(frame = self.frames, "Director 暂停");
    }

    /// 恢复推进
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.skip_next_delta = self.config.zero_delta_after_resume;
        debug!(frame = self.frames, "Director 恢复");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ========== 访问器 ==========

    /// 调度器句柄
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// 动作管理器句柄
    pub fn action_manager(&self) -> &ActionManager {
        &self.action_manager
    }

    /// 动作管理器在调度器中注册的身份
    pub fn action_manager_id(&self) -> TargetId {
        self.action_manager_id
    }

    /// 在目标上运行动作
    pub fn run_action(&self, target: &Target, action: Box<dyn Action>) -> ActionId {
        self.action_manager.add_action(target, action, false)
    }

    /// 已调用 `tick` 的次数
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// 交给调度器的累计时间（未乘时间缩放）
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }
}
