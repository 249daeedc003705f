//! # Scene Runtime
//!
//! 帧驱动的调度核心：缓动函数、可组合的动作、动作管理器和通用调度器。
//!
//! ## 架构概述
//!
//! `scene-runtime` 不依赖任何渲染或窗口系统。宿主每帧把墙钟 `dt` 交给
//! [`Director::tick`]，其余工作都在这一次调用中完成：
//!
//! ```text
//! Host                       Director
//!   │                            │
//!   │──── tick(dt) ────────────►│ Scheduler::update(dt × time_scale)
//!   │                            │   ├─ update 列表（按优先级）
//!   │                            │   │    └─ ActionManager::update (PRIORITY_SYSTEM)
//!   │                            │   └─ 定时器（追帧、重复、延迟）
//!   │◄─── 目标属性已被修改 ──────│
//! ```
//!
//! ## 核心类型
//!
//! - [`Action`] / [`FiniteTimeAction`]：可组合的动作
//! - [`ActionManager`]：按目标登记并推进动作
//! - [`Scheduler`]：update 回调和定时器
//! - [`Director`]：持有以上两者的帧循环上下文
//! - [`Target`]：动作作用的对象，通过 [`Animatable`] 读写属性
//!
//! ## 使用示例
//!
//! ```ignore
//! use scene_runtime::{Director, SceneNode, MoveBy, FiniteTimeActionExt, Vec2};
//!
//! let mut director = Director::new();
//! let node = SceneNode::new("hero").shared();
//! director.run_action(&node.target(), MoveBy::new(1.0, Vec2::new(100.0, 0.0)).boxed());
//!
//! loop {
//!     director.tick(frame_dt);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`easing`]：缓动函数
//! - [`action`]：动作模型与全部内置动作
//! - [`action_manager`]：动作注册表
//! - [`scheduler`]：调度器与定时器
//! - [`director`]：帧循环上下文
//! - [`config`]：配置
//! - [`target`] / [`node`] / [`transform`]：动作目标与基础数学类型
//! - [`error`]：错误类型定义
//!
//! 所有句柄都基于 `Rc<RefCell<_>>`，只能在单线程内使用。

pub mod action;
pub mod action_manager;
pub mod config;
pub mod director;
pub mod easing;
pub mod error;
pub mod node;
pub mod scheduler;
pub mod target;
pub mod transform;

// 重导出核心类型
pub use action::{
    Action, BezierBy, BezierTo, Blink, CallFunc, DelayTime, Ease, FadeIn, FadeOut, FadeTo,
    FiniteTimeAction, FiniteTimeActionExt, FlipX, FlipY, Hide, INVALID_TAG, JumpBy, JumpTo,
    MoveBy, MoveTo, Place, PropertyTween, RemoveSelf, Repeat, RepeatForever, ReverseTime, RotateBy,
    RotateTo, ScaleBy, ScaleTo, Sequence, Show, SkewBy, SkewTo, Spawn, Speed, TargetedAction,
    TintBy, TintTo, ToggleVisibility,
};
pub use action_manager::{ActionId, ActionManager, WeakActionManager};
pub use config::DirectorConfig;
pub use director::Director;
pub use easing::EasingFunction;
pub use error::{ActionError, ConfigError, ScheduleError, SceneError, SceneResult};
pub use node::{NodeData, SceneNode};
pub use scheduler::{
    Callback, PRIORITY_NON_SYSTEM_MIN, PRIORITY_SYSTEM, RepeatCount, Scheduler, TimerKey,
    TimerOptions, WeakScheduler,
};
pub use target::{Animatable, Target, TargetId, props};
pub use transform::{Color3, Vec2};
