//! # Action 模块
//!
//! 可组合的动作模型。
//!
//! ## 核心概念
//!
//! - [`Action`]: 运行单元，`start_with_target → step* → stop`，`is_done` 是唯一的终止信号
//! - [`FiniteTimeAction`]: 有时长、可反转的动作；所有组合子的子动作都是它
//! - [`IntervalState`]: 有限时长动作共享的时间轴（`elapsed` / `duration`）
//!
//! ## 驱动方式
//!
//! 动作有两种推进方式：
//!
//! - `step(dt)`：按秒推进。注册表和 `Sequence`/`Spawn`/`Repeat` 用这种方式驱动子动作，
//!   并把子动作完成后多出来的时间（`elapsed - duration`）交给下一个子动作。
//! - `update(t)`：直接应用归一化时间 `t` 的效果。`Ease`/`ReverseTime` 用这种方式驱动内部动作，
//!   组合动作在这里表现为"定位到 t"。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let jump = Sequence::new(vec![
//!     MoveBy::new(0.5, Vec2::new(0.0, 40.0)).boxed(),
//!     Ease::new(MoveBy::new(0.5, Vec2::new(0.0, -40.0)).boxed(), EasingFunction::EaseOutBounce).boxed(),
//! ])?;
//! director.run_action(&target, RepeatForever::new(jump.boxed()).boxed());
//! ```

mod composite;
mod ease;
mod instant;
mod interval;

use std::fmt;

use crate::target::Target;

pub use composite::{RepeatForever, Repeat, ReverseTime, Sequence, Spawn, Speed, TargetedAction};
pub use ease::Ease;
pub use instant::{
    CallFunc, FlipX, FlipY, Hide, InstantAction, InstantEffect, Place, RemoveSelf, Show,
    ToggleVisibility,
};
pub use interval::{
    BezierBy, BezierTo, Blink, DelayTime, FadeIn, FadeOut, FadeTo, IntervalAction, JumpBy, JumpTo,
    MoveBy, MoveTo, PropertyTween, RotateBy, RotateTo, ScaleBy, ScaleTo, SkewBy, SkewTo, TintBy,
    TintTo, Tween,
};

/// 默认标签（未设置）
pub const INVALID_TAG: i32 = -1;

/// 动作接口
///
/// 所有方法都必须能安全地在注册表的 tick 内部调用；`stop` 可以重复调用。
pub trait Action: fmt::Debug {
    /// 绑定目标并重置内部状态
    fn start_with_target(&mut self, target: Target);

    /// 按 `dt` 秒推进
    fn step(&mut self, dt: f32);

    /// 应用归一化时间 `t` 的效果
    fn update(&mut self, t: f32);

    /// 是否已完成
    fn is_done(&self) -> bool;

    /// 解除目标绑定
    fn stop(&mut self);

    /// 当前目标（`stop` 后为 `None`）
    fn target(&self) -> Option<&Target>;

    /// 最初绑定的目标（`stop` 后保留）
    fn original_target(&self) -> Option<&Target>;

    /// 标签
    fn tag(&self) -> i32;

    /// 设置标签
    fn set_tag(&mut self, tag: i32);

    /// 深拷贝：得到一个未启动的独立副本
    fn clone_action(&self) -> Box<dyn Action>;
}

/// 有限时长动作
pub trait FiniteTimeAction: Action {
    /// 时长（秒）
    fn duration(&self) -> f32;

    /// 自启动以来累计推进的时间（秒），可以超过 `duration`
    fn elapsed(&self) -> f32;

    /// 时间反演后的动作
    fn reverse(&self) -> Box<dyn FiniteTimeAction>;

    /// 深拷贝：得到一个未启动的独立副本
    fn clone_finite(&self) -> Box<dyn FiniteTimeAction>;
}

/// 装箱辅助
pub trait FiniteTimeActionExt: FiniteTimeAction + Sized + 'static {
    /// 装箱为 trait object
    fn boxed(self) -> Box<dyn FiniteTimeAction> {
        Box::new(self)
    }

    /// 设置标签（构建器风格）
    fn with_tag(mut self, tag: i32) -> Self {
        self.set_tag(tag);
        self
    }
}

impl<T: FiniteTimeAction + Sized + 'static> FiniteTimeActionExt for T {}

/// 所有动作共享的目标与标签状态
#[derive(Debug, Clone)]
pub(crate) struct ActionCore {
    pub(crate) tag: i32,
    pub(crate) target: Option<Target>,
    pub(crate) original_target: Option<Target>,
}

impl Default for ActionCore {
    fn default() -> Self {
        Self {
            tag: INVALID_TAG,
            target: None,
            original_target: None,
        }
    }
}

impl ActionCore {
    /// 绑定目标
    pub(crate) fn bind(&mut self, target: Target) {
        self.original_target = Some(target.clone());
        self.target = Some(target);
    }

    /// 解除目标绑定
    pub(crate) fn detach(&mut self) {
        self.target = None;
    }

    /// 未绑定目标的副本，只保留标签
    pub(crate) fn fresh(&self) -> Self {
        Self {
            tag: self.tag,
            ..Self::default()
        }
    }
}

/// 有限时长动作的时间轴
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalState {
    duration: f32,
    elapsed: f32,
    stepped: bool,
}

impl IntervalState {
    /// 创建时间轴，负数或非有限时长按 0 处理
    pub fn new(duration: f32) -> Self {
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        Self {
            duration,
            elapsed: 0.0,
            stepped: false,
        }
    }

    /// 时长
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// 已推进时间
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// 重置为未启动状态
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.stepped = false;
    }

    /// 推进 `dt` 秒并返回新的归一化时间
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.stepped = true;
        self.elapsed += dt.max(0.0);
        self.progress()
    }

    /// 归一化时间，限制在 `[0, 1]`；时长为 0 时恒为 1
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// 至少推进过一次且已走完时长
    pub fn is_done(&self) -> bool {
        self.stepped && self.elapsed >= self.duration
    }

    /// 走完后多出来的时间
    pub fn overflow(&self) -> f32 {
        (self.elapsed - self.duration).max(0.0)
    }
}

/// 子动作完成后多出来的时间
pub(crate) fn leftover(action: &dyn FiniteTimeAction) -> f32 {
    (action.elapsed() - action.duration()).max(0.0)
}
