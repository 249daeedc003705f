//! # Composite 模块
//!
//! 组合动作：拥有子动作并决定如何把时间分配给它们。
//!
//! - [`Sequence`] / [`Spawn`]: 列表在构造时被规整为嵌套的二元组合
//! - [`Repeat`] / [`RepeatForever`]: 每完成一轮就重新启动内部动作
//! - [`Speed`]: 缩放传给内部动作的 `dt`
//! - [`ReverseTime`]: 以 `1 - t` 驱动内部动作
//! - [`TargetedAction`]: 忽略被绑定的目标，改用固定目标
//!
//! 子动作完成时多出来的时间会在同一次 `step` 中交给下一个子动作（或下一轮），
//! 所以一次大的 `dt` 不会"丢"时间。

use tracing::trace;

use super::{
    Action, ActionCore, DelayTime, FiniteTimeAction, FiniteTimeActionExt, IntervalState, leftover,
};
use crate::error::ActionError;
use crate::target::Target;

/// 为组合动作实现 `Action` 中与目标/标签相关的样板方法
macro_rules! core_accessors {
    () => {
        fn target(&self) -> Option<&Target> {
            self.core.target.as_ref()
        }

        fn original_target(&self) -> Option<&Target> {
            self.core.original_target.as_ref()
        }

        fn tag(&self) -> i32 {
            self.core.tag
        }

        fn set_tag(&mut self, tag: i32) {
            self.core.tag = tag;
        }
    };
}

// ========== Sequence ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    First,
    Second,
}

/// 顺序执行
///
/// 内部只有两个子动作；更长的列表被折叠为 `((a, b), c) ...`。
#[derive(Debug)]
pub struct Sequence {
    core: ActionCore,
    state: IntervalState,
    first: Box<dyn FiniteTimeAction>,
    second: Box<dyn FiniteTimeAction>,
    stage: Stage,
    /// 第二个子动作自本次启动以来是否已经绑定目标
    second_started: bool,
    /// 第一个子动作在归一化时间轴上所占的比例
    split: f32,
}

impl Sequence {
    /// 由动作列表创建
    ///
    /// 列表为空时返回错误；只有一个动作时，与一个零时长的延迟组成二元组合。
    pub fn new(actions: Vec<Box<dyn FiniteTimeAction>>) -> Result<Self, ActionError> {
        let mut actions = actions.into_iter();
        let first = actions
            .next()
            .ok_or(ActionError::EmptyComposite { kind: "Sequence" })?;
        let mut rest: Vec<_> = actions.collect();
        let Some(last) = rest.pop() else {
            return Ok(Self::pair(first, DelayTime::new(0.0).boxed()));
        };

        let mut current = first;
        for next in rest {
            current = Box::new(Self::pair(current, next));
        }
        Ok(Self::pair(current, last))
    }

    /// 二元顺序组合
    pub fn pair(first: Box<dyn FiniteTimeAction>, second: Box<dyn FiniteTimeAction>) -> Self {
        let duration = first.duration() + second.duration();
        let split = if duration > 0.0 {
            first.duration() / duration
        } else {
            1.0
        };
        Self {
            core: ActionCore::default(),
            state: IntervalState::new(duration),
            first,
            second,
            stage: Stage::Idle,
            second_started: false,
            split,
        }
    }

    /// 进入第二阶段：结束第一个子动作并启动第二个
    fn advance_stage(&mut self, target: Target) {
        self.first.stop();
        self.second.start_with_target(target);
        self.second_started = true;
        self.stage = Stage::Second;
    }

    fn fresh(&self) -> Self {
        let mut copy = Self::pair(self.first.clone_finite(), self.second.clone_finite());
        copy.core = self.core.fresh();
        copy
    }
}

impl Action for Sequence {
    fn start_with_target(&mut self, target: Target) {
        self.state.reset();
        self.stage = Stage::First;
        self.second_started = false;
        self.first.start_with_target(target.clone());
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        let Some(target) = self.core.target.clone() else {
            return;
        };
        self.state.advance(dt);

        match self.stage {
            Stage::Idle => {}
            Stage::First => {
                self.first.step(dt);
                if self.first.is_done() {
                    let carry = leftover(self.first.as_ref());
                    self.advance_stage(target);
                    self.second.step(carry);
                }
            }
            Stage::Second => self.second.step(dt),
        }
    }

    /// 定位到 `t`
    ///
    /// 两个子动作在定位期间都保持绑定，起点只在第一次进入时记录一次，
    /// 所以来回越过分界点不会重复叠加位移。
    fn update(&mut self, t: f32) {
        let Some(target) = self.core.target.clone() else {
            return;
        };

        if t < self.split {
            if self.stage == Stage::Second {
                // 向后越过分界点：第二个子动作回到自己的起点
                self.second.update(0.0);
                self.stage = Stage::First;
            }
            let local = if self.split > 0.0 { t / self.split } else { 1.0 };
            self.first.update(local);
        } else {
            if self.stage != Stage::Second {
                self.first.update(1.0);
                if !self.second_started {
                    self.second.start_with_target(target);
                    self.second_started = true;
                }
                self.stage = Stage::Second;
            }
            let local = if self.split < 1.0 {
                (t - self.split) / (1.0 - self.split)
            } else {
                1.0
            };
            self.second.update(local);
        }
    }

    fn is_done(&self) -> bool {
        self.stage == Stage::Second && self.second.is_done()
    }

    fn stop(&mut self) {
        if self.stage != Stage::Idle {
            self.first.stop();
            if self.second_started {
                self.second.stop();
            }
        }
        self.core.detach();
    }

    core_accessors!();

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }
}

impl FiniteTimeAction for Sequence {
    fn duration(&self) -> f32 {
        self.state.duration()
    }

    fn elapsed(&self) -> f32 {
        self.state.elapsed()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let mut reversed = Self::pair(self.second.reverse(), self.first.reverse());
        reversed.core.tag = self.core.tag;
        Box::new(reversed)
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(self.fresh())
    }
}

// ========== Spawn ==========

/// 并行执行
///
/// 时长是子动作时长的最大值；较短的一方在构造时用延迟补齐。
#[derive(Debug)]
pub struct Spawn {
    core: ActionCore,
    state: IntervalState,
    one: Box<dyn FiniteTimeAction>,
    two: Box<dyn FiniteTimeAction>,
}

impl Spawn {
    /// 由动作列表创建
    pub fn new(actions: Vec<Box<dyn FiniteTimeAction>>) -> Result<Self, ActionError> {
        let mut actions = actions.into_iter();
        let first = actions
            .next()
            .ok_or(ActionError::EmptyComposite { kind: "Spawn" })?;
        let mut rest: Vec<_> = actions.collect();
        let Some(last) = rest.pop() else {
            return Ok(Self::pair(first, DelayTime::new(0.0).boxed()));
        };

        let mut current = first;
        for next in rest {
            current = Box::new(Self::pair(current, next));
        }
        Ok(Self::pair(current, last))
    }

    /// 二元并行组合
    pub fn pair(one: Box<dyn FiniteTimeAction>, two: Box<dyn FiniteTimeAction>) -> Self {
        let d1 = one.duration();
        let d2 = two.duration();
        let (one, two) = if d1 > d2 {
            (one, Sequence::pair(two, DelayTime::new(d1 - d2).boxed()).boxed())
        } else if d2 > d1 {
            (Sequence::pair(one, DelayTime::new(d2 - d1).boxed()).boxed(), two)
        } else {
            (one, two)
        };
        Self {
            core: ActionCore::default(),
            state: IntervalState::new(d1.max(d2)),
            one,
            two,
        }
    }

    fn fresh(&self) -> Self {
        Self {
            core: self.core.fresh(),
            state: IntervalState::new(self.state.duration()),
            one: self.one.clone_finite(),
            two: self.two.clone_finite(),
        }
    }
}

impl Action for Spawn {
    fn start_with_target(&mut self, target: Target) {
        self.state.reset();
        self.one.start_with_target(target.clone());
        self.two.start_with_target(target.clone());
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        if self.core.target.is_none() {
            return;
        }
        self.state.advance(dt);
        if !self.one.is_done() {
            self.one.step(dt);
        }
        if !self.two.is_done() {
            self.two.step(dt);
        }
    }

    fn update(&mut self, t: f32) {
        self.one.update(t);
        self.two.update(t);
    }

    fn is_done(&self) -> bool {
        self.one.is_done() && self.two.is_done()
    }

    fn stop(&mut self) {
        self.one.stop();
        self.two.stop();
        self.core.detach();
    }

    core_accessors!();

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }
}

impl FiniteTimeAction for Spawn {
    fn duration(&self) -> f32 {
        self.state.duration()
    }

    fn elapsed(&self) -> f32 {
        self.state.elapsed()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let mut reversed = Self::pair(self.one.reverse(), self.two.reverse());
        reversed.core.tag = self.core.tag;
        Box::new(reversed)
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(self.fresh())
    }
}

// ========== Repeat ==========

/// 重复执行 `times` 次
#[derive(Debug)]
pub struct Repeat {
    core: ActionCore,
    state: IntervalState,
    inner: Box<dyn FiniteTimeAction>,
    times: u32,
    /// 已完成的轮数
    completed: u32,
    /// 定位时第 1 轮之后各轮的实例，各自在第一次进入时记录起点
    later_cycles: Vec<Box<dyn FiniteTimeAction>>,
    /// 定位时当前所在的轮次
    seek_cycle: usize,
}

impl Repeat {
    pub fn new(inner: Box<dyn FiniteTimeAction>, times: u32) -> Result<Self, ActionError> {
        if times == 0 {
            return Err(ActionError::ZeroRepeat);
        }
        Ok(Self {
            core: ActionCore::default(),
            state: IntervalState::new(inner.duration() * times as f32),
            inner,
            times,
            completed: 0,
            later_cycles: Vec::new(),
            seek_cycle: 0,
        })
    }

    /// 总轮数
    pub fn times(&self) -> u32 {
        self.times
    }

    /// 已完成的轮数
    pub fn completed(&self) -> u32 {
        self.completed
    }

    fn fresh(&self) -> Self {
        Self {
            core: self.core.fresh(),
            state: IntervalState::new(self.state.duration()),
            inner: self.inner.clone_finite(),
            times: self.times,
            completed: 0,
            later_cycles: Vec::new(),
            seek_cycle: 0,
        }
    }

    /// 定位时第 `index` 轮的实例
    fn cycle_mut(&mut self, index: usize) -> &mut dyn FiniteTimeAction {
        match index.checked_sub(1) {
            Some(later) => self.later_cycles[later].as_mut(),
            None => self.inner.as_mut(),
        }
    }

    /// 停止并丢弃定位用的实例
    fn clear_later_cycles(&mut self) {
        for mut cycle in self.later_cycles.drain(..) {
            cycle.stop();
        }
        self.seek_cycle = 0;
    }

    /// 结束当前一轮；还有剩余轮数时重新启动内部动作
    fn finish_cycle(&mut self, target: &Target) {
        self.completed += 1;
        self.inner.stop();
        if self.completed < self.times {
            self.inner.start_with_target(target.clone());
        }
    }
}

impl Action for Repeat {
    fn start_with_target(&mut self, target: Target) {
        self.state.reset();
        self.completed = 0;
        self.clear_later_cycles();
        self.inner.start_with_target(target.clone());
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        let Some(target) = self.core.target.clone() else {
            return;
        };
        self.state.advance(dt);
        if self.completed >= self.times {
            return;
        }

        self.inner.step(dt);
        // 最多循环 `times` 次，零时长的内部动作也不会死循环
        while self.completed < self.times && self.inner.is_done() {
            let carry = leftover(self.inner.as_ref());
            self.finish_cycle(&target);
            if self.completed < self.times {
                self.inner.step(carry);
            }
        }
    }

    /// 定位到 `t`
    ///
    /// 每一轮使用独立的实例，向后定位时回到那一轮自己的实例，
    /// 途经的各轮先回到各自的起点。
    fn update(&mut self, t: f32) {
        let Some(target) = self.core.target.clone() else {
            return;
        };
        let t = t.clamp(0.0, 1.0);
        let scaled = t * self.times as f32;
        // t == 1 停在最后一轮的终点
        let cycle = (scaled.floor() as usize).min(self.times as usize - 1);
        let local = scaled - cycle as f32;

        while self.seek_cycle > cycle {
            let current = self.seek_cycle;
            self.cycle_mut(current).update(0.0);
            self.seek_cycle -= 1;
        }
        while self.seek_cycle < cycle {
            let current = self.seek_cycle;
            self.cycle_mut(current).update(1.0);
            self.seek_cycle += 1;
            if self.later_cycles.len() < self.seek_cycle {
                let mut next = self.inner.clone_finite();
                next.start_with_target(target.clone());
                self.later_cycles.push(next);
            }
        }
        self.cycle_mut(cycle).update(local);

        self.completed = if t >= 1.0 { self.times } else { cycle as u32 };
    }

    fn is_done(&self) -> bool {
        self.completed >= self.times
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.clear_later_cycles();
        self.core.detach();
    }

    core_accessors!();

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }
}

impl FiniteTimeAction for Repeat {
    fn duration(&self) -> f32 {
        self.state.duration()
    }

    fn elapsed(&self) -> f32 {
        self.state.elapsed()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let mut reversed = Self {
            core: ActionCore::default(),
            state: IntervalState::new(self.state.duration()),
            inner: self.inner.reverse(),
            times: self.times,
            completed: 0,
            later_cycles: Vec::new(),
            seek_cycle: 0,
        };
        reversed.core.tag = self.core.tag;
        Box::new(reversed)
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(self.fresh())
    }
}

// ========== RepeatForever ==========

/// 无限重复，永远不会完成
///
/// 一次 `step` 最多重新启动内部动作一次：多出来的时间按内部时长取模后
/// 交给新的一轮。零时长的内部动作在下一帧才推进，因此每帧执行一次。
#[derive(Debug)]
pub struct RepeatForever {
    core: ActionCore,
    inner: Box<dyn FiniteTimeAction>,
}

impl RepeatForever {
    pub fn new(inner: Box<dyn FiniteTimeAction>) -> Self {
        Self {
            core: ActionCore::default(),
            inner,
        }
    }

    /// 内部动作
    pub fn inner(&self) -> &dyn FiniteTimeAction {
        self.inner.as_ref()
    }

    /// 反转内部动作
    ///
    /// 这是固有方法：`RepeatForever` 没有时长，不是有限时长动作，所以没有实现
    /// [`FiniteTimeAction::reverse`]。
    pub fn reverse(&self) -> Self {
        let mut reversed = Self::new(self.inner.reverse());
        reversed.core.tag = self.core.tag;
        reversed
    }

    /// 装箱为 trait object
    pub fn boxed(self) -> Box<dyn Action> {
        Box::new(self)
    }
}

impl Action for RepeatForever {
    fn start_with_target(&mut self, target: Target) {
        self.inner.start_with_target(target.clone());
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        let Some(target) = self.core.target.clone() else {
            return;
        };

        self.inner.step(dt);
        if self.inner.is_done() {
            let duration = self.inner.duration();
            let carry = if duration > 0.0 {
                leftover(self.inner.as_ref()) % duration
            } else {
                0.0
            };
            trace!(target_id = %target.id(), carry, "RepeatForever 开始新一轮");
            self.inner.stop();
            self.inner.start_with_target(target);
            if duration > 0.0 {
                self.inner.step(carry);
            }
        }
    }

    fn update(&mut self, t: f32) {
        self.inner.update(t);
    }

    fn is_done(&self) -> bool {
        false
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.core.detach();
    }

    core_accessors!();

    fn clone_action(&self) -> Box<dyn Action> {
        let mut copy = Self::new(self.inner.clone_finite());
        copy.core = self.core.fresh();
        Box::new(copy)
    }
}

// ========== Speed ==========

/// 按倍率缩放内部动作的时间
///
/// 倍率为 0 时内部动作冻结。内部动作可以是无限动作，因此 `Speed` 不是有限时长动作。
#[derive(Debug)]
pub struct Speed {
    core: ActionCore,
    inner: Box<dyn Action>,
    speed: f32,
}

fn check_speed(speed: f32) -> Result<f32, ActionError> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(ActionError::InvalidSpeed { speed })
    }
}

impl Speed {
    pub fn new(inner: Box<dyn Action>, speed: f32) -> Result<Self, ActionError> {
        Ok(Self {
            core: ActionCore::default(),
            inner,
            speed: check_speed(speed)?,
        })
    }

    /// 当前倍率
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// 修改倍率，运行中也可以调用
    pub fn set_speed(&mut self, speed: f32) -> Result<(), ActionError> {
        self.speed = check_speed(speed)?;
        Ok(())
    }

    /// 装箱为 trait object
    pub fn boxed(self) -> Box<dyn Action> {
        Box::new(self)
    }
}

impl Action for Speed {
    fn start_with_target(&mut self, target: Target) {
        self.inner.start_with_target(target.clone());
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        self.inner.step(dt * self.speed);
    }

    fn update(&mut self, t: f32) {
        self.inner.update(t);
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.core.detach();
    }

    core_accessors!();

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(Self {
            core: self.core.fresh(),
            inner: self.inner.clone_action(),
            speed: self.speed,
        })
    }
}

// ========== ReverseTime ==========

/// 倒放：以 `1 - t` 驱动内部动作
#[derive(Debug)]
pub struct ReverseTime {
    core: ActionCore,
    state: IntervalState,
    inner: Box<dyn FiniteTimeAction>,
}

impl ReverseTime {
    pub fn new(inner: Box<dyn FiniteTimeAction>) -> Self {
        Self {
            core: ActionCore::default(),
            state: IntervalState::new(inner.duration()),
            inner,
        }
    }
}

impl Action for ReverseTime {
    fn start_with_target(&mut self, target: Target) {
        self.state.reset();
        self.inner.start_with_target(target.clone());
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        let t = self.state.advance(dt);
        self.update(t);
    }

    fn update(&mut self, t: f32) {
        self.inner.update(1.0 - t);
    }

    fn is_done(&self) -> bool {
        self.state.is_done()
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.core.detach();
    }

    core_accessors!();

    fn clone_action(&self) -> Box<dyn Action> {
        let mut copy = Self::new(self.inner.clone_finite());
        copy.core = self.core.fresh();
        Box::new(copy)
    }
}

impl FiniteTimeAction for ReverseTime {
    fn duration(&self) -> f32 {
        self.state.duration()
    }

    fn elapsed(&self) -> f32 {
        self.state.elapsed()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        self.inner.clone_finite()
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        let mut copy = Self::new(self.inner.clone_finite());
        copy.core = self.core.fresh();
        Box::new(copy)
    }
}

// ========== TargetedAction ==========

/// 在固定目标上运行内部动作，忽略被绑定的目标
#[derive(Debug)]
pub struct TargetedAction {
    core: ActionCore,
    forced: Target,
    inner: Box<dyn FiniteTimeAction>,
}

impl TargetedAction {
    pub fn new(forced: Target, inner: Box<dyn FiniteTimeAction>) -> Self {
        Self {
            core: ActionCore::default(),
            forced,
            inner,
        }
    }

    /// 实际作用的目标
    pub fn forced_target(&self) -> &Target {
        &self.forced
    }
}

impl Action for TargetedAction {
    fn start_with_target(&mut self, target: Target) {
        self.inner.start_with_target(self.forced.clone());
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        self.inner.step(dt);
    }

    fn update(&mut self, t: f32) {
        self.inner.update(t);
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.core.detach();
    }

    core_accessors!();

    fn clone_action(&self) -> Box<dyn Action> {
        self.clone_finite()
    }
}

impl FiniteTimeAction for TargetedAction {
    fn duration(&self) -> f32 {
        self.inner.duration()
    }

    fn elapsed(&self) -> f32 {
        self.inner.elapsed()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let mut reversed = Self::new(self.forced.clone(), self.inner.reverse());
        reversed.core.tag = self.core.tag;
        Box::new(reversed)
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        let mut copy = Self::new(self.forced.clone(), self.inner.clone_finite());
        copy.core = self.core.fresh();
        Box::new(copy)
    }
}
