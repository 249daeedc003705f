//! # Instant 模块
//!
//! 瞬时动作：时长为 0，第一次推进时执行一次效果，随即完成。

use std::fmt;
use std::rc::Rc;

use super::{Action, ActionCore, FiniteTimeAction};
use crate::target::{Target, props};
use crate::transform::Vec2;

/// 瞬时效果
pub trait InstantEffect: fmt::Debug + Clone + 'static {
    /// 对目标执行一次
    fn execute(&mut self, target: &Target);

    /// 反演后的效果
    fn reversed(&self) -> Self;
}

/// 通用的瞬时动作
#[derive(Debug, Clone)]
pub struct InstantAction<E: InstantEffect> {
    core: ActionCore,
    executed: bool,
    /// 执行时收到的时间，父动作据此把多余时间交给下一个子动作
    elapsed: f32,
    effect: E,
}

impl<E: InstantEffect> InstantAction<E> {
    /// 由效果创建
    pub fn from_effect(effect: E) -> Self {
        Self {
            core: ActionCore::default(),
            executed: false,
            elapsed: 0.0,
            effect,
        }
    }

    /// 效果
    pub fn effect(&self) -> &E {
        &self.effect
    }

    fn fresh(&self) -> Self {
        Self {
            core: self.core.fresh(),
            executed: false,
            elapsed: 0.0,
            effect: self.effect.clone(),
        }
    }
}

impl<E: InstantEffect> Action for InstantAction<E> {
    fn start_with_target(&mut self, target: Target) {
        self.executed = false;
        self.elapsed = 0.0;
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        self.update(1.0);
    }

    fn update(&mut self, _t: f32) {
        if self.executed {
            return;
        }
        self.executed = true;
        if let Some(target) = &self.core.target {
            self.effect.execute(target);
        }
    }

    fn is_done(&self) -> bool {
        self.executed
    }

    fn stop(&mut self) {
        self.core.detach();
    }

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

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }
}

impl<E: InstantEffect> FiniteTimeAction for InstantAction<E> {
    fn duration(&self) -> f32 {
        0.0
    }

    fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let mut reversed = Self::from_effect(self.effect.reversed());
        reversed.core.tag = self.core.tag;
        Box::new(reversed)
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(self.fresh())
    }
}

/// 设置可见性
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetVisible(bool);

impl InstantEffect for SetVisible {
    fn execute(&mut self, target: &Target) {
        target.set_flag(props::VISIBLE, self.0);
    }

    fn reversed(&self) -> Self {
        Self(!self.0)
    }
}

/// 显示（反转为隐藏）
pub type Show = InstantAction<SetVisible>;

impl Show {
    pub fn new() -> Self {
        Self::from_effect(SetVisible(true))
    }
}

impl Default for Show {
    fn default() -> Self {
        Self::new()
    }
}

/// 隐藏（反转为显示，与 `Show` 共享效果类型）
pub struct Hide;

impl Hide {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Show {
        Show::from_effect(SetVisible(false))
    }
}

/// 切换可见性
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Toggle;

impl InstantEffect for Toggle {
    fn execute(&mut self, target: &Target) {
        let visible = target.flag(props::VISIBLE);
        target.set_flag(props::VISIBLE, !visible);
    }

    fn reversed(&self) -> Self {
        *self
    }
}

/// 切换可见性（自身即反转）
pub type ToggleVisibility = InstantAction<Toggle>;

impl ToggleVisibility {
    pub fn new() -> Self {
        Self::from_effect(Toggle)
    }
}

impl Default for ToggleVisibility {
    fn default() -> Self {
        Self::new()
    }
}

/// 设置翻转标志
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetFlip {
    property: &'static str,
    flip: bool,
}

impl InstantEffect for SetFlip {
    fn execute(&mut self, target: &Target) {
        target.set_flag(self.property, self.flip);
    }

    fn reversed(&self) -> Self {
        Self {
            flip: !self.flip,
            ..*self
        }
    }
}

/// 水平翻转
pub type FlipX = InstantAction<SetFlip>;

impl FlipX {
    pub fn new(flip: bool) -> Self {
        Self::from_effect(SetFlip {
            property: props::FLIP_X,
            flip,
        })
    }
}

/// 垂直翻转（与 `FlipX` 共享效果类型）
pub struct FlipY;

impl FlipY {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(flip: bool) -> FlipX {
        FlipX::from_effect(SetFlip {
            property: props::FLIP_Y,
            flip,
        })
    }
}

/// 放置到指定位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetPosition(Vec2);

impl InstantEffect for SetPosition {
    fn execute(&mut self, target: &Target) {
        target.set_position(self.0);
    }

    fn reversed(&self) -> Self {
        *self
    }
}

/// 放置到指定位置
pub type Place = InstantAction<SetPosition>;

impl Place {
    pub fn new(position: Vec2) -> Self {
        Self::from_effect(SetPosition(position))
    }
}

/// 调用回调
#[derive(Clone)]
pub struct Invoke(Rc<dyn Fn(&Target)>);

impl fmt::Debug for Invoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invoke(..)")
    }
}

impl InstantEffect for Invoke {
    fn execute(&mut self, target: &Target) {
        (self.0)(target);
    }

    fn reversed(&self) -> Self {
        self.clone()
    }
}

/// 以目标为参数调用回调
///
/// 回调在注册表的 tick 内部执行，可以安全地调用 `ActionManager` 的任何方法。
pub type CallFunc = InstantAction<Invoke>;

impl CallFunc {
    pub fn new(callback: impl Fn(&Target) + 'static) -> Self {
        Self::from_effect(Invoke(Rc::new(callback)))
    }
}

/// 请求从父节点移除
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Remove;

impl InstantEffect for Remove {
    fn execute(&mut self, target: &Target) {
        target.set_flag(props::REMOVED, true);
    }

    fn reversed(&self) -> Self {
        *self
    }
}

/// 请求从父节点移除（场景图负责实际移除）
pub type RemoveSelf = InstantAction<Remove>;

impl RemoveSelf {
    pub fn new() -> Self {
        Self::from_effect(Remove)
    }
}

impl Default for RemoveSelf {
    fn default() -> Self {
        Self::new()
    }
}
