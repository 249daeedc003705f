//! # Ease 模块
//!
//! 用缓动函数重映射内部动作的时间。

use super::{Action, ActionCore, FiniteTimeAction, IntervalState};
use crate::easing::EasingFunction;
use crate::target::Target;

/// 缓动包装：`inner.update(easing(t))`
///
/// 时长与内部动作相同。反转结果是"内部动作的反转 + 互逆缓动"，
/// 因此 `EaseIn` 的反转用 `EaseOut`，`InOut` 类缓动反转后不变。
#[derive(Debug)]
pub struct Ease {
    core: ActionCore,
    state: IntervalState,
    inner: Box<dyn FiniteTimeAction>,
    easing: EasingFunction,
}

impl Ease {
    pub fn new(inner: Box<dyn FiniteTimeAction>, easing: EasingFunction) -> Self {
        Self {
            core: ActionCore::default(),
            state: IntervalState::new(inner.duration()),
            inner,
            easing,
        }
    }

    /// 缓动函数
    pub fn easing(&self) -> EasingFunction {
        self.easing
    }

    /// 内部动作
    pub fn inner(&self) -> &dyn FiniteTimeAction {
        self.inner.as_ref()
    }

    fn fresh(&self) -> Self {
        let mut copy = Self::new(self.inner.clone_finite(), self.easing);
        copy.core = self.core.fresh();
        copy
    }
}

impl Action for Ease {
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
        self.inner.update(self.easing.apply(t));
    }

    fn is_done(&self) -> bool {
        self.state.is_done()
    }

    fn stop(&mut self) {
        self.inner.stop();
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

impl FiniteTimeAction for Ease {
    fn duration(&self) -> f32 {
        self.state.duration()
    }

    fn elapsed(&self) -> f32 {
        self.state.elapsed()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let mut reversed = Self::new(self.inner.reverse(), self.easing.reciprocal());
        reversed.core.tag = self.core.tag;
        Box::new(reversed)
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(self.fresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{FiniteTimeActionExt, MoveBy};
    use crate::node::SceneNode;
    use crate::transform::Vec2;

    #[test]
    fn test_ease_remaps_time() {
        let node = SceneNode::new("n").shared();
        let mut ease = Ease::new(
            MoveBy::new(1.0, Vec2::new(100.0, 0.0)).boxed(),
            EasingFunction::EaseIn { rate: 2.0 },
        );
        assert_eq!(ease.duration(), 1.0);

        ease.start_with_target(node.target());
        ease.step(0.5);
        // 0.5^2 = 0.25
        assert!((node.position().x - 25.0).abs() < 1e-4);

        ease.step(0.5);
        assert!(ease.is_done());
        assert!((node.position().x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_ease_reverse_uses_reciprocal() {
        let ease = Ease::new(
            MoveBy::new(1.0, Vec2::new(10.0, 0.0)).boxed(),
            EasingFunction::EaseInQuad,
        );
        let node = SceneNode::new("n").at(10.0, 0.0).shared();

        let mut reversed = ease.reverse();
        reversed.start_with_target(node.target());
        reversed.step(0.5);
        // EaseOutQuad(0.5) = 0.75，向左移动 7.5
        assert!((node.position().x - 2.5).abs() < 1e-4);
        reversed.step(0.5);
        assert!((node.position().x - 0.0).abs() < 1e-4);
    }

    #[test]
    fn test_ease_back_overshoots() {
        let node = SceneNode::new("n").shared();
        let mut ease = Ease::new(
            MoveBy::new(1.0, Vec2::new(100.0, 0.0)).boxed(),
            EasingFunction::EaseOutBack,
        );
        ease.start_with_target(node.target());
        ease.step(0.7);
        assert!(node.position().x > 100.0);
        ease.step(0.3);
        assert!((node.position().x - 100.0).abs() < 1e-3);
    }
}
