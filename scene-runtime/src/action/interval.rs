//! # Interval 模块
//!
//! 有时长的叶子动作。
//!
//! 每种叶子动作只描述"效果"（[`Tween`]）：启动时记录起始状态，
//! 按归一化时间应用效果，给出反演后的效果。时间轴、目标绑定和
//! `Action` 接口由通用的 [`IntervalAction`] 负责。
//!
//! `*By` 动作能精确反转（取反增量）；`*To` 动作不知道运行前的起始状态，
//! 反转结果是近似的（返回同一个终点），这是已知的非双射情形。

use std::fmt;

use tracing::debug;

use super::{Action, ActionCore, FiniteTimeAction, IntervalState};
use crate::error::{ActionError, check_duration};
use crate::target::{Target, props};
use crate::transform::{Color3, Vec2};

/// 叶子动作的效果
pub trait Tween: fmt::Debug + Clone + 'static {
    /// 绑定目标时记录起始状态
    fn start(&mut self, _target: &Target) {}

    /// 应用归一化时间 `t` 的效果
    fn apply(&mut self, target: &Target, t: f32);

    /// 动作停止时的收尾（例如恢复可见性）
    fn finish(&mut self, _target: &Target) {}

    /// 时间反演后的效果
    fn reversed(&self) -> Self;
}

/// 通用的有时长动作
#[derive(Debug, Clone)]
pub struct IntervalAction<T: Tween> {
    core: ActionCore,
    state: IntervalState,
    tween: T,
}

impl<T: Tween> IntervalAction<T> {
    /// 由时长和效果创建
    pub fn from_tween(duration: f32, tween: T) -> Self {
        Self {
            core: ActionCore::default(),
            state: IntervalState::new(duration),
            tween,
        }
    }

    /// 由时长和效果创建，拒绝负数或非有限时长
    pub fn try_from_tween(duration: f32, tween: T) -> Result<Self, ActionError> {
        Ok(Self::from_tween(check_duration(duration)?, tween))
    }

    /// 效果
    pub fn tween(&self) -> &T {
        &self.tween
    }

    fn fresh(&self) -> Self {
        Self {
            core: self.core.fresh(),
            state: IntervalState::new(self.state.duration()),
            tween: self.tween.clone(),
        }
    }
}

impl<T: Tween> Action for IntervalAction<T> {
    fn start_with_target(&mut self, target: Target) {
        self.state.reset();
        self.tween.start(&target);
        self.core.bind(target);
    }

    fn step(&mut self, dt: f32) {
        let t = self.state.advance(dt);
        self.update(t);
    }

    fn update(&mut self, t: f32) {
        if let Some(target) = &self.core.target {
            self.tween.apply(target, t);
        }
    }

    fn is_done(&self) -> bool {
        self.state.is_done()
    }

    fn stop(&mut self) {
        if let Some(target) = self.core.target.take() {
            self.tween.finish(&target);
        }
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

impl<T: Tween> FiniteTimeAction for IntervalAction<T> {
    fn duration(&self) -> f32 {
        self.state.duration()
    }

    fn elapsed(&self) -> f32 {
        self.state.elapsed()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let mut reversed = Self::from_tween(self.state.duration(), self.tween.reversed());
        reversed.core.tag = self.core.tag;
        Box::new(reversed)
    }

    fn clone_finite(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(self.fresh())
    }
}

// ========== 延迟 ==========

/// 什么也不做的效果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delay;

impl Tween for Delay {
    fn apply(&mut self, _target: &Target, _t: f32) {}

    fn reversed(&self) -> Self {
        *self
    }
}

/// 延迟
pub type DelayTime = IntervalAction<Delay>;

impl DelayTime {
    pub fn new(duration: f32) -> Self {
        Self::from_tween(duration, Delay)
    }
}

// ========== 移动 ==========

/// 可叠加的位置轨迹
///
/// 其它动作在两帧之间对位置的修改会平移起点，
/// 这样多个相对移动可以同时作用于同一个目标（例如 `Spawn` 中的两个 `MoveBy`）。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Stackable {
    start: Vec2,
    previous: Vec2,
}

impl Stackable {
    fn start(&mut self, target: &Target) {
        self.start = target.position();
        self.previous = self.start;
    }

    fn place(&mut self, target: &Target, offset: Vec2) {
        let current = target.position();
        self.start = self.start + (current - self.previous);
        let next = self.start + offset;
        target.set_position(next);
        self.previous = next;
    }
}

/// 相对移动
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveByTween {
    delta: Vec2,
    track: Stackable,
}

impl Tween for MoveByTween {
    fn start(&mut self, target: &Target) {
        self.track.start(target);
    }

    fn apply(&mut self, target: &Target, t: f32) {
        self.track.place(target, self.delta.scale(t));
    }

    fn reversed(&self) -> Self {
        Self {
            delta: -self.delta,
            track: Stackable::default(),
        }
    }
}

/// 相对移动
pub type MoveBy = IntervalAction<MoveByTween>;

impl MoveBy {
    pub fn new(duration: f32, delta: Vec2) -> Self {
        Self::from_tween(
            duration,
            MoveByTween {
                delta,
                track: Stackable::default(),
            },
        )
    }
}

/// 移动到绝对位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveToTween {
    end: Vec2,
    start: Vec2,
}

impl Tween for MoveToTween {
    fn start(&mut self, target: &Target) {
        self.start = target.position();
    }

    fn apply(&mut self, target: &Target, t: f32) {
        target.set_position(self.start.lerp(self.end, t));
    }

    fn reversed(&self) -> Self {
        debug!("MoveTo 无法精确反转，返回同一终点");
        *self
    }
}

/// 移动到绝对位置
pub type MoveTo = IntervalAction<MoveToTween>;

impl MoveTo {
    pub fn new(duration: f32, end: Vec2) -> Self {
        Self::from_tween(
            duration,
            MoveToTween {
                end,
                start: Vec2::zero(),
            },
        )
    }
}

// ========== 跳跃 ==========

/// 抛物线跳跃
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpTween {
    /// 相对位移；`JumpTo` 在启动时由终点换算
    delta: Vec2,
    /// `JumpTo` 的绝对终点
    end: Option<Vec2>,
    height: f32,
    jumps: u32,
    track: Stackable,
}

impl Tween for JumpTween {
    fn start(&mut self, target: &Target) {
        self.track.start(target);
        if let Some(end) = self.end {
            self.delta = end - self.track.start;
        }
    }

    fn apply(&mut self, target: &Target, t: f32) {
        let jumps = self.jumps.max(1) as f32;
        let frac = if t >= 1.0 { 0.0 } else { (t * jumps) % 1.0 };
        let y = self.height * 4.0 * frac * (1.0 - frac) + self.delta.y * t;
        let x = self.delta.x * t;
        self.track.place(target, Vec2::new(x, y));
    }

    fn reversed(&self) -> Self {
        match self.end {
            Some(_) => {
                debug!("JumpTo 无法精确反转，返回同一终点");
                *self
            }
            None => Self {
                delta: -self.delta,
                ..*self
            },
        }
    }
}

/// 相对跳跃
pub type JumpBy = IntervalAction<JumpTween>;

impl JumpBy {
    pub fn new(duration: f32, delta: Vec2, height: f32, jumps: u32) -> Self {
        Self::from_tween(
            duration,
            JumpTween {
                delta,
                end: None,
                height,
                jumps,
                track: Stackable::default(),
            },
        )
    }
}

/// 跳跃到绝对位置（与 `JumpBy` 共享效果类型）
pub struct JumpTo;

impl JumpTo {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32, end: Vec2, height: f32, jumps: u32) -> JumpBy {
        JumpBy::from_tween(
            duration,
            JumpTween {
                delta: Vec2::zero(),
                end: Some(end),
                height,
                jumps,
                track: Stackable::default(),
            },
        )
    }
}

// ========== 贝塞尔 ==========

fn bezier_at(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * a + 3.0 * t * u * u * b + 3.0 * t * t * u * c + t * t * t * d
}

/// 三次贝塞尔路径（控制点相对起点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierTween {
    control_1: Vec2,
    control_2: Vec2,
    end: Vec2,
    /// `BezierTo` 的控制点是绝对坐标，启动时换算
    absolute: bool,
    relative: [Vec2; 3],
    track: Stackable,
}

impl Tween for BezierTween {
    fn start(&mut self, target: &Target) {
        self.track.start(target);
        let start = self.track.start;
        self.relative = if self.absolute {
            [
                self.control_1 - start,
                self.control_2 - start,
                self.end - start,
            ]
        } else {
            [self.control_1, self.control_2, self.end]
        };
    }

    fn apply(&mut self, target: &Target, t: f32) {
        let [c1, c2, end] = self.relative;
        let x = bezier_at(0.0, c1.x, c2.x, end.x, t);
        let y = bezier_at(0.0, c1.y, c2.y, end.y, t);
        self.track.place(target, Vec2::new(x, y));
    }

    fn reversed(&self) -> Self {
        if self.absolute {
            debug!("BezierTo 无法精确反转，返回同一路径");
            return *self;
        }
        Self {
            control_1: self.control_2 - self.end,
            control_2: self.control_1 - self.end,
            end: -self.end,
            ..*self
        }
    }
}

/// 相对贝塞尔移动
pub type BezierBy = IntervalAction<BezierTween>;

impl BezierBy {
    pub fn new(duration: f32, control_1: Vec2, control_2: Vec2, end: Vec2) -> Self {
        Self::from_tween(
            duration,
            BezierTween {
                control_1,
                control_2,
                end,
                absolute: false,
                relative: [Vec2::zero(); 3],
                track: Stackable::default(),
            },
        )
    }
}

/// 绝对贝塞尔移动（与 `BezierBy` 共享效果类型）
pub struct BezierTo;

impl BezierTo {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32, control_1: Vec2, control_2: Vec2, end: Vec2) -> BezierBy {
        BezierBy::from_tween(
            duration,
            BezierTween {
                control_1,
                control_2,
                end,
                absolute: true,
                relative: [Vec2::zero(); 3],
                track: Stackable::default(),
            },
        )
    }
}

// ========== 成对属性（缩放、倾斜） ==========

/// 两个属性的插值方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairMode {
    /// 终值 = 起始值 + 增量
    By(Vec2),
    /// 终值 = 起始值 × 倍率
    Times(Vec2),
    /// 终值为给定值
    To(Vec2),
}

/// 同时插值两个属性（x/y 分量）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairTween {
    keys: (&'static str, &'static str),
    mode: PairMode,
    start: Vec2,
    end: Vec2,
}

impl PairTween {
    fn new(keys: (&'static str, &'static str), mode: PairMode) -> Self {
        Self {
            keys,
            mode,
            start: Vec2::zero(),
            end: Vec2::zero(),
        }
    }
}

impl Tween for PairTween {
    fn start(&mut self, target: &Target) {
        let (kx, ky) = self.keys;
        self.start = Vec2::new(target.get_or(kx, 0.0), target.get_or(ky, 0.0));
        self.end = match self.mode {
            PairMode::By(delta) => self.start + delta,
            PairMode::Times(factor) => {
                Vec2::new(self.start.x * factor.x, self.start.y * factor.y)
            }
            PairMode::To(end) => end,
        };
    }

    fn apply(&mut self, target: &Target, t: f32) {
        let value = self.start.lerp(self.end, t);
        target.set(self.keys.0, value.x);
        target.set(self.keys.1, value.y);
    }

    fn reversed(&self) -> Self {
        let mode = match self.mode {
            PairMode::By(delta) => PairMode::By(-delta),
            PairMode::Times(factor) => {
                PairMode::Times(Vec2::new(1.0 / factor.x, 1.0 / factor.y))
            }
            PairMode::To(end) => {
                debug!("*To 动作无法精确反转，返回同一终点");
                PairMode::To(end)
            }
        };
        Self::new(self.keys, mode)
    }
}

/// 按倍率缩放
pub type ScaleBy = IntervalAction<PairTween>;

impl ScaleBy {
    pub fn new(duration: f32, sx: f32, sy: f32) -> Self {
        Self::from_tween(
            duration,
            PairTween::new(
                (props::SCALE_X, props::SCALE_Y),
                PairMode::Times(Vec2::new(sx, sy)),
            ),
        )
    }
}

/// 缩放到给定值（与 `ScaleBy` 共享效果类型）
pub struct ScaleTo;

impl ScaleTo {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32, sx: f32, sy: f32) -> ScaleBy {
        ScaleBy::from_tween(
            duration,
            PairTween::new(
                (props::SCALE_X, props::SCALE_Y),
                PairMode::To(Vec2::new(sx, sy)),
            ),
        )
    }
}

/// 相对倾斜
pub struct SkewBy;

impl SkewBy {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32, dx: f32, dy: f32) -> IntervalAction<PairTween> {
        IntervalAction::from_tween(
            duration,
            PairTween::new(
                (props::SKEW_X, props::SKEW_Y),
                PairMode::By(Vec2::new(dx, dy)),
            ),
        )
    }
}

/// 倾斜到给定角度
pub struct SkewTo;

impl SkewTo {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32, sx: f32, sy: f32) -> IntervalAction<PairTween> {
        IntervalAction::from_tween(
            duration,
            PairTween::new(
                (props::SKEW_X, props::SKEW_Y),
                PairMode::To(Vec2::new(sx, sy)),
            ),
        )
    }
}

// ========== 旋转 ==========

/// 旋转
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateTween {
    /// `Some` 表示相对角度
    by: Option<f32>,
    /// `RotateTo` 的目标角度
    to: f32,
    start: f32,
    diff: f32,
}

impl Tween for RotateTween {
    fn start(&mut self, target: &Target) {
        let current = target.get_or(props::ROTATION, 0.0);
        match self.by {
            Some(angle) => {
                self.start = current;
                self.diff = angle;
            }
            None => {
                // 走最短路径
                self.start = current % 360.0;
                let mut diff = self.to - self.start;
                if diff > 180.0 {
                    diff -= 360.0;
                }
                if diff < -180.0 {
                    diff += 360.0;
                }
                self.diff = diff;
            }
        }
    }

    fn apply(&mut self, target: &Target, t: f32) {
        target.set(props::ROTATION, self.start + self.diff * t);
    }

    fn reversed(&self) -> Self {
        match self.by {
            Some(angle) => Self {
                by: Some(-angle),
                ..*self
            },
            None => {
                debug!("RotateTo 无法精确反转，返回同一终点");
                *self
            }
        }
    }
}

/// 相对旋转（度）
pub type RotateBy = IntervalAction<RotateTween>;

impl RotateBy {
    pub fn new(duration: f32, angle: f32) -> Self {
        Self::from_tween(
            duration,
            RotateTween {
                by: Some(angle),
                to: 0.0,
                start: 0.0,
                diff: 0.0,
            },
        )
    }
}

/// 旋转到给定角度（与 `RotateBy` 共享效果类型）
pub struct RotateTo;

impl RotateTo {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32, angle: f32) -> RotateBy {
        RotateBy::from_tween(
            duration,
            RotateTween {
                by: None,
                to: angle,
                start: 0.0,
                diff: 0.0,
            },
        )
    }
}

// ========== 不透明度 ==========

/// 不透明度渐变
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTween {
    to: f32,
    /// 反转后的终点（FadeIn ↔ FadeOut）
    reverse_to: f32,
    from: f32,
}

impl Tween for FadeTween {
    fn start(&mut self, target: &Target) {
        self.from = target.get_or(props::OPACITY, 255.0);
    }

    fn apply(&mut self, target: &Target, t: f32) {
        target.set(props::OPACITY, self.from + (self.to - self.from) * t);
    }

    fn reversed(&self) -> Self {
        Self {
            to: self.reverse_to,
            reverse_to: self.to,
            from: 0.0,
        }
    }
}

/// 渐变到给定不透明度
pub type FadeTo = IntervalAction<FadeTween>;

impl FadeTo {
    pub fn new(duration: f32, opacity: f32) -> Self {
        Self::from_tween(
            duration,
            FadeTween {
                to: opacity,
                reverse_to: opacity,
                from: 0.0,
            },
        )
    }
}

/// 淡入（反转为淡出）
pub struct FadeIn;

impl FadeIn {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32) -> FadeTo {
        FadeTo::from_tween(
            duration,
            FadeTween {
                to: 255.0,
                reverse_to: 0.0,
                from: 0.0,
            },
        )
    }
}

/// 淡出（反转为淡入）
pub struct FadeOut;

impl FadeOut {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32) -> FadeTo {
        FadeTo::from_tween(
            duration,
            FadeTween {
                to: 0.0,
                reverse_to: 255.0,
                from: 0.0,
            },
        )
    }
}

// ========== 颜色 ==========

/// 颜色渐变
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintTween {
    /// `Some` 表示相对增量
    delta: Option<Color3>,
    to: Color3,
    from: Color3,
}

impl Tween for TintTween {
    fn start(&mut self, target: &Target) {
        self.from = target.color();
        if let Some(delta) = self.delta {
            self.to = Color3::new(
                self.from.r + delta.r,
                self.from.g + delta.g,
                self.from.b + delta.b,
            );
        }
    }

    fn apply(&mut self, target: &Target, t: f32) {
        target.set_color(self.from.lerp(self.to, t));
    }

    fn reversed(&self) -> Self {
        match self.delta {
            Some(delta) => Self {
                delta: Some(Color3::new(-delta.r, -delta.g, -delta.b)),
                ..*self
            },
            None => {
                debug!("TintTo 无法精确反转，返回同一终点");
                *self
            }
        }
    }
}

/// 相对颜色渐变
pub type TintBy = IntervalAction<TintTween>;

impl TintBy {
    pub fn new(duration: f32, dr: f32, dg: f32, db: f32) -> Self {
        Self::from_tween(
            duration,
            TintTween {
                delta: Some(Color3::new(dr, dg, db)),
                to: Color3::WHITE,
                from: Color3::WHITE,
            },
        )
    }
}

/// 渐变到给定颜色（与 `TintBy` 共享效果类型）
pub struct TintTo;

impl TintTo {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration: f32, color: Color3) -> TintBy {
        TintBy::from_tween(
            duration,
            TintTween {
                delta: None,
                to: color,
                from: Color3::WHITE,
            },
        )
    }
}

// ========== 闪烁 ==========

/// 闪烁
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkTween {
    times: u32,
    original_visible: bool,
}

impl Tween for BlinkTween {
    fn start(&mut self, target: &Target) {
        self.original_visible = target.flag(props::VISIBLE);
    }

    fn apply(&mut self, target: &Target, t: f32) {
        if t >= 1.0 {
            target.set_flag(props::VISIBLE, self.original_visible);
            return;
        }
        let slice = 1.0 / self.times.max(1) as f32;
        let m = t % slice;
        target.set_flag(props::VISIBLE, m > slice / 2.0);
    }

    fn finish(&mut self, target: &Target) {
        target.set_flag(props::VISIBLE, self.original_visible);
    }

    fn reversed(&self) -> Self {
        *self
    }
}

/// 闪烁 `times` 次，结束后恢复原可见性
pub type Blink = IntervalAction<BlinkTween>;

impl Blink {
    pub fn new(duration: f32, times: u32) -> Self {
        Self::from_tween(
            duration,
            BlinkTween {
                times,
                original_visible: true,
            },
        )
    }
}

// ========== 任意属性 ==========

/// 任意命名属性的插值
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTweenEffect {
    property: String,
    from: f32,
    to: f32,
}

impl Tween for PropertyTweenEffect {
    fn apply(&mut self, target: &Target, t: f32) {
        target.set(&self.property, self.from + (self.to - self.from) * t);
    }

    fn reversed(&self) -> Self {
        Self {
            property: self.property.clone(),
            from: self.to,
            to: self.from,
        }
    }
}

/// 把属性 `property` 从 `from` 插值到 `to`
pub type PropertyTween = IntervalAction<PropertyTweenEffect>;

impl PropertyTween {
    pub fn new(duration: f32, property: impl Into<String>, from: f32, to: f32) -> Self {
        Self::from_tween(
            duration,
            PropertyTweenEffect {
                property: property.into(),
                from,
                to,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FiniteTimeActionExt;
    use crate::node::SceneNode;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn run(action: &mut dyn FiniteTimeAction, target: &Target, dts: &[f32]) {
        action.start_with_target(target.clone());
        for dt in dts {
            action.step(*dt);
        }
    }

    #[test]
    fn test_move_by() {
        let node = SceneNode::new("n").at(10.0, 10.0).shared();
        let mut action = MoveBy::new(1.0, Vec2::new(100.0, -20.0));

        run(&mut action, &node.target(), &[0.5]);
        assert_eq!(node.position(), Vec2::new(60.0, 0.0));
        assert!(!action.is_done());

        action.step(0.5);
        assert_eq!(node.position(), Vec2::new(110.0, -10.0));
        assert!(action.is_done());

        // 完成后再推进不会继续移动
        action.step(0.5);
        assert_eq!(node.position(), Vec2::new(110.0, -10.0));
    }

    #[test]
    fn test_move_by_reverse_undoes() {
        let node = SceneNode::new("n").at(5.0, 5.0).shared();
        let mut forward = MoveBy::new(1.0, Vec2::new(30.0, 40.0));
        run(&mut forward, &node.target(), &[1.0]);

        let mut back = forward.reverse();
        run(back.as_mut(), &node.target(), &[1.0]);
        assert_eq!(node.position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_move_by_stacks() {
        let node = SceneNode::new("n").shared();
        let target = node.target();
        let mut right = MoveBy::new(1.0, Vec2::new(10.0, 0.0));
        let mut up = MoveBy::new(1.0, Vec2::new(0.0, 10.0));
        right.start_with_target(target.clone());
        up.start_with_target(target.clone());

        for _ in 0..4 {
            right.step(0.25);
            up.step(0.25);
        }
        assert_eq!(node.position(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_move_to() {
        let node = SceneNode::new("n").shared();
        let mut action = MoveTo::new(2.0, Vec2::new(20.0, 40.0));
        run(&mut action, &node.target(), &[1.0]);
        assert_eq!(node.position(), Vec2::new(10.0, 20.0));
        action.step(1.0);
        assert_eq!(node.position(), Vec2::new(20.0, 40.0));
    }

    #[test]
    fn test_zero_duration_completes_on_first_step() {
        let node = SceneNode::new("n").shared();
        let mut action = MoveTo::new(0.0, Vec2::new(7.0, 8.0));
        run(&mut action, &node.target(), &[0.0]);
        assert!(action.is_done());
        assert_eq!(node.position(), Vec2::new(7.0, 8.0));
    }

    #[test]
    fn test_jump_by_lands() {
        let node = SceneNode::new("n").shared();
        let mut action = JumpBy::new(1.0, Vec2::new(100.0, 0.0), 50.0, 2);

        run(&mut action, &node.target(), &[0.25]);
        // 第一跳的顶点
        assert!(approx(node.position().y, 50.0));

        action.step(0.75);
        assert!(approx(node.position().x, 100.0));
        assert!(approx(node.position().y, 0.0));
    }

    #[test]
    fn test_jump_to() {
        let node = SceneNode::new("n").at(10.0, 0.0).shared();
        let mut action = JumpTo::new(1.0, Vec2::new(60.0, 10.0), 30.0, 1);
        run(&mut action, &node.target(), &[1.0]);
        assert!(approx(node.position().x, 60.0));
        assert!(approx(node.position().y, 10.0));
    }

    #[test]
    fn test_bezier_by_and_reverse() {
        let node = SceneNode::new("n").shared();
        let mut action = BezierBy::new(
            1.0,
            Vec2::new(0.0, 100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        run(&mut action, &node.target(), &[0.5]);
        assert!(approx(node.position().x, 50.0));
        assert!(approx(node.position().y, 75.0));
        action.step(0.5);
        assert_eq!(node.position(), Vec2::new(100.0, 0.0));

        let mut back = action.reverse();
        run(back.as_mut(), &node.target(), &[1.0]);
        assert!(approx(node.position().x, 0.0));
        assert!(approx(node.position().y, 0.0));
    }

    #[test]
    fn test_bezier_to() {
        let node = SceneNode::new("n").at(10.0, 10.0).shared();
        let mut action = BezierTo::new(
            1.0,
            Vec2::new(10.0, 50.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(50.0, 10.0),
        );
        run(&mut action, &node.target(), &[1.0]);
        assert!(approx(node.position().x, 50.0));
        assert!(approx(node.position().y, 10.0));
    }

    #[test]
    fn test_scale_by_and_reverse() {
        let node = SceneNode::new("n").shared();
        let mut action = ScaleBy::new(1.0, 2.0, 4.0);
        run(&mut action, &node.target(), &[1.0]);
        assert_eq!(node.scale(), Vec2::new(2.0, 4.0));

        let mut back = action.reverse();
        run(back.as_mut(), &node.target(), &[1.0]);
        assert_eq!(node.scale(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_scale_to() {
        let node = SceneNode::new("n").shared();
        let mut action = ScaleTo::new(1.0, 3.0, 3.0);
        run(&mut action, &node.target(), &[0.5]);
        assert_eq!(node.scale(), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_skew() {
        let node = SceneNode::new("n").shared();
        let target = node.target();
        let mut action = SkewBy::new(1.0, 10.0, -10.0);
        run(&mut action, &target, &[1.0]);
        assert_eq!(target.get(props::SKEW_X), Some(10.0));

        let mut to = SkewTo::new(1.0, 0.0, 0.0);
        run(&mut to, &target, &[1.0]);
        assert_eq!(target.get(props::SKEW_Y), Some(0.0));
    }

    #[test]
    fn test_rotate_by_and_reverse() {
        let node = SceneNode::new("n").shared();
        let mut action = RotateBy::new(1.0, 720.0);
        run(&mut action, &node.target(), &[1.0]);
        assert_eq!(node.rotation(), 720.0);

        let mut back = action.reverse();
        run(back.as_mut(), &node.target(), &[1.0]);
        assert_eq!(node.rotation(), 0.0);
    }

    #[test]
    fn test_rotate_to_shortest_path() {
        let node = SceneNode::new("n").shared();
        let target = node.target();
        target.set(props::ROTATION, 350.0);

        let mut action = RotateTo::new(1.0, 10.0);
        run(&mut action, &target, &[0.5]);
        // 350 → 370 而不是 350 → 10
        assert!(approx(node.rotation(), 360.0));
        action.step(0.5);
        assert!(approx(node.rotation(), 370.0));
    }

    #[test]
    fn test_fade_in_out() {
        let node = SceneNode::new("n").shared();
        let target = node.target();
        target.set(props::OPACITY, 0.0);

        let mut fade_in = FadeIn::new(1.0);
        run(&mut fade_in, &target, &[0.5]);
        assert!(approx(node.opacity(), 127.5));
        fade_in.step(0.5);
        assert_eq!(node.opacity(), 255.0);

        // FadeIn 的反转是 FadeOut
        let mut fade_out = fade_in.reverse();
        run(fade_out.as_mut(), &target, &[1.0]);
        assert_eq!(node.opacity(), 0.0);
    }

    #[test]
    fn test_fade_to() {
        let node = SceneNode::new("n").shared();
        let mut action = FadeTo::new(1.0, 55.0);
        run(&mut action, &node.target(), &[1.0]);
        assert_eq!(node.opacity(), 55.0);
    }

    #[test]
    fn test_tint() {
        let node = SceneNode::new("n").shared();
        let target = node.target();
        let mut action = TintTo::new(1.0, Color3::new(0.0, 0.0, 0.0));
        run(&mut action, &target, &[1.0]);
        assert_eq!(target.color(), Color3::new(0.0, 0.0, 0.0));

        let mut by = TintBy::new(1.0, 10.0, 20.0, 30.0);
        run(&mut by, &target, &[1.0]);
        assert_eq!(target.color(), Color3::new(10.0, 20.0, 30.0));

        let mut back = by.reverse();
        run(back.as_mut(), &target, &[1.0]);
        assert_eq!(target.color(), Color3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_blink_restores_visibility() {
        let node = SceneNode::new("n").shared();
        let mut action = Blink::new(1.0, 2);
        run(&mut action, &node.target(), &[0.1]);
        // 第一段的前半段不可见
        assert!(!node.is_visible());
        action.step(0.2);
        assert!(node.is_visible());

        action.step(0.7);
        assert!(action.is_done());
        action.stop();
        assert!(node.is_visible());
    }

    #[test]
    fn test_property_tween() {
        let node = SceneNode::new("bar").with_property("progress", 0.0).shared();
        let mut action = PropertyTween::new(2.0, "progress", 0.0, 100.0);
        run(&mut action, &node.target(), &[0.5]);
        assert_eq!(node.custom("progress"), Some(25.0));

        let mut back = action.reverse();
        run(back.as_mut(), &node.target(), &[2.0]);
        assert_eq!(node.custom("progress"), Some(0.0));
    }

    #[test]
    fn test_stop_detaches_target() {
        let node = SceneNode::new("n").shared();
        let mut action = DelayTime::new(1.0).with_tag(7);
        action.start_with_target(node.target());
        assert!(action.target().is_some());

        action.stop();
        action.stop();
        assert!(action.target().is_none());
        assert!(action.original_target().is_some());
        assert_eq!(action.tag(), 7);
    }

    #[test]
    fn test_checked_duration() {
        assert!(IntervalAction::try_from_tween(0.5, Delay).is_ok());
        assert_eq!(
            IntervalAction::try_from_tween(-1.0, Delay).unwrap_err(),
            ActionError::InvalidDuration { duration: -1.0 }
        );
        assert!(IntervalAction::try_from_tween(f32::INFINITY, Delay).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let node = SceneNode::new("n").shared();
        let mut action = MoveBy::new(1.0, Vec2::new(10.0, 0.0));
        run(&mut action, &node.target(), &[0.5]);

        let copy = action.clone_finite();
        assert_eq!(copy.elapsed(), 0.0);
        assert!(copy.target().is_none());
        assert_eq!(copy.duration(), 1.0);
        assert_eq!(action.elapsed(), 0.5);
    }
}
