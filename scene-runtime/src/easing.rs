//! # Easing 模块
//!
//! 缓动函数库：把归一化时间 `t ∈ [0, 1]` 映射为变形后的 `t'`。
//!
//! 所有曲线都是无状态的纯函数。每条曲线都有一个"时间反演"伙伴
//! （[`EasingFunction::reciprocal`]），`Ease` 动作反转时用它替换自身的曲线：
//! `In ↔ Out`，`InOut` 与 `Linear` 和自身配对。

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Back 系列的默认过冲量
const BACK_OVERSHOOT: f32 = 1.70158;

/// Elastic 系列的默认周期
pub const DEFAULT_ELASTIC_PERIOD: f32 = 0.3;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 幂次缓入 `t^rate`
    EaseIn { rate: f32 },
    /// 幂次缓出 `1 - (1 - t)^rate`
    EaseOut { rate: f32 },
    /// 幂次缓入缓出
    EaseInOut { rate: f32 },
    /// 指数缓入
    EaseInExpo,
    /// 指数缓出
    EaseOutExpo,
    /// 指数缓入缓出
    EaseInOutExpo,
    /// 正弦缓入
    EaseInSine,
    /// 正弦缓出
    EaseOutSine,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓入
    EaseInCubic,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    EaseInOutCubic,
    /// 四次缓入
    EaseInQuart,
    /// 四次缓出
    EaseOutQuart,
    /// 四次缓入缓出
    EaseInOutQuart,
    /// 五次缓入
    EaseInQuint,
    /// 五次缓出
    EaseOutQuint,
    /// 五次缓入缓出
    EaseInOutQuint,
    /// 圆弧缓入
    EaseInCirc,
    /// 圆弧缓出
    EaseOutCirc,
    /// 圆弧缓入缓出
    EaseInOutCirc,
    /// 弹性缓入
    EaseInElastic { period: f32 },
    /// 弹性缓出
    EaseOutElastic { period: f32 },
    /// 弹性缓入缓出
    EaseInOutElastic { period: f32 },
    /// 弹跳缓入
    EaseInBounce,
    /// 弹跳缓出
    EaseOutBounce,
    /// 弹跳缓入缓出
    EaseInOutBounce,
    /// 回拉缓入
    EaseInBack,
    /// 回拉缓出
    EaseOutBack,
    /// 回拉缓入缓出
    EaseInOutBack,
    /// 一维三次贝塞尔曲线（四个控制值）
    Bezier { p0: f32, p1: f32, p2: f32, p3: f32 },
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度，超出 `[0, 1]` 的输入会被限制
    ///
    /// # 返回
    /// - 缓动后的进度值。Back/Elastic 系列会短暂越过 `[0, 1]`。
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Self::Linear => t,
            Self::EaseIn { rate } => t.powf(rate),
            Self::EaseOut { rate } => 1.0 - (1.0 - t).powf(rate),
            Self::EaseInOut { rate } => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t.powf(rate)
                } else {
                    1.0 - 0.5 * (2.0 - t).powf(rate)
                }
            }
            Self::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * (t - 1.0))
                }
            }
            Self::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::EaseInOutExpo => ease_in_out_expo(t),
            Self::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Self::EaseOutSine => (t * PI / 2.0).sin(),
            Self::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutQuad => in_out_pow(t, 2),
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => in_out_pow(t, 3),
            Self::EaseInQuart => t.powi(4),
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Self::EaseInOutQuart => in_out_pow(t, 4),
            Self::EaseInQuint => t.powi(5),
            Self::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Self::EaseInOutQuint => in_out_pow(t, 5),
            Self::EaseInCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::EaseOutCirc => (1.0 - (t - 1.0) * (t - 1.0)).max(0.0).sqrt(),
            Self::EaseInOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - 4.0 * t * t).max(0.0).sqrt()) / 2.0
                } else {
                    let u = -2.0 * t + 2.0;
                    ((1.0 - u * u).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
            Self::EaseInElastic { period } => ease_in_elastic(t, period),
            Self::EaseOutElastic { period } => ease_out_elastic(t, period),
            Self::EaseInOutElastic { period } => ease_in_out_elastic(t, period),
            Self::EaseInBounce => 1.0 - ease_out_bounce(1.0 - t),
            Self::EaseOutBounce => ease_out_bounce(t),
            Self::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - ease_out_bounce(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + ease_out_bounce(2.0 * t - 1.0)) / 2.0
                }
            }
            Self::EaseInBack => ease_in_back(t),
            Self::EaseOutBack => 1.0 - ease_in_back(1.0 - t),
            Self::EaseInOutBack => ease_in_out_back(t),
            Self::Bezier { p0, p1, p2, p3 } => {
                let u = 1.0 - t;
                u * u * u * p0 + 3.0 * t * u * u * p1 + 3.0 * t * t * u * p2 + t * t * t * p3
            }
        }
    }

    /// 时间反演伙伴曲线：`reciprocal(f)(t) = 1 - f(1 - t)`
    ///
    /// 对所有变体满足 `e.reciprocal().reciprocal() == e`。
    pub fn reciprocal(&self) -> Self {
        match *self {
            Self::EaseIn { rate } => Self::EaseOut { rate },
            Self::EaseOut { rate } => Self::EaseIn { rate },
            Self::EaseInExpo => Self::EaseOutExpo,
            Self::EaseOutExpo => Self::EaseInExpo,
            Self::EaseInSine => Self::EaseOutSine,
            Self::EaseOutSine => Self::EaseInSine,
            Self::EaseInQuad => Self::EaseOutQuad,
            Self::EaseOutQuad => Self::EaseInQuad,
            Self::EaseInCubic => Self::EaseOutCubic,
            Self::EaseOutCubic => Self::EaseInCubic,
            Self::EaseInQuart => Self::EaseOutQuart,
            Self::EaseOutQuart => Self::EaseInQuart,
            Self::EaseInQuint => Self::EaseOutQuint,
            Self::EaseOutQuint => Self::EaseInQuint,
            Self::EaseInCirc => Self::EaseOutCirc,
            Self::EaseOutCirc => Self::EaseInCirc,
            Self::EaseInElastic { period } => Self::EaseOutElastic { period },
            Self::EaseOutElastic { period } => Self::EaseInElastic { period },
            Self::EaseInBounce => Self::EaseOutBounce,
            Self::EaseOutBounce => Self::EaseInBounce,
            Self::EaseInBack => Self::EaseOutBack,
            Self::EaseOutBack => Self::EaseInBack,
            Self::Bezier { p0, p1, p2, p3 } => Self::Bezier {
                p0: 1.0 - p3,
                p1: 1.0 - p2,
                p2: 1.0 - p1,
                p3: 1.0 - p0,
            },
            // 对称曲线与自身配对
            Self::Linear
            | Self::EaseInOut { .. }
            | Self::EaseInOutExpo
            | Self::EaseInOutSine
            | Self::EaseInOutQuad
            | Self::EaseInOutCubic
            | Self::EaseInOutQuart
            | Self::EaseInOutQuint
            | Self::EaseInOutCirc
            | Self::EaseInOutElastic { .. }
            | Self::EaseInOutBounce
            | Self::EaseInOutBack => *self,
        }
    }
}

/// 多项式缓入缓出
fn in_out_pow(t: f32, n: i32) -> f32 {
    if t < 0.5 {
        2.0_f32.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

fn ease_in_out_expo(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * 2.0_f32.powf(10.0 * (t - 1.0))
    } else {
        0.5 * (2.0 - 2.0_f32.powf(-10.0 * (t - 1.0)))
    }
}

/// 弹性缓入
fn ease_in_elastic(t: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = period / 4.0;
    let t = t - 1.0;
    -(2.0_f32.powf(10.0 * t)) * ((t - s) * 2.0 * PI / period).sin()
}

/// 弹性缓出
fn ease_out_elastic(t: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = period / 4.0;
    2.0_f32.powf(-10.0 * t) * ((t - s) * 2.0 * PI / period).sin() + 1.0
}

/// 弹性缓入缓出
fn ease_in_out_elastic(t: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = period / 4.0;
    let t = t * 2.0 - 1.0;
    let wave = ((t - s) * 2.0 * PI / period).sin();
    if t < 0.0 {
        -0.5 * 2.0_f32.powf(10.0 * t) * wave
    } else {
        0.5 * 2.0_f32.powf(-10.0 * t) * wave + 1.0
    }
}

/// 弹跳缓出
fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

fn ease_in_back(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = BACK_OVERSHOOT;
    t * t * ((s + 1.0) * t - s)
}

fn ease_in_out_back(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = BACK_OVERSHOOT * 1.525;
    let t = t * 2.0;
    if t < 1.0 {
        (t * t * ((s + 1.0) * t - s)) / 2.0
    } else {
        let t = t - 2.0;
        (t * t * ((s + 1.0) * t + s)) / 2.0 + 1.0
    }
}
