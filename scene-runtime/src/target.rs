//! # Target 模块
//!
//! 动作与调度器看到的"目标"抽象。
//!
//! ## 核心概念
//!
//! - [`TargetId`]: 不透明的身份标识，只比较身份，从不比较值
//! - [`Animatable`]: 动作对目标的唯一视图，按名称读写 f32 属性
//! - [`Target`]: `TargetId` + `Rc<dyn Animatable>` 的可克隆句柄
//!
//! 调度器只使用 `TargetId` 作为键，从不解引用目标；
//! 只有动作本身会通过 `Target` 读写属性。

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::transform::{Color3, Vec2};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// 目标唯一标识符
///
/// 由进程内单调递增的计数器分配，永不复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// 分配一个新的标识符
    pub fn next() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.0)
    }
}

impl From<&Target> for TargetId {
    fn from(target: &Target) -> Self {
        target.id()
    }
}

/// 内置属性名
pub mod props {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const ROTATION: &str = "rotation";
    pub const SCALE_X: &str = "scale_x";
    pub const SCALE_Y: &str = "scale_y";
    pub const SKEW_X: &str = "skew_x";
    pub const SKEW_Y: &str = "skew_y";
    /// 不透明度 (0.0 - 255.0)
    pub const OPACITY: &str = "opacity";
    /// 可见性（0.0 / 1.0）
    pub const VISIBLE: &str = "visible";
    pub const FLIP_X: &str = "flip_x";
    pub const FLIP_Y: &str = "flip_y";
    pub const COLOR_R: &str = "color_r";
    pub const COLOR_G: &str = "color_g";
    pub const COLOR_B: &str = "color_b";
    /// 标记目标已请求从父节点移除（0.0 / 1.0）
    pub const REMOVED: &str = "removed";
}

/// 可动画对象接口
///
/// 对象通过实现此 trait 暴露自己的属性。方法只接收 `&self`，
/// 对象自己用 `Cell`/`RefCell` 管理内部可变性，这样多个动作可以
/// 同时作用于同一个对象而不违反借用规则。
pub trait Animatable: 'static {
    /// 对象身份。同一个对象必须始终返回同一个值。
    fn id(&self) -> TargetId;

    /// 获取属性的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在
    /// - `None`: 属性不存在
    fn get_property(&self, property_id: &str) -> Option<f32>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 属性不存在或设置失败
    fn set_property(&self, property_id: &str, value: f32) -> bool;
}

/// 动作目标句柄
///
/// 克隆开销很小（一次 `Rc` 计数）。相等性与哈希只看 [`TargetId`]。
#[derive(Clone)]
pub struct Target {
    id: TargetId,
    object: Rc<dyn Animatable>,
}

impl Target {
    /// 包装一个可动画对象
    pub fn new<T: Animatable>(object: Rc<T>) -> Self {
        let id = object.id();
        Self {
            id,
            object: object as Rc<dyn Animatable>,
        }
    }

    /// 目标身份
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// 读取属性
    pub fn get(&self, property_id: &str) -> Option<f32> {
        self.object.get_property(property_id)
    }

    /// 读取属性，不存在时返回默认值
    pub fn get_or(&self, property_id: &str, default: f32) -> f32 {
        self.get(property_id).unwrap_or(default)
    }

    /// 写入属性
    pub fn set(&self, property_id: &str, value: f32) -> bool {
        let ok = self.object.set_property(property_id, value);
        if !ok {
            trace!(target_id = %self.id, property = property_id, "属性不存在，忽略写入");
        }
        ok
    }

    /// 当前位置
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.get_or(props::X, 0.0), self.get_or(props::Y, 0.0))
    }

    /// 设置位置
    pub fn set_position(&self, position: Vec2) {
        self.set(props::X, position.x);
        self.set(props::Y, position.y);
    }

    /// 当前颜色
    pub fn color(&self) -> Color3 {
        Color3::new(
            self.get_or(props::COLOR_R, 255.0),
            self.get_or(props::COLOR_G, 255.0),
            self.get_or(props::COLOR_B, 255.0),
        )
    }

    /// 设置颜色
    pub fn set_color(&self, color: Color3) {
        self.set(props::COLOR_R, color.r);
        self.set(props::COLOR_G, color.g);
        self.set(props::COLOR_B, color.b);
    }

    /// 读取布尔属性（非 0 即真）
    pub fn flag(&self, property_id: &str) -> bool {
        self.get_or(property_id, 0.0) != 0.0
    }

    /// 写入布尔属性
    pub fn set_flag(&self, property_id: &str, value: bool) {
        self.set(property_id, if value { 1.0 } else { 0.0 });
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("id", &self.id).finish()
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
