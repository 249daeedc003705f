//! # Node 模块
//!
//! 最小的内存场景节点，实现 [`Animatable`]。
//!
//! 真正的场景图（渲染、父子关系、仿射矩阵）是外部协作者；
//! `SceneNode` 只保存动作会读写的那部分状态，供无头宿主和测试使用。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::target::{Animatable, Target, TargetId, props};
use crate::transform::{Color3, Vec2};

/// 场景节点的内部数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeData {
    /// 节点名称（仅用于调试）
    pub name: String,
    /// 位置
    pub position: Vec2,
    /// 缩放
    pub scale: Vec2,
    /// 旋转角度（度）
    pub rotation: f32,
    /// 倾斜角度（度）
    pub skew: Vec2,
    /// 不透明度 (0.0 - 255.0)
    pub opacity: f32,
    /// 颜色
    pub color: Color3,
    pub visible: bool,
    pub flip_x: bool,
    pub flip_y: bool,
    /// 是否已请求从父节点移除
    pub removed: bool,
    /// 自定义属性（`PropertyTween` 使用）
    pub custom: BTreeMap<String, f32>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec2::zero(),
            scale: Vec2::one(),
            rotation: 0.0,
            skew: Vec2::zero(),
            opacity: 255.0,
            color: Color3::WHITE,
            visible: true,
            flip_x: false,
            flip_y: false,
            removed: false,
            custom: BTreeMap::new(),
        }
    }
}

/// 可动画的场景节点
///
/// ## 支持的属性
///
/// [`props`] 中的全部内置属性，外加通过 [`SceneNode::with_property`]
/// 声明的自定义属性。未声明的属性读写都会失败。
#[derive(Debug)]
pub struct SceneNode {
    id: TargetId,
    data: RefCell<NodeData>,
}

impl SceneNode {
    /// 创建新的节点
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TargetId::next(),
            data: RefCell::new(NodeData {
                name: name.into(),
                ..Default::default()
            }),
        }
    }

    /// 设置初始位置
    pub fn at(self, x: f32, y: f32) -> Self {
        self.data.borrow_mut().position = Vec2::new(x, y);
        self
    }

    /// 声明一个自定义属性
    pub fn with_property(self, name: impl Into<String>, value: f32) -> Self {
        self.data.borrow_mut().custom.insert(name.into(), value);
        self
    }

    /// 包装为共享句柄
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// 为共享节点创建动作目标
    pub fn target(self: &Rc<Self>) -> Target {
        Target::new(self.clone())
    }

    /// 节点数据快照
    pub fn snapshot(&self) -> NodeData {
        self.data.borrow().clone()
    }

    /// 节点名称
    pub fn name(&self) -> String {
        self.data.borrow().name.clone()
    }

    /// 当前位置
    pub fn position(&self) -> Vec2 {
        self.data.borrow().position
    }

    /// 当前缩放
    pub fn scale(&self) -> Vec2 {
        self.data.borrow().scale
    }

    /// 当前旋转
    pub fn rotation(&self) -> f32 {
        self.data.borrow().rotation
    }

    /// 当前不透明度
    pub fn opacity(&self) -> f32 {
        self.data.borrow().opacity
    }

    /// 是否可见
    pub fn is_visible(&self) -> bool {
        self.data.borrow().visible
    }

    /// 读取自定义属性
    pub fn custom(&self, name: &str) -> Option<f32> {
        self.data.borrow().custom.get(name).copied()
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

impl Animatable for SceneNode {
    fn id(&self) -> TargetId {
        self.id
    }

    fn get_property(&self, property_id: &str) -> Option<f32> {
        let data = self.data.borrow();
        let value = match property_id {
            props::X => data.position.x,
            props::Y => data.position.y,
            props::ROTATION => data.rotation,
            props::SCALE_X => data.scale.x,
            props::SCALE_Y => data.scale.y,
            props::SKEW_X => data.skew.x,
            props::SKEW_Y => data.skew.y,
            props::OPACITY => data.opacity,
            props::VISIBLE => flag(data.visible),
            props::FLIP_X => flag(data.flip_x),
            props::FLIP_Y => flag(data.flip_y),
            props::COLOR_R => data.color.r,
            props::COLOR_G => data.color.g,
            props::COLOR_B => data.color.b,
            props::REMOVED => flag(data.removed),
            other => return data.custom.get(other).copied(),
        };
        Some(value)
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        let mut data = self.data.borrow_mut();
        match property_id {
            props::X => data.position.x = value,
            props::Y => data.position.y = value,
            props::ROTATION => data.rotation = value,
            props::SCALE_X => data.scale.x = value,
            props::SCALE_Y => data.scale.y = value,
            props::SKEW_X => data.skew.x = value,
            props::SKEW_Y => data.skew.y = value,
            props::OPACITY => data.opacity = value.clamp(0.0, 255.0),
            props::VISIBLE => data.visible = value != 0.0,
            props::FLIP_X => data.flip_x = value != 0.0,
            props::FLIP_Y => data.flip_y = value != 0.0,
            props::COLOR_R => data.color.r = value,
            props::COLOR_G => data.color.g = value,
            props::COLOR_B => data.color.b = value,
            props::REMOVED => data.removed = value != 0.0,
            other => match data.custom.get_mut(other) {
                Some(slot) => *slot = value,
                None => return false,
            },
        }
        true
    }
}
