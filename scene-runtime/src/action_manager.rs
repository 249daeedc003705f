//! # ActionManager 模块
//!
//! 按目标管理正在运行的动作，每帧推进一次。
//!
//! ```rust,ignore
//! let manager = ActionManager::new();
//! let id = manager.add_action(&target, MoveBy::new(1.0, Vec2::new(10.0, 0.0)).boxed(), false);
//! manager.update(dt);
//! ```
//!
//! ## 重入
//!
//! `ActionManager` 是 `Rc<RefCell<_>>` 上的句柄，克隆开销很小。
//! 推进某个动作时，注册表的借用已经释放，所以动作（例如 `CallFunc` 的回调）
//! 可以在 tick 中调用任何方法：添加、移除、暂停都立即生效，
//! 但 tick 中新添加的动作从下一帧开始才会被推进。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::action::{Action, INVALID_TAG};
use crate::target::{Target, TargetId};

/// 动作在注册表中的身份
///
/// 同一个 `ActionManager` 内单调递增，永不复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);

impl ActionId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.0)
    }
}

/// 注册表中的一个动作
struct Slot {
    id: ActionId,
    /// 标签缓存；动作被取出推进时依然可以按标签查找
    tag: i32,
    /// 正在推进时为 `None`
    action: Option<Box<dyn Action>>,
}

/// 单个目标的记录
struct TargetEntry {
    target: Target,
    /// 按 `ActionId` 升序（即添加顺序）排列
    slots: Vec<Slot>,
    paused: bool,
}

struct Registry {
    entries: HashMap<TargetId, TargetEntry>,
    /// 目标的添加顺序
    order: Vec<TargetId>,
    next_id: u64,
    updating: bool,
}

impl Registry {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
            updating: false,
        }
    }

    /// 删除空记录
    fn purge(&mut self, target_id: TargetId) {
        let empty = self
            .entries
            .get(&target_id)
            .is_some_and(|entry| entry.slots.is_empty());
        if empty {
            self.entries.remove(&target_id);
            self.order.retain(|id| *id != target_id);
            trace!(target_id = %target_id, "目标已无动作，移除记录");
        }
    }

    /// 删除整个目标记录，返回其中未在推进中的动作
    fn take_entry(&mut self, target_id: TargetId) -> Vec<Box<dyn Action>> {
        self.order.retain(|id| *id != target_id);
        self.entries
            .remove(&target_id)
            .map(|entry| entry.slots.into_iter().filter_map(|slot| slot.action).collect())
            .unwrap_or_default()
    }

    /// 删除一个动作；正在推进中的动作在推进结束后由 `update` 停止
    fn take_slot(&mut self, target_id: TargetId, index: usize) -> Option<Box<dyn Action>> {
        let entry = self.entries.get_mut(&target_id)?;
        let slot = entry.slots.remove(index);
        self.purge(target_id);
        slot.action
    }

    fn locate(&self, id: ActionId) -> Option<(TargetId, usize)> {
        self.entries.iter().find_map(|(target_id, entry)| {
            entry
                .slots
                .binary_search_by_key(&id, |slot| slot.id)
                .ok()
                .map(|index| (*target_id, index))
        })
    }
}

/// 停止被移除的动作（在注册表借用之外调用）
fn stop_all(actions: Vec<Box<dyn Action>>) {
    for mut action in actions {
        action.stop();
    }
}

/// 动作注册表
///
/// ## 不变量
///
/// - 没有动作的目标不会留下空记录
/// - 目标只按身份（[`TargetId`]）比较
/// - 组合动作无论包含多少叶子动作都只算一个
#[derive(Clone)]
pub struct ActionManager {
    inner: Rc<RefCell<Registry>>,
}

/// 不持有所有权的 `ActionManager` 句柄，供回调捕获
#[derive(Clone)]
pub struct WeakActionManager {
    inner: Weak<RefCell<Registry>>,
}

impl WeakActionManager {
    /// 注册表仍然存在时返回强句柄
    pub fn upgrade(&self) -> Option<ActionManager> {
        self.inner.upgrade().map(|inner| ActionManager { inner })
    }
}

impl Default for ActionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(registry) => f
                .debug_struct("ActionManager")
                .field("targets", &registry.entries.len())
                .field(
                    "actions",
                    &registry.entries.values().map(|e| e.slots.len()).sum::<usize>(),
                )
                .finish(),
            Err(_) => f.write_str("ActionManager { <borrowed> }"),
        }
    }
}

impl ActionManager {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry::new())),
        }
    }

    /// 创建弱句柄
    pub fn downgrade(&self) -> WeakActionManager {
        WeakActionManager {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ========== 添加与推进 ==========

    /// 添加动作并以 `target` 启动它
    ///
    /// 目标没有记录时以 `paused` 创建记录；已有记录时 `paused` 被忽略。
    pub fn add_action(
        &self,
        target: &Target,
        mut action: Box<dyn Action>,
        paused: bool,
    ) -> ActionId {
        action.start_with_target(target.clone());

        let mut registry = self.inner.borrow_mut();
        let id = ActionId(registry.next_id);
        registry.next_id += 1;

        let target_id = target.id();
        if !registry.entries.contains_key(&target_id) {
            registry.order.push(target_id);
        }
        let entry = registry.entries.entry(target_id).or_insert_with(|| TargetEntry {
            target: target.clone(),
            slots: Vec::new(),
            paused,
        });
        entry.slots.push(Slot {
            id,
            tag: action.tag(),
            action: Some(action),
        });

        debug!(target_id = %target_id, action_id = %id, "添加动作");
        id
    }

    /// 推进所有未暂停目标的动作
    ///
    /// 完成的动作会被停止并移除；在 tick 内部再次调用 `update` 会被忽略。
    pub fn update(&self, dt: f32) {
        let (order, limit) = {
            let mut registry = self.inner.borrow_mut();
            if registry.updating {
                debug!("ActionManager::update 重入，忽略");
                return;
            }
            registry.updating = true;
            (registry.order.clone(), ActionId(registry.next_id))
        };

        for target_id in order {
            let paused = self
                .inner
                .borrow()
                .entries
                .get(&target_id)
                .is_none_or(|entry| entry.paused);
            if paused {
                continue;
            }

            let mut last: Option<ActionId> = None;
            while let Some((id, action)) = self.take_next(target_id, last, limit) {
                last = Some(id);
                self.step_one(target_id, id, action, dt);
            }
        }

        self.inner.borrow_mut().updating = false;
    }

    /// 取出 `last` 之后的下一个动作
    ///
    /// 按 id 而不是下标定位，所以推进中的增删不会跳过或重复访问动作。
    fn take_next(
        &self,
        target_id: TargetId,
        last: Option<ActionId>,
        limit: ActionId,
    ) -> Option<(ActionId, Box<dyn Action>)> {
        let mut registry = self.inner.borrow_mut();
        let entry = registry.entries.get_mut(&target_id)?;
        let start = match last {
            Some(last) => entry.slots.partition_point(|slot| slot.id <= last),
            None => 0,
        };
        entry.slots[start..]
            .iter_mut()
            .take_while(|slot| slot.id < limit)
            .find_map(|slot| slot.action.take().map(|action| (slot.id, action)))
    }

    fn step_one(&self, target_id: TargetId, id: ActionId, mut action: Box<dyn Action>, dt: f32) {
        action.step(dt);
        let done = action.is_done();

        let mut registry = self.inner.borrow_mut();
        let index = registry.entries.get(&target_id).and_then(|entry| {
            entry.slots.binary_search_by_key(&id, |slot| slot.id).ok()
        });

        match index {
            Some(index) if !done => {
                if let Some(entry) = registry.entries.get_mut(&target_id) {
                    let slot = &mut entry.slots[index];
                    slot.tag = action.tag();
                    slot.action = Some(action);
                }
            }
            Some(index) => {
                registry.take_slot(target_id, index);
                drop(registry);
                action.stop();
                debug!(target_id = %target_id, action_id = %id, "动作完成");
            }
            None => {
                // 推进过程中被移除
                drop(registry);
                action.stop();
                debug!(target_id = %target_id, action_id = %id, "动作在推进中被移除");
            }
        }
    }

    // ========== 移除 ==========

    /// 移除一个动作；不存在时什么也不做
    pub fn remove_action(&self, id: ActionId) {
        let removed = {
            let mut registry = self.inner.borrow_mut();
            match registry.locate(id) {
                Some((target_id, index)) => registry.take_slot(target_id, index),
                None => return,
            }
        };
        debug!(action_id = %id, "移除动作");
        if let Some(mut action) = removed {
            action.stop();
        }
    }

    /// 移除目标上第一个（按添加顺序）带有 `tag` 的动作
    pub fn remove_action_by_tag(&self, tag: i32, target: impl Into<TargetId>) {
        let target_id = target.into();
        if tag == INVALID_TAG {
            debug!(target_id = %target_id, "无效标签，忽略");
            return;
        }
        let removed = {
            let mut registry = self.inner.borrow_mut();
            let index = registry
                .entries
                .get(&target_id)
                .and_then(|entry| entry.slots.iter().position(|slot| slot.tag == tag));
            match index {
                Some(index) => registry.take_slot(target_id, index),
                None => return,
            }
        };
        debug!(target_id = %target_id, tag, "按标签移除动作");
        if let Some(mut action) = removed {
            action.stop();
        }
    }

    /// 移除目标上所有带有 `tag` 的动作
    pub fn remove_all_actions_by_tag(&self, tag: i32, target: impl Into<TargetId>) {
        let target_id = target.into();
        if tag == INVALID_TAG {
            return;
        }
        let removed = {
            let mut registry = self.inner.borrow_mut();
            let Some(entry) = registry.entries.get_mut(&target_id) else {
                return;
            };
            let (matching, kept): (Vec<_>, Vec<_>) =
                entry.slots.drain(..).partition(|slot| slot.tag == tag);
            entry.slots = kept;
            registry.purge(target_id);
            matching.into_iter().filter_map(|slot| slot.action).collect()
        };
        stop_all(removed);
    }

    /// 移除目标的所有动作
    pub fn remove_all_actions_from_target(&self, target: impl Into<TargetId>) {
        let target_id = target.into();
        let removed = self.inner.borrow_mut().take_entry(target_id);
        debug!(target_id = %target_id, count = removed.len(), "移除目标的所有动作");
        stop_all(removed);
    }

    /// 移除所有动作
    pub fn remove_all_actions(&self) {
        let removed: Vec<_> = {
            let mut registry = self.inner.borrow_mut();
            registry.order.clear();
            registry
                .entries
                .drain()
                .flat_map(|(_, entry)| entry.slots.into_iter().filter_map(|slot| slot.action))
                .collect()
        };
        debug!(count = removed.len(), "移除所有动作");
        stop_all(removed);
    }

    // ========== 暂停 ==========

    /// 暂停目标：动作不再收到 `step`，进度保持不变
    pub fn pause_target(&self, target: impl Into<TargetId>) {
        let target_id = target.into();
        if let Some(entry) = self.inner.borrow_mut().entries.get_mut(&target_id) {
            entry.paused = true;
            debug!(target_id = %target_id, "暂停目标的动作");
        }
    }

    /// 恢复目标
    pub fn resume_target(&self, target: impl Into<TargetId>) {
        let target_id = target.into();
        if let Some(entry) = self.inner.borrow_mut().entries.get_mut(&target_id) {
            entry.paused = false;
            debug!(target_id = %target_id, "恢复目标的动作");
        }
    }

    /// 目标是否被暂停；没有记录的目标返回 `false`
    pub fn is_target_paused(&self, target: impl Into<TargetId>) -> bool {
        self.inner
            .borrow()
            .entries
            .get(&target.into())
            .is_some_and(|entry| entry.paused)
    }

    /// 暂停所有正在运行的目标，返回被暂停的目标
    pub fn pause_all_running_actions(&self) -> Vec<TargetId> {
        let mut registry = self.inner.borrow_mut();
        let Registry { entries, order, .. } = &mut *registry;
        let mut paused = Vec::new();
        for target_id in order.iter() {
            if let Some(entry) = entries.get_mut(target_id) {
                if !entry.paused {
                    entry.paused = true;
                    paused.push(*target_id);
                }
            }
        }
        debug!(count = paused.len(), "暂停所有动作");
        paused
    }

    /// 恢复一组目标（通常来自 [`pause_all_running_actions`](Self::pause_all_running_actions)）
    pub fn resume_targets(&self, targets: &[TargetId]) {
        for target_id in targets {
            self.resume_target(*target_id);
        }
    }

    // ========== 查询 ==========

    /// 目标上第一个（按添加顺序）带有 `tag` 的动作
    pub fn get_action_by_tag(&self, tag: i32, target: impl Into<TargetId>) -> Option<ActionId> {
        if tag == INVALID_TAG {
            return None;
        }
        self.inner
            .borrow()
            .entries
            .get(&target.into())?
            .slots
            .iter()
            .find(|slot| slot.tag == tag)
            .map(|slot| slot.id)
    }

    /// 访问一个已注册的动作
    ///
    /// 动作不存在或正在推进中时返回 `None`。
    pub fn with_action<R>(&self, id: ActionId, f: impl FnOnce(&mut dyn Action) -> R) -> Option<R> {
        let (target_id, mut action) = {
            let mut registry = self.inner.borrow_mut();
            let (target_id, index) = registry.locate(id)?;
            let slot = registry.entries.get_mut(&target_id)?.slots.get_mut(index)?;
            (target_id, slot.action.take()?)
        };

        let result = f(action.as_mut());

        let mut registry = self.inner.borrow_mut();
        let slot = registry
            .entries
            .get_mut(&target_id)
            .and_then(|entry| entry.slots.iter_mut().find(|slot| slot.id == id));
        match slot {
            Some(slot) => {
                slot.tag = action.tag();
                slot.action = Some(action);
            }
            None => {
                drop(registry);
                action.stop();
            }
        }
        Some(result)
    }

    /// 目标上正在运行的动作数量
    pub fn number_of_running_actions_in_target(&self, target: impl Into<TargetId>) -> usize {
        self.inner
            .borrow()
            .entries
            .get(&target.into())
            .map_or(0, |entry| entry.slots.len())
    }

    /// 所有正在运行的动作数量
    pub fn number_of_running_actions(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .values()
            .map(|entry| entry.slots.len())
            .sum()
    }

    /// 拥有动作的目标（按添加顺序）
    pub fn targets(&self) -> Vec<TargetId> {
        self.inner.borrow().order.clone()
    }

    /// 取得目标句柄
    pub fn target(&self, target_id: TargetId) -> Option<Target> {
        self.inner
            .borrow()
            .entries
            .get(&target_id)
            .map(|entry| entry.target.clone())
    }
}
