//! # Scheduler 模块
//!
//! 通用的帧调度器，由两部分组成：
//!
//! - **更新列表**：每个目标最多一个 update 回调，按优先级升序每帧调用一次
//! - **定时器**：按 `(目标, 键)` 登记的间隔回调，支持延迟、重复次数和追帧
//!
//! 两者共享同一个 [`Scheduler::update`] 入口，`dt` 在入口处乘以全局时间缩放。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let scheduler = Scheduler::new();
//! let tick = Callback::new(|scheduler, dt| { /* ... */ });
//! scheduler.schedule(target_id, &tick, tick.clone(), TimerOptions::every(0.5));
//! scheduler.update(dt);
//! ```
//!
//! ## 回调中修改调度器
//!
//! 回调执行时调度器的借用已经释放，回调可以调用任何方法：
//!
//! - 遍历更新列表期间的注册会推迟到本次遍历结束后加入，注销只做标记，遍历结束后清理
//! - 定时器在回调前后都会按 id 重新查找，被注销的定时器不会再次触发
//! - 在回调中再次调用 `update` 会被忽略

mod timer;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::error::ScheduleError;
use crate::target::TargetId;

pub use timer::{Callback, CallbackId, RepeatCount, TimerKey, TimerOptions};
use timer::{Tick, Timer};

/// 系统优先级，只供框架内部使用（例如动作注册表）
pub const PRIORITY_SYSTEM: i32 = i32::MIN;

/// 用户可用的最小优先级
pub const PRIORITY_NON_SYSTEM_MIN: i32 = PRIORITY_SYSTEM + 1;

/// 更新列表中的一项
#[derive(Debug)]
struct UpdateEntry {
    target: TargetId,
    callback: Callback,
    priority: i32,
    paused: bool,
    marked_for_deletion: bool,
}

/// 单个目标的定时器
#[derive(Debug)]
struct TimerTarget {
    paused: bool,
    timers: Vec<Timer>,
}

#[derive(Debug)]
struct SchedulerState {
    time_scale: f32,
    /// 按优先级升序排列
    updates: Vec<UpdateEntry>,
    /// 遍历期间新注册的 update 回调
    pending_updates: Vec<UpdateEntry>,
    /// 正在遍历更新列表
    walking_updates: bool,
    timers: HashMap<TargetId, TimerTarget>,
    /// 定时器目标的注册顺序
    timer_order: Vec<TargetId>,
    next_timer_id: u64,
    updating: bool,
}

impl SchedulerState {
    fn new() -> Self {
        Self {
            time_scale: 1.0,
            updates: Vec::new(),
            pending_updates: Vec::new(),
            walking_updates: false,
            timers: HashMap::new(),
            timer_order: Vec::new(),
            next_timer_id: 1,
            updating: false,
        }
    }

    /// 按优先级插入（排在相同优先级之后）
    fn insert_update(&mut self, entry: UpdateEntry) {
        let index = self
            .updates
            .partition_point(|existing| existing.priority <= entry.priority);
        self.updates.insert(index, entry);
    }

    /// 注销 update 回调；遍历期间只做标记
    fn remove_update(&mut self, target: TargetId) -> bool {
        let pending_before = self.pending_updates.len();
        self.pending_updates.retain(|entry| entry.target != target);
        let mut removed = self.pending_updates.len() != pending_before;

        if self.walking_updates {
            for entry in self
                .updates
                .iter_mut()
                .filter(|entry| entry.target == target && !entry.marked_for_deletion)
            {
                entry.marked_for_deletion = true;
                removed = true;
            }
        } else {
            let before = self.updates.len();
            self.updates.retain(|entry| entry.target != target);
            removed |= self.updates.len() != before;
        }
        removed
    }

    /// 遍历结束后清理标记并加入新注册的回调
    fn flush_updates(&mut self) {
        self.updates.retain(|entry| !entry.marked_for_deletion);
        for entry in std::mem::take(&mut self.pending_updates) {
            self.insert_update(entry);
        }
    }

    fn update_entry_mut(&mut self, target: TargetId) -> impl Iterator<Item = &mut UpdateEntry> {
        self.updates
            .iter_mut()
            .chain(self.pending_updates.iter_mut())
            .filter(move |entry| entry.target == target && !entry.marked_for_deletion)
    }

    fn find_timer_mut(&mut self, target: TargetId, timer_id: u64) -> Option<&mut Timer> {
        self.timers
            .get_mut(&target)?
            .timers
            .iter_mut()
            .find(|timer| timer.id == timer_id)
    }

    /// 移除一个定时器，目标没有定时器时移除其记录
    fn remove_timer(&mut self, target: TargetId, predicate: impl Fn(&Timer) -> bool) -> bool {
        let Some(entry) = self.timers.get_mut(&target) else {
            return false;
        };
        let before = entry.timers.len();
        entry.timers.retain(|timer| !predicate(timer));
        let removed = entry.timers.len() != before;
        if entry.timers.is_empty() {
            self.timers.remove(&target);
            self.timer_order.retain(|id| *id != target);
        }
        removed
    }

    fn remove_all_timers(&mut self) {
        self.timers.clear();
        self.timer_order.clear();
    }

    fn target_paused(&self, target: TargetId) -> bool {
        self.timers.get(&target).is_some_and(|entry| entry.paused)
    }
}

/// 调度器
///
/// `Rc<RefCell<_>>` 上的句柄，克隆开销很小；所有克隆共享同一份状态。
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerState>>,
}

/// 不持有所有权的调度器句柄
#[derive(Clone)]
pub struct WeakScheduler {
    inner: Weak<RefCell<SchedulerState>>,
}

impl WeakScheduler {
    pub fn upgrade(&self) -> Option<Scheduler> {
        self.inner.upgrade().map(|inner| Scheduler { inner })
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(state) => f
                .debug_struct("Scheduler")
                .field("time_scale", &state.time_scale)
                .field("updates", &state.updates.len())
                .field("timer_targets", &state.timers.len())
                .finish(),
            Err(_) => f.write_str("Scheduler { <borrowed> }"),
        }
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerState::new())),
        }
    }

    /// 创建弱句柄
    pub fn downgrade(&self) -> WeakScheduler {
        WeakScheduler {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ========== 时间 ==========

    /// 全局时间缩放
    pub fn time_scale(&self) -> f32 {
        self.inner.borrow().time_scale
    }

    /// 设置全局时间缩放；负数或非有限值被忽略
    pub fn set_time_scale(&self, time_scale: f32) {
        if !time_scale.is_finite() || time_scale < 0.0 {
            debug!(time_scale, "无效的时间缩放，忽略");
            return;
        }
        self.inner.borrow_mut().time_scale = time_scale;
    }

    /// 推进一帧
    ///
    /// 先按优先级调用 update 回调，再推进定时器。
    pub fn update(&self, dt: f32) {
        let dt = {
            let mut state = self.inner.borrow_mut();
            if state.updating {
                debug!("Scheduler::update 重入，忽略");
                return;
            }
            state.updating = true;
            dt.max(0.0) * state.time_scale
        };

        self.walk_updates(dt);
        self.walk_timers(dt);

        self.inner.borrow_mut().updating = false;
    }

    fn walk_updates(&self, dt: f32) {
        let count = {
            let mut state = self.inner.borrow_mut();
            state.walking_updates = true;
            state.updates.len()
        };

        // 遍历期间列表只会被标记，不会被插入或删除
        for index in 0..count {
            let callback = {
                let state = self.inner.borrow();
                match state.updates.get(index) {
                    Some(entry) if !entry.paused && !entry.marked_for_deletion => {
                        entry.callback.clone()
                    }
                    _ => continue,
                }
            };
            callback.invoke(self, dt);
        }

        let mut state = self.inner.borrow_mut();
        state.walking_updates = false;
        state.flush_updates();
    }

    fn walk_timers(&self, dt: f32) {
        let targets = self.inner.borrow().timer_order.clone();

        for target in targets {
            let timer_ids: Vec<u64> = match self.inner.borrow().timers.get(&target) {
                Some(entry) if !entry.paused => entry.timers.iter().map(|timer| timer.id).collect(),
                _ => continue,
            };

            for timer_id in timer_ids {
                self.run_timer(target, timer_id, dt);
            }
        }
    }

    /// 推进一个定时器并按需触发（可能多次）
    fn run_timer(&self, target: TargetId, timer_id: u64, dt: f32) {
        {
            let mut state = self.inner.borrow_mut();
            if state.target_paused(target) {
                return;
            }
            match state.find_timer_mut(target, timer_id) {
                Some(timer) => timer.advance(dt),
                None => return,
            }
        }

        let mut first = true;
        loop {
            let (callback, fire_dt) = {
                let mut state = self.inner.borrow_mut();
                if state.target_paused(target) {
                    return;
                }
                let Some(timer) = state.find_timer_mut(target, timer_id) else {
                    return;
                };
                let Tick::Fire(fire_dt) = timer.poll(first) else {
                    return;
                };
                let callback = timer.callback.clone();
                trace!(target_id = %target, key = %timer.key, fired = timer.fired, "定时器触发");

                // 最后一次触发前先移除，回调里重新注册同一个键不会被误删
                if timer.is_exhausted() {
                    debug!(target_id = %target, key = %timer.key, "定时器次数耗尽，移除");
                    state.remove_timer(target, |timer| timer.id == timer_id);
                }
                (callback, fire_dt)
            };
            first = false;
            callback.invoke(self, fire_dt);
        }
    }

    // ========== 更新列表 ==========

    /// 为目标注册每帧调用的 update 回调
    ///
    /// 目标已有 update 回调时替换它；遍历期间注册的回调从下一帧开始调用。
    pub fn schedule_update(
        &self,
        target: impl Into<TargetId>,
        priority: i32,
        paused: bool,
        callback: Callback,
    ) {
        let target = target.into();
        let mut state = self.inner.borrow_mut();
        if state.remove_update(target) {
            debug!(target_id = %target, "替换已有的 update 回调");
        }

        let entry = UpdateEntry {
            target,
            callback,
            priority,
            paused,
            marked_for_deletion: false,
        };
        if state.walking_updates {
            state.pending_updates.push(entry);
        } else {
            state.insert_update(entry);
        }
        debug!(target_id = %target, priority, paused, "注册 update 回调");
    }

    /// 注销目标的 update 回调
    pub fn unschedule_update(&self, target: impl Into<TargetId>) {
        let target = target.into();
        if self.inner.borrow_mut().remove_update(target) {
            debug!(target_id = %target, "注销 update 回调");
        }
    }

    /// 目标是否有 update 回调
    pub fn has_update(&self, target: impl Into<TargetId>) -> bool {
        let target = target.into();
        let state = self.inner.borrow();
        state
            .updates
            .iter()
            .chain(state.pending_updates.iter())
            .any(|entry| entry.target == target && !entry.marked_for_deletion)
    }

    /// 注销所有定时器，以及优先级不低于 `min_priority` 的 update 回调
    pub fn unschedule_all_with_min_priority(&self, min_priority: i32) {
        let mut state = self.inner.borrow_mut();
        state.remove_all_timers();

        let targets: Vec<TargetId> = state
            .updates
            .iter()
            .chain(state.pending_updates.iter())
            .filter(|entry| entry.priority >= min_priority)
            .map(|entry| entry.target)
            .collect();
        for target in targets {
            state.remove_update(target);
        }
        debug!(min_priority, "注销所有调度");
    }

    /// 注销所有定时器和非系统优先级的 update 回调
    pub fn unschedule_all(&self) {
        self.unschedule_all_with_min_priority(PRIORITY_NON_SYSTEM_MIN);
    }

    // ========== 定时器 ==========

    /// 注册或更新定时器
    ///
    /// `(target, key)` 已存在时只更新间隔，不会重复注册。
    /// 无效的间隔或延迟按 0 处理；需要报错时使用 [`try_schedule`](Self::try_schedule)。
    pub fn schedule(
        &self,
        target: impl Into<TargetId>,
        key: impl Into<TimerKey>,
        callback: Callback,
        options: TimerOptions,
    ) {
        if options.validate().is_err() {
            debug!(?options, "无效的定时器参数，按 0 处理");
        }
        self.insert_timer(target.into(), key.into(), callback, options.sanitized());
    }

    /// 检查参数后注册或更新定时器
    pub fn try_schedule(
        &self,
        target: impl Into<TargetId>,
        key: impl Into<TimerKey>,
        callback: Callback,
        options: TimerOptions,
    ) -> Result<(), ScheduleError> {
        options.validate()?;
        self.insert_timer(target.into(), key.into(), callback, options);
        Ok(())
    }

    /// 延迟 `delay` 秒后触发一次
    pub fn schedule_once(
        &self,
        target: impl Into<TargetId>,
        key: impl Into<TimerKey>,
        callback: Callback,
        delay: f32,
    ) {
        self.schedule(target, key, callback, TimerOptions::once(delay));
    }

    fn insert_timer(
        &self,
        target: TargetId,
        key: TimerKey,
        callback: Callback,
        options: TimerOptions,
    ) {
        let mut guard = self.inner.borrow_mut();
        let state = &mut *guard;

        let existing = state
            .timers
            .get_mut(&target)
            .and_then(|entry| entry.timers.iter_mut().find(|timer| timer.key == key));
        if let Some(existing) = existing {
            existing.interval = options.interval;
            debug!(target_id = %target, %key, interval = options.interval, "更新定时器间隔");
            return;
        }

        if !state.timers.contains_key(&target) {
            state.timer_order.push(target);
        }
        let id = state.next_timer_id;
        state.next_timer_id += 1;

        debug!(
            target_id = %target,
            %key,
            interval = options.interval,
            delay = options.delay,
            "注册定时器"
        );
        state
            .timers
            .entry(target)
            .or_insert_with(|| TimerTarget {
                paused: options.paused,
                timers: Vec::new(),
            })
            .timers
            .push(Timer::new(id, key, callback, options));
    }

    /// 注销定时器；不存在时什么也不做
    pub fn unschedule(&self, key: impl Into<TimerKey>, target: impl Into<TargetId>) {
        let key = key.into();
        let target = target.into();
        if self
            .inner
            .borrow_mut()
            .remove_timer(target, |timer| timer.key == key)
        {
            debug!(target_id = %target, %key, "注销定时器");
        }
    }

    /// 注销目标的所有定时器和 update 回调
    pub fn unschedule_all_for_target(&self, target: impl Into<TargetId>) {
        let target = target.into();
        let mut state = self.inner.borrow_mut();
        state.timers.remove(&target);
        state.timer_order.retain(|id| *id != target);
        state.remove_update(target);
        debug!(target_id = %target, "注销目标的所有调度");
    }

    /// `(target, key)` 是否已注册
    pub fn is_scheduled(&self, key: impl Into<TimerKey>, target: impl Into<TargetId>) -> bool {
        let key = key.into();
        self.inner
            .borrow()
            .timers
            .get(&target.into())
            .is_some_and(|entry| entry.timers.iter().any(|timer| timer.key == key))
    }

    /// 定时器当前累计的时间
    pub fn timer_elapsed(
        &self,
        key: impl Into<TimerKey>,
        target: impl Into<TargetId>,
    ) -> Option<f32> {
        let key = key.into();
        self.inner
            .borrow()
            .timers
            .get(&target.into())?
            .timers
            .iter()
            .find(|timer| timer.key == key)
            .map(|timer| timer.elapsed)
    }

    // ========== 暂停 ==========

    /// 暂停目标的定时器和 update 回调
    pub fn pause_target(&self, target: impl Into<TargetId>) {
        let target = target.into();
        let mut state = self.inner.borrow_mut();
        if let Some(entry) = state.timers.get_mut(&target) {
            entry.paused = true;
        }
        for entry in state.update_entry_mut(target) {
            entry.paused = true;
        }
        debug!(target_id = %target, "暂停目标");
    }

    /// 恢复目标
    pub fn resume_target(&self, target: impl Into<TargetId>) {
        let target = target.into();
        let mut state = self.inner.borrow_mut();
        if let Some(entry) = state.timers.get_mut(&target) {
            entry.paused = false;
        }
        for entry in state.update_entry_mut(target) {
            entry.paused = false;
        }
        debug!(target_id = %target, "恢复目标");
    }

    /// 目标是否被暂停；没有任何调度的目标返回 `false`
    pub fn is_target_paused(&self, target: impl Into<TargetId>) -> bool {
        let target = target.into();
        let state = self.inner.borrow();
        if let Some(entry) = state.timers.get(&target) {
            return entry.paused;
        }
        state
            .updates
            .iter()
            .chain(state.pending_updates.iter())
            .find(|entry| entry.target == target && !entry.marked_for_deletion)
            .is_some_and(|entry| entry.paused)
    }

    /// 暂停所有目标，返回被暂停的目标
    pub fn pause_all_targets(&self) -> Vec<TargetId> {
        self.pause_all_targets_with_min_priority(PRIORITY_SYSTEM)
    }

    /// 暂停所有定时器目标，以及优先级不低于 `min_priority` 的 update 回调
    pub fn pause_all_targets_with_min_priority(&self, min_priority: i32) -> Vec<TargetId> {
        let mut state = self.inner.borrow_mut();
        let mut paused = Vec::new();

        let SchedulerState {
            timers,
            timer_order,
            updates,
            pending_updates,
            ..
        } = &mut *state;
        for target in timer_order.iter() {
            if let Some(entry) = timers.get_mut(target) {
                entry.paused = true;
                paused.push(*target);
            }
        }
        for entry in updates.iter_mut().chain(pending_updates.iter_mut()) {
            if entry.priority >= min_priority && !entry.marked_for_deletion {
                entry.paused = true;
                if !paused.contains(&entry.target) {
                    paused.push(entry.target);
                }
            }
        }

        debug!(min_priority, count = paused.len(), "暂停所有目标");
        paused
    }

    /// 恢复一组目标
    pub fn resume_targets(&self, targets: &[TargetId]) {
        for target in targets {
            self.resume_target(*target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Callback::new(move |_, _| c.set(c.get() + 1)))
    }

    #[test]
    fn test_update_priority_order() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (name, priority) in [("b", 0), ("a", -5), ("c", 10), ("b2", 0)] {
            let log = log.clone();
            scheduler.schedule_update(
                TargetId::next(),
                priority,
                false,
                Callback::new(move |_, _| log.borrow_mut().push(name)),
            );
        }

        scheduler.update(0.1);
        assert_eq!(*log.borrow(), vec!["a", "b", "b2", "c"]);
    }

    #[test]
    fn test_duplicate_update_replaces() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (first, cb1) = counter();
        let (second, cb2) = counter();

        scheduler.schedule_update(target, 0, false, cb1);
        scheduler.schedule_update(target, 0, false, cb2);
        scheduler.update(0.1);

        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_time_scale() {
        let scheduler = Scheduler::new();
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        scheduler.schedule_update(
            TargetId::next(),
            0,
            false,
            Callback::new(move |_, dt| s.set(dt)),
        );

        scheduler.set_time_scale(2.0);
        scheduler.update(0.25);
        assert_eq!(seen.get(), 0.5);

        scheduler.set_time_scale(-1.0);
        assert_eq!(scheduler.time_scale(), 2.0);
    }

    #[test]
    fn test_unschedule_self_during_update() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let x = TargetId::next();

        let l = log.clone();
        scheduler.schedule_update(
            x,
            0,
            false,
            Callback::new(move |scheduler, _| {
                l.borrow_mut().push("x");
                scheduler.unschedule_update(x);
            }),
        );
        let l = log.clone();
        scheduler.schedule_update(
            TargetId::next(),
            1,
            false,
            Callback::new(move |_, _| l.borrow_mut().push("y")),
        );

        scheduler.update(0.1);
        scheduler.update(0.1);
        assert_eq!(*log.borrow(), vec!["x", "y", "y"]);
        assert!(!scheduler.has_update(x));
    }

    #[test]
    fn test_schedule_update_during_walk_starts_next_tick() {
        let scheduler = Scheduler::new();
        let (count, late) = counter();
        let late_target = TargetId::next();

        scheduler.schedule_update(
            TargetId::next(),
            0,
            false,
            Callback::new(move |scheduler, _| {
                if !scheduler.has_update(late_target) {
                    // 优先级更高（更晚），但本帧不会被调用
                    scheduler.schedule_update(late_target, 5, false, late.clone());
                }
            }),
        );

        scheduler.update(0.1);
        assert_eq!(count.get(), 0);
        assert!(scheduler.has_update(late_target));
        scheduler.update(0.1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_timer_catch_up() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (count, cb) = counter();
        scheduler.schedule(target, "tick", cb, TimerOptions::every(0.1));

        scheduler.update(0.35);
        assert_eq!(count.get(), 3);
        let elapsed = scheduler.timer_elapsed("tick", target).unwrap();
        assert!((elapsed - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_timer_repeat_exhaustion() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (count, cb) = counter();
        scheduler.schedule(
            target,
            "limited",
            cb,
            TimerOptions::every(0.1).repeat(RepeatCount::Times(2)),
        );

        for _ in 0..10 {
            scheduler.update(0.1);
        }
        assert_eq!(count.get(), 3);
        assert!(!scheduler.is_scheduled("limited", target));
    }

    #[test]
    fn test_reschedule_updates_interval() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (count, cb) = counter();
        scheduler.schedule(target, "t", cb.clone(), TimerOptions::every(1.0));
        scheduler.schedule(target, "t", cb, TimerOptions::every(0.5));

        scheduler.update(0.5);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_callback_key() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (count, cb) = counter();
        scheduler.schedule(target, &cb, cb.clone(), TimerOptions::every(0.0));
        assert!(scheduler.is_scheduled(&cb, target));

        scheduler.update(0.1);
        scheduler.unschedule(&cb, target);
        scheduler.update(0.1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unschedule_timer_inside_callback() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        scheduler.schedule(
            target,
            "self",
            Callback::new(move |scheduler, _| {
                c.set(c.get() + 1);
                scheduler.unschedule("self", target);
            }),
            TimerOptions::every(0.1),
        );

        // 追帧本应触发 5 次，但第一次就注销了自己
        scheduler.update(0.5);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_try_schedule_rejects() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (_, cb) = counter();
        assert_eq!(
            scheduler.try_schedule(target, "bad", cb.clone(), TimerOptions::every(-0.5)),
            Err(ScheduleError::InvalidInterval { interval: -0.5 })
        );
        assert!(!scheduler.is_scheduled("bad", target));

        // 宽松版本按 0 处理
        scheduler.schedule(target, "lenient", cb, TimerOptions::every(-0.5));
        assert!(scheduler.is_scheduled("lenient", target));
    }

    #[test]
    fn test_schedule_once() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (count, cb) = counter();
        scheduler.schedule_once(target, "once", cb, 0.5);

        scheduler.update(0.25);
        assert_eq!(count.get(), 0);
        scheduler.update(0.25);
        assert_eq!(count.get(), 1);
        scheduler.update(1.0);
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_scheduled("once", target));
    }

    #[test]
    fn test_pause_target() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (timer_count, timer_cb) = counter();
        let (update_count, update_cb) = counter();
        scheduler.schedule(target, "t", timer_cb, TimerOptions::every(0.5));
        scheduler.schedule_update(target, 0, false, update_cb);

        scheduler.update(0.25);
        scheduler.pause_target(target);
        assert!(scheduler.is_target_paused(target));
        scheduler.update(10.0);
        assert_eq!(timer_count.get(), 0);
        assert_eq!(update_count.get(), 1);

        // 恢复后从暂停前的进度继续
        scheduler.resume_target(target);
        scheduler.update(0.25);
        assert_eq!(timer_count.get(), 1);
        assert_eq!(update_count.get(), 2);
    }

    #[test]
    fn test_pause_all_with_min_priority() {
        let scheduler = Scheduler::new();
        let low = TargetId::next();
        let high = TargetId::next();
        let (low_count, low_cb) = counter();
        let (high_count, high_cb) = counter();
        scheduler.schedule_update(low, -10, false, low_cb);
        scheduler.schedule_update(high, 10, false, high_cb);

        let paused = scheduler.pause_all_targets_with_min_priority(0);
        assert_eq!(paused, vec![high]);
        scheduler.update(0.1);
        assert_eq!(low_count.get(), 1);
        assert_eq!(high_count.get(), 0);

        scheduler.resume_targets(&paused);
        scheduler.update(0.1);
        assert_eq!(high_count.get(), 1);
    }

    #[test]
    fn test_unschedule_all_keeps_system_priority() {
        let scheduler = Scheduler::new();
        let system = TargetId::next();
        let user = TargetId::next();
        let (system_count, system_cb) = counter();
        let (user_count, user_cb) = counter();
        let (timer_count, timer_cb) = counter();
        scheduler.schedule_update(system, PRIORITY_SYSTEM, false, system_cb);
        scheduler.schedule_update(user, 0, false, user_cb);
        scheduler.schedule(user, "t", timer_cb, TimerOptions::every(0.0));

        scheduler.unschedule_all();
        scheduler.update(0.1);
        assert_eq!(system_count.get(), 1);
        assert_eq!(user_count.get(), 0);
        assert_eq!(timer_count.get(), 0);

        scheduler.unschedule_all_with_min_priority(PRIORITY_SYSTEM);
        assert!(!scheduler.has_update(system));
    }

    #[test]
    fn test_unschedule_all_for_target() {
        let scheduler = Scheduler::new();
        let target = TargetId::next();
        let (count, cb) = counter();
        scheduler.schedule(target, "a", cb.clone(), TimerOptions::every(0.0));
        scheduler.schedule_update(target, 0, false, cb);

        scheduler.unschedule_all_for_target(target);
        scheduler.update(0.1);
        assert_eq!(count.get(), 0);
        assert!(!scheduler.is_target_paused(target));

        // 不存在的目标
        scheduler.unschedule_all_for_target(TargetId::next());
        scheduler.unschedule("missing", target);
    }

    #[test]
    fn test_reentrant_update_ignored() {
        let scheduler = Scheduler::new();
        let (count, counted) = counter();
        scheduler.schedule_update(TargetId::next(), 1, false, counted);
        scheduler.schedule_update(
            TargetId::next(),
            0,
            false,
            Callback::new(|scheduler, dt| scheduler.update(dt)),
        );

        scheduler.update(0.1);
        assert_eq!(count.get(), 1);
    }
}
