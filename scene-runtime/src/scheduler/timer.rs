//! 定时器的键、回调与参数

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::Scheduler;
use crate::error::ScheduleError;

/// 回调身份，由回调对象的地址得到
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(usize);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:#x})", self.0)
    }
}

/// 调度器回调
///
/// 回调收到调度器句柄和本次的 `dt`，可以在回调中注销自己或注册新的工作。
/// 克隆得到的是同一个回调（身份相同）。
#[derive(Clone)]
pub struct Callback {
    inner: Rc<RefCell<dyn FnMut(&Scheduler, f32)>>,
}

impl Callback {
    pub fn new(f: impl FnMut(&Scheduler, f32) + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(f)),
        }
    }

    /// 回调身份
    pub fn id(&self) -> CallbackId {
        CallbackId(Rc::as_ptr(&self.inner) as *const () as usize)
    }

    /// 调用回调；回调正在执行时（重入）忽略本次调用
    pub(crate) fn invoke(&self, scheduler: &Scheduler, dt: f32) -> bool {
        match self.inner.try_borrow_mut() {
            Ok(mut f) => {
                (*f)(scheduler, dt);
                true
            }
            Err(_) => {
                debug!(callback = %self.id(), "回调正在执行，忽略重入调用");
                false
            }
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.id()).finish()
    }
}

/// 定时器的键
///
/// 同一个目标上，键相同的定时器只有一个。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// 字符串键
    Name(String),
    /// 以回调身份为键
    Callback(CallbackId),
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "\"{name}\""),
            Self::Callback(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for TimerKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for TimerKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&Callback> for TimerKey {
    fn from(callback: &Callback) -> Self {
        Self::Callback(callback.id())
    }
}

/// 首次触发之后的重复次数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatCount {
    /// 无限重复
    #[default]
    Forever,
    /// 再重复 N 次（总共触发 N + 1 次）
    Times(u32),
}

impl RepeatCount {
    /// 总触发次数；无限重复时为 `None`
    pub fn total_firings(&self) -> Option<u64> {
        match self {
            Self::Forever => None,
            Self::Times(n) => Some(u64::from(*n) + 1),
        }
    }

    /// 已触发 `fired` 次后是否耗尽
    pub(crate) fn is_exhausted(&self, fired: u64) -> bool {
        self.total_firings().is_some_and(|total| fired >= total)
    }
}

/// 定时器参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerOptions {
    /// 触发间隔（秒），0 表示每帧触发一次
    pub interval: f32,
    pub repeat: RepeatCount,
    /// 开始计时前的延迟（秒）
    pub delay: f32,
    /// 目标尚无定时器时，以此状态创建
    pub paused: bool,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self::every(0.0)
    }
}

impl TimerOptions {
    /// 每 `interval` 秒触发一次，无限重复
    pub fn every(interval: f32) -> Self {
        Self {
            interval,
            repeat: RepeatCount::Forever,
            delay: 0.0,
            paused: false,
        }
    }

    /// 延迟 `delay` 秒后触发一次
    pub fn once(delay: f32) -> Self {
        Self {
            interval: 0.0,
            repeat: RepeatCount::Times(0),
            delay,
            paused: false,
        }
    }

    pub fn repeat(mut self, repeat: RepeatCount) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// 检查参数
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !self.interval.is_finite() || self.interval < 0.0 {
            return Err(ScheduleError::InvalidInterval {
                interval: self.interval,
            });
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ScheduleError::InvalidDelay { delay: self.delay });
        }
        Ok(())
    }

    /// 把无效参数修正为 0
    pub(crate) fn sanitized(self) -> Self {
        let fix = |value: f32| if value.is_finite() { value.max(0.0) } else { 0.0 };
        Self {
            interval: fix(self.interval),
            delay: fix(self.delay),
            ..self
        }
    }
}

/// 一次推进的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Tick {
    /// 本帧不再触发
    Idle,
    /// 触发一次，参数为传给回调的 `dt`
    Fire(f32),
}

/// 定时器
///
/// 状态机：等待延迟 → 计时 → (触发)* → 耗尽并移除。暂停是目标级别的开关，
/// 不影响这里的状态。
#[derive(Debug)]
pub(crate) struct Timer {
    pub(crate) id: u64,
    pub(crate) key: TimerKey,
    pub(crate) callback: Callback,
    pub(crate) interval: f32,
    pub(crate) repeat: RepeatCount,
    /// 剩余延迟
    pub(crate) delay: f32,
    pub(crate) elapsed: f32,
    pub(crate) fired: u64,
}

impl Timer {
    pub(crate) fn new(id: u64, key: TimerKey, callback: Callback, options: TimerOptions) -> Self {
        Self {
            id,
            key,
            callback,
            interval: options.interval,
            repeat: options.repeat,
            delay: options.delay,
            elapsed: 0.0,
            fired: 0,
        }
    }

    /// 累加本帧时间；延迟优先消耗
    pub(crate) fn advance(&mut self, dt: f32) {
        let mut dt = dt;
        if self.delay > 0.0 {
            let used = self.delay.min(dt);
            self.delay -= used;
            dt -= used;
            if self.delay > 0.0 {
                return;
            }
        }
        self.elapsed += dt;
    }

    /// 尝试触发一次
    ///
    /// `first` 表示本帧的第一次尝试；间隔为 0 的定时器每帧只触发一次。
    pub(crate) fn poll(&mut self, first: bool) -> Tick {
        if self.delay > 0.0 || self.repeat.is_exhausted(self.fired) {
            return Tick::Idle;
        }
        if self.interval <= 0.0 {
            if !first {
                return Tick::Idle;
            }
            let dt = self.elapsed;
            self.elapsed = 0.0;
            self.fired += 1;
            return Tick::Fire(dt);
        }
        if self.elapsed < self.interval {
            return Tick::Idle;
        }
        self.elapsed -= self.interval;
        self.fired += 1;
        Tick::Fire(self.interval)
    }

    /// 是否已经触发完所有次数
    pub(crate) fn is_exhausted(&self) -> bool {
        self.repeat.is_exhausted(self.fired)
    }
}
