//! 演示场景
//!
//! 三个节点，覆盖动作组合、缓动、定时器和回调中修改调度器的常见用法。

use std::rc::Rc;

use serde::Serialize;
use tracing::info;

use scene_runtime::{
    Action, Blink, CallFunc, Callback, Color3, DelayTime, Director, Ease, EasingFunction, FadeTo,
    FiniteTimeActionExt, JumpBy, MoveBy, NodeData, PropertyTween, RepeatForever, RotateBy,
    ScaleTo, SceneNode, SceneResult, Sequence, Spawn, TimerOptions, TintTo, Vec2,
};

/// `hero` 上可被替换的动作标签
const TAG_PATROL: i32 = 1;

/// 演示场景中的节点
pub struct Demo {
    nodes: Vec<Rc<SceneNode>>,
}

/// `--dump` 输出
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub frames: u64,
    pub total_time: f64,
    pub running_actions: usize,
    pub nodes: Vec<NodeData>,
}

impl Demo {
    /// 创建节点并登记所有动作和定时器
    ///
    /// `report_interval` 来自命令行，定时器参数无效时返回 [`SceneError::Schedule`]。
    ///
    /// [`SceneError::Schedule`]: scene_runtime::SceneError::Schedule
    pub fn build(director: &Director, report_interval: f32) -> SceneResult<Self> {
        let hero = SceneNode::new("hero").at(0.0, 0.0).shared();
        let orb = SceneNode::new("orb").at(200.0, 100.0).shared();
        let meter = SceneNode::new("meter").with_property("fill", 0.0).shared();
        let hero_id = hero.target().id();
        let orb_target = orb.target();

        // hero: 往返巡逻，每一轮结束时跳一下
        let patrol = Sequence::new(vec![
            Ease::new(
                MoveBy::new(1.0, Vec2::new(120.0, 0.0)).boxed(),
                EasingFunction::EaseInOut { rate: 2.0 },
            )
            .boxed(),
            JumpBy::new(0.5, Vec2::zero(), 30.0, 2).boxed(),
            Ease::new(
                MoveBy::new(1.0, Vec2::new(-120.0, 0.0)).boxed(),
                EasingFunction::EaseOutBounce,
            )
            .boxed(),
            CallFunc::new(|target| info!(target_id = %target.id(), "巡逻一轮结束")).boxed(),
        ])?;
        let mut patrol_loop = RepeatForever::new(patrol.boxed());
        patrol_loop.set_tag(TAG_PATROL);
        director.run_action(&hero.target(), patrol_loop.boxed());

        // orb: 边转边淡出，然后闪烁并恢复
        let orb_intro = Sequence::new(vec![
            Spawn::new(vec![
                RotateBy::new(2.0, 360.0).boxed(),
                FadeTo::new(1.5, 64.0).boxed(),
                ScaleTo::new(2.0, 1.5, 1.5).boxed(),
            ])?
            .boxed(),
            Blink::new(1.0, 4).boxed(),
            FadeTo::new(0.5, 255.0).boxed(),
        ])?;
        director.run_action(&orb_target, orb_intro.boxed());

        // meter: 自定义属性
        director.run_action(
            &meter.target(),
            Sequence::new(vec![
                DelayTime::new(0.5).boxed(),
                PropertyTween::new(3.0, "fill", 0.0, 100.0).boxed(),
            ])?
            .boxed(),
        );

        let scheduler = director.scheduler();

        // 定期报告 hero 的位置
        let watched = hero.clone();
        scheduler.try_schedule(
            hero_id,
            "report",
            Callback::new(move |_, dt| {
                let position = watched.position();
                info!(dt, x = position.x, y = position.y, "hero 位置");
            }),
            TimerOptions::every(report_interval),
        )?;

        // 2.5 秒后给 orb 染色
        let manager = director.action_manager().clone();
        scheduler.try_schedule(
            orb_target.id(),
            "tint",
            Callback::new(move |_, _| {
                info!(target_id = %orb_target.id(), "开始染色");
                manager.add_action(
                    &orb_target,
                    TintTo::new(1.0, Color3::new(255.0, 128.0, 0.0)).boxed(),
                    false,
                );
            }),
            TimerOptions::once(2.5),
        )?;

        // 4 秒后停止巡逻：按标签移除，并注销报告定时器
        let manager = director.action_manager().clone();
        scheduler.try_schedule(
            hero_id,
            "stop-patrol",
            Callback::new(move |scheduler, _| {
                info!(target_id = %hero_id, "停止巡逻");
                manager.remove_action_by_tag(TAG_PATROL, hero_id);
                scheduler.unschedule("report", hero_id);
            }),
            TimerOptions::once(4.0),
        )?;

        Ok(Self {
            nodes: vec![hero, orb, meter],
        })
    }

    /// 当前状态
    pub fn report(&self, director: &Director) -> DemoReport {
        DemoReport {
            frames: director.frames(),
            total_time: director.total_time(),
            running_actions: director.action_manager().number_of_running_actions(),
            nodes: self.nodes.iter().map(|node| node.snapshot()).collect(),
        }
    }
}
