//! # 帧循环集成测试
//!
//! 通过公开 API 测试 Director → Scheduler → ActionManager → 动作 的完整链路。

use std::cell::RefCell;
use std::rc::Rc;

use scene_runtime::{
    Action, Callback, CallFunc, DelayTime, Director, Ease, EasingFunction, FiniteTimeAction,
    FiniteTimeActionExt, MoveBy, RepeatCount, RepeatForever, Repeat, Scheduler, SceneNode,
    Sequence, Spawn, TargetId, TimerKey, TimerOptions, Vec2,
};

const EPS: f32 = 1e-4;

fn approx(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
}

/// 共享日志，供回调记录调用顺序
fn new_log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}

/// 时长代数
#[test]
fn test_duration_algebra() {
    let a = || MoveBy::new(1.0, Vec2::new(1.0, 0.0)).boxed();
    let b = || DelayTime::new(0.5).boxed();

    let sequence = Sequence::new(vec![a(), b()]).unwrap();
    assert!((sequence.duration() - 1.5).abs() < EPS);

    let spawn = Spawn::new(vec![a(), b()]).unwrap();
    assert!((spawn.duration() - 1.0).abs() < EPS);

    let repeat = Repeat::new(b(), 4).unwrap();
    assert!((repeat.duration() - 2.0).abs() < EPS);
}

/// 一次大步长推进 Sequence：多出来的时间交给下一个子动作
#[test]
fn test_sequence_sub_tick_carry() {
    let node = SceneNode::new("n").shared();
    let mut sequence = Sequence::new(vec![
        MoveBy::new(1.0, Vec2::new(10.0, 0.0)).boxed(),
        MoveBy::new(1.0, Vec2::new(0.0, 10.0)).boxed(),
    ])
    .unwrap();

    sequence.start_with_target(node.target());
    sequence.step(1.5);

    assert!(approx(node.position(), Vec2::new(10.0, 5.0)));
    assert!((sequence.elapsed() - 1.5).abs() < EPS);
    assert!(!sequence.is_done());

    sequence.step(0.5);
    assert!(sequence.is_done());
    assert!(approx(node.position(), Vec2::new(10.0, 10.0)));
}

/// 暂停 k 帧后恢复，与少推进 k 帧的结果相同
#[test]
fn test_pause_fidelity() {
    let mut director = Director::new();
    let paused_node = SceneNode::new("paused").shared();
    let plain_node = SceneNode::new("plain").shared();

    let action = || {
        Sequence::new(vec![
            MoveBy::new(0.5, Vec2::new(10.0, 0.0)).boxed(),
            MoveBy::new(1.0, Vec2::new(0.0, 20.0)).boxed(),
        ])
        .unwrap()
        .boxed()
    };
    director.run_action(&paused_node.target(), action());
    director.run_action(&plain_node.target(), action());

    let manager = director.action_manager().clone();
    for frame in 0..10 {
        match frame {
            2 => manager.pause_target(&paused_node.target()),
            5 => manager.resume_target(&paused_node.target()),
            _ => {}
        }
        if frame == 7 {
            // 对照组停在少推进 3 帧的位置
            manager.pause_target(&plain_node.target());
        }
        director.tick(0.1);
    }

    assert!(approx(paused_node.position(), plain_node.position()));
    assert!(approx(paused_node.position(), Vec2::new(10.0, 4.0)));
}

/// 定时器追帧
#[test]
fn test_timer_catch_up() {
    let scheduler = Scheduler::new();
    let target = TargetId::next();
    let log = new_log();

    let l = log.clone();
    scheduler.schedule(
        target,
        "tick",
        Callback::new(move |_, dt| l.borrow_mut().push(format!("{dt:.2}"))),
        TimerOptions::every(0.1),
    );

    scheduler.update(0.35);
    assert_eq!(*log.borrow(), vec!["0.10", "0.10", "0.10"]);

    let elapsed = scheduler.timer_elapsed("tick", target).unwrap();
    assert!((elapsed - 0.05).abs() < EPS);
}

/// repeat = 2 总共触发 3 次，之后自动移除
#[test]
fn test_timer_repeat_exhaustion() {
    let scheduler = Scheduler::new();
    let target = TargetId::next();
    let log = new_log();

    let l = log.clone();
    scheduler.schedule(
        target,
        "limited",
        Callback::new(move |_, _| l.borrow_mut().push("fire".to_string())),
        TimerOptions::every(0.1).repeat(RepeatCount::Times(2)),
    );

    for _ in 0..5 {
        scheduler.update(0.1);
    }
    assert_eq!(log.borrow().len(), 3);
    assert!(!scheduler.is_scheduled("limited", target));

    scheduler.update(1.0);
    assert_eq!(log.borrow().len(), 3);
}

/// 目标的动作全部完成后，注册表里不再有这个目标
#[test]
fn test_registry_cleanup() {
    let mut director = Director::new();
    let node = SceneNode::new("n").shared();
    let target = node.target();

    director.run_action(&target, MoveBy::new(0.2, Vec2::new(1.0, 0.0)).boxed());
    director.run_action(&target, DelayTime::new(0.3).boxed());
    assert_eq!(
        director
            .action_manager()
            .number_of_running_actions_in_target(&target),
        2
    );

    for _ in 0..4 {
        director.tick(0.1);
    }

    let manager = director.action_manager();
    assert_eq!(manager.number_of_running_actions_in_target(&target), 0);
    assert!(!manager.targets().contains(&target.id()));
    assert!(manager.target(target.id()).is_none());
}

/// reverse(reverse(A)) 与 A 的终态相同
#[test]
fn test_reversal_involution() {
    let originals: Vec<Box<dyn FiniteTimeAction>> = vec![
        MoveBy::new(1.0, Vec2::new(30.0, -10.0)).boxed(),
        Ease::new(
            MoveBy::new(1.0, Vec2::new(5.0, 5.0)).boxed(),
            EasingFunction::EaseIn { rate: 3.0 },
        )
        .boxed(),
        Sequence::new(vec![
            MoveBy::new(0.5, Vec2::new(10.0, 0.0)).boxed(),
            Ease::new(
                MoveBy::new(0.5, Vec2::new(0.0, 10.0)).boxed(),
                EasingFunction::EaseOutBounce,
            )
            .boxed(),
        ])
        .unwrap()
        .boxed(),
    ];

    for original in originals {
        let twice = original.reverse().reverse();
        assert!((twice.duration() - original.duration()).abs() < EPS);

        let run = |mut action: Box<dyn FiniteTimeAction>| {
            let node = SceneNode::new("n").at(3.0, 4.0).shared();
            action.start_with_target(node.target());
            for _ in 0..4 {
                action.step(0.25);
            }
            assert!(action.is_done());
            node.position()
        };

        let expected = run(original.clone_finite());
        let actual = run(twice);
        assert!(approx(expected, actual), "{expected:?} != {actual:?}");
    }
}

/// 在回调中注销自己，不影响同一帧里其他回调的调用
#[test]
fn test_unschedule_self_during_update() {
    let scheduler = Scheduler::new();
    let log = new_log();
    let b_target = TargetId::next();

    for (name, priority) in [("a", 0), ("c", 2)] {
        let l = log.clone();
        scheduler.schedule_update(
            TargetId::next(),
            priority,
            false,
            Callback::new(move |_, _| l.borrow_mut().push(name.to_string())),
        );
    }
    let l = log.clone();
    scheduler.schedule_update(
        b_target,
        1,
        false,
        Callback::new(move |scheduler, _| {
            l.borrow_mut().push("b".to_string());
            scheduler.unschedule_update(b_target);
        }),
    );

    scheduler.update(0.1);
    log.borrow_mut().push("|".to_string());
    scheduler.update(0.1);

    insta::assert_snapshot!(log.borrow().join(" "), @"a b c | a c");
}

/// 同一帧内的执行顺序：动作管理器最先，然后是其他 update 回调，最后是定时器
#[test]
fn test_frame_order() {
    let mut director = Director::new();
    let node = SceneNode::new("n").shared();
    let log = new_log();

    let l = log.clone();
    let record = CallFunc::new(move |_| l.borrow_mut().push("action".to_string()));
    director.run_action(&node.target(), RepeatForever::new(record.boxed()).boxed());

    let scheduler = director.scheduler().clone();
    let l = log.clone();
    scheduler.schedule(
        TargetId::next(),
        "timer",
        Callback::new(move |_, _| l.borrow_mut().push("timer".to_string())),
        TimerOptions::every(0.0),
    );
    let l = log.clone();
    scheduler.schedule_update(
        TargetId::next(),
        -100,
        false,
        Callback::new(move |_, _| l.borrow_mut().push("update".to_string())),
    );

    director.tick(0.1);
    insta::assert_snapshot!(log.borrow().join(" "), @"action update timer");
}

/// 定时器回调中启动动作，动作在下一帧开始推进
#[test]
fn test_timer_starts_action() {
    let mut director = Director::new();
    let node = SceneNode::new("n").shared();

    let manager = director.action_manager().clone();
    let target = node.target();
    director.scheduler().schedule_once(
        target.id(),
        TimerKey::from("spawn"),
        Callback::new(move |_, _| {
            manager.add_action(&target, MoveBy::new(0.5, Vec2::new(10.0, 0.0)).boxed(), false);
        }),
        0.2,
    );

    director.tick(0.1);
    director.tick(0.1);
    assert_eq!(node.position().x, 0.0);
    assert_eq!(director.action_manager().number_of_running_actions(), 1);

    for _ in 0..6 {
        director.tick(0.1);
    }
    assert!((node.position().x - 10.0).abs() < EPS);
    assert_eq!(director.action_manager().number_of_running_actions(), 0);
}

/// 时间缩放同时作用于动作和定时器
#[test]
fn test_time_scale_end_to_end() {
    let mut director = Director::new();
    director.scheduler().set_time_scale(0.5);

    let node = SceneNode::new("n").shared();
    director.run_action(&node.target(), MoveBy::new(1.0, Vec2::new(10.0, 0.0)).boxed());

    let log = new_log();
    let l = log.clone();
    director.scheduler().schedule(
        TargetId::next(),
        "half",
        Callback::new(move |_, _| l.borrow_mut().push("fire".to_string())),
        TimerOptions::every(0.1),
    );

    director.tick(0.2);
    assert!((node.position().x - 1.0).abs() < EPS);
    assert_eq!(log.borrow().len(), 1);
}
