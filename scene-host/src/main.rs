//! # Scene Host
//!
//! 无窗口的帧循环驱动：搭建演示场景，以固定帧率推进若干帧。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p scene-host
//! cargo run -p scene-host -- --frames 600 --fps 30 --report-every 0.5
//! cargo run -p scene-host -- --config director.json --time-scale 0.5 --dump
//! RUST_LOG=scene_runtime=debug cargo run -p scene-host
//! ```
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. `--config` 指定的配置文件
//! 3. 默认值（最低）

mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scene_runtime::{Director, DirectorConfig};

use demo::Demo;

#[derive(Parser)]
#[command(name = "scene-host")]
#[command(about = "无窗口帧循环驱动 - 推进演示场景并输出节点状态")]
#[command(version)]
struct Cli {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 推进的帧数
    #[arg(short, long, default_value = "300")]
    frames: u32,

    /// 帧率，每帧 dt = 1 / fps
    #[arg(long, default_value = "60")]
    fps: f32,

    /// 覆盖配置文件中的时间缩放
    #[arg(long)]
    time_scale: Option<f32>,

    /// hero 位置报告的间隔（秒）
    #[arg(long, default_value = "1.0")]
    report_every: f32,

    /// 结束后以 JSON 输出节点状态
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 日志初始化之前先读取配置，失败信息推迟到初始化之后再输出
    let (mut config, load_error) = match &cli.config {
        Some(path) => match DirectorConfig::load(path) {
            Ok(config) => (config, None),
            Err(e) => (DirectorConfig::default(), Some((path.clone(), e))),
        },
        None => (DirectorConfig::default(), None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .init();

    if let Some((path, e)) = load_error {
        warn!(path = %path.display(), error = %e, "加载配置失败，使用默认配置");
    }

    if let Some(time_scale) = cli.time_scale {
        config.time_scale = time_scale;
    }
    ensure!(
        cli.fps.is_finite() && cli.fps > 0.0,
        "帧率必须是正数: {}",
        cli.fps
    );

    let mut director = Director::from_config(config).context("配置无效")?;
    let demo = Demo::build(&director, cli.report_every).context("搭建演示场景失败")?;

    let dt = 1.0 / cli.fps;
    info!(frames = cli.frames, fps = cli.fps, "开始推进");
    for frame in 1..=cli.frames {
        director.tick(dt);
        if frame % cli.fps.ceil().max(1.0) as u32 == 0 {
            info!(
                frame,
                total_time = director.total_time(),
                running_actions = director.action_manager().number_of_running_actions(),
                "进度"
            );
        }
    }
    info!(
        frames = director.frames(),
        total_time = director.total_time(),
        "推进结束"
    );

    if cli.dump {
        let report = demo.report(&director);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
