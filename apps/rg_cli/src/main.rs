// apps/rg_cli/src/main.rs

//! RiverGrid 命令行界面
//!
//! 河网汇流与需求分配模拟的入口：`run` 执行逐日模拟，`info`
//! 打印系统信息与默认配置，`validate` 检查配置文件与河网拓扑。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：只组合 rg_config 与 rg_sim
//! 的公开接口，不直接触碰物理层。

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// RiverGrid 河网汇流模拟命令行工具
#[derive(Parser)]
#[command(name = "rg_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "RiverGrid lateral routing and demand simulation", long_about = None)]
struct Cli {
    /// 日志过滤指令（如 `info`、`rg_sim=debug`；RG_LOG 环境变量优先）
    #[arg(short, long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行模拟
    Run(commands::run::RunArgs),
    /// 显示系统信息与默认配置
    Info(commands::info::InfoArgs),
    /// 验证配置与河网
    Validate(commands::validate::ValidateArgs),
}

/// 初始化日志订阅器
///
/// 过滤指令来源优先级：RG_LOG 环境变量 > `--log` 命令行参数。
fn init_logging(directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("RG_LOG")
        .or_else(|_| EnvFilter::try_new(directive))
        .with_context(|| format!("日志过滤指令非法: {}", directive))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
