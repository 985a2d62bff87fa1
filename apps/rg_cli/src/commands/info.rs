// apps/rg_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示系统信息与默认配置。

use anyhow::Result;
use clap::Args;
use tracing::info;

use rg_config::SimulationConfig;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== RiverGrid 信息 ===");

    if args.system {
        print_system_info();
    }

    if args.defaults {
        print_default_config()?;
    }

    if !args.system && !args.defaults {
        // 默认显示所有信息
        print_system_info();
        println!();
        print_default_config()?;
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("RiverGrid CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!("逻辑核心数: {}", std::thread::available_parallelism().map_or(1, |n| n.get()));
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let config = SimulationConfig::default();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
