// apps/rg_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! 在给定河网与配置上执行逐日模拟。未提供河网文件时构造
//! 合成链式流域（演示/冒烟测试模式）。

use anyhow::{Context, Result};
use chrono::Days;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use rg_config::SimulationConfig;
use rg_foundation::constants::KM3_PER_DAY_TO_M3_PER_S;
use rg_foundation::indices::{cell, CellIndex};
use rg_network::cell::CellTable;
use rg_network::units::UnitTable;
use rg_sim::{ConstantInputs, DailyForcing, DailyWaterUse, Simulation, SimulationRunner};

/// 运行模拟参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 河网单元表路径（JSON，省略时使用合成流域）
    #[arg(short, long)]
    pub network: Option<PathBuf>,

    /// 合成流域的单元数量
    #[arg(long, default_value = "100")]
    pub cells: usize,

    /// 模拟天数（覆盖配置中的日期区间）
    #[arg(short, long)]
    pub days: Option<u64>,

    /// 合成流域源头的恒定产流 [km³/day]
    #[arg(long, default_value = "0.1")]
    pub runoff: f64,

    /// 每个单元的恒定地表取水请求 [km³/day]
    #[arg(long, default_value = "0.0")]
    pub demand: f64,

    /// 检查点间隔 [天]
    #[arg(long)]
    pub checkpoint_interval: Option<u32>,

    /// 输出目录
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== RiverGrid 模拟启动 ===");

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(days) = args.days {
        config.run.end_date = config
            .run
            .start_date
            .checked_add_days(Days::new(days.saturating_sub(1)))
            .context("日期区间越界")?;
    }
    config.run.checkpoint_interval_days = args.checkpoint_interval;
    config.run.output_dir = args.output.clone();

    let cells = match &args.network {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("读取河网失败: {}", path.display()))?;
            serde_json::from_str::<CellTable>(&text).context("解析河网单元表失败")?
        }
        None => {
            info!("未提供河网文件，构造 {} 单元合成链式流域", args.cells);
            synthetic_chain(args.cells)
        }
    };
    let n = cells.n_cells;

    let mut sim = Simulation::new(cells, UnitTable::empty(n), config.clone())
        .context("构建模拟器失败")?;
    info!(
        "河网: {} 单元, {} 个独立流域",
        n,
        sim.regions().n_regions()
    );
    info!(
        "区间: {} 至 {}, 并行: {}",
        config.run.start_date, config.run.end_date, config.run.parallel
    );

    // 合成强迫：源头单元产流，各单元恒定请求
    let mut forcing = DailyForcing::zeros(n);
    if n > 0 {
        forcing.runoff[0] = args.runoff;
    }
    let mut water_use = DailyWaterUse::zeros(n);
    for request in &mut water_use.abstraction.surface {
        *request = args.demand;
    }
    let provider = ConstantInputs { forcing, water_use };

    let runner = SimulationRunner::new();
    let start = Instant::now();
    let summary = runner.run(&mut sim, &provider).context("模拟运行失败")?;
    let elapsed = start.elapsed();

    let progress = runner.progress();
    info!("=== 模拟完成 ===");
    info!("运行标识: {}", summary.run_id);
    info!("完成天数: {}", summary.days_completed);
    info!(
        "出口合计流量: {:.6} km³/day ({:.1} m³/s)",
        progress.last_outlet_discharge,
        progress.last_outlet_discharge * KM3_PER_DAY_TO_M3_PER_S
    );
    info!("计算时间: {:.2} s", elapsed.as_secs_f64());
    if let Some(path) = &summary.last_checkpoint {
        info!("最后检查点: {}", path.display());
    }

    Ok(())
}

/// 合成链式流域：0 -> 1 -> ... -> n-1(出口)
fn synthetic_chain(n: usize) -> CellTable {
    let downstream: Vec<CellIndex> = (0..n)
        .map(|i| {
            if i + 1 < n {
                cell(i + 1)
            } else {
                CellIndex::INVALID
            }
        })
        .collect();
    CellTable::uniform(downstream)
}
