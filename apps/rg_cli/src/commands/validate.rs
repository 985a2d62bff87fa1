// apps/rg_cli/src/commands/validate.rs

//! 配置与河网验证命令
//!
//! 验证配置文件的取值范围，以及河网单元表的拓扑合法性
//! （含环路检测）。

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{error, info, warn};

use rg_config::SimulationConfig;
use rg_network::cell::CellTable;
use rg_network::drainage::DrainageNetwork;
use rg_network::region::RegionPartition;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 河网单元表路径（JSON）
    #[arg(short, long)]
    pub network: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== RiverGrid 验证 ===");

    let mut warnings = 0usize;

    if let Some(path) = &args.config {
        SimulationConfig::from_file(path)
            .with_context(|| format!("配置验证失败: {}", path.display()))?;
        info!("配置合法: {}", path.display());
    }

    if let Some(path) = &args.network {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取河网失败: {}", path.display()))?;
        let cells: CellTable =
            serde_json::from_str(&text).context("解析河网单元表失败")?;
        cells.validate().context("单元表数组不一致")?;

        // 环路检测与流域划分
        let net = DrainageNetwork::build(cells.downstream.clone())
            .context("汇流方向图非法")?;
        let regions = RegionPartition::build(&net);
        info!(
            "河网合法: {} 单元, {} 个独立流域",
            cells.n_cells,
            regions.n_regions()
        );

        for (i, &length) in cells.river_length.iter().enumerate() {
            if length <= 0.0 {
                warn!("单元 {} 的河长非正: {}", i, length);
                warnings += 1;
            }
        }
    }

    if args.config.is_none() && args.network.is_none() {
        error!("未提供任何待验证文件（--config / --network）");
        bail!("无验证目标");
    }

    if warnings > 0 {
        warn!("验证通过，但有 {} 条警告", warnings);
        if args.strict {
            bail!("严格模式下警告视为错误");
        }
    } else {
        info!("验证通过");
    }

    Ok(())
}
