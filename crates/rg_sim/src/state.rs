// crates/rg_sim/src/state.rs

//! 模拟状态
//!
//! 逐单元的全部可变状态：五类水体存量、当日有效面积占比、
//! 跨日未满足需求累计器。每个量在一个模拟日内恰好被更新一次
//! （按拓扑序），生命周期覆盖整个模拟，经检查点持久化/恢复。

use rg_demand::request::CellAccumulators;
use rg_network::cell::CellTable;
use rg_foundation::{RgError, RgResult};
use serde::{Deserialize, Serialize};

/// 逐单元模拟状态
///
/// 湖泊/湿地/水库存量带符号，约束 `-Smax <= S <= Smax`；
/// 河段存量非负。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// 河段存量 [km³]
    pub river_storage: Vec<f64>,
    /// 地方湖泊存量 [km³]
    pub local_lake_storage: Vec<f64>,
    /// 全球湖泊存量 [km³]
    pub global_lake_storage: Vec<f64>,
    /// 湿地存量 [km³]
    pub wetland_storage: Vec<f64>,
    /// 水库存量 [km³]
    pub reservoir_storage: Vec<f64>,

    /// 地方湖泊当日有效面积占比
    pub local_lake_fraction: Vec<f64>,
    /// 全球湖泊当日有效面积占比
    pub global_lake_fraction: Vec<f64>,
    /// 湿地当日有效面积占比
    pub wetland_fraction: Vec<f64>,
    /// 水库当日有效面积占比
    pub reservoir_fraction: Vec<f64>,

    /// 跨日未满足需求累计器
    pub accumulators: Vec<CellAccumulators>,
}

impl SimulationState {
    /// 满库初始状态
    ///
    /// 湖泊/湿地/水库从满库参考水位（S = +Smax）起算，河段为空，
    /// 有效面积占比取静态占比。
    pub fn init_full(cells: &CellTable) -> Self {
        let n = cells.n_cells;
        Self {
            river_storage: vec![0.0; n],
            local_lake_storage: cells.max_storage_local_lake.clone(),
            global_lake_storage: cells.max_storage_global_lake.clone(),
            wetland_storage: cells.max_storage_wetland.clone(),
            reservoir_storage: cells.max_storage_reservoir.clone(),
            local_lake_fraction: cells.local_lake_fraction.clone(),
            global_lake_fraction: cells.global_lake_fraction.clone(),
            wetland_fraction: cells.wetland_fraction.clone(),
            reservoir_fraction: cells.reservoir_fraction.clone(),
            accumulators: vec![CellAccumulators::default(); n],
        }
    }

    /// 校验数组长度并检查存量界
    pub fn validate(&self, cells: &CellTable) -> RgResult<()> {
        let n = cells.n_cells;
        RgError::check_size("river_storage", n, self.river_storage.len())?;
        RgError::check_size("local_lake_storage", n, self.local_lake_storage.len())?;
        RgError::check_size("global_lake_storage", n, self.global_lake_storage.len())?;
        RgError::check_size("wetland_storage", n, self.wetland_storage.len())?;
        RgError::check_size("reservoir_storage", n, self.reservoir_storage.len())?;
        RgError::check_size("accumulators", n, self.accumulators.len())?;

        for i in 0..n {
            if self.river_storage[i] < 0.0 {
                return Err(RgError::internal(format!(
                    "单元 {} 的河段存量为负: {}",
                    i, self.river_storage[i]
                )));
            }
            let bounds = [
                (self.local_lake_storage[i], cells.max_storage_local_lake[i]),
                (self.global_lake_storage[i], cells.max_storage_global_lake[i]),
                (self.wetland_storage[i], cells.max_storage_wetland[i]),
                (self.reservoir_storage[i], cells.max_storage_reservoir[i]),
            ];
            for (s, max) in bounds {
                if s < -max - 1e-9 || s > max + 1e-9 {
                    return Err(RgError::internal(format!(
                        "单元 {} 的水体存量越界: {} 不在 [-{}, {}] 内",
                        i, s, max, max
                    )));
                }
            }
        }
        Ok(())
    }

    /// 显式重初始化累计器（模拟重启）
    pub fn reset_accumulators(&mut self) {
        for acc in &mut self.accumulators {
            acc.reset();
        }
    }

    /// 单元数量
    pub fn n_cells(&self) -> usize {
        self.river_storage.len()
    }
}
