// crates/rg_sim/src/forcing.rs

//! 当日强迫与用水输入
//!
//! 强迫数据由外部协作者（垂向水量平衡、气候预处理）逐日提供。
//! 非负契约在进入演算前校验：负的产流或降水意味着数据管线缺陷，
//! 必须立即报错而不是静默截断。

use rg_demand::request::NetAbstraction;
use rg_foundation::{RgError, RgResult};
use serde::{Deserialize, Serialize};

/// 当日气候/产流强迫
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForcing {
    /// 入河产流 [km³/day]（垂向平衡的输出）
    pub runoff: Vec<f64>,
    /// 开阔水面降水 [mm/day]
    pub precipitation: Vec<f64>,
    /// 开阔水面潜在蒸发 [mm/day]
    pub potential_evap: Vec<f64>,
}

impl DailyForcing {
    /// 全零强迫
    pub fn zeros(n_cells: usize) -> Self {
        Self {
            runoff: vec![0.0; n_cells],
            precipitation: vec![0.0; n_cells],
            potential_evap: vec![0.0; n_cells],
        }
    }

    /// 校验数组长度与非负契约
    ///
    /// 任何负值都是致命错误（[`RgError::NegativeForcing`]），
    /// 当日演算中止。
    pub fn validate(&self, n_cells: usize) -> RgResult<()> {
        RgError::check_size("forcing.runoff", n_cells, self.runoff.len())?;
        RgError::check_size("forcing.precipitation", n_cells, self.precipitation.len())?;
        RgError::check_size("forcing.potential_evap", n_cells, self.potential_evap.len())?;

        for i in 0..n_cells {
            RgError::check_forcing("runoff", i, self.runoff[i])?;
            RgError::check_forcing("precipitation", i, self.precipitation[i])?;
            RgError::check_forcing("potential_evap", i, self.potential_evap[i])?;
        }
        Ok(())
    }
}

/// 当日用水输入（外部用水协作者提供）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyWaterUse {
    /// 带符号净取水请求
    pub abstraction: NetAbstraction,
    /// 当日地表灌溉取水量 [km³/day]
    pub irrigation_withdrawal: Vec<f64>,
    /// 当日灌溉耗水量 [km³/day]
    pub irrigation_consumptive_use: Vec<f64>,
    /// 地表需求中灌溉部门的占比 [0, 1]
    pub irrigation_share: Vec<f64>,
    /// 灌溉非耗水部分的回流比例 [0, 1]
    pub return_fraction: Vec<f64>,
}

impl DailyWaterUse {
    /// 全零用水
    pub fn zeros(n_cells: usize) -> Self {
        Self {
            abstraction: NetAbstraction::zeros(n_cells),
            irrigation_withdrawal: vec![0.0; n_cells],
            irrigation_consumptive_use: vec![0.0; n_cells],
            irrigation_share: vec![0.0; n_cells],
            return_fraction: vec![0.0; n_cells],
        }
    }

    /// 校验数组长度
    ///
    /// 净取水请求带符号，不做非负校验；取水/耗水量必须非负。
    pub fn validate(&self, n_cells: usize) -> RgResult<()> {
        self.abstraction.validate(n_cells)?;
        RgError::check_size(
            "water_use.irrigation_withdrawal",
            n_cells,
            self.irrigation_withdrawal.len(),
        )?;
        RgError::check_size(
            "water_use.irrigation_consumptive_use",
            n_cells,
            self.irrigation_consumptive_use.len(),
        )?;
        RgError::check_size(
            "water_use.irrigation_share",
            n_cells,
            self.irrigation_share.len(),
        )?;
        RgError::check_size(
            "water_use.return_fraction",
            n_cells,
            self.return_fraction.len(),
        )?;

        for i in 0..n_cells {
            RgError::check_forcing("irrigation_withdrawal", i, self.irrigation_withdrawal[i])?;
            RgError::check_forcing(
                "irrigation_consumptive_use",
                i,
                self.irrigation_consumptive_use[i],
            )?;
        }
        Ok(())
    }
}
