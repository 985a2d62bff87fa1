// crates/rg_network/src/cell.rs

//! 单元属性表
//!
//! 网格单元的静态水力/库容参数，SoA 布局的只读表。
//! 初始化时从外部静态数据装配，模拟期间共享只读。

use rg_foundation::indices::CellIndex;
use rg_foundation::{RgError, RgResult};
use serde::{Deserialize, Serialize};

/// 单元属性表
///
/// 所有数组长度等于单元数，以 [`CellIndex`] 寻址。
/// `downstream[i]` 为 `CellIndex::INVALID` 时表示该单元是流域出口。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellTable {
    /// 单元数量
    pub n_cells: usize,
    /// 外部数据集中的单元编号（Arc_ID）
    pub arc_id: Vec<i64>,
    /// 纬度 [度]
    pub lat: Vec<f64>,
    /// 经度 [度]
    pub lon: Vec<f64>,
    /// 下游单元（出口为 INVALID）
    pub downstream: Vec<CellIndex>,

    // ===== 河道水力参数 =====
    /// 河段长度 [km]
    pub river_length: Vec<f64>,
    /// 河底宽度 [m]
    pub bottom_width: Vec<f64>,
    /// 河床比降 [-]
    pub river_slope: Vec<f64>,
    /// 河道糙率（Manning n）
    pub roughness: Vec<f64>,

    // ===== 水体最大库容 [km³] =====
    /// 地方湖泊最大库容
    pub max_storage_local_lake: Vec<f64>,
    /// 全球湖泊最大库容
    pub max_storage_global_lake: Vec<f64>,
    /// 湿地最大库容
    pub max_storage_wetland: Vec<f64>,
    /// 水库最大库容
    pub max_storage_reservoir: Vec<f64>,

    // ===== 水体面积占比 [-] =====
    /// 地方湖泊面积占比
    pub local_lake_fraction: Vec<f64>,
    /// 全球湖泊面积占比
    pub global_lake_fraction: Vec<f64>,
    /// 湿地面积占比
    pub wetland_fraction: Vec<f64>,
    /// 水库面积占比
    pub reservoir_fraction: Vec<f64>,

    /// 单元面积 [km²]
    pub cell_area: Vec<f64>,
    /// 测站校准修正系数（默认 1.0）
    pub station_correction: Vec<f64>,
}

impl CellTable {
    /// 校验所有数组长度与 `n_cells` 一致
    pub fn validate(&self) -> RgResult<()> {
        let n = self.n_cells;
        RgError::check_size("arc_id", n, self.arc_id.len())?;
        RgError::check_size("lat", n, self.lat.len())?;
        RgError::check_size("lon", n, self.lon.len())?;
        RgError::check_size("downstream", n, self.downstream.len())?;
        RgError::check_size("river_length", n, self.river_length.len())?;
        RgError::check_size("bottom_width", n, self.bottom_width.len())?;
        RgError::check_size("river_slope", n, self.river_slope.len())?;
        RgError::check_size("roughness", n, self.roughness.len())?;
        RgError::check_size(
            "max_storage_local_lake",
            n,
            self.max_storage_local_lake.len(),
        )?;
        RgError::check_size(
            "max_storage_global_lake",
            n,
            self.max_storage_global_lake.len(),
        )?;
        RgError::check_size("max_storage_wetland", n, self.max_storage_wetland.len())?;
        RgError::check_size("max_storage_reservoir", n, self.max_storage_reservoir.len())?;
        RgError::check_size("local_lake_fraction", n, self.local_lake_fraction.len())?;
        RgError::check_size("global_lake_fraction", n, self.global_lake_fraction.len())?;
        RgError::check_size("wetland_fraction", n, self.wetland_fraction.len())?;
        RgError::check_size("reservoir_fraction", n, self.reservoir_fraction.len())?;
        RgError::check_size("cell_area", n, self.cell_area.len())?;
        RgError::check_size("station_correction", n, self.station_correction.len())?;

        for i in 0..n {
            let down = self.downstream[i];
            if down.is_valid() {
                RgError::check_index("downstream", down.get(), n)?;
                rg_foundation::ensure!(
                    down.get() != i,
                    RgError::invalid_network(format!("单元 {} 的下游指向自身", i))
                );
            }
        }
        Ok(())
    }

    /// 构建均质测试网络的属性表
    ///
    /// 所有单元使用同一组水力参数，`downstream` 由调用者给出。
    /// 用于单元测试和合成流域实验。
    pub fn uniform(downstream: Vec<CellIndex>) -> Self {
        let n = downstream.len();
        Self {
            n_cells: n,
            arc_id: (0..n as i64).collect(),
            lat: vec![0.0; n],
            lon: vec![0.0; n],
            downstream,
            river_length: vec![10.0; n],
            bottom_width: vec![50.0; n],
            river_slope: vec![1e-3; n],
            roughness: vec![0.03; n],
            max_storage_local_lake: vec![0.0; n],
            max_storage_global_lake: vec![0.0; n],
            max_storage_wetland: vec![0.0; n],
            max_storage_reservoir: vec![0.0; n],
            local_lake_fraction: vec![0.0; n],
            global_lake_fraction: vec![0.0; n],
            wetland_fraction: vec![0.0; n],
            reservoir_fraction: vec![0.0; n],
            cell_area: vec![2500.0; n],
            station_correction: vec![1.0; n],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_foundation::indices::cell;

    #[test]
    fn test_uniform_table_valid() {
        let table = CellTable::uniform(vec![cell(1), cell(2), CellIndex::INVALID]);
        assert!(table.validate().is_ok());
        assert_eq!(table.n_cells, 3);
    }

    #[test]
    fn test_self_loop_rejected() {
        let table = CellTable::uniform(vec![cell(0)]);
        assert!(table.validate().is_err(), "自环应被拒绝");
    }

    #[test]
    fn test_downstream_out_of_bounds() {
        let table = CellTable::uniform(vec![cell(5), CellIndex::INVALID]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_size_mismatch_detected() {
        let mut table = CellTable::uniform(vec![cell(1), CellIndex::INVALID]);
        table.river_length.pop();
        assert!(matches!(
            table.validate(),
            Err(RgError::SizeMismatch { .. })
        ));
    }
}
