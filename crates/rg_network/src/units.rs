// crates/rg_network/src/units.rs

//! 跨单元共享的湖泊/水库对象
//!
//! 一个物理湖泊或水库可以横跨多个网格单元（沿岸单元）。
//! 每个对象有唯一的出流单元，水量平衡与取水都在出流单元的
//! 存量上进行；沿岸单元的取水需求在每日预处理中汇集到出流单元
//! （见 rg_demand::aggregator）。对象集合在整个模拟期间静态。

use rg_foundation::indices::{CellIndex, UnitIndex};
use rg_foundation::{RgError, RgResult};
use serde::{Deserialize, Serialize};

/// 水体对象类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// 全球湖泊
    GlobalLake,
    /// 调节水库
    Reservoir,
}

/// 一个共享湖泊/水库对象
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterUnit {
    /// 数据集中的对象名称
    pub name: String,
    /// 对象类别
    pub kind: UnitKind,
    /// 沿岸单元（含出流单元）
    pub cells: Vec<CellIndex>,
    /// 指定的出流单元
    pub outflow_cell: CellIndex,
    /// 水库投运年份（之前按天然湖泊处理；湖泊为 None）
    pub commission_year: Option<i32>,
    /// 长期平均入流 [km³/day]（水库运行规则的目标值）
    pub mean_inflow: f64,
}

/// 湖库对象表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTable {
    /// 对象列表
    units: Vec<WaterUnit>,
    /// 单元 -> 所属对象（无对象为 INVALID）
    unit_of_cell: Vec<UnitIndex>,
}

impl UnitTable {
    /// 从对象列表构建
    ///
    /// # 错误
    ///
    /// - 出流单元不在成员列表中
    /// - 同一单元属于多个对象
    pub fn build(units: Vec<WaterUnit>, n_cells: usize) -> RgResult<Self> {
        let mut unit_of_cell = vec![UnitIndex::INVALID; n_cells];
        for (u, unit) in units.iter().enumerate() {
            rg_foundation::ensure!(
                unit.cells.contains(&unit.outflow_cell),
                RgError::invalid_network(format!(
                    "湖库对象 {} 的出流单元 {} 不在成员列表中",
                    unit.name, unit.outflow_cell
                ))
            );
            for &c in &unit.cells {
                RgError::check_index("unit cell", c.get(), n_cells)?;
                if unit_of_cell[c.get()].is_valid() {
                    return Err(RgError::invalid_network(format!(
                        "单元 {} 同时属于多个湖库对象",
                        c
                    )));
                }
                unit_of_cell[c.get()] = UnitIndex::new(u);
            }
        }
        Ok(Self {
            units,
            unit_of_cell,
        })
    }

    /// 空对象表
    pub fn empty(n_cells: usize) -> Self {
        Self {
            units: Vec::new(),
            unit_of_cell: vec![UnitIndex::INVALID; n_cells],
        }
    }

    /// 对象数量
    pub fn n_units(&self) -> usize {
        self.units.len()
    }

    /// 迭代所有对象
    pub fn iter(&self) -> impl Iterator<Item = (UnitIndex, &WaterUnit)> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, u)| (UnitIndex::new(i), u))
    }

    /// 按索引访问对象
    pub fn unit(&self, idx: UnitIndex) -> &WaterUnit {
        &self.units[idx.get()]
    }

    /// 单元所属对象（无对象为 INVALID）
    pub fn unit_of(&self, cell: CellIndex) -> UnitIndex {
        self.unit_of_cell[cell.get()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_foundation::indices::cell;

    fn lake(name: &str, cells: Vec<CellIndex>, outflow: CellIndex) -> WaterUnit {
        WaterUnit {
            name: name.into(),
            kind: UnitKind::GlobalLake,
            cells,
            outflow_cell: outflow,
            commission_year: None,
            mean_inflow: 0.0,
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let table = UnitTable::build(
            vec![lake("ladoga", vec![cell(0), cell(1), cell(2)], cell(2))],
            5,
        )
        .unwrap();
        assert_eq!(table.n_units(), 1);
        assert_eq!(table.unit_of(cell(1)), UnitIndex::new(0));
        assert!(table.unit_of(cell(4)).is_invalid());
    }

    #[test]
    fn test_outflow_must_be_member() {
        let err = UnitTable::build(vec![lake("bad", vec![cell(0)], cell(3))], 5).unwrap_err();
        assert!(matches!(err, RgError::InvalidNetwork { .. }));
    }

    #[test]
    fn test_overlapping_units_rejected() {
        let err = UnitTable::build(
            vec![
                lake("a", vec![cell(0), cell(1)], cell(1)),
                lake("b", vec![cell(1), cell(2)], cell(2)),
            ],
            5,
        )
        .unwrap_err();
        assert!(matches!(err, RgError::InvalidNetwork { .. }));
    }

    #[test]
    fn test_empty_table() {
        let table = UnitTable::empty(3);
        assert_eq!(table.n_units(), 0);
        assert!(table.unit_of(cell(0)).is_invalid());
    }
}
