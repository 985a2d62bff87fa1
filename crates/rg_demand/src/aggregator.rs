// crates/rg_demand/src/aggregator.rs

//! 沿岸需求汇集
//!
//! 共享湖泊/水库的存量记在出流单元上，因此所有沿岸单元对该
//! 对象的正净取水请求必须先搬到出流单元，才能在级联中统一
//! 从同一份存量扣除。负请求（净回流）不参与汇集，留在原单元。
//!
//! 每日在级联之前执行一次。

use rg_network::units::UnitTable;
use rg_foundation::indices::CellIndex;
use tracing::warn;

/// 汇集沿岸正净取水到各对象的出流单元
///
/// `lake_fraction` / `reservoir_fraction` 是当日的有效面积占比，
/// 用于判定对象当日是否有可记账的出流单元：
///
/// - 指定出流单元面积为正：用它
/// - 否则退回对象内第一个面积为正的成员单元
/// - 全员面积为零：该对象当日无出流单元可记账，跳过
///   （局部恢复，不致命）
///
/// 返回当日被跳过的对象数量。
pub fn aggregate_riparian_demand(
    units: &UnitTable,
    lake_fraction: &[f64],
    reservoir_fraction: &[f64],
    surface_request: &mut [f64],
) -> usize {
    let mut skipped = 0;

    for (_, unit) in units.iter() {
        let has_area = |c: CellIndex| {
            lake_fraction[c.get()] > 0.0 || reservoir_fraction[c.get()] > 0.0
        };

        let outlet = if has_area(unit.outflow_cell) {
            Some(unit.outflow_cell)
        } else {
            unit.cells.iter().copied().find(|&c| has_area(c))
        };

        let Some(outlet) = outlet else {
            warn!(unit = %unit.name, "湖库对象当日无正面积单元，跳过需求汇集");
            skipped += 1;
            continue;
        };

        let mut pooled = 0.0;
        for &c in &unit.cells {
            if c == outlet {
                continue;
            }
            let request = surface_request[c.get()];
            if request > 0.0 {
                pooled += request;
                surface_request[c.get()] = 0.0;
            }
        }
        surface_request[outlet.get()] += pooled;
    }

    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_network::units::{UnitKind, WaterUnit};
    use rg_foundation::indices::cell;

    fn unit_table(outflow: usize) -> UnitTable {
        UnitTable::build(
            vec![WaterUnit {
                name: "test-lake".into(),
                kind: UnitKind::GlobalLake,
                cells: vec![cell(0), cell(1), cell(2), cell(3)],
                outflow_cell: cell(outflow),
                commission_year: None,
                mean_inflow: 0.0,
            }],
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_pools_positive_requests_onto_outlet() {
        // 沿岸请求 {2,3,1}，出流单元请求 0
        let units = unit_table(3);
        let lake_frac = vec![0.1, 0.1, 0.1, 0.2, 0.0];
        let res_frac = vec![0.0; 5];
        let mut requests = vec![2.0, 3.0, 1.0, 0.0, 9.0];

        let skipped =
            aggregate_riparian_demand(&units, &lake_frac, &res_frac, &mut requests);

        assert_eq!(skipped, 0);
        assert!((requests[3] - 6.0).abs() < 1e-12, "出流单元应承接汇总需求");
        assert!(requests[0].abs() < 1e-12);
        assert!(requests[1].abs() < 1e-12);
        assert!(requests[2].abs() < 1e-12);
        // 非成员单元不受影响
        assert!((requests[4] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_requests_left_in_place() {
        let units = unit_table(3);
        let lake_frac = vec![0.1, 0.1, 0.1, 0.2, 0.0];
        let res_frac = vec![0.0; 5];
        let mut requests = vec![2.0, -1.5, 0.0, 1.0, 0.0];

        aggregate_riparian_demand(&units, &lake_frac, &res_frac, &mut requests);

        assert!((requests[1] - (-1.5)).abs() < 1e-12, "净回流不参与汇集");
        assert!((requests[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_dried_out_unit_skipped() {
        let units = unit_table(3);
        let lake_frac = vec![0.0; 5];
        let res_frac = vec![0.0; 5];
        let mut requests = vec![2.0, 3.0, 1.0, 0.0, 0.0];

        let skipped =
            aggregate_riparian_demand(&units, &lake_frac, &res_frac, &mut requests);

        assert_eq!(skipped, 1);
        // 请求原样保留
        assert!((requests[0] - 2.0).abs() < 1e-12);
        assert!((requests[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fallback_outlet_when_designated_dry() {
        let units = unit_table(3);
        // 指定出流单元 3 面积为零，成员 1 有水库面积
        let lake_frac = vec![0.0; 5];
        let res_frac = vec![0.0, 0.3, 0.0, 0.0, 0.0];
        let mut requests = vec![2.0, 0.5, 1.0, 4.0, 0.0];

        let skipped =
            aggregate_riparian_demand(&units, &lake_frac, &res_frac, &mut requests);

        assert_eq!(skipped, 0);
        // 单元 1 成为记账出流单元: 0.5 + 2 + 1 + 4
        assert!((requests[1] - 7.5).abs() < 1e-12);
        assert!(requests[0].abs() < 1e-12);
        assert!(requests[2].abs() < 1e-12);
        assert!(requests[3].abs() < 1e-12);
    }
}
