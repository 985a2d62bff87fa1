// crates/rg_physics/src/river.rs

//! 河段存量的单日闭式演算
//!
//! 单日质量平衡 `dS/dt = I - k·S - A`（入流 I、流出常数 k、取水 A
//! 在一天内视为分段常数），用指数衰减的解析解推进，不做数值积分：
//!
//! ```text
//! S(t+1) = S·e^(-k) + ((I - A)/k)·(1 - e^(-k))
//! ```
//!
//! # 取水分支
//!
//! 令 S(t+1) = 0 反解出解析解当日可供给的最大取水量
//!
//! ```text
//! A_max = I + k·S·e^(-k) / (1 - e^(-k))
//! ```
//!
//! - `A <= A_max`: 需求全部满足，按闭式解更新存量
//! - 否则: 存量压到 0，实供 A_max，剩余需求按 `A_max / A` 比例缩减
//!
//! 出流量下限 0，并乘以测站校准修正系数。

use crate::types::RiverStepResult;

/// k 低于该值时按"无流出河道"的极限形式处理
///
/// 防止 (1 - e^(-k))/k 在 k -> 0 时的 0/0。
const K_DEGENERATE: f64 = 1e-12;

/// 河段单日演算
///
/// # 参数
/// - `storage`: 日初河段存量 [km³]
/// - `inflow`: 当日上游入流 + 本地产流 [km³/day]
/// - `outflow_constant`: k = 流速/河长 [1/day]
/// - `abstraction`: 请求的地表水净取水量 [km³/day]（非负）
/// - `correction_factor`: 测站校准修正系数（无测站时为 1）
pub fn route_river_day(
    storage: f64,
    inflow: f64,
    outflow_constant: f64,
    abstraction: f64,
    correction_factor: f64,
) -> RiverStepResult {
    let storage = storage.max(0.0);
    let demand = abstraction.max(0.0);
    let k = outflow_constant.max(0.0);

    let (decay, growth) = if k < K_DEGENERATE {
        (1.0, 0.0)
    } else {
        ((-k).exp(), -(-k).exp_m1())
    };

    // A_max: 令闭式解的日末存量为 0 反解
    let storage_coeff = if k < K_DEGENERATE {
        // lim k->0: k·e^(-k)/(1-e^(-k)) = 1
        1.0
    } else {
        k * decay / growth
    };
    let abstraction_max = inflow + storage * storage_coeff;

    let (new_storage, raw_streamflow, actual, remaining) = if demand <= abstraction_max {
        let new_storage = if k < K_DEGENERATE {
            storage + inflow - demand
        } else {
            storage * decay + (inflow - demand) / k * growth
        };
        let new_storage = new_storage.max(0.0);
        let streamflow = inflow + storage - new_storage - demand;
        (new_storage, streamflow, demand, 0.0)
    } else {
        let streamflow = inflow + storage - abstraction_max;
        (0.0, streamflow, abstraction_max, demand - abstraction_max)
    };

    RiverStepResult {
        new_storage,
        streamflow: raw_streamflow.max(0.0) * correction_factor,
        actual_supplied: actual,
        remaining_unsatisfied: remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn test_no_abstraction_closed_form() {
        // S=10, I=5, k=0.5, A=0
        let r = route_river_day(10.0, 5.0, 0.5, 0.0, 1.0);
        let decay = (-0.5_f64).exp();
        let expected = 10.0 * decay + (5.0 / 0.5) * (1.0 - decay);
        assert!((r.new_storage - expected).abs() < EPS);
        let expected_flow = 5.0 + 10.0 - expected;
        assert!((r.streamflow - expected_flow).abs() < EPS);
        assert!(r.remaining_unsatisfied.abs() < EPS);
    }

    #[test]
    fn test_satisfiable_abstraction_conserves_demand() {
        let r = route_river_day(10.0, 5.0, 0.5, 2.0, 1.0);
        assert!((r.actual_supplied + r.remaining_unsatisfied - 2.0).abs() < EPS);
        assert!(r.remaining_unsatisfied.abs() < EPS);
        assert!(r.new_storage >= 0.0);
    }

    #[test]
    fn test_excess_abstraction_drains_storage() {
        // 需求远超可供量
        let r = route_river_day(1.0, 0.5, 0.5, 100.0, 1.0);
        assert!(r.new_storage.abs() < EPS, "存量应被压到 0");
        assert!(r.remaining_unsatisfied > 0.0);
        assert!((r.actual_supplied + r.remaining_unsatisfied - 100.0).abs() < EPS);
        assert!(r.streamflow >= 0.0);
    }

    #[test]
    fn test_abstraction_max_never_exceeds_available() {
        // A_max <= I + S 恒成立（k·e^(-k) <= 1 - e^(-k)）
        for &k in &[0.01, 0.5, 1.0, 5.0, 50.0] {
            let r = route_river_day(3.0, 2.0, k, 1e9, 1.0);
            assert!(r.actual_supplied <= 3.0 + 2.0 + EPS, "k={}", k);
        }
    }

    #[test]
    fn test_degenerate_outflow_constant() {
        // k = 0: 无流出，存量只随入流/取水变化
        let r = route_river_day(4.0, 1.0, 0.0, 2.0, 1.0);
        assert!((r.new_storage - 3.0).abs() < EPS);
        assert!(r.streamflow.abs() < EPS);
        assert!(r.remaining_unsatisfied.abs() < EPS);

        // k = 0 且需求超过 I + S
        let r = route_river_day(4.0, 1.0, 0.0, 8.0, 1.0);
        assert!((r.actual_supplied - 5.0).abs() < EPS);
        assert!((r.remaining_unsatisfied - 3.0).abs() < EPS);
    }

    #[test]
    fn test_streamflow_never_negative() {
        for &(s, i, k, a) in &[
            (0.0, 0.0, 0.5, 0.0),
            (1e-15, 0.0, 10.0, 1.0),
            (5.0, 0.0, 100.0, 0.0),
        ] {
            let r = route_river_day(s, i, k, a, 1.0);
            assert!(r.streamflow >= 0.0, "s={} i={} k={} a={}", s, i, k, a);
            assert!(r.new_storage >= 0.0);
        }
    }

    #[test]
    fn test_station_correction_applied() {
        let base = route_river_day(10.0, 5.0, 0.5, 0.0, 1.0);
        let corrected = route_river_day(10.0, 5.0, 0.5, 0.0, 1.3);
        assert!((corrected.streamflow - base.streamflow * 1.3).abs() < EPS);
        // 修正只作用于出流量，不影响存量
        assert!((corrected.new_storage - base.new_storage).abs() < EPS);
    }

    #[test]
    fn test_larger_demand_supplies_no_less() {
        // 实供量随需求单调不减
        let mut prev = 0.0;
        for i in 0..20 {
            let demand = i as f64 * 0.5;
            let r = route_river_day(2.0, 1.0, 0.8, demand, 1.0);
            assert!(r.actual_supplied + EPS >= prev);
            prev = r.actual_supplied;
        }
    }
}
