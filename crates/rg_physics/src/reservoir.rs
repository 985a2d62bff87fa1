// crates/rg_physics/src/reservoir.rs

//! 水库运行规则
//!
//! 按蓄满程度调节的日释放量（Hanasaki 型运行规则）：
//!
//! ```text
//! krele = content / (α · capacity)          蓄满系数, α = 0.85
//! provisional = mean_inflow · krele         以长期平均入流为目标
//! c = capacity / (365 · mean_inflow)        相对库容
//! ```
//!
//! 相对库容小（c < 0.5）的水库调节能力弱，释放量向当日入流
//! 加权回退；释放量始终被夹在 `[0, content + inflow]` 内。
//!
//! 投运年份之前的水库按天然湖泊处理（不执行运行规则）。

use crate::reduction::reduction_factor;
use crate::types::BodyKind;
use crate::waterbody::WaterBodyFluxes;

/// 运行规则的蓄满系数分母 α
pub const RELEASE_ALPHA: f64 = 0.85;

/// 相对库容阈值，低于此值释放量向当日入流回退
const CAPACITY_RATIO_FULL_CONTROL: f64 = 0.5;

/// 水库是否已投运
#[inline]
pub fn is_operational(commission_year: Option<i32>, current_year: i32) -> bool {
    match commission_year {
        Some(year) => current_year >= year,
        None => true,
    }
}

/// 运行规则的日释放量 [km³/day]
///
/// # 参数
/// - `storage`: 带符号存量 [km³]
/// - `max_storage`: 最大存量 [km³]（实际库容为 2·max_storage）
/// - `inflow`: 当日入流 [km³/day]
/// - `mean_inflow`: 长期平均入流 [km³/day]（历史强迫预计算）
pub fn reservoir_release(storage: f64, max_storage: f64, inflow: f64, mean_inflow: f64) -> f64 {
    let content = (storage + max_storage).max(0.0);
    let capacity = 2.0 * max_storage;
    if capacity <= 0.0 || mean_inflow <= 0.0 {
        // 无调节能力：来水过境
        return inflow.max(0.0);
    }

    let krele = content / (RELEASE_ALPHA * capacity);
    let provisional = mean_inflow * krele;

    let capacity_ratio = capacity / (365.0 * mean_inflow);
    let release = if capacity_ratio >= CAPACITY_RATIO_FULL_CONTROL {
        provisional
    } else {
        let w = (capacity_ratio / CAPACITY_RATIO_FULL_CONTROL).powi(2);
        w * provisional + (1.0 - w) * inflow.max(0.0)
    };

    release.clamp(0.0, content + inflow.max(0.0))
}

/// 水库的单日存量平衡
///
/// 垂向通量结算后扣除运行规则的释放量，超出库容的部分溢流。
/// 返回 `(新存量, 出流量)`。
pub fn update_reservoir_storage(
    storage: f64,
    max_storage: f64,
    fluxes: WaterBodyFluxes,
    release: f64,
    reduction_exponent: f64,
) -> (f64, f64) {
    if max_storage <= 0.0 {
        return (storage, fluxes.inflow);
    }

    let evap = fluxes.potential_evap
        * reduction_factor(storage, max_storage, reduction_exponent, BodyKind::Reservoir);

    let mut filled = (storage + max_storage).max(0.0);
    filled += fluxes.inflow + fluxes.precipitation - evap;
    filled = filled.max(0.0);

    let mut outflow = release.clamp(0.0, filled);
    filled -= outflow;

    let capacity = 2.0 * max_storage;
    if filled > capacity {
        outflow += filled - capacity;
        filled = capacity;
    }

    (filled - max_storage, outflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_full_large_reservoir_releases_target() {
        // 大库容、满蓄：释放 mean_inflow · 2/(2·α)
        let release = reservoir_release(100.0, 100.0, 0.1, 1.0);
        let expected = 1.0 * 200.0 / (RELEASE_ALPHA * 200.0);
        assert!((release - expected).abs() < EPS);
    }

    #[test]
    fn test_low_storage_conserves_water() {
        // 蓄水越少释放越少
        let high = reservoir_release(50.0, 100.0, 0.1, 1.0);
        let low = reservoir_release(-50.0, 100.0, 0.1, 1.0);
        assert!(low < high, "低蓄水位应收缩释放量");
    }

    #[test]
    fn test_empty_reservoir_releases_nothing_beyond_inflow() {
        let release = reservoir_release(-100.0, 100.0, 0.3, 1.0);
        assert!(release <= 0.3 + EPS);
        assert!(release >= 0.0);
    }

    #[test]
    fn test_small_reservoir_follows_inflow() {
        // 相对库容极小：释放量几乎等于当日入流
        let inflow = 2.0;
        let release = reservoir_release(0.005, 0.005, inflow, 1.0);
        assert!(
            (release - inflow).abs() < 0.05 * inflow,
            "小水库释放 {} 应接近入流 {}",
            release,
            inflow
        );
    }

    #[test]
    fn test_release_bounded_by_available() {
        for &(s, i) in &[(-99.0, 0.0), (0.0, 0.5), (100.0, 10.0)] {
            let release = reservoir_release(s, 100.0, i, 5.0);
            let content = (s + 100.0_f64).max(0.0);
            assert!(release >= 0.0);
            assert!(release <= content + i + EPS);
        }
    }

    #[test]
    fn test_zero_capacity_routes_inflow() {
        let release = reservoir_release(0.0, 0.0, 1.5, 1.0);
        assert!((release - 1.5).abs() < EPS);
    }

    #[test]
    fn test_commissioning() {
        assert!(is_operational(None, 1990));
        assert!(is_operational(Some(1980), 1990));
        assert!(!is_operational(Some(2000), 1990));
    }

    #[test]
    fn test_storage_update_mass_balance() {
        let fluxes = WaterBodyFluxes {
            inflow: 1.0,
            precipitation: 0.2,
            potential_evap: 0.0,
        };
        let s0 = 10.0;
        let (s1, out) = update_reservoir_storage(s0, 50.0, fluxes, 0.8, 2.81);
        assert!((s1 - s0 + out - 1.2).abs() < EPS, "存量增量 + 出流 == 入流 + 降水");
        assert!((out - 0.8).abs() < EPS);
    }

    #[test]
    fn test_storage_update_spills_above_capacity() {
        let fluxes = WaterBodyFluxes {
            inflow: 100.0,
            precipitation: 0.0,
            potential_evap: 0.0,
        };
        let (s1, out) = update_reservoir_storage(4.0, 5.0, fluxes, 0.0, 2.81);
        assert!(s1 <= 5.0 + EPS);
        assert!(out > 0.0, "超出库容的来水必须溢流");
    }

    #[test]
    fn test_storage_update_release_clamped_to_content() {
        let fluxes = WaterBodyFluxes::default();
        let (s1, out) = update_reservoir_storage(-4.5, 5.0, fluxes, 10.0, 2.81);
        assert!((out - 0.5).abs() < EPS, "释放量不能超过实际含水量");
        assert!((s1 - (-5.0)).abs() < EPS);
    }
}
