// crates/rg_physics/src/waterbody.rs

//! 湖泊/湿地/水库的符号存量平衡与取水
//!
//! 存量为带符号体积，负值表示低于满库参考水位的亏损，
//! 约束 `-Smax <= S <= Smax`（实际含水量 = S + Smax ∈ [0, 2·Smax]）。
//!
//! # 取水契约
//!
//! `abstract_from_waterbody` 把符号存量平移到非负坐标系后与需求
//! 比较：需求放得下就全额供给，否则存量压到 `-Smax`、差额作为
//! 剩余需求返回。恒有 实供 + 剩余 == 需求。
//!
//! # 日平衡
//!
//! 取水之前，每个水体先结算当日的垂向与侧向通量：入流、水面降水、
//! 按当前缩减因子收缩的开阔水面蒸发；湖泊/湿地的出流用存量幂律，
//! 水库的释放量由运行规则给出（见 [`crate::reservoir`]）。

use crate::reduction::reduction_factor;
use crate::types::{AbstractionOutcome, BodyKind};

/// 水体的当日通量输入 [km³/day]
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterBodyFluxes {
    /// 上游来水（河道汇入）
    pub inflow: f64,
    /// 水面降水体积
    pub precipitation: f64,
    /// 潜在开阔水面蒸发体积（未缩减）
    pub potential_evap: f64,
}

/// 从水体取水
///
/// # 参数
/// - `storage`: 带符号存量 [km³]
/// - `max_storage`: 最大存量 [km³]
/// - `area_fraction`: 该水体的原始面积占比
/// - `reduction_exponent`: 面积缩减指数
/// - `kind`: 水体类别
/// - `demand`: 非负的取水需求 [km³/day]
pub fn abstract_from_waterbody(
    storage: f64,
    max_storage: f64,
    area_fraction: f64,
    reduction_exponent: f64,
    kind: BodyKind,
    demand: f64,
) -> AbstractionOutcome {
    let demand = demand.max(0.0);
    if max_storage <= 0.0 {
        // 该单元没有这类水体，需求原样传递
        return AbstractionOutcome {
            new_storage: storage,
            remaining_unsatisfied: demand,
            new_area_fraction: 0.0,
            actual_supplied: 0.0,
        };
    }

    // 平移到非负坐标系后比较
    let available = (storage + max_storage).max(0.0);
    let (new_storage, remaining) = if demand <= available {
        (storage - demand, 0.0)
    } else {
        (-max_storage, demand - available)
    };

    AbstractionOutcome {
        new_storage,
        remaining_unsatisfied: remaining,
        new_area_fraction: reduction_factor(new_storage, max_storage, reduction_exponent, kind)
            * area_fraction,
        actual_supplied: demand - remaining,
    }
}

/// 湖泊/湿地的单日存量平衡
///
/// 返回 `(新存量, 出流量)`。水库不走这条路径（释放量由运行规则
/// 决定，见 [`crate::reservoir::update_reservoir_storage`]）。
///
/// # 参数
/// - `outflow_coefficient`: 存量幂律出流系数 [1/day]
/// - `outflow_exponent`: 存量幂律出流指数
pub fn update_waterbody_storage(
    storage: f64,
    max_storage: f64,
    kind: BodyKind,
    fluxes: WaterBodyFluxes,
    reduction_exponent: f64,
    outflow_coefficient: f64,
    outflow_exponent: f64,
) -> (f64, f64) {
    debug_assert!(!matches!(kind, BodyKind::Reservoir | BodyKind::River));
    if max_storage <= 0.0 {
        // 无水体：来水直接过境
        return (storage, fluxes.inflow);
    }

    // 蒸发按当前缩减因子收缩（干涸水体蒸发面积变小）
    let evap = fluxes.potential_evap
        * reduction_factor(storage, max_storage, reduction_exponent, kind);

    let mut filled = (storage + max_storage).max(0.0);
    filled += fluxes.inflow + fluxes.precipitation - evap;
    filled = filled.max(0.0);

    // 存量幂律出流
    let capacity = 2.0 * max_storage;
    let mut outflow = if filled > 0.0 {
        let ratio = (filled / capacity).min(1.0);
        (outflow_coefficient * filled * ratio.powf(outflow_exponent)).clamp(0.0, filled)
    } else {
        0.0
    };
    filled -= outflow;

    // 超出库容的部分全部溢流
    if filled > capacity {
        outflow += filled - capacity;
        filled = capacity;
    }

    (filled - max_storage, outflow)
}
