// crates/rg_foundation/src/constants.rs

//! 水文常量
//!
//! 单位换算系数与数值下限。内部计算统一使用 km³/day（体积）
//! 和 km/day（流速），输出层再换算到 m³/s。

/// 河道流速下限 [km/day]
///
/// 流速参与 `outflow_constant = velocity / river_length` 的除法，
/// 下限防止下游计算出现除零放大。
pub const MIN_RIVER_VELOCITY: f64 = 1e-5;

/// 每天的秒数
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// km³/day 换算到 m³/s 的系数
pub const KM3_PER_DAY_TO_M3_PER_S: f64 = 1.0e9 / SECONDS_PER_DAY;

/// m/s 换算到 km/day 的系数
pub const M_PER_S_TO_KM_PER_DAY: f64 = SECONDS_PER_DAY / 1000.0;

/// mm 水深 × km² 面积换算到 km³ 体积的系数
pub const MM_KM2_TO_KM3: f64 = 1.0e-6;

/// 需求分配的通用容差 [km³/day]
///
/// 低于该值的剩余需求视为浮点噪声，直接透传。
pub const DEMAND_EPSILON: f64 = 1e-12;
