// crates/rg_physics/src/channel.rs

//! 梯形断面河道水力学
//!
//! 由河段存量推算流速（Manning–Strickler）：
//!
//! ```text
//! F = S / L                        断面面积（存量摊到河长）
//! F = b·h + 2·h²                   梯形断面（边坡 2:1）
//! h = -b/4 + sqrt(b²/16 + F/2)     闭式求解水深
//! P = b + 2·h·√5                   湿周
//! R = F / P                        水力半径
//! v = (1/n) · R^(2/3) · √slope     Manning–Strickler
//! ```
//!
//! 流速有下限 [`MIN_RIVER_VELOCITY`]，防止
//! `outflow_constant = v / L` 在下游引发除法放大。

use rg_foundation::constants::{MIN_RIVER_VELOCITY, M_PER_S_TO_KM_PER_DAY};
use rg_foundation::float::{safe_div, safe_sqrt};

/// 梯形断面的边坡系数（水平 : 垂直 = 2 : 1）
const SIDE_SLOPE: f64 = 2.0;

/// 由断面面积闭式求解水深 [m]
///
/// 求解 `2·h² + b·h - F = 0` 的正根。
#[inline]
pub fn water_depth(cross_section: f64, bottom_width: f64) -> f64 {
    if cross_section <= 0.0 {
        return 0.0;
    }
    let b = bottom_width.max(0.0);
    -b / (2.0 * SIDE_SLOPE) + safe_sqrt(b * b / (4.0 * SIDE_SLOPE * SIDE_SLOPE) + cross_section / SIDE_SLOPE)
}

/// 由河段存量计算流速 [km/day]
///
/// # 参数
/// - `storage`: 河段存量 [km³]
/// - `river_length`: 河段长度 [km]
/// - `bottom_width`: 河底宽度 [m]
/// - `slope`: 河床比降 [-]
/// - `roughness`: Manning 糙率 n
pub fn flow_velocity(
    storage: f64,
    river_length: f64,
    bottom_width: f64,
    slope: f64,
    roughness: f64,
) -> f64 {
    if storage <= 0.0 || river_length <= 0.0 {
        return MIN_RIVER_VELOCITY;
    }

    // km³ / km = km²，换算到 m²
    let cross_section = storage / river_length * 1.0e6;
    let depth = water_depth(cross_section, bottom_width);
    if depth <= 0.0 {
        return MIN_RIVER_VELOCITY;
    }

    let wetted_perimeter = bottom_width + 2.0 * depth * 5.0_f64.sqrt();
    let hydraulic_radius = safe_div(cross_section, wetted_perimeter, 0.0);

    let v_ms = safe_div(1.0, roughness, 0.0) * hydraulic_radius.powf(2.0 / 3.0) * safe_sqrt(slope);
    (v_ms * M_PER_S_TO_KM_PER_DAY).max(MIN_RIVER_VELOCITY)
}

/// 流出常数 k = v / L [1/day]
///
/// 河长非法时返回 0，由河段平衡的极限分支兜底。
#[inline]
pub fn outflow_constant(velocity: f64, river_length: f64) -> f64 {
    safe_div(velocity, river_length, 0.0).max(0.0)
}
