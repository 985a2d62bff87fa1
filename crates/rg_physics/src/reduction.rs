// crates/rg_physics/src/reduction.rs

//! 干涸面积缩减因子
//!
//! 湖泊/湿地/水库的存量低于满库参考水位时，其有效水面面积
//! 按幂函数收缩：
//!
//! ```text
//! factor = ((S + Smax) / (k · Smax))^exponent,  截断到 [0, 1]
//! ```
//!
//! 其中 k 是类别缩放常数（见 [`BodyKind::reduction_scale`]）。
//! 缩减作用于*有效面积占比*而非存量本身；缩小后的面积占比反馈给
//! 次日的垂向平衡（外部协作者）。

use crate::types::BodyKind;
use rg_foundation::float::safe_powf;

/// 计算面积缩减因子，∈ [0, 1]
///
/// 纯函数：相同输入永远给出相同输出。
///
/// # 截断
///
/// - 河段不缩减，恒为 1
/// - `max_storage <= 0`（该单元无此类水体）时为 0
/// - 存量低于 `-max_storage` 的非法输入按 0 处理
#[inline]
pub fn reduction_factor(storage: f64, max_storage: f64, exponent: f64, kind: BodyKind) -> f64 {
    if !kind.is_reduced() {
        return 1.0;
    }
    if max_storage <= 0.0 {
        return 0.0;
    }
    let filled = (storage + max_storage).max(0.0);
    let ratio = filled / (kind.reduction_scale() * max_storage);
    safe_powf(ratio, exponent).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXP_LOCAL: f64 = 3.32;
    const EXP_GLOBAL: f64 = 2.81;

    #[test]
    fn test_river_never_reduced() {
        assert!((reduction_factor(-5.0, 10.0, EXP_LOCAL, BodyKind::River) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_local_lake_is_one() {
        // S = Smax 时 (S+Smax)/(2·Smax) = 1
        let f = reduction_factor(10.0, 10.0, EXP_LOCAL, BodyKind::LocalLake);
        assert!((f - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_local_lake_is_zero() {
        let f = reduction_factor(-10.0, 10.0, EXP_LOCAL, BodyKind::LocalLake);
        assert!(f.abs() < 1e-12);
    }

    #[test]
    fn test_half_depleted_wetland() {
        // S = 0: 比值 0.5, 因子 0.5^3.32
        let f = reduction_factor(0.0, 10.0, EXP_LOCAL, BodyKind::Wetland);
        let expected = 0.5_f64.powf(EXP_LOCAL);
        assert!((f - expected).abs() < 1e-12);
    }

    #[test]
    fn test_global_lake_gentler_scale() {
        // 全球湖泊用 k=4.404，同等亏损下因子更小但非零
        let f = reduction_factor(0.0, 10.0, EXP_GLOBAL, BodyKind::GlobalLake);
        let expected = (10.0_f64 / (4.404 * 10.0)).powf(EXP_GLOBAL);
        assert!((f - expected).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_to_unit_interval() {
        // 全满的全球湖泊比值 < 1，不会越界；人为放大的存量被截断到 1
        let f = reduction_factor(100.0, 10.0, EXP_GLOBAL, BodyKind::GlobalLake);
        assert!(f <= 1.0);
        let g = reduction_factor(-100.0, 10.0, EXP_GLOBAL, BodyKind::GlobalLake);
        assert!(g >= 0.0);
    }

    #[test]
    fn test_no_waterbody_means_zero() {
        assert!(reduction_factor(0.0, 0.0, EXP_LOCAL, BodyKind::LocalLake).abs() < 1e-12);
        assert!(reduction_factor(0.0, -1.0, EXP_LOCAL, BodyKind::LocalLake).abs() < 1e-12);
    }

    #[test]
    fn test_idempotent_pure_function() {
        let a = reduction_factor(-3.0, 8.0, EXP_LOCAL, BodyKind::LocalLake);
        let b = reduction_factor(-3.0, 8.0, EXP_LOCAL, BodyKind::LocalLake);
        assert_eq!(a, b, "纯函数两次调用结果必须逐位相同");
    }

    #[test]
    fn test_monotone_in_storage() {
        let mut prev = 0.0;
        for i in 0..=20 {
            let s = -10.0 + i as f64;
            let f = reduction_factor(s, 10.0, EXP_LOCAL, BodyKind::LocalLake);
            assert!(f + 1e-15 >= prev, "因子应随存量单调不减");
            prev = f;
        }
    }
}
