// crates/rg_foundation/src/float.rs

//! 安全浮点运算和数值常量
//!
//! 提供防止除零、负值幂运算等问题的辅助函数，以及用于
//! 长序列累加的 Kahan 求和器。
//!
//! # 设计目标
//!
//! 1. **数值防御**: 边界情况返回调用者指定的兜底值，不产生 NaN/Inf
//! 2. **命名不变量**: 每处截断都有对应的辅助函数，便于测试

use std::fmt;

/// 浮点数相等性比较的默认容差
pub const DEFAULT_EPSILON: f64 = 1e-14;

/// 安全除法的最小分母阈值
pub const SAFE_DIV_EPSILON: f64 = 1e-14;

/// 安全除法
///
/// 分母绝对值低于 [`SAFE_DIV_EPSILON`] 或结果非有限时返回 `fallback`。
#[inline]
pub fn safe_div(a: f64, b: f64, fallback: f64) -> f64 {
    if b.abs() < SAFE_DIV_EPSILON {
        fallback
    } else {
        let result = a / b;
        if result.is_finite() {
            result
        } else {
            fallback
        }
    }
}

/// 安全幂运算
///
/// 底数先截断到非负，结果非有限时返回 0。
#[inline]
pub fn safe_powf(base: f64, exp: f64) -> f64 {
    let v = base.max(0.0).powf(exp);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// 安全平方根
#[inline]
pub fn safe_sqrt(x: f64) -> f64 {
    x.max(0.0).sqrt()
}

/// 限制值到有效范围，非有限值替换为 `fallback`
#[inline]
pub fn clamp_valid(x: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if x.is_finite() {
        x.clamp(min, max)
    } else {
        fallback
    }
}

/// 检查两个值是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

// ============================================================================
// Kahan 求和算法
// ============================================================================

/// Kahan 求和器
///
/// 使用 Kahan 求和算法减少浮点累加误差。用于流域级水量平衡诊断，
/// 其中大量小通量与大存量相加，普通求和会丢失低位精度。
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    /// 累加和
    sum: f64,
    /// 补偿项（低位精度损失）
    compensation: f64,
}

impl KahanSum {
    /// 创建新的 Kahan 求和器
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 重置求和器
    #[inline]
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.compensation = 0.0;
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}

impl fmt::Display for KahanSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sum)
    }
}

// ============================================================================
// 测试
// ============================================================================
