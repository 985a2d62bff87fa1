// crates/rg_physics/src/types.rs

//! 水体类别与平衡结果类型
//!
//! 河段与四类蓄水体共享同一套平衡契约（输入/输出结构），
//! 行为差异通过 [`BodyKind`] 的封闭变体集表达，而非继承。

use serde::{Deserialize, Serialize};

/// 地表水体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// 河段
    River,
    /// 地方湖泊（单元内封闭）
    LocalLake,
    /// 全球湖泊（跨单元共享）
    GlobalLake,
    /// 湿地
    Wetland,
    /// 调节水库
    Reservoir,
}

impl BodyKind {
    /// 面积缩减公式的类别缩放常数 k
    ///
    /// 因子 = ((S + Smax) / (k·Smax))^指数。地方湖泊与湿地在
    /// S = Smax 时恰好取满刻度 (k=2)；全球湖泊与水库的缩减
    /// 更平缓 (k=4.404)。河段不缩减。
    #[inline]
    pub fn reduction_scale(self) -> f64 {
        match self {
            BodyKind::River => 1.0,
            BodyKind::LocalLake | BodyKind::Wetland => 2.0,
            BodyKind::GlobalLake | BodyKind::Reservoir => 4.404,
        }
    }

    /// 该类水体是否参与面积缩减
    #[inline]
    pub fn is_reduced(self) -> bool {
        !matches!(self, BodyKind::River)
    }

    /// 是否为跨单元共享对象（取水需先汇集到出流单元）
    #[inline]
    pub fn is_shared(self) -> bool {
        matches!(self, BodyKind::GlobalLake | BodyKind::Reservoir)
    }
}

/// 一次水体取水调用的结果
///
/// 不变量: `actual_supplied + remaining_unsatisfied == 原始需求`，
/// 且新存量不低于 `-max_storage`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbstractionOutcome {
    /// 取水后的存量 [km³]
    pub new_storage: f64,
    /// 未满足的剩余需求 [km³/day]
    pub remaining_unsatisfied: f64,
    /// 缩减后的有效面积占比
    pub new_area_fraction: f64,
    /// 实际供给量 [km³/day]
    pub actual_supplied: f64,
}

/// 河段单日演算结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiverStepResult {
    /// 日末河段存量 [km³]
    pub new_storage: f64,
    /// 输出到下游的流量 [km³/day]（已乘测站修正系数）
    pub streamflow: f64,
    /// 实际供给的取水量 [km³/day]
    pub actual_supplied: f64,
    /// 未满足的剩余取水需求 [km³/day]
    pub remaining_unsatisfied: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_scale_by_kind() {
        assert!((BodyKind::LocalLake.reduction_scale() - 2.0).abs() < 1e-12);
        assert!((BodyKind::Wetland.reduction_scale() - 2.0).abs() < 1e-12);
        assert!((BodyKind::GlobalLake.reduction_scale() - 4.404).abs() < 1e-12);
        assert!((BodyKind::Reservoir.reduction_scale() - 4.404).abs() < 1e-12);
    }

    #[test]
    fn test_river_is_never_reduced() {
        assert!(!BodyKind::River.is_reduced());
        assert!(BodyKind::Wetland.is_reduced());
    }

    #[test]
    fn test_shared_kinds() {
        assert!(BodyKind::GlobalLake.is_shared());
        assert!(BodyKind::Reservoir.is_shared());
        assert!(!BodyKind::LocalLake.is_shared());
    }

    #[test]
    fn test_body_kind_serde() {
        let json = serde_json::to_string(&BodyKind::LocalLake).unwrap();
        assert_eq!(json, "\"local_lake\"");
    }
}
