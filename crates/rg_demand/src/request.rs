// crates/rg_demand/src/request.rs

//! 净取水请求与未满足需求累计器
//!
//! 净取水 = 取水量 - 回流量，带符号：正值表示净消耗，
//! 负值表示回流多于取水（向水体净补水）。由外部用水协作者
//! 逐日提供，经出流单元汇集与级联分配后部分置零/改写。

use rg_foundation::{RgError, RgResult};
use serde::{Deserialize, Serialize};

/// 单日全网净取水请求
///
/// 两个数组长度都等于单元数；地表水分量会被
/// [`crate::aggregate_riparian_demand`] 与级联改写，地下水分量
/// 会被回流再分配改写。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetAbstraction {
    /// 地表水净取水 [km³/day]
    pub surface: Vec<f64>,
    /// 地下水净取水 [km³/day]
    pub ground: Vec<f64>,
}

impl NetAbstraction {
    /// 全零请求
    pub fn zeros(n_cells: usize) -> Self {
        Self {
            surface: vec![0.0; n_cells],
            ground: vec![0.0; n_cells],
        }
    }

    /// 校验数组长度
    pub fn validate(&self, n_cells: usize) -> RgResult<()> {
        RgError::check_size("net_abstraction.surface", n_cells, self.surface.len())?;
        RgError::check_size("net_abstraction.ground", n_cells, self.ground.len())?;
        Ok(())
    }
}

/// 逐单元的跨日未满足需求累计器
///
/// 整个模拟期间持续累计，仅在显式重初始化时清零。
/// 跨年反馈（地表水短缺压低回流，丰水期再部分恢复）依赖
/// 这些量的持久性。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CellAccumulators {
    /// 灌溉来源的未满足需求累计 [km³]
    pub unsatisfied_from_irrigation: f64,
    /// 其他部门的未满足需求累计 [km³]
    pub unsatisfied_from_other_sectors: f64,
    /// 已削减的地下水回流累计 [km³]
    pub reduced_return_flow: f64,
}

impl CellAccumulators {
    /// 未满足需求总量
    #[inline]
    pub fn total_unsatisfied(&self) -> f64 {
        self.unsatisfied_from_irrigation + self.unsatisfied_from_other_sectors
    }

    /// 显式重初始化（模拟重启时由驱动层调用）
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
