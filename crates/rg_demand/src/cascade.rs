// crates/rg_demand/src/cascade.rs

//! 需求满足级联
//!
//! 每个单元按拓扑序依次尝试满足地表水净取水需求：
//!
//! 1. 河段存量（由驱动层结合当日汇流调用，见 rg_sim）
//! 2. 地方湖泊 -> 湿地（本模块 [`satisfy_surface_demand`]）
//! 3. 全球湖泊 -> 水库（汇集后的需求已落在出流单元上）
//!
//! 每一级守恒：实供 + 剩余 == 进入该级的需求。最终剩余计入
//! 跨日累计器，并触发地下水回流再分配。
//!
//! # 地下水回流再分配
//!
//! 灌溉部门的地下水净需求存在剩余 r 时：
//!
//! - `r > ε`: 按比例削减当日地表灌溉取水，相应的回流减量
//!   累计到 `reduced_return_flow`，地下水净需求增加同量
//! - `r < -ε`: 把以往削减的回流按 盈余/累计未满足灌溉需求 的
//!   比例重新引入（比例下限 -1），地下水净需求相应改写
//! - `|r| <= ε`: 浮点噪声，原样透传

use crate::request::CellAccumulators;
use rg_foundation::float::{safe_div, SAFE_DIV_EPSILON};
use rg_physics::types::BodyKind;
use rg_physics::waterbody::abstract_from_waterbody;

/// 级联中一个水体槽位的可变视图
#[derive(Debug)]
pub struct BodyState<'a> {
    /// 带符号存量 [km³]
    pub storage: &'a mut f64,
    /// 最大存量 [km³]
    pub max_storage: f64,
    /// 静态面积占比（缩减的基准）
    pub base_fraction: f64,
    /// 当日有效面积占比（缩减结果写回这里）
    pub current_fraction: &'a mut f64,
}

/// 地表蓄水体级联的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSupplyReport {
    /// 四类蓄水体合计供给量 [km³/day]
    pub supplied: f64,
    /// 级联结束后的剩余需求 [km³/day]
    pub remaining: f64,
}

/// 从一个水体槽位扣减需求，返回剩余需求
fn draw_from_body(demand: f64, body: BodyState<'_>, exponent: f64, kind: BodyKind) -> f64 {
    let outcome = abstract_from_waterbody(
        *body.storage,
        body.max_storage,
        body.base_fraction,
        exponent,
        kind,
        demand,
    );
    *body.storage = outcome.new_storage;
    if body.max_storage > 0.0 {
        *body.current_fraction = outcome.new_area_fraction;
    }
    outcome.remaining_unsatisfied
}

/// 依次从地方湖泊、湿地、全球湖泊、水库满足剩余需求
///
/// 河段已由驱动层先行扣减；传入的 `demand` 是河段之后的剩余。
/// 共享水体（全球湖泊/水库）的需求此前已由
/// [`crate::aggregate_riparian_demand`] 汇集到出流单元，
/// 非出流单元的对应槽位 `max_storage` 为 0，自动跳过。
#[allow(clippy::too_many_arguments)]
pub fn satisfy_surface_demand(
    demand: f64,
    local_lake: BodyState<'_>,
    wetland: BodyState<'_>,
    global_lake: BodyState<'_>,
    reservoir: BodyState<'_>,
    local_exponent: f64,
    global_exponent: f64,
) -> SurfaceSupplyReport {
    let demand = demand.max(0.0);
    let mut remaining = demand;
    remaining = draw_from_body(remaining, local_lake, local_exponent, BodyKind::LocalLake);
    remaining = draw_from_body(remaining, wetland, local_exponent, BodyKind::Wetland);
    remaining = draw_from_body(remaining, global_lake, global_exponent, BodyKind::GlobalLake);
    remaining = draw_from_body(remaining, reservoir, global_exponent, BodyKind::Reservoir);

    SurfaceSupplyReport {
        supplied: demand - remaining,
        remaining,
    }
}

// ============================================================================
// 地下水回流再分配
// ============================================================================

/// 回流再分配的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundwaterRealloc {
    /// 改写后的地下水净需求 [km³/day]
    pub net_groundwater: f64,
    /// 回流量的带符号变化 [km³/day]（负值 = 回流减少）
    pub return_flow_change: f64,
    /// 改写后的当日地表灌溉取水量 [km³/day]
    pub revised_withdrawal: f64,
}

/// 灌溉地下水需求剩余的再分配
///
/// # 参数
/// - `remaining_from_irrigation`: 当日灌溉需求剩余 r（负值 = 盈余）
/// - `net_groundwater`: 当日地下水净需求 NAg
/// - `irrigation_withdrawal`: 当日地表灌溉取水量 W
/// - `consumptive_use`: 当日灌溉耗水量 CU
/// - `return_fraction`: 非耗水部分回流的比例
/// - `acc`: 该单元的跨日累计器（原位更新）
/// - `epsilon`: 浮点噪声容差
pub fn reallocate_groundwater(
    remaining_from_irrigation: f64,
    net_groundwater: f64,
    irrigation_withdrawal: f64,
    consumptive_use: f64,
    return_fraction: f64,
    acc: &mut CellAccumulators,
    epsilon: f64,
) -> GroundwaterRealloc {
    let r = remaining_from_irrigation;

    if r > epsilon {
        return reduce_return_flow(
            r,
            net_groundwater,
            irrigation_withdrawal,
            consumptive_use,
            return_fraction,
            acc,
        );
    }

    if r < -epsilon {
        // 盈余：尝试按比例重新引入以往削减的回流
        if acc.reduced_return_flow > 0.0 && acc.unsatisfied_from_irrigation > 0.0 {
            let ratio = (r / acc.unsatisfied_from_irrigation).max(-1.0);
            let change = ratio * acc.reduced_return_flow;
            acc.reduced_return_flow = (acc.reduced_return_flow + change).max(0.0);
            acc.unsatisfied_from_irrigation = (acc.unsatisfied_from_irrigation + r).max(0.0);
            return GroundwaterRealloc {
                net_groundwater: net_groundwater - change,
                return_flow_change: change,
                revised_withdrawal: irrigation_withdrawal,
            };
        }
        // 没有以往削减可恢复：浮点噪声级盈余，无效果
        return GroundwaterRealloc {
            net_groundwater,
            return_flow_change: 0.0,
            revised_withdrawal: irrigation_withdrawal,
        };
    }

    // |r| <= ε: 原样透传
    GroundwaterRealloc {
        net_groundwater,
        return_flow_change: 0.0,
        revised_withdrawal: irrigation_withdrawal,
    }
}

/// r > ε 分支：削减地表灌溉取水并压低回流
fn reduce_return_flow(
    r: f64,
    net_groundwater: f64,
    withdrawal: f64,
    consumptive_use: f64,
    return_fraction: f64,
    acc: &mut CellAccumulators,
) -> GroundwaterRealloc {
    // 净需求换算系数：净取水 = 取水 × factor
    let eff = safe_div(consumptive_use, withdrawal, 0.0).clamp(0.0, 1.0);
    let factor = 1.0 - (1.0 - return_fraction) * (1.0 - eff);

    if withdrawal <= 0.0 || factor < SAFE_DIV_EPSILON {
        // 当日没有可削减的地表灌溉取水，全部记为灌溉未满足
        acc.unsatisfied_from_irrigation += r;
        return GroundwaterRealloc {
            net_groundwater,
            return_flow_change: 0.0,
            revised_withdrawal: withdrawal,
        };
    }

    let revised = (withdrawal * factor - r) / factor;
    let revised = if revised < 0.0 {
        // 取水清零也不够：清零能抵扣 W·factor，差额归其他部门
        let covered = withdrawal * factor;
        acc.unsatisfied_from_irrigation += covered;
        acc.unsatisfied_from_other_sectors += r - covered;
        0.0
    } else {
        acc.unsatisfied_from_irrigation += r;
        revised
    };

    // 取水削减对应的回流减量
    let delta_withdrawal = withdrawal - revised;
    let return_flow_change = -delta_withdrawal * (1.0 - eff) * return_fraction;
    acc.reduced_return_flow += -return_flow_change;

    GroundwaterRealloc {
        net_groundwater: net_groundwater - return_flow_change,
        return_flow_change,
        revised_withdrawal: revised,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS_TEST: f64 = 1e-10;
    const EPSILON: f64 = 1e-12;

    fn body<'a>(
        storage: &'a mut f64,
        max: f64,
        base_frac: f64,
        current: &'a mut f64,
    ) -> BodyState<'a> {
        BodyState {
            storage,
            max_storage: max,
            base_fraction: base_frac,
            current_fraction: current,
        }
    }

    #[test]
    fn test_cascade_order_local_lake_first() {
        let (mut ll, mut wl, mut gl, mut rs) = (2.0, 2.0, 2.0, 2.0);
        let (mut fll, mut fwl, mut fgl, mut frs) = (0.1, 0.1, 0.1, 0.1);

        // 需求 1 应只动地方湖泊
        let report = satisfy_surface_demand(
            1.0,
            body(&mut ll, 2.0, 0.1, &mut fll),
            body(&mut wl, 2.0, 0.1, &mut fwl),
            body(&mut gl, 2.0, 0.1, &mut fgl),
            body(&mut rs, 2.0, 0.1, &mut frs),
            3.32,
            2.81,
        );
        assert!((report.supplied - 1.0).abs() < EPS_TEST);
        assert!(report.remaining.abs() < EPS_TEST);
        assert!((ll - 1.0).abs() < EPS_TEST, "地方湖泊先被扣减");
        assert!((wl - 2.0).abs() < EPS_TEST, "湿地不应被触及");
        assert!((gl - 2.0).abs() < EPS_TEST);
        assert!((rs - 2.0).abs() < EPS_TEST);
    }

    #[test]
    fn test_cascade_spills_to_next_level() {
        let (mut ll, mut wl, mut gl, mut rs) = (-1.0, 0.0, 2.0, 2.0);
        let (mut fll, mut fwl, mut fgl, mut frs) = (0.1, 0.1, 0.1, 0.1);

        // 地方湖泊可用 1，湿地可用 2，需求 4 -> 全球湖泊补 1
        let report = satisfy_surface_demand(
            4.0,
            body(&mut ll, 2.0, 0.1, &mut fll),
            body(&mut wl, 2.0, 0.1, &mut fwl),
            body(&mut gl, 2.0, 0.1, &mut fgl),
            body(&mut rs, 2.0, 0.1, &mut frs),
            3.32,
            2.81,
        );
        assert!(report.remaining.abs() < EPS_TEST);
        assert!((ll - (-2.0)).abs() < EPS_TEST);
        assert!((wl - (-2.0)).abs() < EPS_TEST);
        assert!((gl - 1.0).abs() < EPS_TEST);
        assert!((rs - 2.0).abs() < EPS_TEST, "水库最后才动");
    }

    #[test]
    fn test_cascade_conservation_under_shortage() {
        let (mut ll, mut wl, mut gl, mut rs) = (-1.5, -1.5, 0.0, 0.0);
        let (mut fll, mut fwl, mut fgl, mut frs) = (0.1, 0.1, 0.0, 0.0);

        let report = satisfy_surface_demand(
            10.0,
            body(&mut ll, 2.0, 0.1, &mut fll),
            body(&mut wl, 2.0, 0.1, &mut fwl),
            body(&mut gl, 0.0, 0.0, &mut fgl),
            body(&mut rs, 0.0, 0.0, &mut frs),
            3.32,
            2.81,
        );
        assert!(
            (report.supplied + report.remaining - 10.0).abs() < EPS_TEST,
            "级联整体守恒"
        );
        assert!((report.supplied - 1.0).abs() < EPS_TEST);
    }

    #[test]
    fn test_reintroduction_scenario() {
        // r=-3, 累计未满足灌溉 10, 累计削减回流 4
        let mut acc = CellAccumulators {
            unsatisfied_from_irrigation: 10.0,
            unsatisfied_from_other_sectors: 0.0,
            reduced_return_flow: 4.0,
        };
        let out = reallocate_groundwater(-3.0, 5.0, 0.0, 0.0, 0.8, &mut acc, EPSILON);

        // 比例 -0.3, 回流变化 -1.2, NAg' = 5 - (-1.2)
        assert!((out.return_flow_change - (-1.2)).abs() < EPS_TEST);
        assert!((out.net_groundwater - 6.2).abs() < EPS_TEST);
        assert!((acc.reduced_return_flow - 2.8).abs() < EPS_TEST);
        assert!((acc.unsatisfied_from_irrigation - 7.0).abs() < EPS_TEST);
    }

    #[test]
    fn test_reintroduction_ratio_clamped() {
        // 盈余超过累计未满足：比例夹在 -1
        let mut acc = CellAccumulators {
            unsatisfied_from_irrigation: 2.0,
            unsatisfied_from_other_sectors: 0.0,
            reduced_return_flow: 1.0,
        };
        let out = reallocate_groundwater(-50.0, 0.0, 0.0, 0.0, 0.8, &mut acc, EPSILON);
        assert!((out.return_flow_change - (-1.0)).abs() < EPS_TEST);
        assert!(acc.reduced_return_flow.abs() < EPS_TEST);
        assert!(acc.unsatisfied_from_irrigation.abs() < EPS_TEST);
    }

    #[test]
    fn test_surplus_without_prior_reduction_is_noop() {
        let mut acc = CellAccumulators::default();
        let out = reallocate_groundwater(-3.0, 5.0, 1.0, 0.5, 0.8, &mut acc, EPSILON);
        assert!((out.net_groundwater - 5.0).abs() < EPS_TEST);
        assert!(out.return_flow_change.abs() < EPS_TEST);
        assert_eq!(acc, CellAccumulators::default());
    }

    #[test]
    fn test_noise_passthrough() {
        let mut acc = CellAccumulators::default();
        let out = reallocate_groundwater(1e-15, 5.0, 1.0, 0.5, 0.8, &mut acc, EPSILON);
        assert!((out.net_groundwater - 5.0).abs() < EPS_TEST);
        assert_eq!(acc, CellAccumulators::default());
    }

    #[test]
    fn test_reduction_branch_cuts_withdrawal() {
        // W=10, CU=4 -> eff=0.4, rf=0.5 -> factor = 1-0.5*0.6 = 0.7
        let mut acc = CellAccumulators::default();
        let out = reallocate_groundwater(1.4, 2.0, 10.0, 4.0, 0.5, &mut acc, EPSILON);

        // W' = (10*0.7 - 1.4)/0.7 = 8, ΔW = 2
        assert!((out.revised_withdrawal - 8.0).abs() < EPS_TEST);
        // 回流变化 = -ΔW·(1-eff)·rf = -2·0.6·0.5 = -0.6
        assert!((out.return_flow_change - (-0.6)).abs() < EPS_TEST);
        // NAg' = 2 - (-0.6) = 2.6
        assert!((out.net_groundwater - 2.6).abs() < EPS_TEST);
        assert!((acc.reduced_return_flow - 0.6).abs() < EPS_TEST);
        assert!((acc.unsatisfied_from_irrigation - 1.4).abs() < EPS_TEST);
        assert!(acc.unsatisfied_from_other_sectors.abs() < EPS_TEST);
    }

    #[test]
    fn test_reduction_branch_withdrawal_floored_at_zero() {
        // r 超过 W·factor：取水清零，差额归其他部门
        let mut acc = CellAccumulators::default();
        let out = reallocate_groundwater(10.0, 0.0, 5.0, 2.0, 0.5, &mut acc, EPSILON);

        // factor = 1 - 0.5·0.6 = 0.7, W·factor = 3.5
        assert!(out.revised_withdrawal.abs() < EPS_TEST);
        assert!((acc.unsatisfied_from_irrigation - 3.5).abs() < EPS_TEST);
        assert!((acc.unsatisfied_from_other_sectors - 6.5).abs() < EPS_TEST);
        // 回流减量 = 5·0.6·0.5 = 1.5
        assert!((out.return_flow_change - (-1.5)).abs() < EPS_TEST);
        assert!((out.net_groundwater - 1.5).abs() < EPS_TEST);
    }

    #[test]
    fn test_reduction_branch_without_withdrawal() {
        let mut acc = CellAccumulators::default();
        let out = reallocate_groundwater(2.0, 1.0, 0.0, 0.0, 0.5, &mut acc, EPSILON);
        assert!((out.net_groundwater - 1.0).abs() < EPS_TEST);
        assert!((acc.unsatisfied_from_irrigation - 2.0).abs() < EPS_TEST);
        assert!(acc.reduced_return_flow.abs() < EPS_TEST);
    }

    #[test]
    fn test_feedback_roundtrip() {
        // 先削减后盈余：恢复量不超过削减量
        let mut acc = CellAccumulators::default();
        let cut = reallocate_groundwater(1.4, 2.0, 10.0, 4.0, 0.5, &mut acc, EPSILON);
        let reduced = acc.reduced_return_flow;
        assert!(reduced > 0.0);

        let restore =
            reallocate_groundwater(-1.4, cut.net_groundwater, 0.0, 0.0, 0.5, &mut acc, EPSILON);
        assert!(restore.return_flow_change <= 0.0);
        assert!(restore.return_flow_change.abs() <= reduced + EPS_TEST);
        assert!(acc.reduced_return_flow >= 0.0);
    }
}
