// crates/rg_network/src/upstream.rs

//! 上游贡献集与测站集水区
//!
//! 给定种子单元（如校准测站所在单元），沿逆向汇流边反复扩张，
//! 直到不再有新单元加入（不动点迭代；图无环且有限，必然终止）。
//!
//! 嵌套测站场景下，测站 i 的集水区需剔除已被更靠前测站 j < i
//! 认领的单元，避免重复统计共享的集水面积。

use crate::drainage::DrainageNetwork;
use rg_foundation::indices::CellIndex;

/// 种子单元的完整上游贡献集（含种子自身）
///
/// 逆向边不动点迭代：每一轮把当前集合中所有单元的直接上游并入，
/// 集合不再增长时停止。
pub fn upstream_set(net: &DrainageNetwork, seed: CellIndex) -> Vec<CellIndex> {
    let n = net.n_cells();
    let mut member = vec![false; n];
    member[seed.get()] = true;
    let mut result = vec![seed];

    let mut grew = true;
    while grew {
        grew = false;
        let snapshot_len = result.len();
        for idx in 0..snapshot_len {
            let c = result[idx];
            for &up in net.direct_upstream(c) {
                if !member[up.get()] {
                    member[up.get()] = true;
                    result.push(up);
                    grew = true;
                }
            }
        }
    }
    result.sort_unstable();
    result
}

/// 测站集水区（去重版）
///
/// 对每个测站独立计算完整上游集，然后按测站给定顺序，
/// 把已被更靠前测站认领的单元从后续测站的集水区中剔除。
/// 返回与 `stations` 等长的集水区列表。
pub fn station_catchments(
    net: &DrainageNetwork,
    stations: &[CellIndex],
) -> Vec<Vec<CellIndex>> {
    let n = net.n_cells();
    let mut claimed = vec![false; n];
    let mut catchments = Vec::with_capacity(stations.len());

    for &station in stations {
        let full = upstream_set(net, station);
        let own: Vec<CellIndex> = full
            .into_iter()
            .filter(|c| !claimed[c.get()])
            .collect();
        for c in &own {
            claimed[c.get()] = true;
        }
        catchments.push(own);
    }
    catchments
}
