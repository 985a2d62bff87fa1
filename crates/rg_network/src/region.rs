// crates/rg_network/src/region.rs

//! 独立流域分区
//!
//! 汇流森林的每棵树（以一个出口为根）构成一个分区。分区之间
//! 没有水量交换，是并行执行的天然单位：每个分区独占自己的
//! 存量状态，互不共享可变数据。

use crate::drainage::DrainageNetwork;
use rg_foundation::indices::{CellIndex, RegionIndex};
use serde::{Deserialize, Serialize};

/// 单个流域分区
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// 流域出口单元
    pub outlet: CellIndex,
    /// 分区内单元，按全网拓扑序排列（即分区内处理序）
    pub cells: Vec<CellIndex>,
}

/// 流域分区表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionPartition {
    /// 分区列表
    regions: Vec<Region>,
    /// 单元所属分区
    region_of: Vec<RegionIndex>,
}

impl RegionPartition {
    /// 按流域出口划分整个网络
    ///
    /// 全网拓扑序在各分区内的投影仍是合法处理序（分区之间无
    /// 依赖），因此直接按序分配即可。
    pub fn build(net: &DrainageNetwork) -> Self {
        let n = net.n_cells();
        let mut region_of = vec![RegionIndex::INVALID; n];
        let mut outlet_region: Vec<(CellIndex, RegionIndex)> = Vec::new();
        let mut regions: Vec<Region> = Vec::new();

        for c in net.routing_order().iter() {
            let outlet = net.basin_outlet(c);
            let region_idx = match outlet_region.iter().find(|(o, _)| *o == outlet) {
                Some((_, r)) => *r,
                None => {
                    let r = RegionIndex::new(regions.len());
                    outlet_region.push((outlet, r));
                    regions.push(Region {
                        outlet,
                        cells: Vec::new(),
                    });
                    r
                }
            };
            region_of[c.get()] = region_idx;
            regions[region_idx.get()].cells.push(c);
        }

        Self { regions, region_of }
    }

    /// 分区数量
    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }

    /// 迭代所有分区
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// 按索引访问分区
    pub fn region(&self, idx: RegionIndex) -> &Region {
        &self.regions[idx.get()]
    }

    /// 单元所属分区
    pub fn region_of(&self, cell: CellIndex) -> RegionIndex {
        self.region_of[cell.get()]
    }
}
