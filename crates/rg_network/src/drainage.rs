// crates/rg_network/src/drainage.rs

//! 汇流方向图与拓扑处理序
//!
//! 汇流方向关系构成以流域出口为根的森林。本模块从"每个单元指向
//! 唯一下游"的数组构建：
//!
//! - 逆向邻接（直接上游单元列表，CSR 压缩格式）
//! - 全网拓扑序（上游单元先于下游单元出现）
//!
//! # 环路检测
//!
//! 合法的汇流图中任意单元沿下游指针最多 N 步（N = 单元数）到达
//! 出口。拓扑排序若未覆盖全部单元，剩余单元必在环上，构建以
//! [`RgError::CycleDetected`] 失败。无法恢复：带环的图不存在处理序。

use rg_foundation::indices::CellIndex;
use rg_foundation::{RgError, RgResult};
use serde::{Deserialize, Serialize};

/// 拓扑处理序
///
/// 单元索引的全序，保证每个单元出现在其所有上游贡献单元之后。
/// 初始化时构建一次，模拟期间不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingOrder(Vec<CellIndex>);

impl RoutingOrder {
    /// 序列长度
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按处理顺序迭代单元
    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.0.iter().copied()
    }

    /// 处理序的切片视图
    pub fn as_slice(&self) -> &[CellIndex] {
        &self.0
    }
}

/// 汇流方向图
///
/// 下游指针数组 + 逆向 CSR 邻接 + 预计算拓扑序。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrainageNetwork {
    /// 单元数量
    n_cells: usize,
    /// 下游单元（出口为 INVALID）
    downstream: Vec<CellIndex>,
    /// 逆向邻接行偏移，长度 = n_cells + 1
    upstream_offsets: Vec<u32>,
    /// 逆向邻接列索引（直接上游单元）
    upstream_indices: Vec<CellIndex>,
    /// 拓扑处理序
    order: RoutingOrder,
}

impl DrainageNetwork {
    /// 从下游指针数组构建汇流图
    ///
    /// # 错误
    ///
    /// - [`RgError::IndexOutOfBounds`]: 下游指针越界
    /// - [`RgError::CycleDetected`]: 图中存在环路
    pub fn build(downstream: Vec<CellIndex>) -> RgResult<Self> {
        let n = downstream.len();
        for (i, &down) in downstream.iter().enumerate() {
            if down.is_valid() && down.get() >= n {
                return Err(RgError::index_out_of_bounds("downstream", down.get(), n));
            }
            if down.is_valid() && down.get() == i {
                return Err(RgError::cycle_detected(i, n));
            }
        }

        // 逆向邻接：counting sort 构建 CSR
        let mut counts = vec![0u32; n];
        for &down in &downstream {
            if down.is_valid() {
                counts[down.get()] += 1;
            }
        }
        let mut upstream_offsets = vec![0u32; n + 1];
        for i in 0..n {
            upstream_offsets[i + 1] = upstream_offsets[i] + counts[i];
        }
        let mut cursor = upstream_offsets.clone();
        let mut upstream_indices = vec![CellIndex::INVALID; upstream_offsets[n] as usize];
        for (i, &down) in downstream.iter().enumerate() {
            if down.is_valid() {
                let slot = cursor[down.get()] as usize;
                upstream_indices[slot] = CellIndex::new(i);
                cursor[down.get()] += 1;
            }
        }

        let order = Self::topological_order(&downstream, &counts)?;

        Ok(Self {
            n_cells: n,
            downstream,
            upstream_offsets,
            upstream_indices,
            order,
        })
    }

    /// Kahn 拓扑排序
    ///
    /// 入度即"直接上游数"。从源头单元（入度 0）出发逐层释放下游。
    fn topological_order(
        downstream: &[CellIndex],
        upstream_counts: &[u32],
    ) -> RgResult<RoutingOrder> {
        let n = downstream.len();
        let mut indegree = upstream_counts.to_vec();
        let mut queue: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        let mut head = 0;
        while head < queue.len() {
            let i = queue[head];
            head += 1;
            order.push(CellIndex::new(i));
            let down = downstream[i];
            if down.is_valid() {
                let d = down.get();
                indegree[d] -= 1;
                if indegree[d] == 0 {
                    queue.push(d);
                }
            }
        }

        if order.len() != n {
            // 未入序的单元必在环上，报告编号最小的一个
            let on_cycle = (0..n)
                .find(|&i| indegree[i] > 0)
                .unwrap_or(0);
            return Err(RgError::cycle_detected(on_cycle, n));
        }
        Ok(RoutingOrder(order))
    }

    /// 单元数量
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 单元的下游指针（出口为 INVALID）
    #[inline]
    pub fn downstream(&self, cell: CellIndex) -> CellIndex {
        self.downstream[cell.get()]
    }

    /// 单元的直接上游单元列表
    #[inline]
    pub fn direct_upstream(&self, cell: CellIndex) -> &[CellIndex] {
        let i = cell.get();
        let lo = self.upstream_offsets[i] as usize;
        let hi = self.upstream_offsets[i + 1] as usize;
        &self.upstream_indices[lo..hi]
    }

    /// 拓扑处理序
    pub fn routing_order(&self) -> &RoutingOrder {
        &self.order
    }

    /// 单元是否为流域出口
    #[inline]
    pub fn is_outlet(&self, cell: CellIndex) -> bool {
        self.downstream[cell.get()].is_invalid()
    }

    /// 沿下游指针到达的流域出口
    ///
    /// 图构建成功即无环，循环必然终止。
    pub fn basin_outlet(&self, cell: CellIndex) -> CellIndex {
        let mut current = cell;
        loop {
            let down = self.downstream[current.get()];
            if down.is_invalid() {
                return current;
            }
            current = down;
        }
    }
}
