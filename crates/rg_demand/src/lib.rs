// crates/rg_demand/src/lib.rs

//! RiverGrid Demand Layer (Layer 3)
//!
//! 人类用水需求在地表水体间的分配：
//!
//! - [`request`]: 带符号的净取水请求与跨日未满足需求累计器
//! - [`aggregator`]: 共享湖库的沿岸需求汇集（每日预处理）
//! - [`cascade`]: 河道 -> 地方水体 -> 共享水体的逐级满足与
//!   地下水回流再分配
//!
//! # 设计原则
//!
//! 1. **守恒**: 每一级都满足 实供 + 剩余 == 进入该级的需求
//! 2. **显式状态**: 累计器是逐单元的显式字段，随级联传入传出，
//!    无全局单例
//! 3. **顺序敏感**: 级联必须按拓扑序执行，下游结果依赖上游当日出流

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod cascade;
pub mod request;

pub use aggregator::aggregate_riparian_demand;
pub use cascade::{
    reallocate_groundwater, satisfy_surface_demand, BodyState, GroundwaterRealloc,
    SurfaceSupplyReport,
};
pub use request::{CellAccumulators, NetAbstraction};
