// crates/rg_network/src/lib.rs

//! RiverGrid Network Layer (Layer 2)
//!
//! 河网静态结构层：单元属性表、汇流方向图与拓扑处理序、
//! 上游贡献集、独立流域分区、湖库共享单元。
//!
//! # 模块概览
//!
//! - [`cell`]: 单元属性的 SoA 只读表
//! - [`drainage`]: 汇流方向图与拓扑序（环路检测）
//! - [`upstream`]: 上游贡献集与测站集水区算子
//! - [`region`]: 独立流域分区（并行执行的单位）
//! - [`units`]: 跨单元共享的湖泊/水库对象
//!
//! # 设计原则
//!
//! 1. **数组即图**: 汇流关系用整型索引数组表示，无指针结构
//! 2. **一次构建**: 拓扑序在初始化时构建一次，模拟期间只读
//! 3. **无环保证**: 构建失败即 `CycleDetected`，不存在带环的网络实例

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod drainage;
pub mod region;
pub mod units;
pub mod upstream;

pub use cell::CellTable;
pub use drainage::{DrainageNetwork, RoutingOrder};
pub use region::RegionPartition;
pub use units::{UnitKind, UnitTable, WaterUnit};
pub use upstream::{station_catchments, upstream_set};
