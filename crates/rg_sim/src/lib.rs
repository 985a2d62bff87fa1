// crates/rg_sim/src/lib.rs

//! RiverGrid Simulation Layer (Layer 4)
//!
//! 逐日模拟驱动：强迫数据校验、沿岸需求汇集预处理、按拓扑序的
//! 单元演算（水体平衡 + 需求级联）、跨流域并行与检查点。
//!
//! # 模块概览
//!
//! - [`state`]: 逐单元存量与累计器（检查点的主体）
//! - [`forcing`]: 当日强迫与用水输入及其非负校验
//! - [`driver`]: 单日推进（[`driver::Simulation::step_day`]）
//! - [`checkpoint`]: 状态快照的保存与恢复
//! - [`runner`]: 多日运行循环、日界取消、进度共享
//!
//! # 并发模型
//!
//! 同一流域内严格按拓扑序串行（下游入流依赖上游当日出流）；
//! 相互独立的流域分区间并行（rayon），每个分区独占自己的
//! 状态切片，无共享可变数据。取消请求只在整日边界生效。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod driver;
pub mod forcing;
pub mod runner;
pub mod state;

pub use checkpoint::Checkpoint;
pub use driver::{DayOutput, Simulation};
pub use forcing::{DailyForcing, DailyWaterUse};
pub use runner::{ConstantInputs, DailyInputProvider, RunProgress, RunSummary, SimulationRunner};
pub use state::SimulationState;
