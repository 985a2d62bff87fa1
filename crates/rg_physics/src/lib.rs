// crates/rg_physics/src/lib.rs

//! RiverGrid Physics Layer (Layer 3)
//!
//! 地表水体的单日水量平衡：河段、地方湖泊、全球湖泊、湿地、水库。
//! 每类水体的更新都是显式状态上的纯函数，按闭式解析解推进一天，
//! 不做数值积分。
//!
//! # 模块概览
//!
//! - [`types`]: 水体类别与平衡结果类型
//! - [`reduction`]: 干涸面积缩减因子（纯函数）
//! - [`channel`]: 梯形断面 Manning–Strickler 水力学
//! - [`river`]: 河段存量的指数衰减闭式解与取水分支
//! - [`waterbody`]: 湖泊/湿地/水库的符号存量平衡与取水
//! - [`reservoir`]: 水库运行规则的日释放量
//!
//! # 设计原则
//!
//! 1. **纯函数**: 所有更新为 (旧状态, 当日输入) -> 新状态，无隐藏状态
//! 2. **守恒**: 每次取水调用满足 实供 + 剩余 == 需求
//! 3. **命名截断**: 数值边界情况由命名的防御性截断处理，不抛错

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod reduction;
pub mod reservoir;
pub mod river;
pub mod types;
pub mod waterbody;

pub use reduction::reduction_factor;
pub use types::{AbstractionOutcome, BodyKind};
