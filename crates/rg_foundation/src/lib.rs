// crates/rg_foundation/src/lib.rs

//! RiverGrid Foundation Layer
//!
//! 零依赖基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: 安全浮点运算和数值常量
//! - [`indices`]: 强类型索引系统
//! - [`constants`]: 水文常量（单位换算、数值下限）
//!
//! # 设计原则
//!
//! 1. **零外部依赖**: 仅依赖 serde 和 thiserror
//! 2. **类型安全**: 编译期防止索引误用（CellIndex ≠ StationIndex）
//! 3. **数值防御**: 除零、负值开方等边界情况由命名的辅助函数兜底

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod float;
pub mod indices;

pub use error::{RgError, RgResult};
pub use indices::{CellIndex, RegionIndex, StationIndex, UnitIndex};

/// 条件不满足时返回指定错误
///
/// 与 `anyhow::ensure!` 类似，但错误类型由调用者给出。
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

/// 从 `Option` 中取值，`None` 时返回指定错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err),
        }
    };
}

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{RgError, RgResult};
    pub use crate::float::{safe_div, safe_powf, KahanSum};
    pub use crate::indices::{CellIndex, RegionIndex, StationIndex, UnitIndex};
    pub use crate::{ensure, require};
}
