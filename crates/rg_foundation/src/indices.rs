// crates/rg_foundation/src/indices.rs

//! 强类型索引系统
//!
//! 网格单元、校准测站、湖库单元与流域分区各有自己的索引类型，
//! 编译期阻止混用（CellIndex ≠ StationIndex），运行时与 usize
//! 完全等价。
//!
//! 每个索引类型带一个 `INVALID` 哨兵（内部为 `usize::MAX`）。
//! 对 [`CellIndex`] 而言，哨兵还承担"流出网格"的语义：单元表中
//! `downstream[i] == CellIndex::INVALID` 表示单元 i 是流域出口。
//!
//! # 示例
//!
//! ```rust
//! use rg_foundation::indices::{cell, CellIndex};
//!
//! let headwater = cell(0);
//! let downstream_of_outlet = CellIndex::INVALID;
//!
//! assert!(headwater.is_valid());
//! assert!(downstream_of_outlet.is_invalid());
//! assert_eq!(cell(5).get(), 5);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_index {
    ($name:ident, $ctor:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// 无效索引哨兵
            pub const INVALID: Self = Self(usize::MAX);

            /// 从位置值创建索引
            #[inline]
            pub const fn new(idx: usize) -> Self {
                Self(idx)
            }

            /// 位置值
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// 是否为有效索引
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != usize::MAX
            }

            /// 是否为哨兵
            #[inline]
            pub const fn is_invalid(self) -> bool {
                !self.is_valid()
            }
        }

        impl Default for $name {
            /// 默认值即哨兵，未初始化的指针不会意外指向单元 0
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(idx: usize) -> Self {
                Self::new(idx)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.is_valid() {
                    true => write!(f, "{}({})", stringify!($name), self.0),
                    false => write!(f, "{}(none)", stringify!($name)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.is_valid() {
                    true => fmt::Display::fmt(&self.0, f),
                    false => f.write_str("none"),
                }
            }
        }

        #[doc = concat!("创建", $doc)]
        #[inline]
        pub const fn $ctor(idx: usize) -> $name {
            $name::new(idx)
        }
    };
}

define_index!(CellIndex, cell, "网格单元索引");
define_index!(StationIndex, station, "校准测站索引");
define_index!(UnitIndex, unit, "湖泊/水库单元（GLWD）索引");
define_index!(RegionIndex, region, "独立流域分区索引");
