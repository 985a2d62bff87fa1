// crates/rg_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `RgError` 枚举和 `RgResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，配置相关错误在 rg_config 中定义
//! 2. **早失败**: 上游数据契约被违反（如负降水）立即报错，不静默截断
//! 3. **可追溯**: 错误携带单元编号等定位信息

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type RgResult<T> = Result<T, RgError>;

/// RiverGrid 错误类型
///
/// 核心错误类型，用于整个项目。配置相关的错误在 `rg_config` 中扩展。
#[derive(Error, Debug)]
pub enum RgError {
    /// 汇流方向图存在环路，无法建立拓扑序
    #[error("汇流方向图存在环路: 单元 {cell} 在 {steps} 步内未到达出口")]
    CycleDetected {
        /// 检测到环路的起始单元编号
        cell: usize,
        /// 已走过的步数（等于单元总数）
        steps: usize,
    },

    /// 强迫数据违反非负契约（上游数据管线缺陷，当日计算中止）
    #[error("强迫数据为负: {field} 在单元 {cell} 处为 {value}")]
    NegativeForcing {
        /// 字段名（如 precipitation / runoff）
        field: &'static str,
        /// 单元编号
        cell: usize,
        /// 实际值
        value: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    /// 无效的河网拓扑
    #[error("无效的河网拓扑: {message}")]
    InvalidNetwork {
        /// 具体错误信息
        message: String,
    },

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl RgError {
    /// 环路检测
    pub fn cycle_detected(cell: usize, steps: usize) -> Self {
        Self::CycleDetected { cell, steps }
    }

    /// 负强迫数据
    pub fn negative_forcing(field: &'static str, cell: usize, value: f64) -> Self {
        Self::NegativeForcing { field, cell, value }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 无效河网
    pub fn invalid_network(message: impl Into<String>) -> Self {
        Self::InvalidNetwork {
            message: message.into(),
        }
    }

    /// 从IO错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl RgError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> RgResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> RgResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }

    /// 检查强迫数据是否非负
    #[inline]
    pub fn check_forcing(field: &'static str, cell: usize, value: f64) -> RgResult<()> {
        if value < 0.0 {
            Err(Self::negative_forcing(field, cell, value))
        } else {
            Ok(())
        }
    }
}

impl From<std::io::Error> for RgError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================
