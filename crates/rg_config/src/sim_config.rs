// crates/rg_config/src/sim_config.rs

//! SimulationConfig - 模拟配置（全 f64）
//!
//! 定义模拟的所有配置参数，使用纯 f64 类型存储以便 JSON 序列化。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 模拟配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 物理参数
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// 运行设置
    #[serde(default)]
    pub run: RunConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// 从 JSON 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        if p.local_reduction_exponent <= 0.0 {
            return Err(ConfigError::invalid(
                "physics.local_reduction_exponent",
                p.local_reduction_exponent,
                "必须为正",
            ));
        }
        if p.global_reduction_exponent <= 0.0 {
            return Err(ConfigError::invalid(
                "physics.global_reduction_exponent",
                p.global_reduction_exponent,
                "必须为正",
            ));
        }
        if p.lake_outflow_coefficient < 0.0 || p.lake_outflow_coefficient > 1.0 {
            return Err(ConfigError::invalid(
                "physics.lake_outflow_coefficient",
                p.lake_outflow_coefficient,
                "必须在 [0, 1] 内",
            ));
        }
        if p.demand_epsilon <= 0.0 {
            return Err(ConfigError::invalid(
                "physics.demand_epsilon",
                p.demand_epsilon,
                "必须为正",
            ));
        }
        if self.run.end_date < self.run.start_date {
            return Err(ConfigError::invalid(
                "run.end_date",
                self.run.end_date,
                "不得早于 start_date",
            ));
        }
        Ok(())
    }
}

/// 物理参数配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 地方湖泊/湿地的面积缩减指数
    #[serde(default = "default_local_exponent")]
    pub local_reduction_exponent: f64,

    /// 全球湖泊/水库的面积缩减指数
    #[serde(default = "default_global_exponent")]
    pub global_reduction_exponent: f64,

    /// 湖泊/湿地存量幂律出流系数 [1/day]
    #[serde(default = "default_outflow_coefficient")]
    pub lake_outflow_coefficient: f64,

    /// 湖泊/湿地存量幂律出流指数
    #[serde(default = "default_outflow_exponent")]
    pub lake_outflow_exponent: f64,

    /// 需求分配的浮点噪声容差 [km³/day]
    #[serde(default = "default_demand_epsilon")]
    pub demand_epsilon: f64,

    /// 灌溉回流比例的缺省值（无逐单元数据时使用）
    #[serde(default = "default_return_fraction")]
    pub default_return_fraction: f64,
}

fn default_local_exponent() -> f64 {
    3.32
}
fn default_global_exponent() -> f64 {
    2.81
}
fn default_outflow_coefficient() -> f64 {
    0.01
}
fn default_outflow_exponent() -> f64 {
    1.5
}
fn default_demand_epsilon() -> f64 {
    1e-12
}
fn default_return_fraction() -> f64 {
    0.8
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            local_reduction_exponent: default_local_exponent(),
            global_reduction_exponent: default_global_exponent(),
            lake_outflow_coefficient: default_outflow_coefficient(),
            lake_outflow_exponent: default_outflow_exponent(),
            demand_epsilon: default_demand_epsilon(),
            default_return_fraction: default_return_fraction(),
        }
    }
}

/// 运行设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// 模拟起始日期（含）
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// 模拟结束日期（含）
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,

    /// 是否跨流域并行
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// 并行阈值（分区数超过此值时才并行）
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// 检查点间隔 [天]（None 表示不写检查点）
    #[serde(default)]
    pub checkpoint_interval_days: Option<u32>,

    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1991, 1, 1).expect("静态日期合法")
}
fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 12, 31).expect("静态日期合法")
}
fn default_parallel() -> bool {
    true
}
fn default_parallel_threshold() -> usize {
    2
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            parallel: default_parallel(),
            parallel_threshold: default_parallel_threshold(),
            checkpoint_interval_days: None,
            output_dir: default_output_dir(),
        }
    }
}
