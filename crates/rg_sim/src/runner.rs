// crates/rg_sim/src/runner.rs

//! 多日运行循环
//!
//! 驱动 [`Simulation`] 在配置的日期区间上逐日推进：
//!
//! - 取消请求只在整日边界检查（时间步内不可中断）
//! - 进度通过共享读写锁暴露给监控方
//! - 按配置间隔写检查点快照

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use rg_foundation::{RgError, RgResult};

use crate::checkpoint::Checkpoint;
use crate::driver::Simulation;
use crate::forcing::{DailyForcing, DailyWaterUse};

/// 逐日输入提供者
///
/// 气候强迫与用水数据的装载/重采样属于外部协作者，
/// 运行循环只通过本接口按日拉取。
pub trait DailyInputProvider {
    /// 当日强迫
    fn forcing(&self, date: NaiveDate) -> RgResult<DailyForcing>;
    /// 当日用水
    fn water_use(&self, date: NaiveDate) -> RgResult<DailyWaterUse>;
}

/// 常数输入（测试与演示用）
pub struct ConstantInputs {
    /// 每日重复的强迫
    pub forcing: DailyForcing,
    /// 每日重复的用水
    pub water_use: DailyWaterUse,
}

impl DailyInputProvider for ConstantInputs {
    fn forcing(&self, _date: NaiveDate) -> RgResult<DailyForcing> {
        Ok(self.forcing.clone())
    }

    fn water_use(&self, _date: NaiveDate) -> RgResult<DailyWaterUse> {
        Ok(self.water_use.clone())
    }
}

/// 运行进度（监控方快照读取）
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    /// 最近完成的模拟日
    pub current_date: Option<NaiveDate>,
    /// 已完成天数
    pub days_completed: u64,
    /// 总天数
    pub total_days: u64,
    /// 最近一日的出口合计流量 [km³/day]
    pub last_outlet_discharge: f64,
}

/// 运行结果汇总
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 本次运行标识
    pub run_id: Uuid,
    /// 已完成天数
    pub days_completed: u64,
    /// 是否因取消而提前结束
    pub stopped_early: bool,
    /// 最后一个检查点路径
    pub last_checkpoint: Option<PathBuf>,
}

/// 模拟运行器
pub struct SimulationRunner {
    run_id: Uuid,
    stop: Arc<AtomicBool>,
    progress: Arc<RwLock<RunProgress>>,
}

impl Default for SimulationRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationRunner {
    /// 创建运行器
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stop: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(RwLock::new(RunProgress::default())),
        }
    }

    /// 本次运行标识
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// 请求在下一个日界停止
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// 取消句柄（可跨线程持有）
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// 进度快照
    pub fn progress(&self) -> RunProgress {
        self.progress.read().clone()
    }

    /// 在配置的日期区间上运行
    pub fn run(
        &self,
        sim: &mut Simulation,
        provider: &dyn DailyInputProvider,
    ) -> RgResult<RunSummary> {
        let run_cfg = sim.config().run.clone();
        let total_days = (run_cfg.end_date - run_cfg.start_date).num_days() as u64 + 1;
        {
            let mut p = self.progress.write();
            *p = RunProgress {
                total_days,
                ..RunProgress::default()
            };
        }

        if run_cfg.checkpoint_interval_days.is_some() {
            std::fs::create_dir_all(&run_cfg.output_dir)?;
        }

        info!(
            run_id = %self.run_id,
            start = %run_cfg.start_date,
            end = %run_cfg.end_date,
            total_days,
            "模拟运行开始"
        );

        let mut date = run_cfg.start_date;
        let mut days_completed = 0u64;
        let mut stopped_early = false;
        let mut last_checkpoint = None;

        while date <= run_cfg.end_date {
            // 取消只在日界生效
            if self.stop.load(Ordering::SeqCst) {
                warn!(run_id = %self.run_id, %date, "收到取消请求，在日界停止");
                stopped_early = true;
                break;
            }

            let forcing = provider.forcing(date)?;
            let water_use = provider.water_use(date)?;
            let output = sim.step_day(date, &forcing, &water_use)?;
            days_completed += 1;

            {
                let mut p = self.progress.write();
                p.current_date = Some(date);
                p.days_completed = days_completed;
                p.last_outlet_discharge = output.outlet_discharge;
            }

            if let Some(interval) = run_cfg.checkpoint_interval_days {
                if interval > 0 && days_completed % u64::from(interval) == 0 {
                    let path = run_cfg
                        .output_dir
                        .join(format!("checkpoint_{}.json", date.format("%Y%m%d")));
                    Checkpoint::new(self.run_id, date, sim.state().clone()).save(&path)?;
                    info!(run_id = %self.run_id, path = %path.display(), "检查点已写入");
                    last_checkpoint = Some(path);
                }
            }

            date = date
                .succ_opt()
                .ok_or_else(|| RgError::internal("日历越界"))?;
        }

        info!(
            run_id = %self.run_id,
            days_completed,
            stopped_early,
            "模拟运行结束"
        );

        Ok(RunSummary {
            run_id: self.run_id,
            days_completed,
            stopped_early,
            last_checkpoint,
        })
    }
}
