// crates/rg_sim/src/checkpoint.rs

//! 检查点
//!
//! 全部逐单元状态（存量 + 累计器）加上日历位置的可序列化快照，
//! 足以恢复模拟从中断处继续。此处只定义快照结构与 JSON 存取；
//! 外部协作者负责生产环境的文件格式。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use rg_foundation::{RgError, RgResult};

use crate::state::SimulationState;

/// 模拟状态快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// 本次运行的标识
    pub run_id: Uuid,
    /// 快照对应的模拟日（该日已完成）
    pub date: NaiveDate,
    /// 全部逐单元状态
    pub state: SimulationState,
}

impl Checkpoint {
    /// 创建快照
    pub fn new(run_id: Uuid, date: NaiveDate, state: SimulationState) -> Self {
        Self {
            run_id,
            date,
            state,
        }
    }

    /// 写入 JSON 文件
    pub fn save(&self, path: impl AsRef<Path>) -> RgResult<()> {
        let text = serde_json::to_string(self)
            .map_err(|e| RgError::serialization(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// 从 JSON 文件恢复
    pub fn load(path: impl AsRef<Path>) -> RgResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RgError::file_not_found(path));
        }
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| RgError::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_foundation::indices::CellIndex;
    use rg_network::cell::CellTable;

    #[test]
    fn test_checkpoint_roundtrip_in_memory() {
        let table = CellTable::uniform(vec![CellIndex::INVALID]);
        let mut state = SimulationState::init_full(&table);
        state.river_storage[0] = 1.25;
        state.accumulators[0].unsatisfied_from_irrigation = 0.5;

        let cp = Checkpoint::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(1997, 3, 14).unwrap(),
            state,
        );
        let json = serde_json::to_string(&cp).unwrap();
        let back: Checkpoint = serde_json::from_str(&json).unwrap();

        assert_eq!(back.run_id, cp.run_id);
        assert_eq!(back.date, cp.date);
        assert!((back.state.river_storage[0] - 1.25).abs() < 1e-12);
        assert!(
            (back.state.accumulators[0].unsatisfied_from_irrigation - 0.5).abs() < 1e-12,
            "累计器必须随快照往返"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Checkpoint::load("/nonexistent/checkpoint.json").unwrap_err();
        assert!(matches!(err, RgError::FileNotFound { .. }));
    }
}
