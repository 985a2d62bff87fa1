// crates/rg_sim/src/driver.rs

//! 单日模拟驱动
//!
//! 每个模拟日的控制流：
//!
//! 1. 强迫与用水输入的非负校验（失败即当日中止）
//! 2. 沿岸需求汇集预处理（共享湖库的正请求搬到出流单元）
//! 3. 按拓扑序逐单元演算：入流沿 地方湖泊 -> 湿地 -> 全球湖泊 ->
//!    水库 -> 河段 穿行，取水需求按 河段 -> 地方湖泊 -> 湿地 ->
//!    全球湖泊 -> 水库 逐级满足
//! 4. 未满足剩余计入跨日累计器，触发地下水回流再分配
//!
//! 同一分区内严格串行（下游依赖上游当日出流）；分区之间用 rayon
//! 并行，每个分区只读初始状态、本地累积结果，最后统一写回。

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use tracing::debug;

use rg_config::SimulationConfig;
use rg_demand::aggregator::aggregate_riparian_demand;
use rg_demand::cascade::{reallocate_groundwater, satisfy_surface_demand, BodyState};
use rg_demand::request::CellAccumulators;
use rg_foundation::constants::MM_KM2_TO_KM3;
use rg_foundation::float::KahanSum;
use rg_foundation::indices::CellIndex;
use rg_foundation::RgResult;
use rg_network::cell::CellTable;
use rg_network::drainage::DrainageNetwork;
use rg_network::region::{Region, RegionPartition};
use rg_network::units::{UnitKind, UnitTable};
use rg_physics::channel::{flow_velocity, outflow_constant};
use rg_physics::reduction::reduction_factor;
use rg_physics::reservoir::{is_operational, reservoir_release, update_reservoir_storage};
use rg_physics::river::route_river_day;
use rg_physics::types::BodyKind;
use rg_physics::waterbody::{update_waterbody_storage, WaterBodyFluxes};

use crate::forcing::{DailyForcing, DailyWaterUse};
use crate::state::SimulationState;

/// 单日输出
#[derive(Debug, Clone)]
pub struct DayOutput {
    /// 逐单元出流量 [km³/day]
    pub streamflow: Vec<f64>,
    /// 逐单元实际满足的地表取水 [km³/day]
    pub satisfied_surface: Vec<f64>,
    /// 逐单元级联后的剩余需求 [km³/day]
    pub unsatisfied_surface: Vec<f64>,
    /// 逐单元改写后的地下水净需求 [km³/day]
    pub net_groundwater: Vec<f64>,
    /// 当日无法记账的湖库对象数
    pub skipped_units: usize,
    /// 全部流域出口的合计出流 [km³/day]
    pub outlet_discharge: f64,
}

/// 单元的当日可变状态（gather/scatter 用）
#[derive(Debug, Clone, Copy)]
struct CellState {
    river: f64,
    local_lake: f64,
    global_lake: f64,
    wetland: f64,
    reservoir: f64,
    ll_frac: f64,
    gl_frac: f64,
    wl_frac: f64,
    rs_frac: f64,
    acc: CellAccumulators,
}

impl CellState {
    fn load(state: &SimulationState, i: usize) -> Self {
        Self {
            river: state.river_storage[i],
            local_lake: state.local_lake_storage[i],
            global_lake: state.global_lake_storage[i],
            wetland: state.wetland_storage[i],
            reservoir: state.reservoir_storage[i],
            ll_frac: state.local_lake_fraction[i],
            gl_frac: state.global_lake_fraction[i],
            wl_frac: state.wetland_fraction[i],
            rs_frac: state.reservoir_fraction[i],
            acc: state.accumulators[i],
        }
    }

    fn store(self, state: &mut SimulationState, i: usize) {
        state.river_storage[i] = self.river;
        state.local_lake_storage[i] = self.local_lake;
        state.global_lake_storage[i] = self.global_lake;
        state.wetland_storage[i] = self.wetland;
        state.reservoir_storage[i] = self.reservoir;
        state.local_lake_fraction[i] = self.ll_frac;
        state.global_lake_fraction[i] = self.gl_frac;
        state.wetland_fraction[i] = self.wl_frac;
        state.reservoir_fraction[i] = self.rs_frac;
        state.accumulators[i] = self.acc;
    }
}

/// 单元的当日结果
#[derive(Debug, Clone, Copy, Default)]
struct CellDayResult {
    streamflow: f64,
    satisfied: f64,
    unsatisfied: f64,
    net_ground: f64,
}

/// 模拟器
///
/// 持有河网静态结构与全部可变状态；[`Simulation::step_day`]
/// 每调用一次推进一个模拟日。
pub struct Simulation {
    cells: CellTable,
    net: DrainageNetwork,
    regions: RegionPartition,
    units: UnitTable,
    config: SimulationConfig,
    state: SimulationState,
}

impl Simulation {
    /// 构建模拟器
    ///
    /// 从单元表的下游指针构建汇流图（带环即失败）与流域分区，
    /// 状态初始化为满库。
    pub fn new(
        cells: CellTable,
        units: UnitTable,
        config: SimulationConfig,
    ) -> RgResult<Self> {
        cells.validate()?;
        let net = DrainageNetwork::build(cells.downstream.clone())?;
        let regions = RegionPartition::build(&net);
        let state = SimulationState::init_full(&cells);
        debug!(
            n_cells = cells.n_cells,
            n_regions = regions.n_regions(),
            n_units = units.n_units(),
            "模拟器构建完成"
        );
        Ok(Self {
            cells,
            net,
            regions,
            units,
            config,
            state,
        })
    }

    /// 当前状态
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// 单元表
    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    /// 汇流图
    pub fn network(&self) -> &DrainageNetwork {
        &self.net
    }

    /// 流域分区
    pub fn regions(&self) -> &RegionPartition {
        &self.regions
    }

    /// 模拟配置
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 从检查点恢复状态
    pub fn restore_state(&mut self, state: SimulationState) -> RgResult<()> {
        state.validate(&self.cells)?;
        self.state = state;
        Ok(())
    }

    /// 显式重初始化累计器
    pub fn reset_accumulators(&mut self) {
        self.state.reset_accumulators();
    }

    /// 推进一个模拟日
    pub fn step_day(
        &mut self,
        date: NaiveDate,
        forcing: &DailyForcing,
        water_use: &DailyWaterUse,
    ) -> RgResult<DayOutput> {
        let n = self.cells.n_cells;
        forcing.validate(n)?;
        water_use.validate(n)?;

        // 沿岸需求汇集预处理
        let mut surface_request = water_use.abstraction.surface.clone();
        let skipped_units = aggregate_riparian_demand(
            &self.units,
            &self.state.global_lake_fraction,
            &self.state.reservoir_fraction,
            &mut surface_request,
        );

        // 分区演算：闭包只读初始状态，结果本地累积
        let run = |region: &Region| {
            self.run_region(region, date, forcing, water_use, &surface_request)
        };
        let regions: Vec<&Region> = self.regions.iter().collect();
        let use_parallel = self.config.run.parallel
            && regions.len() >= self.config.run.parallel_threshold;
        let per_region: Vec<Vec<(usize, CellState, CellDayResult)>> = if use_parallel {
            regions.par_iter().copied().map(run).collect()
        } else {
            regions.iter().copied().map(run).collect()
        };

        // 写回状态并装配输出
        let mut output = DayOutput {
            streamflow: vec![0.0; n],
            satisfied_surface: vec![0.0; n],
            unsatisfied_surface: vec![0.0; n],
            net_groundwater: vec![0.0; n],
            skipped_units,
            outlet_discharge: 0.0,
        };
        let mut outlet_sum = KahanSum::new();
        for results in per_region {
            for (i, cell_state, result) in results {
                cell_state.store(&mut self.state, i);
                output.streamflow[i] = result.streamflow;
                output.satisfied_surface[i] = result.satisfied;
                output.unsatisfied_surface[i] = result.unsatisfied;
                output.net_groundwater[i] = result.net_ground;
                if self.net.is_outlet(CellIndex::new(i)) {
                    outlet_sum.add(result.streamflow);
                }
            }
        }
        output.outlet_discharge = outlet_sum.value();
        Ok(output)
    }

    /// 单个分区的当日演算（按分区内拓扑序串行）
    fn run_region(
        &self,
        region: &Region,
        date: NaiveDate,
        forcing: &DailyForcing,
        water_use: &DailyWaterUse,
        surface_request: &[f64],
    ) -> Vec<(usize, CellState, CellDayResult)> {
        let mut results = Vec::with_capacity(region.cells.len());
        let mut flow_of: HashMap<usize, f64> = HashMap::with_capacity(region.cells.len());

        for &c in &region.cells {
            let i = c.get();
            let mut upstream_inflow = 0.0;
            for &up in self.net.direct_upstream(c) {
                upstream_inflow += flow_of.get(&up.get()).copied().unwrap_or(0.0);
            }

            let mut cell_state = CellState::load(&self.state, i);
            let result = self.process_cell(
                c,
                date,
                upstream_inflow,
                &mut cell_state,
                forcing,
                water_use,
                surface_request[i],
            );
            flow_of.insert(i, result.streamflow);
            results.push((i, cell_state, result));
        }
        results
    }

    /// 单元的当日演算
    #[allow(clippy::too_many_arguments)]
    fn process_cell(
        &self,
        cell: CellIndex,
        date: NaiveDate,
        upstream_inflow: f64,
        cs: &mut CellState,
        forcing: &DailyForcing,
        water_use: &DailyWaterUse,
        surface_request: f64,
    ) -> CellDayResult {
        let i = cell.get();
        let p = &self.config.physics;
        let cells = &self.cells;
        let area = cells.cell_area[i];
        let precip_mm = forcing.precipitation[i];
        let evap_mm = forcing.potential_evap[i];
        // mm 水深 × 有效水面面积 -> km³ 体积
        let vol = |mm: f64, frac: f64| mm * area * frac * MM_KM2_TO_KM3;

        let mut inflow = upstream_inflow + forcing.runoff[i];

        // ===== 入流依次穿过蓄水体 =====

        // 地方湖泊
        let max_ll = cells.max_storage_local_lake[i];
        let (s, out) = update_waterbody_storage(
            cs.local_lake,
            max_ll,
            BodyKind::LocalLake,
            WaterBodyFluxes {
                inflow,
                precipitation: vol(precip_mm, cs.ll_frac),
                potential_evap: vol(evap_mm, cs.ll_frac),
            },
            p.local_reduction_exponent,
            p.lake_outflow_coefficient,
            p.lake_outflow_exponent,
        );
        cs.local_lake = s;
        inflow = out;
        cs.ll_frac = reduction_factor(s, max_ll, p.local_reduction_exponent, BodyKind::LocalLake)
            * cells.local_lake_fraction[i];

        // 湿地
        let max_wl = cells.max_storage_wetland[i];
        let (s, out) = update_waterbody_storage(
            cs.wetland,
            max_wl,
            BodyKind::Wetland,
            WaterBodyFluxes {
                inflow,
                precipitation: vol(precip_mm, cs.wl_frac),
                potential_evap: vol(evap_mm, cs.wl_frac),
            },
            p.local_reduction_exponent,
            p.lake_outflow_coefficient,
            p.lake_outflow_exponent,
        );
        cs.wetland = s;
        inflow = out;
        cs.wl_frac = reduction_factor(s, max_wl, p.local_reduction_exponent, BodyKind::Wetland)
            * cells.wetland_fraction[i];

        // 全球湖泊（只有出流单元的 max_storage 为正）
        let max_gl = cells.max_storage_global_lake[i];
        let (s, out) = update_waterbody_storage(
            cs.global_lake,
            max_gl,
            BodyKind::GlobalLake,
            WaterBodyFluxes {
                inflow,
                precipitation: vol(precip_mm, cs.gl_frac),
                potential_evap: vol(evap_mm, cs.gl_frac),
            },
            p.global_reduction_exponent,
            p.lake_outflow_coefficient,
            p.lake_outflow_exponent,
        );
        cs.global_lake = s;
        inflow = out;
        cs.gl_frac = reduction_factor(s, max_gl, p.global_reduction_exponent, BodyKind::GlobalLake)
            * cells.global_lake_fraction[i];

        // 水库：投运后走运行规则，投运前按天然湖泊
        let max_rs = cells.max_storage_reservoir[i];
        if max_rs > 0.0 {
            let unit = self.units.unit_of(cell);
            let (mean_inflow, commission_year) = if unit.is_valid() {
                let u = self.units.unit(unit);
                if u.kind == UnitKind::Reservoir {
                    (u.mean_inflow, u.commission_year)
                } else {
                    (0.0, None)
                }
            } else {
                (0.0, None)
            };
            let fluxes = WaterBodyFluxes {
                inflow,
                precipitation: vol(precip_mm, cs.rs_frac),
                potential_evap: vol(evap_mm, cs.rs_frac),
            };
            let (s, out) = if is_operational(commission_year, date.year()) {
                let release = reservoir_release(cs.reservoir, max_rs, inflow, mean_inflow);
                update_reservoir_storage(
                    cs.reservoir,
                    max_rs,
                    fluxes,
                    release,
                    p.global_reduction_exponent,
                )
            } else {
                update_waterbody_storage(
                    cs.reservoir,
                    max_rs,
                    BodyKind::GlobalLake,
                    fluxes,
                    p.global_reduction_exponent,
                    p.lake_outflow_coefficient,
                    p.lake_outflow_exponent,
                )
            };
            cs.reservoir = s;
            inflow = out;
            cs.rs_frac =
                reduction_factor(s, max_rs, p.global_reduction_exponent, BodyKind::Reservoir)
                    * cells.reservoir_fraction[i];
        }

        // ===== 河段演算与需求级联 =====

        let velocity = flow_velocity(
            cs.river,
            cells.river_length[i],
            cells.bottom_width[i],
            cells.river_slope[i],
            cells.roughness[i],
        );
        let k = outflow_constant(velocity, cells.river_length[i]);

        let mut river_inflow = inflow;
        let mut demand_today = 0.0;
        if surface_request < 0.0 {
            // 净回流：直接补给河段
            river_inflow += -surface_request;
        } else {
            demand_today = surface_request;
        }

        // 往日欠账并入当日需求
        let carry = cs.acc.total_unsatisfied();
        let total_demand = demand_today + carry;

        let step = route_river_day(
            cs.river,
            river_inflow,
            k,
            total_demand,
            cells.station_correction[i],
        );
        cs.river = step.new_storage;

        let report = satisfy_surface_demand(
            step.remaining_unsatisfied,
            BodyState {
                storage: &mut cs.local_lake,
                max_storage: max_ll,
                base_fraction: cells.local_lake_fraction[i],
                current_fraction: &mut cs.ll_frac,
            },
            BodyState {
                storage: &mut cs.wetland,
                max_storage: max_wl,
                base_fraction: cells.wetland_fraction[i],
                current_fraction: &mut cs.wl_frac,
            },
            BodyState {
                storage: &mut cs.global_lake,
                max_storage: max_gl,
                base_fraction: cells.global_lake_fraction[i],
                current_fraction: &mut cs.gl_frac,
            },
            BodyState {
                storage: &mut cs.reservoir,
                max_storage: max_rs,
                base_fraction: cells.reservoir_fraction[i],
                current_fraction: &mut cs.rs_frac,
            },
            p.local_reduction_exponent,
            p.global_reduction_exponent,
        );

        let remaining = report.remaining;
        let satisfied = total_demand - remaining;

        // ===== 累计器更新与地下水回流再分配 =====

        // 当日净新增欠账（负值 = 核销了往日欠账）
        let delta = remaining - carry;
        let irr_share = water_use.irrigation_share[i].clamp(0.0, 1.0);
        let carry_irr_share = if carry > 0.0 {
            cs.acc.unsatisfied_from_irrigation / carry
        } else {
            0.0
        };
        let (r_irrig, r_other) = if delta >= 0.0 {
            (delta * irr_share, delta * (1.0 - irr_share))
        } else {
            let irr = delta * carry_irr_share;
            (irr, delta - irr)
        };

        let return_fraction = water_use.return_fraction[i].clamp(0.0, 1.0);
        let realloc = reallocate_groundwater(
            r_irrig,
            water_use.abstraction.ground[i],
            water_use.irrigation_withdrawal[i],
            water_use.irrigation_consumptive_use[i],
            return_fraction,
            &mut cs.acc,
            p.demand_epsilon,
        );
        if r_irrig < -p.demand_epsilon && realloc.return_flow_change == 0.0 {
            // 盈余但无已削减回流可恢复：仍核销已满足的灌溉欠账
            cs.acc.unsatisfied_from_irrigation =
                (cs.acc.unsatisfied_from_irrigation + r_irrig).max(0.0);
        }
        cs.acc.unsatisfied_from_other_sectors =
            (cs.acc.unsatisfied_from_other_sectors + r_other).max(0.0);

        CellDayResult {
            streamflow: step.streamflow,
            satisfied,
            unsatisfied: remaining,
            net_ground: realloc.net_groundwater,
        }
    }
}
