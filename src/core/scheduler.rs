//! Cron-based scheduler that runs trading cycles until cancelled

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::cycle::{CandidateMode, TradingCycleOrchestrator};
use crate::error::EngineError;

pub struct CycleScheduler {
    schedule: Schedule,
    expression: String,
}

impl CycleScheduler {
    /// `expression` uses the six-field cron format: second minute hour day month weekday.
    pub fn new(expression: &str) -> Result<Self, EngineError> {
        let schedule = Schedule::from_str(expression).map_err(|e| {
            EngineError::Configuration(format!("Invalid cron expression '{}': {}", expression, e))
        })?;

        info!(cron = %expression, "CycleScheduler: created with cron {}", expression);

        Ok(Self {
            schedule,
            expression: expression.to_string(),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    /// Run a session at every tick until `cancel` fires.
    ///
    /// A failed session is logged and the next tick proceeds as normal. Returns the number
    /// of ticks handled.
    pub async fn run(
        &self,
        orchestrator: &mut TradingCycleOrchestrator,
        mode: CandidateMode,
        cancel: CancellationToken,
    ) -> usize {
        info!("CycleScheduler: started, waiting for cron schedule...");
        let mut cycles = 0;

        loop {
            let Some(next_tick) = self.next_after(Utc::now()) else {
                info!("CycleScheduler: schedule has no further ticks");
                break;
            };
            let wait = (next_tick - Utc::now()).to_std().unwrap_or_default();

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            cycles += 1;
            info!(cycle = cycles, "CycleScheduler: tick at {}", next_tick);
            match orchestrator.run_session(mode, Utc::now(), &cancel).await {
                Ok(report) => info!(
                    cycles = report.cycles.len(),
                    "CycleScheduler: tick {} ran {} cycles",
                    cycles,
                    report.cycles.len()
                ),
                Err(e) => error!(error = %e, "CycleScheduler: tick {} failed", cycles),
            }
        }

        info!(cycles, "CycleScheduler: stopped after {} cycles", cycles);
        cycles
    }
}
