//! Stage scheduler (C8): executes stages sequentially; within a stage,
//! executes checks sequentially or in parallel with a bounded worker pool;
//! applies the stage-termination policy.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::check::{Check, Registry};
use crate::env::MAX_WORKERS_CEILING;
use crate::model::{CheckContext, CheckResult, PipelineConfig, Status};

/// `(ok, results)` — the scheduler's final output. `ok` is true iff every
/// stage passed its policy.
pub struct PipelineOutcome {
    pub ok: bool,
    pub results: Vec<CheckResult>,
}

/// Runs every stage of `config` in declaration order against `ctx`,
/// looking up each stage's checks in `registry`. Does not forcibly cancel
/// in-flight checks when a stage aborts: already-spawned checks in the
/// aborting stage are awaited to completion before the scheduler returns.
pub async fn run_pipeline(
    config: &PipelineConfig,
    ctx: Arc<CheckContext>,
    registry: &Registry,
    max_workers: usize,
) -> PipelineOutcome {
    let worker_cap = max_workers.clamp(1, MAX_WORKERS_CEILING);
    let mut results = Vec::new();

    for stage in &config.stages {
        let checks: Vec<Arc<dyn Check>> = stage
            .checks
            .iter()
            .map(|spec| {
                registry.build(&spec.id).unwrap_or_else(|| {
                    panic!("unregistered check id in pipeline configuration: {}", spec.id)
                })
            })
            .collect();

        let stage_results = if stage.parallel {
            run_stage_parallel(checks, ctx.clone(), worker_cap).await
        } else {
            run_stage_sequential(checks, ctx.clone()).await
        };

        let stage_name = stage.name.clone();
        let mut stamped: Vec<CheckResult> = stage_results
            .into_iter()
            .map(|mut result| {
                result.stage = Some(stage_name.clone());
                result
            })
            .collect();

        let stage_failed = stamped.iter().any(|r| r.status == Status::Fail)
            || (stage.fail_on_warn && stamped.iter().any(|r| r.status == Status::Warn));

        results.append(&mut stamped);

        if stage_failed {
            return PipelineOutcome { ok: false, results };
        }
    }

    PipelineOutcome { ok: true, results }
}

/// Runs each check in turn, one `tokio::spawn` at a time, so a panicking
/// check is caught and converted the same way `run_stage_parallel` does
/// rather than unwinding out of the scheduler.
async fn run_stage_sequential(checks: Vec<Arc<dyn Check>>, ctx: Arc<CheckContext>) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(checks.len());
    for check in checks {
        let ctx = ctx.clone();
        match tokio::spawn(run_one(check, ctx)).await {
            Ok(result) => results.push(result),
            Err(join_err) if join_err.is_panic() => {
                results.push(CheckResult::failed_with_error("unknown", panic_message(join_err)));
            }
            Err(_) => {}
        }
    }
    results
}

/// Builds a bounded worker pool of size `worker_cap`. Each worker pulls the
/// next un-started check, invokes it, and deposits the stamped result.
/// Results are collected in completion order but re-sorted to match
/// declaration order before the stage closes, so reporting stays
/// deterministic regardless of scheduling order.
async fn run_stage_parallel(
    checks: Vec<Arc<dyn Check>>,
    ctx: Arc<CheckContext>,
    worker_cap: usize,
) -> Vec<CheckResult> {
    let semaphore = Arc::new(Semaphore::new(worker_cap));
    let mut set = JoinSet::new();
    for (index, check) in checks.into_iter().enumerate() {
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            (index, run_one(check, ctx).await)
        });
    }

    let mut indexed = Vec::new();
    while let Some(outcome) = set.join_next().await {
        match outcome {
            Ok((index, result)) => indexed.push((index, result)),
            Err(join_err) if join_err.is_panic() => {
                // A check panicked outside its own async body (e.g. during
                // polling); convert it the same way an in-body panic would
                // be reported by the check's own error handling.
                indexed.push((
                    usize::MAX,
                    CheckResult::failed_with_error("unknown", panic_message(join_err)),
                ));
            }
            Err(_) => {
                // Task was cancelled; the scheduler never cancels tasks
                // itself, so this only happens if the whole process is
                // shutting down. Nothing meaningful to report.
            }
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}

fn panic_message(err: tokio::task::JoinError) -> String {
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}

async fn run_one(check: Arc<dyn Check>, ctx: Arc<CheckContext>) -> CheckResult {
    let name = check.name().to_string();
    let start = Instant::now();
    let result = check.run(&ctx).await;
    let mut result = result;
    result.duration_ms = Some(start.elapsed().as_millis() as u64);
    if result.name.is_empty() {
        result.name = name;
    }
    result
}
