//! Generic forward-then-compensate runner.
//!
//! A saga is an ordered list of steps. Each step may register one record
//! describing what it created; on the first failing step the records are
//! compensated newest-first and the step's error is returned untouched.

use std::fmt;

use tracing::{error, info, warn};

use crate::domain::{CreatedResourceSet, ProvisionError};

#[allow(async_fn_in_trait)]
pub trait Saga {
    type Step: Copy + fmt::Display + 'static;
    type Record: fmt::Display;
    type Output;

    /// Steps in execution order.
    fn steps(&self) -> &'static [Self::Step];

    /// Runs one step, returning the record it registers, if any.
    async fn execute(&mut self, step: Self::Step) -> Result<Option<Self::Record>, ProvisionError>;

    /// Undoes whatever `record` describes.
    async fn compensate(&self, record: &Self::Record) -> anyhow::Result<()>;

    /// Assembles the result once every step has succeeded.
    fn finish(&self) -> Result<Self::Output, ProvisionError>;
}

/// Output of a completed saga plus every record it registered, oldest-first.
#[derive(Debug)]
pub struct SagaOutcome<O, R> {
    pub output: O,
    pub created: Vec<R>,
}

/// Runs `saga` to completion or rolls it back.
///
/// # Errors
///
/// Returns the error of the first failing step (or of `finish`) after
/// rollback. Compensation failures are logged and never replace it.
pub async fn run_saga<S: Saga>(
    mut saga: S,
) -> Result<SagaOutcome<S::Output, S::Record>, ProvisionError> {
    let mut created = CreatedResourceSet::new();

    for &step in saga.steps() {
        info!(%step, "running step");
        match saga.execute(step).await {
            Ok(Some(record)) => {
                info!(%step, %record, "resource registered");
                created.record(record);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%step, error = %e, "step failed, rolling back");
                rollback(&saga, created).await;
                return Err(e);
            }
        }
    }

    match saga.finish() {
        Ok(output) => Ok(SagaOutcome {
            output,
            created: created.into_entries(),
        }),
        Err(e) => {
            rollback(&saga, created).await;
            Err(e)
        }
    }
}

async fn rollback<S: Saga>(saga: &S, created: CreatedResourceSet<S::Record>) {
    for record in created.into_rollback_order() {
        match saga.compensate(&record).await {
            Ok(()) => info!(%record, "compensated"),
            Err(e) => error!(%record, error = %format!("{e:#}"), "compensation failed, resource may be orphaned"),
        }
    }
}
