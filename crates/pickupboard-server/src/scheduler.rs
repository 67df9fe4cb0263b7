//! Background job scheduler.
//!
//! Runs the periodic snapshot refresh so the durable tier stays current even
//! when no one is reading.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::cache::SnapshotCoordinator;

/// Builds and starts the scheduler with the refresh job registered.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `cron` does not parse, or the scheduler fails to start.
pub async fn build_scheduler(
    coordinator: SnapshotCoordinator,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_refresh_job(&scheduler, coordinator, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the snapshot refresh job. The rebuilt snapshot is persisted and
/// otherwise discarded; the edge cache is left to expire on its own.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    coordinator: SnapshotCoordinator,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let coordinator = coordinator.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting snapshot refresh");
            match coordinator.refresh_and_persist().await {
                Ok(snapshot) => tracing::info!(
                    models = snapshot.models.len(),
                    stores = snapshot.stores.len(),
                    available = snapshot.available_count(),
                    "scheduler: snapshot refresh complete"
                ),
                Err(e) => tracing::warn!(error = %e, "scheduler: snapshot refresh failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: snapshot refresh registered");
    Ok(())
}
