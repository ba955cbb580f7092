use std::path::Path;

use chrono::NaiveDateTime;
use log::debug;
use tokio::fs;

use crate::{
    config::Config,
    remote::Executor,
    schedule::{resolve, table::ScheduleTable},
    slurm::{self, JobRequest},
    Error,
};

fn format_fire_time(fire_time: NaiveDateTime) -> String {
    fire_time.format("%a %Y-%m-%d %H:%M").to_string()
}

/// Replace the persisted schedule with the content of `schedule_file`, cancel
/// all pending notebook jobs, then queue up the first slot of the new
/// schedule.
///
/// The file is parsed locally as a validation gate before anything is
/// touched on the cluster; a bad row aborts the whole reset.
pub async fn reset(
    exec: &impl Executor,
    config: &Config,
    schedule_file: &Path,
    now: NaiveDateTime,
) -> Result<(), Error> {
    debug!("commands::reset({})", schedule_file.display());

    let text = fs::read_to_string(schedule_file).await?;
    ScheduleTable::parse(&text, &config.defaults())?;

    println!("Copying schedule to {}", config.schedule_path());
    exec.write_file(&config.schedule_path(), &text).await?;

    println!("Cancelling all pending notebook jobs");
    let pending = slurm::pending_job_ids(exec).await?;
    slurm::cancel_jobs(exec, &pending).await?;

    println!("Starting schedule");
    run_next(exec, config, now).await
}

/// Resolve the persisted schedule against `now`, submit the selected slot at
/// its fire time and persist the residual schedule.
pub async fn run_next(
    exec: &impl Executor,
    config: &Config,
    now: NaiveDateTime,
) -> Result<(), Error> {
    debug!("commands::run_next({now})");

    let text = exec.read_file(&config.schedule_path()).await?;
    let table = ScheduleTable::parse(&text, &config.defaults())?;
    let resolved = resolve::resolve(&table, now)?;

    println!(
        "Submitting notebook job for {}",
        format_fire_time(resolved.fire_time)
    );
    let output = slurm::submit(
        exec,
        config,
        &JobRequest::from_entry(&resolved.entry, resolved.fire_time),
    )
    .await?;
    print!("{output}");

    println!("Updating {}", config.schedule_path());
    exec.write_file(&config.schedule_path(), &resolved.residual.render())
        .await
}

/// Submit a notebook job immediately, outside of normal scheduling. The
/// persisted schedule is not consulted or modified.
pub async fn run_now(
    exec: &impl Executor,
    config: &Config,
    request: &JobRequest,
) -> Result<(), Error> {
    debug!("commands::run_now({request:?})");

    println!("Submitting notebook job to sbatch");
    let output = slurm::submit(exec, config, request).await?;
    print!("{output}");

    Ok(())
}

/// Fetch the persisted schedule and render it together with the computed
/// next fire time. Mutates nothing.
pub async fn get(
    exec: &impl Executor,
    config: &Config,
    now: NaiveDateTime,
) -> Result<String, Error> {
    debug!("commands::get({now})");

    let text = exec.read_file(&config.schedule_path()).await?;
    let table = ScheduleTable::parse(&text, &config.defaults())?;
    let resolved = resolve::resolve(&table, now)?;

    Ok(format!(
        "Next job running at: {}\n{}",
        format_fire_time(resolved.fire_time),
        text.trim_end()
    ))
}
