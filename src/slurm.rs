use chrono::NaiveDateTime;
use log::debug;

use crate::{config::Config, remote::Executor, schedule::ScheduleEntry, template, Error};

/// Job name tagging notebook jobs in the queue.
pub const JOB_NAME: &str = "notebook";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginTime {
    Now,
    At(NaiveDateTime),
}

impl BeginTime {
    /// Render in the form sbatch's `--begin` accepts.
    pub fn render(&self) -> String {
        match self {
            BeginTime::Now => "now".to_string(),
            BeginTime::At(when) => when.format("%Y-%m-%dT%H:%M").to_string(),
        }
    }
}

/// Resource parameters handed to the batch-job template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRequest {
    pub hours: u32,
    pub cpus: u32,
    pub mem_gb: u32,
    pub begin: BeginTime,
}

impl JobRequest {
    pub fn from_entry(entry: &ScheduleEntry, fire_time: NaiveDateTime) -> Self {
        JobRequest {
            hours: entry.hours(),
            cpus: entry.cpus(),
            mem_gb: entry.mem_gb(),
            begin: BeginTime::At(fire_time),
        }
    }
}

/// Fill in the sbatch template from the install directory, upload the
/// concrete batch script and submit it. Returns sbatch's stdout.
pub async fn submit(
    exec: &impl Executor,
    config: &Config,
    request: &JobRequest,
) -> Result<String, Error> {
    debug!("slurm::submit({request:?})");

    let template_text = exec.read_file(&config.template_path()).await?;

    let script = template::substitute(
        &template_text,
        &[
            ("INSTALL_PATH", config.install_path().to_string()),
            ("R_PORT", config.rstudio_port().to_string()),
            ("JUPYTER_PORT", config.jupyter_port().to_string()),
            ("PARTITION", config.partition().to_string()),
            ("HOURS", request.hours.to_string()),
            ("MEM_GB", request.mem_gb.to_string()),
            ("CPUS", request.cpus.to_string()),
            ("BEGIN", request.begin.render()),
        ],
    );

    exec.write_file(&config.sbatch_path(), &script).await?;

    let output = exec
        .output(&format!("sbatch '{}'", config.sbatch_path()))
        .await?;

    Ok(String::from_utf8_lossy(&output).to_string())
}

/// Job ids of this tool's pending notebook jobs, one per line from squeue.
pub async fn pending_job_ids(exec: &impl Executor) -> Result<Vec<String>, Error> {
    let output = exec
        .output(&format!(
            "squeue --user $USER --name {JOB_NAME} --noheader --format %i --states PD"
        ))
        .await?;

    Ok(String::from_utf8_lossy(&output)
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Best-effort cancellation of the given job ids. A no-op for an empty list.
pub async fn cancel_jobs(exec: &impl Executor, job_ids: &[String]) -> Result<(), Error> {
    if job_ids.is_empty() {
        return Ok(());
    }

    debug!("slurm::cancel_jobs({job_ids:?})");

    exec.output(&format!("scancel {}", job_ids.join(" "))).await?;

    Ok(())
}
