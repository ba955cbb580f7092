use std::{path::PathBuf, process};

use chrono::Local;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use libnbsched::{
    commands,
    config::Config,
    remote::{Executor, LocalExec, SshExec},
    schedule::entry,
    slurm::{BeginTime, JobRequest},
    Error,
};

#[derive(Parser)]
#[command(name = "nbsched")]
#[command(about = "Schedule notebook server jobs on a slurm cluster", long_about = None)]
struct Cli {
    /// Config file (default: ./nbsched.toml, then nbsched/nbsched.toml in the
    /// user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where cluster commands run
    #[arg(long, global = true, value_enum, default_value = "remote")]
    context: Context,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Context {
    /// Reach the cluster over ssh
    Remote,
    /// Run cluster commands on this machine (use when already on the cluster)
    Local,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the schedule wholesale, cancel pending jobs and queue up the
    /// first slot
    Reset {
        /// Schedule file to upload
        schedule: PathBuf,
    },

    /// Submit the next scheduled job and persist the residual schedule
    RunNext,

    /// Submit a notebook job immediately, outside of normal scheduling
    RunNow {
        /// Walltime, e.g. 4 or 4h
        hours: Option<String>,

        /// Cpu count
        cpus: Option<String>,

        /// Memory in gigabytes, e.g. 8 or 8gb
        mem_gb: Option<String>,
    },

    /// Print the current schedule and the next fire time
    Get,
}

async fn dispatch(
    command: Commands,
    exec: &impl Executor,
    config: &Config,
) -> Result<(), Error> {
    let now = Local::now().naive_local();

    match command {
        Commands::Reset { schedule } => commands::reset(exec, config, &schedule, now).await,

        Commands::RunNext => commands::run_next(exec, config, now).await,

        Commands::RunNow {
            hours,
            cpus,
            mem_gb,
        } => {
            let defaults = config.defaults();

            let request = JobRequest {
                hours: match hours {
                    Some(text) => entry::parse_hours(&text)?,
                    None => defaults.hours,
                },
                cpus: match cpus {
                    Some(text) => entry::parse_cpus(&text)?,
                    None => defaults.cpus,
                },
                mem_gb: match mem_gb {
                    Some(text) => entry::parse_mem_gb(&text)?,
                    None => defaults.mem_gb,
                },
                begin: BeginTime::Now,
            };

            commands::run_now(exec, config, &request).await
        }

        Commands::Get => {
            println!("{}", commands::get(exec, config, now).await?);
            Ok(())
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.context {
        Context::Remote => {
            dispatch(
                cli.command,
                &SshExec::new(config.ssh_host()),
                &config,
            )
            .await
        }
        Context::Local => dispatch(cli.command, &LocalExec, &config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    stderrlog::new()
        .verbosity(cli.verbose as usize + 1)
        .init()
        .expect("no other logger is installed");

    if let Err(error) = run(cli).await {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}
