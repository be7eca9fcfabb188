//! Job collection commands.

use std::path::PathBuf;

use clap::Subcommand;
use fleetroute_core::{Job, JobStatus};

use crate::workspace::{runtime, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum JobsAction {
    /// Replace the job collection with a JSON array from a file
    Import {
        /// Path to a JSON file holding `[Job]`
        file: PathBuf,
    },
    /// List jobs
    List {
        /// Filter by status (pending, grouped, completed)
        #[arg(long)]
        status: Option<JobStatus>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch the authoritative job list from the job store
    Pull,
}

pub fn run(action: JobsAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        JobsAction::Import { file } => {
            let content = std::fs::read_to_string(&file)?;
            let jobs: Vec<Job> = serde_json::from_str(&content)?;
            let count = jobs.len();
            ws.session.replace_jobs(jobs);
            println!("imported {count} jobs");
        }
        JobsAction::List { status, json } => {
            let jobs: Vec<&Job> = ws
                .session
                .jobs()
                .iter()
                .filter(|j| status.map_or(true, |s| j.status == s))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else if jobs.is_empty() {
                println!("no jobs");
            } else {
                for job in jobs {
                    let priority = job.priority.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
                    let location = job.location.map(|l| l.to_string()).unwrap_or_else(|| "-".into());
                    println!(
                        "{:<12} {:<9} {:>3}  {:<24} {}",
                        job.id, job.status, priority, location, job.title
                    );
                }
            }
            return Ok(());
        }
        JobsAction::Pull => {
            let mut boundary = ws.boundary()?;
            let count = runtime()?.block_on(boundary.refresh(&mut ws.session))?;
            println!("fetched {count} jobs");
        }
    }

    ws.save()
}
