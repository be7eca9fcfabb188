use clap::Subcommand;

use crate::workspace::{runtime, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Show failed write-backs waiting for a retry
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Retry every failed write-back once
    Retry,
}

pub fn run(action: SyncAction) -> CmdResult {
    let mut ws = Workspace::open()?;
    let mut boundary = ws.boundary()?;

    match action {
        SyncAction::Status { json } => {
            let entries = boundary.outbox().entries();
            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
                return Ok(());
            }
            println!("pending: {}", boundary.status().pending_count);
            for entry in entries {
                println!(
                    "  {} {:<16} attempts={} {}",
                    entry.failed_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.operation.name(),
                    entry.attempts,
                    entry.last_error
                );
            }
            Ok(())
        }
        SyncAction::Retry => {
            if boundary.outbox().is_empty() {
                println!("nothing to retry");
                return Ok(());
            }
            let result = runtime()?.block_on(boundary.retry_pending(&mut ws.session));
            ws.save()?;
            let report = result?;
            println!("{} succeeded, {} failed", report.succeeded, report.failed);
            if report.failed > 0 {
                return Err(format!("{} write-backs still pending", report.failed).into());
            }
            Ok(())
        }
    }
}
