//! Cluster commands: confirm and complete write back to the job store.

use clap::Subcommand;

use crate::workspace::{runtime, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum ClusterAction {
    /// List clusters in this session
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Confirm a cluster: members become grouped with priorities 1..N
    Confirm {
        /// Cluster number as shown by `cluster list`
        number: u32,
    },
    /// Complete grouped jobs (all of them, or one cluster's)
    Complete {
        /// Only complete this cluster's members
        #[arg(long)]
        number: Option<u32>,
    },
    /// Forget all clusters; job statuses are left as they are
    Clear,
}

pub fn run(action: ClusterAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        ClusterAction::List { json } => {
            let clusters = ws.session.clusters().clusters();
            if json {
                println!("{}", serde_json::to_string_pretty(clusters)?);
            } else if clusters.is_empty() {
                println!("no clusters");
            } else {
                for c in clusters {
                    println!(
                        "#{:<3} {:<9} {:<8} r={:.0}m  {}",
                        c.number,
                        format!("{:?}", c.state).to_lowercase(),
                        c.color,
                        c.circle.radius_m,
                        c.member_ids.join(", ")
                    );
                }
            }
            return Ok(());
        }
        ClusterAction::Confirm { number } => {
            let cluster_id = ws.session.cluster_id_by_number(number)?;
            let mut boundary = ws.boundary()?;
            let result =
                runtime()?.block_on(boundary.confirm_cluster(&mut ws.session, &cluster_id));
            // Local state is kept even when the write-back failed.
            ws.save()?;
            match result? {
                Some(confirmation) => {
                    println!("cluster #{number} confirmed");
                    for job in &confirmation.grouped {
                        println!("  {}. {}", job.priority.unwrap_or_default(), job.id);
                    }
                    println!("{} jobs still pending", confirmation.remaining.len());
                }
                None => println!("cluster #{number} was already confirmed"),
            }
            return Ok(());
        }
        ClusterAction::Complete { number } => {
            let cluster_id = number
                .map(|n| ws.session.cluster_id_by_number(n))
                .transpose()?;
            let mut boundary = ws.boundary()?;
            let result = runtime()?.block_on(async {
                match &cluster_id {
                    Some(id) => boundary.complete_cluster(&mut ws.session, id).await,
                    None => boundary.complete_grouped(&mut ws.session).await,
                }
            });
            ws.save()?;
            let completion = result?;
            println!(
                "completed {} jobs, {} still pending",
                completion.completed_ids.len(),
                completion.remaining.len()
            );
            return Ok(());
        }
        ClusterAction::Clear => {
            let count = ws.session.clear_clusters();
            println!("cleared {count} clusters");
        }
    }

    ws.save()
}
