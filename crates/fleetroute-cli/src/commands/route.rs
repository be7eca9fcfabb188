//! Manual route commands.
//!
//! Positions are 1-based on the command line.

use clap::Subcommand;
use fleetroute_core::RouteMetadata;

use crate::workspace::{runtime, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum RouteAction {
    /// Show the route in order
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append a job to the route
    Add { job_id: String },
    /// Remove a job from the route
    Remove { job_id: String },
    /// Move the job at FROM to position TO
    Move { from: usize, to: usize },
    /// Assign a driver (omit the id to unassign)
    Driver { id: Option<String> },
    /// Assign a vehicle (omit the id to unassign)
    Vehicle { id: Option<String> },
    /// Empty the route
    Clear,
    /// Save the route under a name
    Save {
        name: String,
        /// Driver for this save, overriding the assigned one
        #[arg(long)]
        driver: Option<String>,
        /// Vehicle for this save, overriding the assigned one
        #[arg(long)]
        vehicle: Option<String>,
    },
}

fn to_index(position: usize) -> CmdResult<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| "positions start at 1".into())
}

pub fn run(action: RouteAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        RouteAction::Show { json } => {
            let route = ws.session.route();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "jobs": route.jobs(),
                        "driver_id": route.driver_id(),
                        "vehicle_id": route.vehicle_id(),
                        "estimated_duration_min": route.estimate_duration(),
                    }))?
                );
                return Ok(());
            }
            if route.is_empty() {
                println!("route is empty");
                return Ok(());
            }
            for job in route.jobs() {
                println!("{:>3}. {:<12} {}", job.priority.unwrap_or_default(), job.id, job.title);
            }
            println!("driver:   {}", route.driver_id().unwrap_or("-"));
            println!("vehicle:  {}", route.vehicle_id().unwrap_or("-"));
            println!("estimate: {} min", route.estimate_duration());
            return Ok(());
        }
        RouteAction::Add { job_id } => {
            if ws.session.add_to_route(&job_id)? {
                println!("added {job_id} at position {}", ws.session.route().len());
            } else {
                println!("{job_id} is already on the route");
            }
        }
        RouteAction::Remove { job_id } => {
            if ws.session.remove_from_route(&job_id) {
                println!("removed {job_id}");
            } else {
                println!("{job_id} is not on the route");
            }
        }
        RouteAction::Move { from, to } => {
            ws.session.move_in_route(to_index(from)?, to_index(to)?)?;
            println!("moved {from} -> {to}");
        }
        RouteAction::Driver { id } => {
            ws.session.assign_driver(id);
            println!("driver: {}", ws.session.route().driver_id().unwrap_or("-"));
        }
        RouteAction::Vehicle { id } => {
            ws.session.assign_vehicle(id);
            println!("vehicle: {}", ws.session.route().vehicle_id().unwrap_or("-"));
        }
        RouteAction::Clear => {
            ws.session.clear_route();
            println!("route cleared");
        }
        RouteAction::Save {
            name,
            driver,
            vehicle,
        } => {
            let metadata = RouteMetadata {
                name,
                driver_id: driver,
                vehicle_id: vehicle,
            };
            let mut boundary = ws.boundary()?;
            let result = runtime()?.block_on(boundary.save_route(&mut ws.session, &metadata));
            ws.save()?;
            let draft = result?;
            println!(
                "route '{}' saved: {} jobs, ~{} min",
                draft.name,
                draft.job_ids.len(),
                draft.estimated_duration_min
            );
            return Ok(());
        }
    }

    ws.save()
}
