//! Lasso drawing commands.
//!
//! The gesture lives in the saved session, so a press, any number of moves
//! and a release can be issued as separate invocations.

use clap::Subcommand;
use fleetroute_core::{Cluster, Coordinate, GesturePhase};

use crate::workspace::{CmdResult, Workspace};

#[derive(Subcommand)]
pub enum DrawAction {
    /// Enter draw mode
    Start,
    /// Leave draw mode, discarding any circle in progress
    Stop,
    /// Press the pointer at a point ("lat,lng")
    Press {
        #[arg(allow_hyphen_values = true)]
        at: Coordinate,
    },
    /// Drag the pointer to a point ("lat,lng")
    Move {
        #[arg(allow_hyphen_values = true)]
        to: Coordinate,
    },
    /// Release the pointer, committing the circle
    Release,
    /// Discard the circle in progress and leave draw mode
    Cancel,
    /// Draw a whole circle in one step: press at CENTER, release at EDGE
    Circle {
        #[arg(allow_hyphen_values = true)]
        center: Coordinate,
        #[arg(allow_hyphen_values = true)]
        edge: Coordinate,
    },
    /// Show draw mode and the circle in progress
    Status,
}

pub fn run(action: DrawAction) -> CmdResult {
    let mut ws = Workspace::open()?;
    let session = &mut ws.session;

    match action {
        DrawAction::Start => {
            session.set_draw_mode(true);
            println!("draw mode on");
        }
        DrawAction::Stop => {
            session.set_draw_mode(false);
            println!("draw mode off");
        }
        DrawAction::Press { at } => {
            if !session.draw_mode() {
                return Err("draw mode is off (run `draw start` first)".into());
            }
            if !session.pointer_down(at) {
                return Err("a circle is already being drawn".into());
            }
            println!("drawing from {at}");
        }
        DrawAction::Move { to } => match session.pointer_move(to) {
            Some(circle) => println!("radius {:.0} m", circle.radius_m),
            None => return Err("no circle in progress".into()),
        },
        DrawAction::Release => {
            if !session.gesture().is_drawing() {
                return Err("no circle in progress".into());
            }
            let cluster = session.pointer_up();
            report_release(cluster, session.gesture().min_radius_m());
        }
        DrawAction::Cancel => {
            if session.cancel_draw() {
                println!("drawing cancelled");
            } else {
                println!("nothing to cancel");
            }
        }
        DrawAction::Circle { center, edge } => {
            session.set_draw_mode(true);
            if !session.pointer_down(center) {
                return Err("a circle is already being drawn".into());
            }
            session.pointer_move(edge);
            let cluster = session.pointer_up();
            report_release(cluster, session.gesture().min_radius_m());
        }
        DrawAction::Status => {
            println!("draw mode: {}", if session.draw_mode() { "on" } else { "off" });
            match session.gesture().phase() {
                GesturePhase::Drawing { start, radius_m, .. } => {
                    println!("drawing: center {start}, radius {radius_m:.0} m");
                }
                _ => println!("drawing: none"),
            }
            return Ok(());
        }
    }

    ws.save()
}

fn report_release(cluster: Option<Cluster>, min_radius_m: f64) {
    match cluster {
        Some(c) => {
            println!(
                "cluster #{} ({}) with {} jobs: {}",
                c.number,
                c.color,
                c.member_ids.len(),
                c.member_ids.join(", ")
            );
        }
        None => println!(
            "no cluster created (circle under {min_radius_m:.0} m or no pending jobs inside)"
        ),
    }
}
