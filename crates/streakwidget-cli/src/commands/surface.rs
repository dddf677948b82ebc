use clap::Subcommand;
use streakwidget_core::{surface::SurfaceRenderer, Config, SurfaceId};

use super::open_scheduler;

#[derive(Subcommand)]
pub enum SurfaceAction {
    /// Place a surface and draw the current streak on it
    Attach {
        /// Surface id
        id: SurfaceId,
    },
    /// Remove a surface
    Detach {
        /// Surface id
        id: SurfaceId,
    },
    /// List attached surface ids
    List,
    /// Show what a surface currently displays
    Show {
        /// Surface id
        id: SurfaceId,
    },
}

pub fn run(action: SurfaceAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let scheduler = open_scheduler(&config, None)?;
    let surfaces = scheduler.surfaces();

    match action {
        SurfaceAction::Attach { id } => {
            if !surfaces.attach(id)? {
                println!("surface {id} already attached");
            }
            let status = scheduler.on_update(&[id]);
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        SurfaceAction::Detach { id } => {
            if surfaces.detach(id)? {
                println!("surface {id} detached");
            } else {
                eprintln!("surface {id} is not attached");
                std::process::exit(1);
            }
        }
        SurfaceAction::List => {
            let ids = surfaces.surface_ids()?;
            println!("{}", serde_json::to_string_pretty(&ids)?);
        }
        SurfaceAction::Show { id } => match surfaces.read(id)? {
            Some(file) => println!("{}", serde_json::to_string_pretty(&file)?),
            None => {
                eprintln!("surface {id} is not attached");
                std::process::exit(1);
            }
        },
    }
    Ok(())
}
