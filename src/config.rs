use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::store::DEFAULT_DB_PATH;

/// Local-first task and habit planner backend.
#[derive(Debug, Clone, Parser)]
#[command(name = "planora", version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "PLANORA_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// JSON file holding tasks and habits
    #[arg(long = "data", env = "PLANORA_DATA", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Directory with the display layer's static files
    #[arg(long, env = "PLANORA_STATIC", default_value = "static")]
    pub static_dir: PathBuf,
}
