use std::path::{Path, PathBuf};

use anyhow::bail;
use scheduler::ScheduleManager;

mod rejection;
mod service;
#[cfg(test)]
pub mod test_utils;

pub use rejection::{FallbackRoom, Rejection};

pub const CONFIG_ENV: &str = "SCHEDULER_CONFIG";

pub struct SchedulingService {
    manager: ScheduleManager,
}

/// Locate the config file.
///
/// We first try the `SCHEDULER_CONFIG` env var, then "./scheduler.yml",
/// then "~/.config/scheduler.yml", then "/etc/scheduler.yml".
pub fn find_config_file() -> Result<PathBuf, anyhow::Error> {
    if let Ok(filename) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(filename));
    }

    let home = shellexpand::tilde("~/.config/scheduler.yml");
    let candidates = [
        Path::new("./scheduler.yml"),
        Path::new(home.as_ref()),
        Path::new("/etc/scheduler.yml"),
    ];
    match candidates.iter().find(|p| p.exists()) {
        Some(p) => Ok(p.to_path_buf()),
        None => bail!("no config file found"),
    }
}
