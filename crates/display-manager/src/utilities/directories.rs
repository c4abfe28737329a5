use std::{
    fs::create_dir_all,
    io::{self, ErrorKind},
    path::PathBuf,
};

/// Path to the config directory, created if missing.
pub fn config_dir() -> io::Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "No config directory for this user"))?
        .join("Display Manager");

    create_dir_all(&dir)?;

    Ok(dir)
}
