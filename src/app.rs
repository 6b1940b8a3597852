use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Durable client state: one slot holding the bearer token.
///
/// Absence of the file, or of the key, means unauthenticated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppState {
    pub token: Option<String>,
}

impl AppState {
    fn config_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("io", "chatline", "chatline")?;
        Some(proj.config_dir().join("session.toml"))
    }

    /// Loads the persisted state, falling back to the default on any
    /// missing or unreadable file.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config dir"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, toml)
    }

    pub fn store_token(&mut self, token: String) -> io::Result<()> {
        self.token = Some(token);
        self.save()
    }

    pub fn clear_token(&mut self) -> io::Result<()> {
        self.token = None;
        self.save()
    }
}
