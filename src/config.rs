//! Run profiles: connection settings, source list, and check expectations.
//!
//! A profile is a small YAML document so a recurring merge can be captured in
//! the repository next to its dump files. Every connection field except the
//! database name has a default, and `merge` flags override whatever the
//! profile says.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::cli::MergeArgs;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const DEFAULT_COLLATION: &str = "utf8mb4_unicode_ci";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    pub name: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_collation")]
    pub collation: String,
}

impl DbSettings {
    pub fn named(name: String) -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            user: default_user(),
            password: None,
            name,
            charset: default_charset(),
            collation: default_collation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProfile {
    pub database: DbSettings,
    /// SQL dump files to merge, applied in order.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Tables the `check` command expects to find in the target schema.
    #[serde(default)]
    pub required_tables: Vec<String>,
}

impl RunProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening run profile {path:?}"))?;
        let profile = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing run profile {path:?}"))?;
        Ok(profile)
    }

    /// Builds the effective profile for a merge run: the optional YAML profile
    /// first, then flag overrides, then the flag-supplied sources appended to
    /// the profile's list.
    pub fn resolve(args: &MergeArgs) -> Result<Self> {
        let mut profile = match &args.config {
            Some(path) => Self::load(path)?,
            None => {
                let Some(name) = args.database.clone() else {
                    bail!("Either --config or --database is required");
                };
                RunProfile {
                    database: DbSettings::named(name),
                    sources: Vec::new(),
                    required_tables: Vec::new(),
                }
            }
        };

        if let Some(host) = &args.host {
            profile.database.host = host.clone();
        }
        if let Some(port) = args.port {
            profile.database.port = port;
        }
        if let Some(user) = &args.user {
            profile.database.user = user.clone();
        }
        if let Some(password) = &args.password {
            profile.database.password = Some(password.clone());
        }
        if let Some(database) = &args.database {
            profile.database.name = database.clone();
        }
        profile.sources.extend(args.sources.iter().cloned());
        if profile.sources.is_empty() {
            bail!("No source files specified; pass --source or list sources in the run profile");
        }
        Ok(profile)
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

fn default_collation() -> String {
    DEFAULT_COLLATION.to_string()
}
