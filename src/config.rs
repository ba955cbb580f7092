use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{schedule::EntryDefaults, Error};

/// Validated tool configuration.
#[derive(Debug, Clone)]
pub struct Config {
    ssh_host: String,
    install_path: String,
    partition: String,
    jupyter_port: u16,
    rstudio_port: u16,
    defaults: EntryDefaults,
}

impl Config {
    pub fn ssh_host(&self) -> &str {
        &self.ssh_host
    }

    pub fn install_path(&self) -> &str {
        &self.install_path
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn jupyter_port(&self) -> u16 {
        self.jupyter_port
    }

    pub fn rstudio_port(&self) -> u16 {
        self.rstudio_port
    }

    pub fn defaults(&self) -> EntryDefaults {
        self.defaults
    }

    /// Persisted schedule slot in the install directory.
    pub fn schedule_path(&self) -> String {
        format!("{}/current_schedule.csv", self.install_path)
    }

    pub fn template_path(&self) -> String {
        format!("{}/notebook.template.sbatch", self.install_path)
    }

    pub fn sbatch_path(&self) -> String {
        format!("{}/notebook.sbatch", self.install_path)
    }

    /// Load configuration from `explicit` if given, otherwise from the first
    /// existing candidate of `./nbsched.toml` and
    /// `<user config dir>/nbsched/nbsched.toml`.
    pub fn load(explicit: Option<&Path>) -> Result<Config, Error> {
        if let Some(path) = explicit {
            return Config::from_toml(&fs::read_to_string(path)?);
        }

        for candidate in Config::search_paths() {
            if candidate.is_file() {
                return Config::from_toml(&fs::read_to_string(candidate)?);
            }
        }

        Err(Error::ConfigNotFoundError)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("nbsched.toml")];

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("nbsched").join("nbsched.toml"));
        }

        paths
    }

    pub fn from_toml(text: &str) -> Result<Config, Error> {
        match ConfigFile::get_version(text)? {
            1 => toml::from_str::<ConfigFileV1>(text)
                .map_err(|e| Error::ParseError(e.to_string()))?
                .try_into(),
            _ => Err(Error::UnsupportedConfigVersionError),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    config_version: usize,
}

impl ConfigFile {
    fn get_version(text: &str) -> Result<usize, Error> {
        match toml::from_str::<ConfigFile>(text)
            .map_err(|e| Error::ParseError(e.to_string()))?
            .config_version
        {
            version @ 1 => Ok(version),
            _ => Err(Error::UnsupportedConfigVersionError),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFileV1 {
    #[allow(dead_code)]
    config_version: usize,
    ssh_host: Option<String>,
    install_path: String,
    partition: Option<String>,
    jupyter_port: u16,
    rstudio_port: u16,
    defaults: Option<DefaultsV1>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct DefaultsV1 {
    hours: Option<u32>,
    cpus: Option<u32>,
    mem_gb: Option<u32>,
}

impl TryFrom<ConfigFileV1> for Config {
    type Error = Error;

    fn try_from(value: ConfigFileV1) -> Result<Self, Error> {
        let base = EntryDefaults::default();

        let defaults = match value.defaults {
            Some(overrides) => EntryDefaults {
                hours: overrides.hours.unwrap_or(base.hours),
                cpus: overrides.cpus.unwrap_or(base.cpus),
                mem_gb: overrides.mem_gb.unwrap_or(base.mem_gb),
            },
            None => base,
        };

        if defaults.hours == 0 || defaults.cpus == 0 || defaults.mem_gb == 0 {
            return Err(Error::ParseError(
                "[defaults] values must be positive".to_string(),
            ));
        }

        Ok(Config {
            ssh_host: value.ssh_host.unwrap_or("sherlock".to_string()),
            install_path: value.install_path,
            partition: value.partition.unwrap_or("normal".to_string()),
            jupyter_port: value.jupyter_port,
            rstudio_port: value.rstudio_port,
            defaults,
        })
    }
}
