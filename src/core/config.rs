//! Key-value configuration files stored beside the launcher binary
//!
//! One `key=value` pair per line, `#` lines and blank lines ignored.
//! Tunables are self-healing: an absent or unreadable file is rebuilt from
//! defaults and written back. Files with no usable default are required and
//! their absence is fatal.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::Error;

/// How a config file came into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Parsed from an existing file
    Loaded,
    /// File was absent or unreadable; rebuilt from defaults and persisted
    Seeded,
}

/// A named key-value store persisted as a properties-style text file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Load a required config file. There is nothing sensible to default
    /// to, so a missing or unreadable file is fatal.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Self {
                values: parse(&text),
                path,
            }),
            Err(source) => Err(Error::ConfigMissing { path, source }),
        }
    }

    /// Load a tunables file, rebuilding it from `defaults` when it cannot
    /// be read. A failed write-back of the defaults is fatal.
    pub fn load_or_seed(
        path: impl Into<PathBuf>,
        defaults: &[(&str, &str)],
    ) -> Result<(Self, LoadOutcome), Error> {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(text) => Ok((
                Self {
                    values: parse(&text),
                    path,
                },
                LoadOutcome::Loaded,
            )),
            Err(err) => {
                warn!(
                    "Config {} unreadable ({}), seeding defaults",
                    path.display(),
                    err
                );
                let mut config = Self {
                    path,
                    values: BTreeMap::new(),
                };
                for (key, value) in defaults {
                    config.set(key, value);
                }
                config.save()?;
                Ok((config, LoadOutcome::Seeded))
            }
        }
    }

    /// Stored value for `key`, or `fallback` when the key is absent.
    pub fn get<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(fallback)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Serialize back to disk, one pair per line in key order.
    pub fn save(&self) -> Result<(), Error> {
        fs::write(&self.path, serialize(&self.values)).map_err(|source| Error::ConfigPersist {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse(text: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            // last duplicate wins
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    values
}

fn serialize(values: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in values {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load(dir.path().join("program.properties"));
        assert!(matches!(result, Err(Error::ConfigMissing { .. })));
    }

    #[test]
    fn missing_tunables_are_seeded_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmemory.properties");

        let (config, outcome) =
            ConfigFile::load_or_seed(&path, &[("xmx", "1g")]).unwrap();
        assert_eq!(outcome, LoadOutcome::Seeded);
        assert_eq!(config.get("xmx", "fallback"), "1g");

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("xmx=1g"));
    }

    #[test]
    fn existing_tunables_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmemory.properties");
        fs::write(&path, "xmx=4g\n").unwrap();

        let (config, outcome) =
            ConfigFile::load_or_seed(&path, &[("xmx", "1g")]).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(config.get("xmx", "1g"), "4g");
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmemory.properties");

        let (mut config, _) = ConfigFile::load_or_seed(&path, &[]).unwrap();
        config.set("xmx", "2g");
        config.save().unwrap();

        let reloaded = ConfigFile::load(&path).unwrap();
        assert_eq!(reloaded.get("xmx", "1g"), "2g");
    }

    #[test]
    fn get_falls_back_for_absent_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmemory.properties");
        fs::write(&path, "xmx=2g\n").unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.get("timeout", "0"), "0");
    }

    #[test]
    fn parse_skips_comments_and_keeps_last_duplicate() {
        let values = parse("# heap size\n\nxmx=1g\nxmx = 2g \nnot a pair\n");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("xmx").unwrap(), "2g");
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let values = parse("extra=-Dfoo=bar\n");
        assert_eq!(values.get("extra").unwrap(), "-Dfoo=bar");
    }
}
