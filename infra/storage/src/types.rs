use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default permission bits for directories created by `make_dir`.
pub const DEFAULT_DIR_MODE: u32 = 0o777;
/// Default permission bits for parent directories created implicitly by `write`.
pub const DEFAULT_PARENT_MODE: u32 = 0o775;
/// Default storage root, relative to the working directory of the process.
pub const DEFAULT_ROOT: &str = "uploads";

/// Pixel dimensions of a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Embedded image metadata keyed by EXIF tag name.
pub type ExifData = BTreeMap<String, String>;

/// Options accepted by `make_dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirOptions {
    /// Permission bits (unix only; subject to the process umask).
    #[serde(deserialize_with = "deserialize_mode")]
    pub mode: u32,
    /// Create missing ancestors as well.
    pub recursive: bool,
}

impl Default for DirOptions {
    fn default() -> Self {
        Self { mode: DEFAULT_DIR_MODE, recursive: true }
    }
}

impl DirOptions {
    #[must_use]
    pub const fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Settings shared by every adapter kind, merged over the defaults.
///
/// Unknown keys are ignored so that filter options can live in the same map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    /// Root of the storage; every filename is resolved below it.
    pub path: PathBuf,
    /// Mode for parent directories created by `write`.
    #[serde(deserialize_with = "deserialize_mode")]
    pub dir_mode: u32,
    /// Remove stale temp files left by interrupted writes when the adapter is built.
    pub purge_stale: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_ROOT), dir_mode: DEFAULT_PARENT_MODE, purge_stale: true }
    }
}

/// Parses permission bits written as octal text: `"755"`, `"0755"` or `"0o755"`.
#[must_use]
pub fn parse_mode(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw.strip_prefix("0o").unwrap_or(raw);
    u32::from_str_radix(digits, 8).ok().filter(|mode| *mode <= 0o7777)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMode {
    Bits(u32),
    Octal(String),
}

fn deserialize_mode<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match RawMode::deserialize(deserializer)? {
        RawMode::Bits(bits) => Ok(bits),
        RawMode::Octal(raw) => parse_mode(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid octal mode '{raw}'"))),
    }
}
