//! Deployed-address book.
//!
//! A small JSON file (`{"localhost": "0x..."}`) that survives restarts so a
//! freshly deployed local verifier does not have to be re-entered every
//! session. Only the dev network's entry is applied; the deploy tooling may
//! write other networks into the same file and those are left alone.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use alloy_primitives::Address;
use anyhow::{Context, Result};

#[derive(Debug, Default)]
pub struct AddressBook {
    entries: BTreeMap<String, String>,
}

impl AddressBook {
    /// Key of the runtime-mutable dev entry.
    pub const DEV_NETWORK: &'static str = "localhost";

    /// Load the book from `path`. A missing file is an empty book.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };

        let entries = serde_json::from_str(&raw)
            .with_context(|| format!("parsing address book {}", path.display()))?;
        Ok(Self { entries })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// All entries, keyed by network name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn dev(&self) -> Option<&str> {
        self.entries.get(Self::DEV_NETWORK).map(String::as_str)
    }

    pub fn set_dev(&mut self, address: Address) {
        self.entries
            .insert(Self::DEV_NETWORK.to_string(), address.to_string());
    }
}
