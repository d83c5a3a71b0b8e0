//! Profile Store
//!
//! Owns the loaded profiles, the name of the active profile and the
//! [`Connection`] materialized from it.
//!
//! # Invariants
//! - `current` is empty only while no profiles are loaded; otherwise it names
//!   a loaded profile
//! - `connection` is built from `profiles[current]`, or is
//!   [`Connection::Null`] when nothing is loaded or activation failed during
//!   [`ProfileStore::load`]
//! - [`ProfileStore::switch`] is all-or-nothing

use std::path::Path;

use tracing::{debug, warn};

use crate::config::{
    parse_profiles, read_config, render_profiles, write_config, ProfileMap, SaveTarget,
    StoredProfile, DEFAULT_PROFILE,
};
use crate::engine::{ClientProvider, Connection};
use crate::error::{RdslineError, Result};

/// Named connection profiles plus the active connection
pub struct ProfileStore {
    profiles: ProfileMap,
    current: String,
    connection: Connection,
    initial_profile: Option<String>,
    provider: Box<dyn ClientProvider>,
}

impl ProfileStore {
    /// Create an empty store; connections are built through `provider`
    pub fn new(provider: impl ClientProvider + 'static) -> Self {
        Self {
            profiles: ProfileMap::new(),
            current: String::new(),
            connection: Connection::Null,
            initial_profile: None,
            provider: Box::new(provider),
        }
    }

    /// Profile to activate on [`ProfileStore::load`] (falls back to the first one)
    #[must_use]
    pub fn with_initial_profile(mut self, name: impl Into<String>) -> Self {
        self.initial_profile = Some(name.into());
        self
    }

    /// Read and load a configuration file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        debug!("Reading configuration file from: {}", path.display());
        let contents = read_config(path)?;
        self.load(&contents)
    }

    /// Load the per-user file if it exists, deciding where profiles may be saved
    ///
    /// A missing file is fine and becomes the save target. A file that cannot
    /// be read or parsed is skipped with a warning and must not be
    /// overwritten, so saving is refused. Activation errors are returned after
    /// the profiles are loaded; the file stays the save target.
    pub fn load_default_file(&mut self, path: &Path) -> (SaveTarget, Option<RdslineError>) {
        if !path.exists() {
            debug!("No configuration found at {}", path.display());
            return (SaveTarget::File(path.to_path_buf()), None);
        }

        match self.load_file(path) {
            Ok(()) => (SaveTarget::File(path.to_path_buf()), None),
            Err(e) if e.is_unreadable_config() => {
                warn!("Ignoring configuration file {}: {}", path.display(), e.message());
                let reason = format!(
                    "{} could not be loaded ({}); fix or move it before adding profiles",
                    path.display(),
                    e.message()
                );
                (SaveTarget::Unavailable(reason), None)
            }
            Err(e) => (SaveTarget::File(path.to_path_buf()), Some(e)),
        }
    }

    /// Replace the loaded profiles with those parsed from `contents`
    ///
    /// On a parse error the store is left untouched. If the selected profile
    /// fails to activate, the profiles stay loaded, the selected name stays
    /// current and the null connection stays active; the activation error is
    /// returned.
    pub fn load(&mut self, contents: &str) -> Result<()> {
        let profiles = parse_profiles(contents)?;

        self.profiles = profiles;
        self.current.clear();
        self.connection = Connection::Null;

        let Some(name) = self.initial_target() else {
            debug!("No profiles configured. Set to null connection");
            return Ok(());
        };

        self.current.clone_from(&name);
        let config = self.profiles[&name].resolve(&name)?;
        self.connection = Connection::from_config(&config, self.provider.as_ref())?;
        Ok(())
    }

    fn initial_target(&self) -> Option<String> {
        let requested = self.initial_profile.as_deref().unwrap_or(DEFAULT_PROFILE);
        if self.profiles.contains_key(requested) {
            return Some(requested.to_string());
        }

        let first = self.profiles.keys().next().cloned();
        if let (Some(explicit), Some(fallback)) = (&self.initial_profile, &first) {
            warn!("Profile '{explicit}' not found in config, using '{fallback}'");
        }
        first
    }

    /// Make `name` the active profile
    ///
    /// On any failure the previous profile and connection stay active.
    pub fn switch(&mut self, name: &str) -> Result<()> {
        let stored = self
            .profiles
            .get(name)
            .ok_or_else(|| RdslineError::profile_not_found(name))?;
        let config = stored.resolve(name)?;
        let connection = Connection::from_config(&config, self.provider.as_ref())?;

        self.connection = connection;
        self.current = name.to_string();
        Ok(())
    }

    /// Insert a validated profile without activating it
    pub fn add(&mut self, name: &str, profile: StoredProfile) -> Result<()> {
        if name.trim().is_empty() {
            return Err(RdslineError::invalid_input("Profile name cannot be empty"));
        }
        if self.profiles.contains_key(name) {
            return Err(RdslineError::duplicate_profile(name));
        }
        profile.resolve(name)?;

        self.profiles.insert(name.to_string(), profile);
        Ok(())
    }

    /// [`ProfileStore::add`] then [`ProfileStore::persist`]; a failed write
    /// removes the profile again.
    pub fn add_and_persist(&mut self, name: &str, profile: StoredProfile, path: &Path) -> Result<()> {
        self.add(name, profile)?;
        if let Err(e) = self.persist(path) {
            self.profiles.shift_remove(name);
            return Err(e);
        }
        Ok(())
    }

    /// Write all profiles to `path` in the multi-profile shape, overwriting it
    pub fn persist(&self, path: &Path) -> Result<()> {
        debug!("Writing {} profile(s) to {}", self.profiles.len(), path.display());
        write_config(path, &render_profiles(&self.profiles)?)
    }

    /// Profile names in file/insertion order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Name of the active profile (empty when none is loaded)
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&StoredProfile> {
        self.profiles.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("profiles", &self.names())
            .field("current", &self.current)
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}
