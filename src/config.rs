//! Resolver configuration.
//!
//! The controller index is discovered outside this crate, by matching a
//! controller name against the kernel's live controller list, and handed to
//! [`crate::cgroup::TaskCgroupResolver::new`] explicitly. Index `0` is the
//! accepted fallback when discovery fails.

use std::str::FromStr;

use crate::cgroup::{Controller, MAX_KNOWN_CONTROLLER_INDEX};

/// Environment variable read by [`ResolverConfig::from_env`].
pub const CONTROLLER_ENV_VAR: &str = "CGROUP_IDENTITY_CONTROLLER";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid controller `{0}`: expected an index or a controller name")]
    InvalidController(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Position of the tracked controller in a task's css_set.
    pub controller_index: u32,
}

impl ResolverConfig {
    pub fn new(controller_index: u32) -> Self {
        Self { controller_index }
    }

    pub fn for_controller(controller: Controller) -> Self {
        Self::new(controller.index())
    }

    /// Reads the controller from [`CONTROLLER_ENV_VAR`], falling back to
    /// index `0` if it is unset or invalid.
    ///
    /// This is a startup helper for the embedding program. The environment is
    /// read once, here; the resolver only ever sees the returned value through
    /// [`crate::cgroup::TaskCgroupResolver::new`] and never consults the
    /// environment while resolving.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(CONTROLLER_ENV_VAR).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };

        match value.parse::<Self>() {
            Ok(config) => {
                if config.controller_index > MAX_KNOWN_CONTROLLER_INDEX {
                    log::warn!(
                        "Controller index {} exceeds the highest known index {}, cgroup resolution will fail",
                        config.controller_index,
                        MAX_KNOWN_CONTROLLER_INDEX
                    );
                }
                config
            }
            Err(err) => {
                log::warn!("{err}, falling back to controller index 0");
                Self::default()
            }
        }
    }
}

impl FromStr for ResolverConfig {
    type Err = Error;

    /// Parses either a numeric controller index or a controller name as listed
    /// in `/proc/cgroups`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<u32>() {
            return Ok(Self::new(index));
        }

        Controller::from_name(s)
            .map(Self::for_controller)
            .ok_or_else(|| Error::InvalidController(s.to_owned()))
    }
}
