//! Profile documents that seed a session's state.
//!
//! A profile is JSON of the form `{"state": {...}}`. Only the `state` object
//! is used. Resolution order is the override file, then the bundled default,
//! then an empty profile; each fallback is logged.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde_json::Value as JsonValue;

use crate::state::StateValue;

/// Bundled default profile, an empty itinerary for a sample user.
pub const DEFAULT_PROFILE: &str = include_str!("../../profiles/itinerary_empty_default.json");
pub const DEFAULT_PROFILE_NAME: &str = "profiles/itinerary_empty_default.json";

/// The parsed `state` object of a profile document.
pub type ProfileState = BTreeMap<String, StateValue>;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed profile JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("profile has no \"state\" object")]
    MissingState,

    #[error("profile \"state\" must be an object")]
    StateNotObject,
}

/// Parse a profile document and return its `state` object.
pub fn parse_profile(text: &str) -> Result<ProfileState, ProfileError> {
    let root: JsonValue = serde_json::from_str(text)?;
    match root.get("state") {
        None | Some(JsonValue::Null) => Err(ProfileError::MissingState),
        Some(JsonValue::Object(state)) => Ok(state
            .iter()
            .map(|(k, v)| (k.clone(), StateValue::from(v.clone())))
            .collect()),
        Some(_) => Err(ProfileError::StateNotObject),
    }
}

/// Read and parse a profile file.
pub fn read_profile(path: &Path) -> Result<ProfileState, ProfileError> {
    if !path.exists() {
        return Err(ProfileError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile(&text)
}

/// Resolves and caches the profile used to bootstrap sessions.
///
/// The document is loaded once per loader; a different override path needs
/// a new loader.
#[derive(Debug)]
pub struct ProfileLoader {
    override_path: Option<PathBuf>,
    default_document: Option<Cow<'static, str>>,
    cached: OnceLock<Arc<ProfileState>>,
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::bundled()
    }
}

impl ProfileLoader {
    /// Loader backed by the bundled default profile.
    pub fn bundled() -> Self {
        Self {
            override_path: None,
            default_document: Some(Cow::Borrowed(DEFAULT_PROFILE)),
            cached: OnceLock::new(),
        }
    }

    /// Prefer the file at `path` when it exists and parses. Blank paths are ignored.
    pub fn with_override_path(mut self, path: Option<PathBuf>) -> Self {
        self.override_path = path.filter(|p| !p.as_os_str().is_empty());
        self.cached = OnceLock::new();
        self
    }

    /// Replace the built-in fallback document. `None` falls back to an empty profile.
    pub fn with_default_document(mut self, document: Option<impl Into<Cow<'static, str>>>) -> Self {
        self.default_document = document.map(Into::into);
        self.cached = OnceLock::new();
        self
    }

    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }

    /// The resolved profile. Never fails; problems are logged and degrade
    /// to the next source.
    pub fn load(&self) -> Arc<ProfileState> {
        Arc::clone(self.cached.get_or_init(|| Arc::new(self.resolve())))
    }

    fn resolve(&self) -> ProfileState {
        if let Some(path) = &self.override_path {
            match read_profile(path) {
                Ok(state) => {
                    tracing::info!(path = %path.display(), keys = state.len(), "loaded scenario profile");
                    return state;
                }
                Err(ProfileError::NotFound(_)) => {
                    tracing::warn!(
                        path = %path.display(),
                        "scenario path does not exist, falling back to default profile"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to load scenario, falling back to default profile"
                    );
                }
            }
        }

        let Some(document) = &self.default_document else {
            tracing::warn!(resource = DEFAULT_PROFILE_NAME, "default profile not found, using empty state");
            return ProfileState::new();
        };
        match parse_profile(document) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load default profile, using empty state");
                ProfileState::new()
            }
        }
    }
}
