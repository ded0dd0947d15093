//! Environment and configuration utilities.
//!
//! garc keeps account credentials in a TOML file, `~/.garc.toml` by
//! default. Each table in the file is a named profile:
//!
//! ```toml
//! [main]
//! user_account = "someone"
//! user_password = "hunter2"
//! user_agent = "0f8fad5b-d9cb-469f-a165-70867728950e"
//! ```

use crate::error::{Error, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::{env, fs};
use uuid::Uuid;

/// Environment variable holding the account name.
pub const ACCOUNT_ENV: &str = "GAB_USER_ACCOUNT";

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "GAB_USER_PASSWORD";

/// One named set of account settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Gab account name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_account: Option<String>,

    /// Gab account password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_password: Option<String>,

    /// Device identifier sent as the `User-Agent` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// A configuration file and the profiles it holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

impl ConfigFile {
    /// `~/.garc.toml`, if a home directory can be found.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".garc.toml"))
    }

    /// Reads the configuration file at `path`.
    ///
    /// A missing file is treated as an empty configuration.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let profiles = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("invalid config at {}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, profiles })
    }

    /// Reads the configuration file at `path`, or at the
    /// [default path](ConfigFile::default_path) if `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()
                .ok_or_else(|| Error::Config(String::from("could not determine home directory")))?,
        };
        Self::load(path)
    }

    /// Where the configuration is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The named profile, or an empty profile if there is none.
    pub fn profile(&self, name: &str) -> Profile {
        self.profiles.get(name).cloned().unwrap_or_default()
    }

    /// Replaces the named profile.
    pub fn set_profile(&mut self, name: impl Into<String>, profile: Profile) {
        self.profiles.insert(name.into(), profile);
    }

    /// Writes the configuration back to its file.
    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string(&self.profiles)
            .map_err(|e| Error::Config(format!("could not serialize config: {e}")))?;
        fs::write(&self.path, contents)
            .map_err(|e| Error::Config(format!("failed to write {}: {e}", self.path.display())))
    }
}

/// An account name and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    account: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credentials {{ account = {}, password = *** }}", self.account)
    }
}

impl Credentials {
    /// Creates credentials for an account.
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            password: password.into(),
        }
    }

    /// Finds credentials, preferring command-line values, then
    /// [`ACCOUNT_ENV`] and [`PASSWORD_ENV`], then `profile`.
    pub fn resolve(account: Option<&str>, password: Option<&str>, profile: &Profile) -> Result<Self> {
        let account = pick(account, ACCOUNT_ENV, profile.user_account.as_deref())
            .ok_or_else(|| Error::MissingCredentials(String::from("user account")))?;
        let password = pick(password, PASSWORD_ENV, profile.user_password.as_deref())
            .ok_or_else(|| Error::MissingCredentials(String::from("user password")))?;
        Ok(Self { account, password })
    }

    /// The account name.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The account password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

fn pick(flag: Option<&str>, envvar: &str, stored: Option<&str>) -> Option<String> {
    flag.map(String::from)
        .or_else(|| env::var(envvar).ok())
        .or_else(|| stored.map(String::from))
        .filter(|value| !value.is_empty())
}

/// Prompts for an account name and password and stores them in the named
/// profile, keeping the rest of the configuration intact.
pub fn input_keys(
    config: &mut ConfigFile,
    profile_name: &str,
    input: &mut impl BufRead,
    prompt: &mut impl Write,
) -> Result<Profile> {
    let mut profile = config.profile(profile_name);
    profile.user_account = Some(ask(input, prompt, "Please enter Gab account name: ")?);
    profile.user_password = Some(ask(input, prompt, "Please enter Gab account password: ")?);
    config.set_profile(profile_name, profile.clone());
    config.save()?;
    writeln!(prompt, "Your keys have been written to {}", config.path().display())?;
    info!("stored credentials in profile {profile_name}");
    Ok(profile)
}

fn ask(input: &mut impl BufRead, prompt: &mut impl Write, question: &str) -> Result<String> {
    write!(prompt, "{question}")?;
    prompt.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    if answer.is_empty() {
        Err(Error::Config(format!("no answer given to \"{}\"", question.trim())))
    } else {
        Ok(answer.to_string())
    }
}

/// Generates a new device identifier and stores it as the named profile's
/// user agent.
///
/// Returns the new identifier.
pub fn save_user_agent(config: &mut ConfigFile, profile_name: &str) -> Result<String> {
    let user_agent = Uuid::new_v4().to_string();
    let mut profile = config.profile(profile_name);
    profile.user_agent = Some(user_agent.clone());
    config.set_profile(profile_name, profile);
    config.save()?;
    info!("stored user agent {user_agent} in profile {profile_name}");
    Ok(user_agent)
}
