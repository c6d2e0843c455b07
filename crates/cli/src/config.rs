//! Configuration file loading and interactive creation.
//!
//! The file is a JSON object with four keys:
//!
//! ```json
//! {
//!   "access_token": "...",
//!   "organization_url": "https://dev.azure.com/contoso",
//!   "repository_name": "Platform",
//!   "pull_quantity": 10000
//! }
//! ```
//!
//! `pull_quantity` may also be a string holding an integer. A missing file can
//! be created interactively; a file that exists but is malformed is always
//! fatal.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use audit::{AccessToken, AuditError, OrganizationUrl, PullQuantity, RepositoryName};

/// Config file read in normal runs.
pub const CONFIG_FILE: &str = "config.json";

/// Config file read with `--debug`.
pub const DEBUG_CONFIG_FILE: &str = "debug_config.json";

/// Path of the config file for the selected mode.
pub fn config_path(debug: bool) -> &'static Path {
    Path::new(if debug { DEBUG_CONFIG_FILE } else { CONFIG_FILE })
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Validated run configuration. Every field is required; nothing is
/// defaulted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub access_token: AccessToken,
    pub organization_url: OrganizationUrl,
    pub repository_name: RepositoryName,
    pub pull_quantity: PullQuantity,
}

/// On-disk shape. `pull_quantity` stays untyped until [`coerce_quantity`]
/// so a bad value gets its own message instead of a generic key error.
#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    access_token: String,
    organization_url: String,
    repository_name: String,
    pull_quantity: Value,
}

impl ConfigFile {
    fn into_configuration(self, path: &Path) -> Result<Configuration, AuditError> {
        let invalid = |message: &str| AuditError::invalid_config(path.display().to_string(), message);

        let pull_quantity = coerce_quantity(&self.pull_quantity)
            .ok_or_else(|| invalid("Pull quantity must be a positive integer"))?;

        Ok(Configuration {
            access_token: AccessToken::new(self.access_token)
                .ok_or_else(|| invalid("access_token must not be empty"))?,
            organization_url: OrganizationUrl::new(self.organization_url)
                .ok_or_else(|| invalid("organization_url must not be empty"))?,
            repository_name: RepositoryName::new(self.repository_name)
                .ok_or_else(|| invalid("repository_name must not be empty"))?,
            pull_quantity,
        })
    }
}

impl From<&Configuration> for ConfigFile {
    fn from(config: &Configuration) -> Self {
        Self {
            access_token: config.access_token.expose().to_string(),
            organization_url: config.organization_url.to_string(),
            repository_name: config.repository_name.to_string(),
            pull_quantity: Value::from(config.pull_quantity.as_u64()),
        }
    }
}

/// Accepts a JSON integer or a string holding one; rejects zero.
fn coerce_quantity(value: &Value) -> Option<PullQuantity> {
    let raw = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    PullQuantity::new(raw)
}

// ---------------------------------------------------------------------------
// Loading and saving
// ---------------------------------------------------------------------------

/// Read and validate the config file at `path`.
///
/// # Errors
///
/// [`AuditError::ConfigurationMissing`] when the file does not exist,
/// [`AuditError::ConfigurationInvalid`] for anything else that is wrong.
pub fn load(path: &Path) -> Result<Configuration, AuditError> {
    let display = path.display().to_string();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AuditError::ConfigurationMissing { path: display });
        }
        Err(e) => {
            return Err(AuditError::invalid_config(display, format!("Cannot read file: {e}")));
        }
    };

    let file: ConfigFile = serde_json::from_str(&content).map_err(|e| {
        let message = match e.classify() {
            serde_json::error::Category::Data => format!("Error in JSON keys: {e}"),
            _ => format!("JSON decoding error: {e}"),
        };
        AuditError::invalid_config(display.clone(), message)
    })?;

    file.into_configuration(path)
}

/// Write `config` to `path` as pretty-printed JSON, replacing any file there.
pub fn save(path: &Path, config: &Configuration) -> Result<(), AuditError> {
    let display = path.display().to_string();
    let json = serde_json::to_string_pretty(&ConfigFile::from(config))
        .map_err(|e| AuditError::invalid_config(display.clone(), e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| AuditError::invalid_config(display, format!("Cannot write file: {e}")))
}

/// Load the config file, offering to create it when it does not exist.
///
/// Declining ends the run with [`AuditError::ConfigurationDeclined`] and
/// writes nothing. A malformed file never triggers a prompt.
pub fn load_or_create(path: &Path, prompt: &mut dyn Prompt) -> Result<Configuration, AuditError> {
    match load(path) {
        Err(AuditError::ConfigurationMissing { .. }) => {
            error!("Config file not found");
            create_interactively(path, prompt)
        }
        other => other,
    }
}

fn create_interactively(path: &Path, prompt: &mut dyn Prompt) -> Result<Configuration, AuditError> {
    let read_failed = |e: io::Error| {
        AuditError::invalid_config(path.display().to_string(), format!("Failed to read input: {e}"))
    };

    let answer = prompt
        .ask("Do you want to create a new one? (Y/N) ")
        .map_err(read_failed)?;
    if !answer.trim().eq_ignore_ascii_case("y") {
        info!("Closing...");
        return Err(AuditError::ConfigurationDeclined {
            path: path.display().to_string(),
        });
    }

    let mut ask = |question: &str, secret: bool| {
        let line = if secret {
            prompt.ask_secret(question)
        } else {
            prompt.ask(question)
        };
        line.map(|l| l.trim().to_string()).map_err(read_failed)
    };
    let config = ConfigFile {
        access_token: ask("Access Token: ", true)?,
        organization_url: ask("Organization URL: ", false)?,
        repository_name: ask("Repository Name: ", false)?,
        pull_quantity: Value::from(PullQuantity::DEFAULT.as_u64()),
    }
    .into_configuration(path)?;

    save(path, &config)?;
    info!("Config file created");
    Ok(config)
}

// ---------------------------------------------------------------------------
// Prompting
// ---------------------------------------------------------------------------

/// Source of interactive answers.
pub trait Prompt {
    /// Show `question` and return one line of input without its newline.
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Like [`Prompt::ask`], without echoing the input.
    fn ask_secret(&mut self, question: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(question.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        rpassword::prompt_password(question)
    }
}
