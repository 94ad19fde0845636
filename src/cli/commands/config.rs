//! Config command implementation.
//!
//! View and modify pulse configuration settings. Every action works on the
//! file named by `--config`, or the default location.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, ConfigAction, ConfigArgs};
use crate::config::{default_config_path, Config};
use crate::error::Result;

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let path = config_path(cli)?;
    execute(&path, &args.action, &mut io::stdout().lock())
}

/// Apply `action` to the configuration file at `path`.
pub fn execute<W: Write>(path: &Path, action: &ConfigAction, out: &mut W) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(path, out),
        ConfigAction::Get { key } => {
            let value = load(path)?.get(key)?;
            writeln!(out, "{value}")?;
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = load(path)?;
            config.set(key, value)?;
            config.save_to(path)?;
            tracing::info!(key, path = %path.display(), "configuration updated");
            writeln!(out, "Set {key} = {value}")?;
            Ok(())
        }
        ConfigAction::Path => {
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
        ConfigAction::Init => init_config(path, out),
        ConfigAction::Reset => reset_config(path, out),
    }
}

fn load(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load_from(path)
    } else {
        Ok(Config::default())
    }
}

/// Show full configuration as TOML.
fn show_config<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let config = load(path)?;
    let body = toml::to_string_pretty(&config).map_err(|e| {
        crate::error::PulseError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        }
    })?;
    writeln!(out, "# {}", describe(path))?;
    write!(out, "{body}")?;
    Ok(())
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not created yet, showing defaults)", path.display())
    }
}

/// Initialize configuration file with defaults.
fn init_config<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    if path.exists() {
        writeln!(out, "Configuration file already exists at: {}", path.display())?;
        writeln!(out, "Use 'pulse config reset' to reset to defaults.")?;
        return Ok(());
    }

    Config::default().save_to(path)?;
    writeln!(out, "Created configuration file at: {}", path.display())?;
    Ok(())
}

/// Reset configuration to defaults.
fn reset_config<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    if !path.exists() {
        writeln!(
            out,
            "No configuration file exists. Use 'pulse config init' to create one."
        )?;
        return Ok(());
    }

    Config::default().save_to(path)?;
    writeln!(out, "Reset configuration to defaults at: {}", path.display())?;
    Ok(())
}

/// The path `config path` would print for these flags.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exec(path: &Path, action: ConfigAction) -> Result<String> {
        let mut buf = Vec::new();
        execute(path, &action, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_init_set_get() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pulse").join("config.toml");

        let out = exec(&path, ConfigAction::Init).unwrap();
        assert!(out.starts_with("Created configuration file"));
        assert!(path.exists());

        let out = exec(
            &path,
            ConfigAction::Set {
                key: "pomodoro.work_minutes".to_string(),
                value: "50".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, "Set pomodoro.work_minutes = 50\n");

        let out = exec(
            &path,
            ConfigAction::Get {
                key: "pomodoro.work_minutes".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, "50\n");

        let out = exec(&path, ConfigAction::Init).unwrap();
        assert!(out.contains("already exists"));
    }

    #[test]
    fn test_unknown_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let err = exec(
            &path,
            ConfigAction::Get {
                key: "nope".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let result = exec(
            &path,
            ConfigAction::Set {
                key: "display.show_sidebar".to_string(),
                value: "maybe".to_string(),
            },
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let out = exec(&path, ConfigAction::Reset).unwrap();
        assert!(out.starts_with("No configuration file exists"));

        exec(
            &path,
            ConfigAction::Set {
                key: "theme".to_string(),
                value: "nord".to_string(),
            },
        )
        .unwrap();
        exec(&path, ConfigAction::Reset).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_show_marks_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let out = exec(&path, ConfigAction::Show).unwrap();
        assert!(out.contains("showing defaults"));
        assert!(out.contains("[pomodoro]"));
    }
}
