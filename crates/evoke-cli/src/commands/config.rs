//! Config command handlers

use std::path::Path;

use anyhow::{bail, Context, Result};

use evoke_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "offline": config.offline,
                    "log_file": config.log_file,
                    "strategies": config.strategies.keys().collect::<Vec<_>>(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:   {}", config.data_dir.display());
            println!("  offline:    {}", config.offline);
            println!(
                "  log_file:   {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            if config.strategies.is_empty() {
                println!("  strategies: (default)");
            } else {
                let names: Vec<&str> = config.strategies.keys().map(String::as_str).collect();
                println!("  strategies: {}", names.join(", "));
            }
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
///
/// Strategies are edited in the config file directly. Only the file is
/// edited, so EVOKE_* overrides in the environment are not persisted.
pub fn set(key: String, value: String, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let save_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_file_path);
    let mut config = Config::read_file(&save_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "offline" => {
            config.offline = value
                .parse()
                .context("Invalid value for offline. Use 'true' or 'false'.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, offline, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "offline", "true").unwrap();
        apply(&mut config, "data_dir", "/srv/evoke").unwrap();
        apply(&mut config, "log_file", "/tmp/evoke.log").unwrap();
        assert!(config.offline);
        assert_eq!(config.data_dir, PathBuf::from("/srv/evoke"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/evoke.log")));

        apply(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();

        assert!(apply(&mut config, "offline", "maybe").is_err());
        let err = apply(&mut config, "sync_url", "ws://example.com").unwrap_err();
        assert!(err.to_string().contains("Valid keys"));
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");
        std::fs::write(&path, format!("data_dir = {:?}\n", data_dir)).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set("offline".to_string(), "true".to_string(), Some(path.as_path()), &output).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("offline = true"));
        assert_eq!(Config::read_file(&path).unwrap().data_dir, data_dir);
    }

    #[test]
    fn test_set_keeps_other_keys_as_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/srv/evoke\"\noffline = true\n").unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set(
            "log_file".to_string(),
            "/tmp/evoke.log".to_string(),
            Some(path.as_path()),
            &output,
        )
        .unwrap();

        let saved = Config::read_file(&path).unwrap();
        assert_eq!(saved.data_dir, PathBuf::from("/srv/evoke"));
        assert!(saved.offline);
        assert_eq!(saved.log_file, Some(PathBuf::from("/tmp/evoke.log")));
    }
}
