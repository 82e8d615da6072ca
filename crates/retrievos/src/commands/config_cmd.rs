//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// The config as TOML with plaintext passwords masked.
fn format_config_redacted(cfg: &Config) -> Result<String, CliError> {
    let mut masked = Config {
        default_profile: cfg.default_profile.clone(),
        defaults: cfg.defaults.clone(),
        profiles: cfg.profiles.clone(),
    };
    for profile in masked.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("****".into());
        }
    }
    toml::to_string_pretty(&masked).map_err(|e| CliError::Config(e.into()))
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("interactive", format!("prompt failed: {e}"))
}

/// Ask for a password; store it in the keyring or hand it back for plaintext.
fn prompt_password(profile_name: &str) -> Result<Option<String>, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::validation("password", "password cannot be empty"));
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        retrievos_config::store_password(profile_name, &pass)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(pass))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            output::print_output(format_config_redacted(&cfg)?.trim_end(), global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let pass = rpassword::prompt_password(format!("Password for '{profile_name}': "))
                .map_err(prompt_err)?;
            if pass.is_empty() {
                return Err(CliError::validation("password", "password cannot be empty"));
            }
            retrievos_config::store_password(&profile_name, &pass)?;
            if !global.quiet {
                eprintln!("✓ Password for '{profile_name}' stored in system keyring");
            }
            Ok(())
        }
    }
}

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("retrievos configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default();

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Dashboard URL")
        .default("http://localhost:8000".into())
        .validate_with(|s: &String| -> Result<(), String> {
            s.parse::<url::Url>().map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let wants_login = Confirm::new()
        .with_prompt("Configure a login (needed to start pipeline runs)?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let (username, password) = if wants_login {
        let user: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?;
        (Some(user), prompt_password(&profile_name)?)
    } else {
        (None, None)
    };

    let insecure = url.starts_with("https://")
        && Confirm::new()
            .with_prompt("Accept self-signed certificates?")
            .default(false)
            .interact()
            .map_err(prompt_err)?;

    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            url,
            username,
            password,
            insecure: insecure.then_some(true),
            ..Profile::default()
        },
    );
    if cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }

    config::save_config(&cfg)?;
    eprintln!("\n✓ Profile '{profile_name}' saved to {}", config_path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn redacted_config_masks_password() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                url: "http://lab:8000".into(),
                username: Some("ops".into()),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        let text = format_config_redacted(&cfg).unwrap();
        assert!(text.contains("[profiles.lab]"));
        assert!(text.contains("username = \"ops\""));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("summaries_limit = 30"));
        assert!(!text.contains("password_env"));
    }
}
