//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// This is called early in the startup sequence, before command handling.
/// It checks:
/// 1. If config file doesn't exist, runs full setup
/// 2. If config version is older than app version, runs setup and logs migration
/// 3. If config version matches app version, does nothing
fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = crate::config::get_config_path()?;

    match crate::setup::version::check_setup_needed(&config_path)? {
        Some(old_version) => {
            tracing::info!(
                "Setup needed - migrating from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
            crate::setup::run_setup().map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
            crate::setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Setup completed successfully - migrated to version {}",
                env!("CARGO_PKG_VERSION")
            );
        }
        None => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// A voice-operated kiosk that answers spoken questions with pre-recorded scripts
#[derive(Parser)]
#[command(name = "voxkiosk")]
#[command(version)]
#[command(about = "A voice-operated information kiosk")]
#[command(
    long_about = "A voice-operated information kiosk.\n\nListens on the microphone until the speaker falls silent, transcribes the\nquestion, matches it against a keyword table, and plays back the matching\nanswer script as synthesized speech.\n\nDEFAULT COMMAND:\n    If no command is specified, 'ask' is used by default.\n\nEXAMPLES:\n    # Answer a single spoken question\n    $ voxkiosk\n    $ voxkiosk ask\n\n    # Run unattended, answering question after question\n    $ voxkiosk ask --kiosk\n\n    # Sign in to the kiosk account\n    $ voxkiosk auth sign-in\n\n    # Show the keyword table\n    $ voxkiosk scripts\n\n    # View recent interactions\n    $ voxkiosk history"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/voxkiosk/voxkiosk.toml\n    Scripts override:   ~/.config/voxkiosk/scripts.toml\n    Logs:               ~/.local/state/voxkiosk/voxkiosk.log.*"
)]
struct Cli {
    /// Keep listening for the next question after answering (ask default command)
    #[arg(short, long, global = true)]
    kiosk: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a spoken question and play back the matched answer (default)
    ///
    /// Recording stops automatically after a stretch of silence, or
    /// immediately when Enter is pressed.
    #[command(visible_alias = "a")]
    Ask {
        /// Keep listening for the next question after answering
        #[arg(short, long)]
        kiosk: bool,
    },

    /// Manage the kiosk account and API credentials
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Show the keyword table the kiosk answers from
    ///
    /// Lists every recognized keyword, the answer text, and the name of the
    /// cached audio file it maps to.
    #[command(visible_alias = "s")]
    Scripts,

    /// View recent kiosk interactions
    ///
    /// Lists what was heard, which script answered, and where the audio lives.
    #[command(visible_alias = "h")]
    History,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio settings, speech models, and Firebase project options.
    /// Uses $EDITOR environment variable or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in voxkiosk.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   voxkiosk completions bash > voxkiosk.bash
    ///   voxkiosk completions zsh > _voxkiosk
    ///   voxkiosk completions fish > voxkiosk.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Sign in with an existing kiosk account
    #[command(name = "sign-in")]
    SignIn,

    /// Create a new kiosk account and sign in
    #[command(name = "sign-up")]
    SignUp,

    /// Sign out and forget the stored session
    #[command(name = "sign-out")]
    SignOut,

    /// Store the OpenAI API key used for transcription and synthesis
    #[command(name = "set-key")]
    SetKey,
}

/// True when kiosk mode was requested on either the top-level or the `ask`
/// subcommand position. The flag positions combine rather than override, so
/// `voxkiosk --kiosk ask` behaves the same as `voxkiosk ask --kiosk`.
fn kiosk_requested(cli: &Cli) -> bool {
    cli.kiosk || matches!(cli.command, Some(Commands::Ask { kiosk: true }))
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails (e.g., authentication, recording, playback)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voxkiosk", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Check if setup is needed (version check or missing config)
    check_and_run_setup()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Ask { .. }) => {
            // Default command is ask
            commands::handle_ask(kiosk_requested(&cli)).await?;
        }
        Some(Commands::Auth(action)) => {
            let result = match action {
                AuthCommands::SignIn => commands::handle_sign_in().await,
                AuthCommands::SignUp => commands::handle_sign_up().await,
                AuthCommands::SignOut => commands::handle_sign_out(),
                AuthCommands::SetKey => commands::handle_set_key(),
            };
            if let Err(e) = result {
                // Cancellation errors were already displayed by cliclack
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::Scripts) => {
            commands::handle_scripts()?;
        }
        Some(Commands::History) => {
            commands::handle_history()?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_kiosk_flag_works_in_either_position() {
        assert!(kiosk_requested(&parse(&["voxkiosk", "--kiosk"])));
        assert!(kiosk_requested(&parse(&["voxkiosk", "ask", "--kiosk"])));
        // The flag before the subcommand must not be dropped
        assert!(kiosk_requested(&parse(&["voxkiosk", "--kiosk", "ask"])));
    }

    #[test]
    fn test_kiosk_defaults_off() {
        assert!(!kiosk_requested(&parse(&["voxkiosk"])));
        assert!(!kiosk_requested(&parse(&["voxkiosk", "ask"])));
    }
}
