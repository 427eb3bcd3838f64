//! Show the keyword table the kiosk answers from.

use console::style;

use crate::commands::config_dir;
use crate::scripts::ScriptLibrary;

/// Prints every keyword the kiosk recognizes and the script it answers with.
///
/// # Errors
/// - If the config directory cannot be determined
/// - If a scripts.toml override exists but cannot be parsed
pub fn handle_scripts() -> Result<(), anyhow::Error> {
    let library = ScriptLibrary::load(&config_dir()?)?;

    println!();
    println!("Keywords the kiosk answers to:");
    println!();

    for entry in library.entries() {
        println!("  {}", style(&entry.keyword).cyan().bold());
        println!("    audio: {}", style(&entry.script_name).dim());
        println!("    {}", entry.script_text);
        println!();
    }

    Ok(())
}
