//! Interaction history viewer.
//!
//! Lists recent kiosk interactions: what was heard, which script answered,
//! and where the audio lives.

use console::style;

use crate::commands::data_dir;
use crate::history::HistoryManager;

/// Prints recent kiosk interactions, newest first.
///
/// # Errors
/// - If the data directory cannot be determined
/// - If the history database cannot be read
pub fn handle_history() -> Result<(), anyhow::Error> {
    tracing::info!("=== voxkiosk History ===");

    let mut history_manager = HistoryManager::new(&data_dir()?)?;
    let entries = history_manager.get_all_interactions()?;

    if entries.is_empty() {
        println!("No interaction history found.");
        return Ok(());
    }

    println!();
    for entry in &entries {
        let when = entry.created_at.format("%Y-%m-%d %H:%M:%S");
        let answer = match &entry.script_name {
            Some(name) => style(name.as_str()).green(),
            None => style("no match").yellow(),
        };
        println!("{} [{}] {}", style(when).dim(), answer, entry.transcript);
        if let Some(url) = &entry.audio_url {
            println!("    {}", style(url).dim());
        }
    }
    println!();
    println!("{} interactions.", entries.len());

    Ok(())
}
