//! Interaction history storage using SQLite.
//!
//! Every answered (or unanswered) question is stored with its transcript,
//! the matched script if any, and the cached audio URL, so operators can see
//! what visitors actually asked the kiosk.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::OptionalExtension;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// A single kiosk interaction.
#[derive(Debug, Clone)]
pub struct InteractionEntry {
    /// Unique identifier for this interaction
    pub id: i64,
    /// What the visitor asked, as transcribed
    pub transcript: String,
    /// Storage name of the matched script, None when nothing matched
    pub script_name: Option<String>,
    /// Retrieval URL of the answer audio, None when nothing matched
    pub audio_url: Option<String>,
    /// When this interaction happened
    pub created_at: DateTime<Local>,
}

/// Manages the interaction history database.
pub struct HistoryManager {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl HistoryManager {
    /// Creates a new history manager for the given data directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join("interaction_history.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Initializes database connection and creates tables if necessary.
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let connection = Connection::open(&self.database_path)?;

            connection.execute("PRAGMA foreign_keys = ON", [])?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS interactions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    transcript TEXT NOT NULL,
                    script_name TEXT,
                    audio_url TEXT,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Saves one interaction to the history database.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If insertion fails
    pub fn save_interaction(
        &mut self,
        transcript: &str,
        script_name: Option<&str>,
        audio_url: Option<&str>,
    ) -> Result<()> {
        let connection = self.get_connection()?;
        let now = Local::now();
        let timestamp = now.to_rfc3339();

        connection.execute(
            "INSERT INTO interactions (transcript, script_name, audio_url, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![transcript, script_name, audio_url, timestamp],
        )?;

        tracing::debug!("Interaction saved to history");
        Ok(())
    }

    /// Retrieves all interactions ordered by most recent first.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution fails
    /// - If timestamp parsing fails
    pub fn get_all_interactions(&mut self) -> Result<Vec<InteractionEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, transcript, script_name, audio_url, created_at
             FROM interactions ORDER BY created_at DESC",
        )?;

        let entries = statement
            .query_map([], |row| {
                let id = row.get::<_, i64>(0)?;
                let transcript = row.get::<_, String>(1)?;
                let script_name = row.get::<_, Option<String>>(2)?;
                let audio_url = row.get::<_, Option<String>>(3)?;
                let timestamp_str = row.get::<_, String>(4)?;

                let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(InteractionEntry {
                    id,
                    transcript,
                    script_name,
                    audio_url,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Retrieves a single interaction by ID.
    pub fn get_interaction(&mut self, id: i64) -> Result<Option<InteractionEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, transcript, script_name, audio_url, created_at
             FROM interactions WHERE id = ?1",
        )?;

        let entry = statement
            .query_row(params![id], |row| {
                let entry_id = row.get::<_, i64>(0)?;
                let transcript = row.get::<_, String>(1)?;
                let script_name = row.get::<_, Option<String>>(2)?;
                let audio_url = row.get::<_, Option<String>>(3)?;
                let timestamp_str = row.get::<_, String>(4)?;

                let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(InteractionEntry {
                    id: entry_id,
                    transcript,
                    script_name,
                    audio_url,
                    created_at,
                })
            })
            .optional()?;

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_list_interactions() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = HistoryManager::new(dir.path()).unwrap();

        history
            .save_interaction(
                "I want to know about the Charging station",
                Some("script-charging-station.mp3"),
                Some("memory://audio/script-charging-station.mp3"),
            )
            .unwrap();
        history.save_interaction("tell me a joke", None, None).unwrap();

        let entries = history.get_all_interactions().unwrap();
        assert_eq!(entries.len(), 2);

        let unmatched = entries.iter().find(|e| e.script_name.is_none()).unwrap();
        assert_eq!(unmatched.transcript, "tell me a joke");
        assert!(unmatched.audio_url.is_none());

        let matched = history.get_interaction(entries[1].id).unwrap().unwrap();
        assert_eq!(matched.id, entries[1].id);
    }
}
