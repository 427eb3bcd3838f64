//! Keyword table mapping spoken questions to canned answer scripts.
//!
//! The resolver is a deterministic linear scan: the first table entry whose
//! keyword appears (case-insensitively) in the transcript wins, so table order
//! is priority order. Each entry derives a filesystem/URL-safe storage name
//! used as the cache key for its synthesized audio.

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A single keyword-to-script mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Keyword looked for in the transcript
    pub keyword: String,
    /// Storage name of the synthesized audio, e.g. "script-charging-station.mp3"
    pub script_name: String,
    /// The answer text that gets synthesized
    pub script_text: String,
}

impl ScriptEntry {
    /// Creates an entry, deriving the storage name from the keyword.
    ///
    /// The name is the lowercased keyword with spaces replaced by dashes,
    /// wrapped as `script-<slug>.mp3`.
    pub fn new(keyword: impl Into<String>, script_text: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let slug = keyword.to_lowercase().replace(' ', "-");
        Self {
            script_name: format!("script-{slug}.mp3"),
            keyword,
            script_text: script_text.into(),
        }
    }
}

/// On-disk shape of an optional user-provided script table.
#[derive(Debug, Deserialize)]
struct ScriptsFile {
    #[serde(rename = "script", default)]
    scripts: Vec<ScriptFileEntry>,
}

#[derive(Debug, Deserialize)]
struct ScriptFileEntry {
    keyword: String,
    text: String,
}

/// Ordered table of answer scripts, read-only at runtime.
#[derive(Debug, Clone)]
pub struct ScriptLibrary {
    entries: Vec<ScriptEntry>,
}

impl ScriptLibrary {
    /// The built-in demo table.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                ScriptEntry::new(
                    "Charging station",
                    "Here's information about charging stations...",
                ),
                ScriptEntry::new(
                    "Tracking Software",
                    "Let me tell you about tracking software...",
                ),
            ],
        }
    }

    /// Builds a library from explicit entries, preserving their order.
    pub fn from_entries(entries: Vec<ScriptEntry>) -> Self {
        Self { entries }
    }

    /// Loads the script table, preferring a `scripts.toml` in the config
    /// directory over the built-in table.
    ///
    /// # Errors
    /// - If the scripts file exists but cannot be read or parsed
    pub fn load(config_dir: &Path) -> Result<Self> {
        let scripts_file = config_dir.join("scripts.toml");
        if !scripts_file.exists() {
            tracing::debug!("No scripts.toml found, using built-in script table");
            return Ok(Self::builtin());
        }

        let content = fs::read_to_string(&scripts_file)?;
        let parsed: ScriptsFile = toml::from_str(&content)?;
        let entries: Vec<ScriptEntry> = parsed
            .scripts
            .into_iter()
            .map(|s| ScriptEntry::new(s.keyword, s.text))
            .collect();

        if entries.is_empty() {
            tracing::warn!(
                "{} contains no scripts, using built-in script table",
                scripts_file.display()
            );
            return Ok(Self::builtin());
        }

        tracing::info!("Loaded {} scripts from {}", entries.len(), scripts_file.display());
        Ok(Self { entries })
    }

    /// Resolves a transcript to the first matching script entry.
    ///
    /// Matching is a case-insensitive substring check against each keyword in
    /// table order. Returns None when no keyword matches.
    pub fn resolve(&self, transcript: &str) -> Option<&ScriptEntry> {
        let haystack = transcript.to_lowercase();
        self.entries
            .iter()
            .find(|entry| haystack.contains(&entry.keyword.to_lowercase()))
    }

    /// All entries in priority order.
    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    /// Keywords in table order, used to bias the transcription prompt.
    pub fn keywords(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.keyword.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_name_derivation() {
        let entry = ScriptEntry::new("Charging station", "text");
        assert_eq!(entry.script_name, "script-charging-station.mp3");

        let entry = ScriptEntry::new("Tracking Software", "text");
        assert_eq!(entry.script_name, "script-tracking-software.mp3");
    }

    #[test]
    fn test_resolve_case_insensitive_substring() {
        let library = ScriptLibrary::builtin();

        let matched = library
            .resolve("I want to know about the Charging station")
            .unwrap();
        assert_eq!(matched.script_name, "script-charging-station.mp3");

        // Case differences in the transcript don't matter
        let matched = library.resolve("what is CHARGING STATION pricing").unwrap();
        assert_eq!(matched.keyword, "Charging station");
    }

    #[test]
    fn test_resolve_no_match() {
        let library = ScriptLibrary::builtin();
        assert!(library.resolve("tell me a joke").is_none());
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let library = ScriptLibrary::from_entries(vec![
            ScriptEntry::new("station", "first"),
            ScriptEntry::new("charging station", "second"),
        ]);

        // Both keywords match; table order decides
        let matched = library.resolve("about the charging station").unwrap();
        assert_eq!(matched.script_text, "first");
    }

    #[test]
    fn test_resolve_deterministic() {
        let library = ScriptLibrary::builtin();
        let a = library.resolve("tracking software please").cloned();
        let b = library.resolve("tracking software please").cloned();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let library = ScriptLibrary::load(dir.path()).unwrap();
        assert_eq!(library.entries().len(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("scripts.toml"),
            r#"
[[script]]
keyword = "Opening hours"
text = "We are open from nine to five."
"#,
        )
        .unwrap();

        let library = ScriptLibrary::load(dir.path()).unwrap();
        assert_eq!(library.entries().len(), 1);
        assert_eq!(library.entries()[0].script_name, "script-opening-hours.mp3");
    }
}
