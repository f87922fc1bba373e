//! Rendering and publishing of the generated crontab file.
//!
//! The database is the source of truth; the file is a projection that is
//! fully rewritten on every publish, so it is always safe to regenerate.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::db::entities::crontab_entry;

/// Environment defaults expected by the consuming cron daemon.
pub const CRONTAB_PREAMBLE: &str =
    "SHELL=/bin/sh\nPATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin\n";

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("I/O error writing crontab file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to replace crontab file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("Crontab file path has no parent directory")]
    NoParentDir,
    #[error("Crontab write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Derives the log-file-safe token for a job name: lowercased, with each
/// run of characters outside `[a-z0-9._-]` collapsed to a single `-` and
/// leading/trailing dashes stripped. Falls back to `"job"` when nothing
/// survives.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut prev_replaced = false;
    for c in name.trim().to_lowercase().chars() {
        if matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-') {
            slug.push(c);
            prev_replaced = false;
        } else {
            if !prev_replaced {
                slug.push('-');
            }
            prev_replaced = true;
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "job".to_string()
    } else {
        slug.to_string()
    }
}

/// Pure, deterministic rendering of the active entry set into crontab
/// text. Entries must already be in `created_at` ascending order.
pub fn render_crontab(entries: &[crontab_entry::Model], logs_dir: &Path) -> String {
    let mut content = String::from(CRONTAB_PREAMBLE);
    content.push('\n');

    for entry in entries {
        if let Some(description) = entry.description.as_deref() {
            if !description.is_empty() {
                content.push_str("# ");
                content.push_str(description);
                content.push('\n');
            }
        }
        let log_path = logs_dir.join(format!("{}.log", slugify(&entry.name)));
        content.push_str(&format!(
            "{} {} >> {} 2>&1\n\n",
            entry.schedule,
            entry.command,
            log_path.display()
        ));
    }

    content
}

/// Owns the single well-known crontab file location. Publishing writes a
/// temporary file in the same directory and renames it over the target,
/// so the cron daemon never observes a half-written file.
#[derive(Clone, Debug)]
pub struct CrontabPublisher {
    path: PathBuf,
}

impl CrontabPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn publish(&self, content: &str) -> Result<(), PublishError> {
        let path = self.path.clone();
        let content = content.to_owned();

        tokio::task::spawn_blocking(move || {
            let dir = path.parent().ok_or(PublishError::NoParentDir)?;
            let mut tmp = NamedTempFile::new_in(dir)?;
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path)?;
            Ok(())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(
        id: i32,
        name: &str,
        schedule: &str,
        command: &str,
        description: Option<&str>,
    ) -> crontab_entry::Model {
        crontab_entry::Model {
            id,
            name: name.to_string(),
            schedule: schedule.to_string(),
            command: command.to_string(),
            description: description.map(str::to_string),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, id as u32).unwrap(),
            last_run_at: None,
            next_run_at: None,
        }
    }

    #[test]
    fn slugify_keeps_safe_names() {
        assert_eq!(slugify("nightly-backup"), "nightly-backup");
        assert_eq!(slugify("backup_v2.sh"), "backup_v2.sh");
    }

    #[test]
    fn slugify_lowercases_and_collapses_punctuation() {
        assert_eq!(slugify("Weird/Name!!"), "weird-name");
        assert_eq!(slugify("a//b"), "a-b");
        assert_eq!(slugify("  Daily Report  "), "daily-report");
    }

    #[test]
    fn slugify_strips_edge_dashes_and_falls_back() {
        assert_eq!(slugify("--x--"), "x");
        assert_eq!(slugify("!!!"), "job");
        assert_eq!(slugify(""), "job");
    }

    #[test]
    fn render_empty_set_is_preamble_only() {
        let content = render_crontab(&[], Path::new("/app/logs"));
        assert_eq!(
            content,
            "SHELL=/bin/sh\nPATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin\n\n"
        );
    }

    #[test]
    fn render_emits_comment_and_redirection() {
        let entries = vec![entry(
            1,
            "nightly-backup",
            "0 2 * * *",
            "backup.sh",
            Some("nightly"),
        )];
        let content = render_crontab(&entries, Path::new("/app/logs"));
        assert!(content.contains("# nightly\n"));
        assert!(content.contains("0 2 * * * backup.sh >> /app/logs/nightly-backup.log 2>&1\n\n"));
    }

    #[test]
    fn render_skips_empty_description() {
        let entries = vec![entry(1, "job-a", "* * * * *", "true", Some(""))];
        let content = render_crontab(&entries, Path::new("/app/logs"));
        assert!(!content.contains("# \n"));
    }

    #[test]
    fn render_is_deterministic() {
        let entries = vec![
            entry(1, "first", "* * * * *", "one.sh", None),
            entry(2, "second", "0 0 * * *", "two.sh", Some("daily")),
        ];
        let a = render_crontab(&entries, Path::new("/app/logs"));
        let b = render_crontab(&entries, Path::new("/app/logs"));
        assert_eq!(a, b);

        let first = a.find("first.log").unwrap();
        let second = a.find("second.log").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn publish_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = CrontabPublisher::new(dir.path().join("crontab.txt"));

        publisher.publish("first version\n").await.unwrap();
        publisher.publish("second version\n").await.unwrap();

        let content = std::fs::read_to_string(publisher.path()).unwrap();
        assert_eq!(content, "second version\n");
    }

    #[tokio::test]
    async fn publish_fails_when_parent_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = CrontabPublisher::new(dir.path().join("missing").join("crontab.txt"));

        let result = publisher.publish("content\n").await;
        assert!(result.is_err());
    }
}
