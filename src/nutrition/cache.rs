use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::normalize::normalize;
use super::NutritionRecord;

const HEADER: &str = "name,calories,protein,fat,carbs";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    key: String,
    record: NutritionRecord,
}

/// Durable table of previously resolved nutrition records.
///
/// The whole CSV file is loaded into memory at open and appended to on each
/// successful remote resolution. The store owns the file: lookups run under a
/// read lock, appends serialize through the write lock so concurrent writes
/// cannot interleave rows.
pub struct CacheStore {
    path: PathBuf,
    entries: RwLock<Vec<CacheEntry>>,
}

impl CacheStore {
    /// Opens the store at `path`. A missing or unreadable file yields an
    /// empty table; it will be created on the first append.
    pub async fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let mut entries = Vec::new();
                for line in contents.lines() {
                    let line = line.trim_end();
                    if line.is_empty() || line == HEADER {
                        continue;
                    }
                    match parse_row(line) {
                        Some(record) => entries.push(CacheEntry {
                            key: normalize(&record.name),
                            record,
                        }),
                        None => warn!("skipping malformed cache row: {}", line),
                    }
                }
                info!("loaded {} cached nutrition entries from {}", entries.len(), path.display());
                entries
            }
            Err(e) => {
                info!("no readable cache at {} ({}), starting empty", path.display(), e);
                Vec::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Returns the first cached record matching `name`: exact normalized-key
    /// match first, then a substring pass so partial queries like "rice"
    /// still find "Fried Rice".
    pub async fn lookup(&self, name: &str) -> Option<NutritionRecord> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }

        let entries = self.entries.read().await;
        if let Some(entry) = entries.iter().find(|e| e.key == key) {
            return Some(entry.record.clone());
        }
        entries
            .iter()
            .find(|e| e.key.contains(&key))
            .map(|e| e.record.clone())
    }

    /// Appends `record` to the durable table, flushing before returning. A
    /// record whose key is already present is skipped. The in-memory table is
    /// only updated once the row is on disk.
    pub async fn append(&self, record: &NutritionRecord) -> Result<(), CacheError> {
        let key = normalize(&record.name);

        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.key == key) {
            debug!("cache already holds '{}', skipping append", record.name);
            return Ok(());
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let mut row = String::new();
        if file.metadata().await?.len() == 0 {
            row.push_str(HEADER);
            row.push('\n');
        }
        row.push_str(&format_row(record));
        row.push('\n');
        file.write_all(row.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;

        entries.push(CacheEntry {
            key,
            record: record.clone(),
        });
        Ok(())
    }
}

fn format_row(record: &NutritionRecord) -> String {
    format!(
        "{},{},{},{},{}",
        escape_name(&record.name),
        record.calories,
        record.protein,
        record.fat,
        record.carbs
    )
}

fn escape_name(name: &str) -> String {
    if name.contains(',') || name.contains('"') || name.contains('\n') {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

// The four numeric columns never contain commas, so splitting from the right
// leaves any commas inside the (possibly quoted) name column intact.
fn parse_row(line: &str) -> Option<NutritionRecord> {
    let mut fields = line.rsplitn(5, ',');
    let carbs = fields.next()?.trim().parse().ok()?;
    let fat = fields.next()?.trim().parse().ok()?;
    let protein = fields.next()?.trim().parse().ok()?;
    let calories = fields.next()?.trim().parse().ok()?;
    let name = unescape_name(fields.next()?.trim());
    if name.is_empty() {
        return None;
    }
    Some(NutritionRecord {
        name,
        calories,
        protein,
        fat,
        carbs,
    })
}

fn unescape_name(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1].replace("\"\"", "\"")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fried_rice() -> NutritionRecord {
        NutritionRecord {
            name: "Fried Rice".to_string(),
            calories: 250.0,
            protein: 5.0,
            fat: 8.0,
            carbs: 40.0,
        }
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().join("nutrition.csv")).await;
        assert!(store.lookup("banana").await.is_none());
    }

    #[tokio::test]
    async fn append_then_lookup_tolerates_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().join("nutrition.csv")).await;
        store.append(&fried_rice()).await.unwrap();

        for query in ["fried rice", "FRIED RICE", "  Fried  Rice!  "] {
            let hit = store.lookup(query).await.expect(query);
            assert_eq!(hit, fried_rice());
        }
    }

    #[tokio::test]
    async fn substring_match_tolerates_partial_queries() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().join("nutrition.csv")).await;
        store.append(&fried_rice()).await.unwrap();

        assert_eq!(store.lookup("rice").await, Some(fried_rice()));
        assert!(store.lookup("noodles").await.is_none());
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nutrition.csv");
        {
            let store = CacheStore::open(&path).await;
            store.append(&fried_rice()).await.unwrap();
        }

        let reopened = CacheStore::open(&path).await;
        assert_eq!(reopened.lookup("fried rice").await, Some(fried_rice()));
    }

    #[tokio::test]
    async fn duplicate_append_writes_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nutrition.csv");
        let store = CacheStore::open(&path).await;
        store.append(&fried_rice()).await.unwrap();
        store.append(&fried_rice()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        // Header plus a single data row.
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn comma_in_name_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nutrition.csv");
        let record = NutritionRecord {
            name: "Rice, fried, with egg".to_string(),
            calories: 260.5,
            protein: 6.1,
            fat: 9.2,
            carbs: 38.0,
        };
        {
            let store = CacheStore::open(&path).await;
            store.append(&record).await.unwrap();
        }

        let reopened = CacheStore::open(&path).await;
        assert_eq!(reopened.lookup("rice fried with egg").await, Some(record));
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nutrition.csv");
        std::fs::write(
            &path,
            "name,calories,protein,fat,carbs\nBanana,105,1.3,0.3,27\nnot a row at all\nOats,389,abc,6.9,66\n",
        )
        .unwrap();

        let store = CacheStore::open(&path).await;
        assert!(store.lookup("banana").await.is_some());
        assert!(store.lookup("oats").await.is_none());
    }

    #[tokio::test]
    async fn append_to_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().join("no-such-dir").join("nutrition.csv")).await;
        assert!(store.append(&fried_rice()).await.is_err());
    }
}
