use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::entities::DailyEntryEntity;

/// Interface for abstracting storage of daily entries.
pub trait EntryStore {
    /// Retrieves a single entry by its (rep, date) natural key.
    fn entry_for(
        &self,
        rep_id: Uuid,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<DailyEntryEntity>>> + Send;

    /// Inserts the entry, replacing any previous one for the same (rep, date)
    /// pair. This is what keeps the natural key unique.
    fn upsert_entry(&self, entry: DailyEntryEntity) -> impl Future<Output = Result<()>>;

    /// Every entry a rep has logged, in date order.
    fn entries_for_rep(
        &self,
        rep_id: Uuid,
    ) -> impl Future<Output = Result<Vec<DailyEntryEntity>>> + Send;

    /// Drops all of a rep's entries. Removing a rep cascades through here.
    fn delete_entries_for(&self, rep_id: Uuid) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> EntryStore for T
where
    T::Target: EntryStore,
{
    fn entry_for(
        &self,
        rep_id: Uuid,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<DailyEntryEntity>>> + Send {
        self.deref().entry_for(rep_id, date)
    }

    fn upsert_entry(&self, entry: DailyEntryEntity) -> impl Future<Output = Result<()>> {
        self.deref().upsert_entry(entry)
    }

    fn entries_for_rep(
        &self,
        rep_id: Uuid,
    ) -> impl Future<Output = Result<Vec<DailyEntryEntity>>> + Send {
        self.deref().entries_for_rep(rep_id)
    }

    fn delete_entries_for(&self, rep_id: Uuid) -> impl Future<Output = Result<()>> {
        self.deref().delete_entries_for(rep_id)
    }
}

/// The main realization of [EntryStore]. Each rep owns one JSON-lines file,
/// so a year of daily entries stays a few hundred lines and a whole-file
/// rewrite on upsert is cheap.
pub struct FsEntryStore {
    entry_dir: PathBuf,
}

impl FsEntryStore {
    pub fn new(entry_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&entry_dir)?;

        Ok(Self { entry_dir })
    }

    fn rep_path(&self, rep_id: Uuid) -> PathBuf {
        self.entry_dir.join(format!("{rep_id}.jsonl"))
    }

    async fn read_all(path: &Path) -> Result<Vec<DailyEntryEntity>> {
        async fn extract(path: &Path) -> Result<Vec<DailyEntryEntity>, std::io::Error> {
            debug!("Extracting {path:?}");
            let file = File::open(path).await?;
            file.lock_shared()?;
            let buffer = BufReader::new(file);
            let mut lines = buffer.lines();
            let mut entries = vec![];
            while let Ok(Some(line)) = lines.next_line().await {
                match serde_json::from_str::<DailyEntryEntity>(&line) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        // ignore illegal values. Might happen after shutdowns
                        warn!(
                            "During parsing in path {:?} found illegal json string {}:  {e}",
                            path, &line
                        )
                    }
                }
            }

            lines.into_inner().into_inner().unlock_async().await?;

            Ok(entries)
        }

        match extract(path).await {
            Ok(entries) => Ok(entries),
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    Ok(vec![])
                } else {
                    Err(e)?
                }
            }
        }
    }

    async fn upsert_inner(&self, entry: DailyEntryEntity) -> Result<()> {
        let path = self.rep_path(entry.rep_id);

        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::upsert_with_file(&mut file, entry).await;
        file.unlock_async().await?;
        result
    }

    async fn upsert_with_file(file: &mut File, entry: DailyEntryEntity) -> Result<()> {
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let mut entries: Vec<DailyEntryEntity> = vec![];
        for line in contents.lines() {
            match serde_json::from_str::<DailyEntryEntity>(line) {
                Ok(parsed) => entries.push(parsed),
                Err(e) => {
                    // Might happen due to shutdown cutting of the write into a file.
                    warn!("Dropping corrupted entry line {line}: {e}")
                }
            }
        }

        match entries
            .iter_mut()
            .find(|existing| existing.date == entry.date)
        {
            Some(existing) => *existing = entry,
            None => {
                entries.push(entry);
                entries.sort_by_key(|existing| existing.date);
            }
        }

        let mut buffer = Vec::<u8>::new();
        for entry in &entries {
            serde_json::to_writer(&mut buffer, entry)?;
            buffer.push(b'\n');
        }

        file.set_len(0).await?;
        file.rewind().await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

impl EntryStore for FsEntryStore {
    async fn entry_for(&self, rep_id: Uuid, date: NaiveDate) -> Result<Option<DailyEntryEntity>> {
        let entries = Self::read_all(&self.rep_path(rep_id)).await?;
        Ok(entries.into_iter().find(|entry| entry.date == date))
    }

    async fn upsert_entry(&self, entry: DailyEntryEntity) -> Result<()> {
        self.upsert_inner(entry).await
    }

    async fn entries_for_rep(&self, rep_id: Uuid) -> Result<Vec<DailyEntryEntity>> {
        let mut entries = Self::read_all(&self.rep_path(rep_id)).await?;
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }

    async fn delete_entries_for(&self, rep_id: Uuid) -> Result<()> {
        match tokio::fs::remove_file(self.rep_path(rep_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
