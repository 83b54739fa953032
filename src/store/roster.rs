use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::debug;

use super::entities::{RepEntity, RepRole};

/// File-backed roster of the team. The whole roster lives in one JSON file;
/// the teams this tool serves are a handful of people.
pub struct FsRosterStore {
    path: PathBuf,
}

impl FsRosterStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("roster.json"),
        }
    }

    /// Every rep, in name order.
    pub async fn list(&self) -> Result<Vec<RepEntity>> {
        debug!("Reading roster {:?}", self.path);
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut contents = String::new();
        let read = file.read_to_string(&mut contents).await;
        file.unlock_async().await?;
        read?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub async fn find(&self, name: &str) -> Result<Option<RepEntity>> {
        Ok(self.list().await?.into_iter().find(|rep| rep.name == name))
    }

    /// Adds a rep. Names are the human key, so a duplicate is an error.
    pub async fn add(&self, name: &str, role: RepRole) -> Result<RepEntity> {
        let mut reps = self.list().await?;
        if reps.iter().any(|rep| rep.name == name) {
            bail!("a rep named {name} already exists");
        }
        let rep = RepEntity::new(name, role);
        reps.push(rep.clone());
        reps.sort_by(|a, b| a.name.cmp(&b.name));
        self.write(&reps).await?;
        Ok(rep)
    }

    /// Removes a rep by name. The caller cascades to the entry store using
    /// the returned entity's id.
    pub async fn remove(&self, name: &str) -> Result<Option<RepEntity>> {
        let mut reps = self.list().await?;
        let Some(position) = reps.iter().position(|rep| rep.name == name) else {
            return Ok(None);
        };
        let removed = reps.remove(position);
        self.write(&reps).await?;
        Ok(Some(removed))
    }

    async fn write(&self, reps: &[RepEntity]) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        file.lock_exclusive()?;
        let result = Self::overwrite(&mut file, reps).await;
        file.unlock_async().await?;
        result
    }

    async fn overwrite(file: &mut File, reps: &[RepEntity]) -> Result<()> {
        let buffer = serde_json::to_vec_pretty(reps)?;
        file.set_len(0).await?;
        file.rewind().await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}
