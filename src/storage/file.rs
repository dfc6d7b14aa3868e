// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::Result, metadata};

use super::{IsPersistent, Storage};

pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Option<Self> {
        metadata::PROJECT_DIRS.as_ref().map(|dirs| Self {
            path: dirs.data_dir().to_owned().join(file),
        })
    }

    pub(crate) fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl IsPersistent for File {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + for<'de> Deserialize<'de>> Storage<T> for File {
    async fn get(&mut self) -> Result<Option<T>> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(Some(serde_json::from_reader::<fs::File, T>(fp)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer(file, data)?;
        debug!("Wrote session to {}", self.path.display());
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    type Map = BTreeMap<String, String>;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("teamflow-{}", std::process::id()))
            .join(name)
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() -> Result<()> {
        let mut storage = File::at(scratch("missing.json"));
        assert!(Storage::<Map>::get(&mut storage).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_then_clear() -> Result<()> {
        let mut storage = File::at(scratch("update.json"));
        let data = Map::from([("token".to_owned(), "abc".to_owned())]);

        Storage::<Map>::update(&mut storage, &data).await?;
        assert_eq!(Storage::<Map>::get(&mut storage).await?, Some(data));

        Storage::<Map>::clear(&mut storage).await?;
        assert_eq!(Storage::<Map>::get(&mut storage).await?, None);

        // Clearing twice is fine.
        Storage::<Map>::clear(&mut storage).await?;
        Ok(())
    }
}
