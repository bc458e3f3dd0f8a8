//! CSV-backed tables.
//!
//! Writes go to a temp file in the table's directory which is then
//! renamed over the target, so a table is never left without its header.
//! Each save touches one table; the rename is its only commit point.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{HeroStore, HERO_COLUMNS, LINK_COLUMNS};
use crate::config::HeroNetConfig;
use crate::error::{HeroNetError, Result};
use crate::graph::{HeroRecord, LinkRecord, Tables};

/// Hero and link tables as two CSV files.
#[derive(Debug, Clone)]
pub struct CsvStore {
    heroes_path: PathBuf,
    links_path: PathBuf,
}

impl CsvStore {
    /// Open the store, creating the directory and any missing table as a
    /// header-only file.
    pub fn open(heroes_path: impl Into<PathBuf>, links_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            heroes_path: heroes_path.into(),
            links_path: links_path.into(),
        };
        store.ensure_table::<HeroRecord>(&store.heroes_path, HERO_COLUMNS)?;
        store.ensure_table::<LinkRecord>(&store.links_path, LINK_COLUMNS)?;
        Ok(store)
    }

    pub fn from_config(config: &HeroNetConfig) -> Result<Self> {
        Self::open(config.heroes_path(), config.links_path())
    }

    pub fn heroes_path(&self) -> &Path {
        &self.heroes_path
    }

    pub fn links_path(&self) -> &Path {
        &self.links_path
    }

    fn ensure_table<T: Serialize>(&self, path: &Path, columns: &[&str]) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        let dir = parent_dir(path);
        fs::create_dir_all(dir).map_err(|e| HeroNetError::io(dir, e))?;
        let tmp = write_table::<T>(path, columns, &[])?;
        persist(tmp, path)?;
        info!(table = %path.display(), "created empty table");
        Ok(())
    }
}

impl HeroStore for CsvStore {
    fn load(&self) -> Result<Tables> {
        let heroes = read_table(&self.heroes_path, HERO_COLUMNS)?;
        let links = read_table(&self.links_path, LINK_COLUMNS)?;
        Ok(Tables::new(heroes, links))
    }

    fn save_heroes(&self, heroes: &[HeroRecord]) -> Result<()> {
        let tmp = write_table(&self.heroes_path, HERO_COLUMNS, heroes)?;
        persist(tmp, &self.heroes_path)?;
        debug!(heroes = heroes.len(), "hero table saved");
        Ok(())
    }

    fn save_links(&self, links: &[LinkRecord]) -> Result<()> {
        let tmp = write_table(&self.links_path, LINK_COLUMNS, links)?;
        persist(tmp, &self.links_path)?;
        debug!(links = links.len(), "link table saved");
        Ok(())
    }
}

fn read_table<T: DeserializeOwned>(path: &Path, columns: &[&str]) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| HeroNetError::io(path, e))?;
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| csv_error(path, e))?;
    if !headers.iter().eq(columns.iter().copied()) {
        return Err(HeroNetError::corrupt(
            path,
            format!(
                "expected header `{}`, found `{}`",
                columns.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    reader
        .deserialize::<T>()
        .map(|row| row.map_err(|e| csv_error(path, e)))
        .collect()
}

fn write_table<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<NamedTempFile> {
    let dir = parent_dir(path);
    let mut tmp = tempfile::Builder::new()
        .prefix(".heronet-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| HeroNetError::io(dir, e))?;

    {
        // Header written by hand so empty tables still get one.
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer
            .write_record(columns)
            .map_err(|e| csv_error(path, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| csv_error(path, e))?;
        }
        writer.flush().map_err(|e| HeroNetError::io(path, e))?;
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| HeroNetError::io(path, e))?;
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map(|_| ())
        .map_err(|e| HeroNetError::io(path, e.error))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn csv_error(path: &Path, err: ::csv::Error) -> HeroNetError {
    if err.is_io_error() {
        if let ::csv::ErrorKind::Io(io) = err.into_kind() {
            return HeroNetError::io(path, io);
        }
        return HeroNetError::corrupt(path, "unreadable table");
    }
    HeroNetError::corrupt(path, err.to_string())
}
