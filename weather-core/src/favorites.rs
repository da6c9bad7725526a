use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Favorite city names, in insertion order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<String>);

impl Favorites {
    /// Build a list from names, dropping repeats (first occurrence wins).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        Favorites(names)
    }

    /// Remove `city` if present, otherwise append it.
    pub fn toggle(&self, city: &str) -> Favorites {
        if self.contains(city) {
            Favorites(
                self.0
                    .iter()
                    .filter(|fav| fav.as_str() != city)
                    .cloned()
                    .collect(),
            )
        } else {
            let mut names = self.0.clone();
            names.push(city.to_string());
            Favorites(names)
        }
    }

    pub fn contains(&self, city: &str) -> bool {
        self.0.iter().any(|fav| fav == city)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// JSON file holding the favorites list.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored list. A missing, unreadable or corrupt file yields an
    /// empty list; nothing is propagated.
    pub fn load(&self) -> Favorites {
        if !self.path.exists() {
            return Favorites::default();
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    %err,
                    "could not read favorites, starting empty"
                );
                return Favorites::default();
            }
        };

        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(names) => {
                let favorites = Favorites::from_names(names);
                debug!(count = favorites.len(), "loaded favorites");
                favorites
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    %err,
                    "favorites file is not a JSON list, starting empty"
                );
                Favorites::default()
            }
        }
    }

    /// Write the full list, creating parent directories as needed.
    pub fn persist(&self, favorites: &Favorites) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create favorites directory: {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_string(favorites).context("Failed to serialize favorites to JSON")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write favorites file: {}", self.path.display()))?;

        debug!(count = favorites.len(), "persisted favorites");
        Ok(())
    }
}
