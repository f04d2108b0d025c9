//! Boss tuning loaded from RON files.
//!
//! Every tuning struct carries its stock values as `Default` and is
//! `#[serde(default)]`, so a file only needs the fields it changes. A boss
//! without a file fights with the stock values.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::de::DeserializeOwned;

use super::roster::{BossKind, BospiderTuning, GutsTankTuning, InfernoManTuning, TimberWomanTuning};
use crate::world::DataLoadError;

pub const BOSS_DATA_DIR: &str = "assets/data/bosses";

/// Resource holding the tuning every boss is built with.
#[derive(Resource, Debug, Clone, Default)]
pub struct BossRegistry {
    pub bospider: BospiderTuning,
    pub inferno_man: InfernoManTuning,
    pub timber_woman: TimberWomanTuning,
    pub guts_tank: GutsTankTuning,
    loaded: HashSet<BossKind>,
}

impl BossRegistry {
    /// Whether `kind` came from a file rather than the stock values.
    pub fn is_loaded(&self, kind: BossKind) -> bool {
        self.loaded.contains(&kind)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Parses `contents` as the tuning of `kind` and stores it.
    pub fn apply(&mut self, kind: BossKind, contents: &str, path: &str) -> Result<(), DataLoadError> {
        match kind {
            BossKind::Bospider => self.bospider = parse_ron(contents, path)?,
            BossKind::InfernoMan => self.inferno_man = parse_ron(contents, path)?,
            BossKind::TimberWoman => self.timber_woman = parse_ron(contents, path)?,
            BossKind::GutsTank => self.guts_tank = parse_ron(contents, path)?,
        }
        self.loaded.insert(kind);
        Ok(())
    }

    /// Reads one tuning file, named after its boss.
    pub fn load_file(&mut self, path: &Path) -> Result<BossKind, DataLoadError> {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown");
        let kind = BossKind::from_file_stem(stem).ok_or_else(|| DataLoadError::UnknownBoss(stem.to_string()))?;
        let contents = read_data_file(path)?;
        self.apply(kind, &contents, &path.display().to_string())?;
        Ok(kind)
    }

    /// Loads every `.ron` file in `dir`. Bad files are logged and skipped.
    pub fn load_dir(&mut self, dir: &Path) {
        if !dir.exists() {
            warn!("Boss tuning directory not found: {:?}", dir);
            return;
        }

        let Ok(entries) = fs::read_dir(dir) else {
            warn!("Failed to read boss tuning directory");
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "ron") {
                continue;
            }
            match self.load_file(&path) {
                Ok(kind) => info!("Loaded tuning for {:?}", kind),
                Err(DataLoadError::UnknownBoss(stem)) => warn!("Ignoring tuning for unknown boss '{}'", stem),
                Err(err) => error!("{}", err),
            }
        }
    }
}

pub fn read_data_file(path: &Path) -> Result<String, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(path.display().to_string()));
    }
    fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

pub fn parse_ron<T: DeserializeOwned>(contents: &str, path: &str) -> Result<T, DataLoadError> {
    ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
        path: path.to_string(),
        details: e.to_string(),
    })
}

/// Loads boss tuning when a level starts.
pub fn load_boss_tuning(mut registry: ResMut<BossRegistry>) {
    *registry = BossRegistry::default();
    registry.load_dir(Path::new(BOSS_DATA_DIR));
    info!("Loaded tuning for {} boss types", registry.loaded_count());
}

/// Drops loaded tuning when the level goes away.
pub fn clear_boss_tuning(mut registry: ResMut<BossRegistry>) {
    *registry = BossRegistry::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scaled;

    #[test]
    fn partial_files_keep_stock_values() {
        let mut registry = BossRegistry::default();
        registry
            .apply(
                BossKind::GutsTank,
                "(pause: 2.0, speed: (full: 3.0, empty: 6.0))",
                "guts_tank.ron",
            )
            .unwrap();

        let stock = GutsTankTuning::default();
        assert_eq!(registry.guts_tank.pause, 2.0);
        assert_eq!(registry.guts_tank.speed, Scaled { full: 3.0, empty: 6.0 });
        assert_eq!(registry.guts_tank.intro, stock.intro);
        assert!(registry.is_loaded(BossKind::GutsTank));
        assert!(!registry.is_loaded(BossKind::Bospider));
    }

    #[test]
    fn broken_files_are_parse_errors() {
        let mut registry = BossRegistry::default();
        let err = registry
            .apply(BossKind::Bospider, "(max_health: \"lots\")", "bospider.ron")
            .unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { ref path, .. } if path == "bospider.ron"));
        assert_eq!(registry.loaded_count(), 0);
    }

    #[test]
    fn missing_files_are_reported() {
        let mut registry = BossRegistry::default();
        let err = registry.load_file(Path::new("does/not/exist/bospider.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound(_)));

        let err = registry.load_file(Path::new("does/not/exist/dragon.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::UnknownBoss(ref stem) if stem == "dragon"));
    }
}
