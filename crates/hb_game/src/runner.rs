use std::path::PathBuf;

use crate::config::GameConfig;
use crate::error::LevelError;
use crate::inventory::Inventory;
use crate::level::{Level, LevelStatus};
use crate::level_builder::LevelBuilder;

pub type LevelFactory = fn() -> LevelBuilder;

/// Owns the active level and rebuilds it on reload.
pub struct LevelRunner {
    name: String,
    factory: LevelFactory,
    config: GameConfig,
    assets_dir: PathBuf,
    level: Option<Level>,
    reloads: u32,
}

impl LevelRunner {
    pub fn new(
        name: &str,
        factory: LevelFactory,
        config: GameConfig,
        assets_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.to_string(),
            factory,
            config,
            assets_dir: assets_dir.into(),
            level: None,
            reloads: 0,
        }
    }

    /// Build, preload and create a fresh level. Any previous level is torn
    /// down first so its timers cannot fire.
    pub fn start(&mut self) -> Result<&mut Level, LevelError> {
        if let Some(mut old) = self.level.take() {
            old.teardown();
        }

        let mut level =
            (self.factory)().build_with_config(&self.name, Inventory::new(), self.config.clone());
        level.loader.set_base_dir(&self.assets_dir);
        level.preload()?;
        level.create()?;
        Ok(self.level.insert(level))
    }

    /// Step the active level. A requested reload is carried out before
    /// returning, so the caller sees the new level on its next tick.
    pub fn tick(&mut self, elapsed: f64, delta: f64) -> Result<LevelStatus, LevelError> {
        let Some(level) = self.level.as_mut() else {
            return Err(LevelError::NotCreated("active level"));
        };
        let status = level.step(elapsed, delta);
        if status == LevelStatus::ReloadRequested {
            self.reload()?;
        }
        Ok(status)
    }

    /// Inventory is not carried over.
    pub fn reload(&mut self) -> Result<&mut Level, LevelError> {
        self.reloads += 1;
        log::info!("Reloading '{}' (reload #{})", self.name, self.reloads);
        self.start()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    pub fn reloads(&self) -> u32 {
        self.reloads
    }
}
