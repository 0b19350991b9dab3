//! Headless platformer core: tile-map levels, entity controllers, data-driven
//! tile objects and their collision handlers.
//!
//! A host drives a `Level` through `preload()`, `create()` and then one
//! `step(elapsed, delta)` per fixed tick. `LevelRunner` wraps that cycle and
//! rebuilds the level when the hero dies.

pub mod assets;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod level;
pub mod level_builder;
pub mod levels;
pub mod physics;
pub mod replay;
pub mod runner;
pub mod tile_objects;
pub mod tilemap;
