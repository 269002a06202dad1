//! Level loading for the command-line adapter.
//!
//! A level is a [`GameConfig`] serialized as TOML. When no file is given
//! the built-in ridgeline level is used, which doubles as a reference for
//! the expected document shape.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;
use ridgeline_defence_core::{
    config::{
        EnemyConfig, GameConfig, LevelConfig, MapConfig, SpecialTrait, TierStats, TileKind,
        TowerConfig, WaveSegment,
    },
    EnemyKind, TowerKind, WorldPoint,
};

/// Loads a level from the provided path, falling back to the built-in level.
pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read level file {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse level file {}", path.display()))?
        }
        None => builtin_level(),
    };
    config
        .validate()
        .context("level configuration is invalid")?;
    Ok(config)
}

/// The built-in demonstration level: an eight-column ridgeline with the
/// path cutting through the middle and buildable shelves on both sides.
pub(crate) fn builtin_level() -> GameConfig {
    const COLUMNS: u32 = 8;
    const ROWS: u32 = 5;
    const TILE: f32 = 50.0;

    let mut tiles = Vec::with_capacity((COLUMNS * ROWS) as usize);
    let mut heights = vec![0i32; (COLUMNS * ROWS) as usize];
    for row in 0..ROWS {
        for column in 0..COLUMNS {
            let tile = match row {
                1 | 3 => TileKind::Buildable,
                2 if column == 0 => TileKind::Spawn,
                2 if column == COLUMNS - 1 => TileKind::Goal,
                2 => TileKind::Path,
                _ => TileKind::Ground,
            };
            tiles.push(tile);
        }
    }
    // Two raised shelves overlooking the middle of the path.
    heights[(COLUMNS + 3) as usize] = 1;
    heights[(3 * COLUMNS + 4) as usize] = 2;

    let waypoints = vec![
        WorldPoint::new(25.0, 125.0),
        WorldPoint::new(COLUMNS as f32 * TILE - 25.0, 125.0),
    ];
    let map = MapConfig::new(COLUMNS, ROWS, TILE, tiles, heights, waypoints, vec![0, 0]);

    let level = LevelConfig::new(
        150,
        5.0,
        20,
        1.0,
        vec![
            WaveSegment::new(EnemyKind::new("grunt"), 8, 800),
            WaveSegment::new(EnemyKind::new("splitter"), 3, 1_500),
            WaveSegment::new(EnemyKind::new("shield-bearer"), 4, 1_200),
        ],
    );

    let mut towers = BTreeMap::new();
    let _ = towers.insert(
        TowerKind::new("laser"),
        TowerConfig::new(
            50,
            [75, 110],
            0.5,
            300.0,
            [
                TierStats::new(5.0, 120.0, 2.0),
                TierStats::new(9.0, 140.0, 2.5),
                TierStats::new(14.0, 160.0, 3.0),
            ],
        ),
    );
    let _ = towers.insert(
        TowerKind::new("mortar"),
        TowerConfig::new(
            80,
            [110, 150],
            0.5,
            200.0,
            [
                TierStats::new(9.0, 150.0, 0.8).with_splash(40.0),
                TierStats::new(14.0, 165.0, 0.9).with_splash(45.0),
                TierStats::new(20.0, 180.0, 1.0).with_splash(50.0),
            ],
        ),
    );
    let _ = towers.insert(
        TowerKind::new("frost"),
        TowerConfig::new(
            60,
            [90, 120],
            0.5,
            0.0,
            [
                TierStats::new(2.0, 100.0, 1.0).with_slow(0.5, 2_000),
                TierStats::new(3.0, 110.0, 1.0).with_slow(0.4, 2_500),
                TierStats::new(4.0, 120.0, 1.0).with_slow(0.3, 3_000),
            ],
        ),
    );

    let mut enemies = BTreeMap::new();
    let _ = enemies.insert(EnemyKind::new("grunt"), EnemyConfig::new(20.0, 60.0, 5));
    let _ = enemies.insert(
        EnemyKind::new("shield-bearer"),
        EnemyConfig::new(40.0, 45.0, 12).with_special(SpecialTrait::Shield {
            shield_percent: 0.5,
            regen_delay_ms: 3_000,
        }),
    );
    let _ = enemies.insert(
        EnemyKind::new("splitter"),
        EnemyConfig::new(30.0, 50.0, 10).with_special(SpecialTrait::Split {
            count: 2,
            child: EnemyKind::new("grunt"),
        }),
    );

    GameConfig::new(level, map, towers, enemies)
}
