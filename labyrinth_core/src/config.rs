use serde::{Deserialize, Serialize};

/// Tunable constants of a labyrinth run.
///
/// The defaults reproduce the classic setup: a 70x35 field, roughly a third
/// of it walled in, five keys to collect and five bombs to start with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Probability that a generated cell becomes a wall.
    pub wall_frequency: f64,
    /// Probability that a freshly rolled wall is downgraded to a trap.
    pub trap_frequency: f64,
    pub keys_required: u32,
    pub chest_count: usize,
    /// Initial bomb supply. Also the exclusive upper bound of the bomb
    /// reward a chest yields, so it must be at least 2.
    pub starting_bombs: u32,
    pub max_hit_points: u32,
    pub trap_damage: u32,
    pub interact_radius: usize,
    pub bomb_radius: usize,
    /// Upper bound on rejection-sampling attempts when placing an entity on
    /// a free cell. Exhaustion means the field is too crowded.
    pub max_placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 70,
            height: 35,
            wall_frequency: 0.3,
            trap_frequency: 0.15,
            keys_required: 5,
            chest_count: 3,
            starting_bombs: 5,
            max_hit_points: 100,
            trap_damage: 25,
            interact_radius: 1,
            bomb_radius: 2,
            max_placement_attempts: 1000,
        }
    }
}

/// Rejections produced by [`GameConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("field dimensions {width}x{height} cannot hold {entities} entities")]
    FieldTooSmall {
        width: usize,
        height: usize,
        entities: usize,
    },
    #[error("{name} must lie within [0, 1], got {value}")]
    FrequencyOutOfRange { name: &'static str, value: f64 },
    #[error("starting bomb count must be at least 2, got {0}")]
    TooFewBombs(u32),
    #[error("maximum hit points must be positive")]
    NoHitPoints,
}

impl GameConfig {
    /// The number of cells entity placement will claim: player, finish,
    /// the current key (when any are required) and every chest.
    pub fn entity_count(&self) -> usize {
        let key = usize::from(self.keys_required > 0);
        2 + key + self.chest_count
    }

    /// Rejects configurations the generator cannot satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cells = self.width.saturating_mul(self.height);
        if cells < self.entity_count() {
            return Err(ConfigError::FieldTooSmall {
                width: self.width,
                height: self.height,
                entities: self.entity_count(),
            });
        }
        for (name, value) in [
            ("wall_frequency", self.wall_frequency),
            ("trap_frequency", self.trap_frequency),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FrequencyOutOfRange { name, value });
            }
        }
        if self.starting_bombs < 2 {
            return Err(ConfigError::TooFewBombs(self.starting_bombs));
        }
        if self.max_hit_points == 0 {
            return Err(ConfigError::NoHitPoints);
        }
        Ok(())
    }
}
