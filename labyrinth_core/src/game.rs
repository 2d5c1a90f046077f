use std::collections::HashSet;

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    config::{ConfigError, GameConfig},
    field::{Field, FieldError, Tile},
};

/// The closed set of commands a player can issue.
///
/// Unrecognized key presses are dropped by the input mapper before they
/// reach the engine, so every action here is exhaustively handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move(Direction),
    Interact,
    UseBomb,
}

/// Lifecycle of a run. `Won` and `Dead` are terminal: once either is
/// reached, further actions are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    Won,
    Dead,
}

/// Errors that can occur while setting up or advancing a game.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("no free cell found for {entity} after {attempts} attempts")]
    PlacementExhausted { entity: &'static str, attempts: u32 },
    #[error("map is empty")]
    EmptyMap,
    #[error("map row {row} has width {found}, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown map symbol '{symbol}' at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
    #[error("map must contain exactly one player start")]
    PlayerCount,
    #[error("map must contain exactly one finish")]
    FinishCount,
    #[error("map may contain at most one key")]
    KeyCount,
}

/// A single labyrinth run: the field, the entities living on it and the
/// win/lose bookkeeping. The game loop is the sole owner; every mutation
/// goes through [`Game::apply`].
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    field: Field,
    player: Position,
    player_prev: Position,
    finish: Position,
    key: Option<Position>,
    chests: HashSet<Position>,
    /// Cells currently claimed by an entity. Consulted whenever a fresh
    /// coordinate is drawn so entities never stack.
    used: HashSet<Position>,
    bombs: u32,
    keys_collected: u32,
    hit_points: u32,
    status: GameStatus,
    rng: StdRng,
}

/// Draws uniform positions until one misses `used`, claiming and returning
/// it. Attempts are bounded: a field crowded enough to exhaust them is a
/// configuration problem, not something to retry forever.
fn place_unique(
    rng: &mut StdRng,
    width: usize,
    height: usize,
    used: &mut HashSet<Position>,
    entity: &'static str,
    max_attempts: u32,
) -> Result<Position, GameError> {
    for _ in 0..max_attempts {
        let candidate = Position {
            x: rng.random_range(0..width),
            y: rng.random_range(0..height),
        };
        if used.insert(candidate) {
            return Ok(candidate);
        }
    }
    Err(GameError::PlacementExhausted {
        entity,
        attempts: max_attempts,
    })
}

impl Game {
    /// Generates a fresh labyrinth: probabilistic walls and traps, then
    /// player, finish, key and chests stamped onto unique free coordinates.
    pub fn new(config: GameConfig, mut rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;

        let mut field = Field::new(config.width, config.height);
        for y in 0..config.height {
            for x in 0..config.width {
                field[Position { x, y }] = roll_tile(&mut rng, &config);
            }
        }

        let mut used = HashSet::new();
        let claim = |rng: &mut StdRng, used: &mut HashSet<Position>, entity| {
            place_unique(
                rng,
                config.width,
                config.height,
                used,
                entity,
                config.max_placement_attempts,
            )
        };

        let player = claim(&mut rng, &mut used, "player")?;
        let finish = claim(&mut rng, &mut used, "finish")?;
        let key = if config.keys_required > 0 {
            Some(claim(&mut rng, &mut used, "key")?)
        } else {
            None
        };
        let mut chests = HashSet::new();
        for _ in 0..config.chest_count {
            let chest = claim(&mut rng, &mut used, "chest")?;
            chests.insert(chest);
        }

        // Entities override whatever the populator rolled underneath them.
        field[player] = Tile::Player;
        field[finish] = Tile::Finish;
        if let Some(key) = key {
            field[key] = Tile::Key;
        }
        for &chest in &chests {
            field[chest] = Tile::Chest;
        }

        Ok(Game {
            bombs: config.starting_bombs,
            hit_points: config.max_hit_points,
            config,
            field,
            player,
            player_prev: player,
            finish,
            key,
            chests,
            used,
            keys_collected: 0,
            status: GameStatus::Running,
            rng,
        })
    }

    /// Builds a game from a character map instead of random generation.
    ///
    /// Symbols follow [`Tile::symbol`], with `@` marking the player start.
    /// The map must be rectangular and contain exactly one player and one
    /// finish; its dimensions replace the configured ones. Every other rule
    /// of the game is shared with randomly generated runs.
    pub fn from_map_str(
        mut config: GameConfig,
        map: &str,
        rng: StdRng,
    ) -> Result<Self, GameError> {
        let lines: Vec<&str> = map.trim().lines().map(str::trim_end).collect();
        if lines.is_empty() || lines[0].is_empty() {
            return Err(GameError::EmptyMap);
        }

        let width = lines[0].chars().count();
        let height = lines.len();
        let mut field = Field::new(width, height);
        let mut player = None;
        let mut finish = None;
        let mut key = None;
        let mut chests = HashSet::new();

        for (y, line) in lines.iter().enumerate() {
            let row: Vec<char> = line.chars().collect();
            if row.len() != width {
                return Err(GameError::RaggedMap {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, symbol) in row.into_iter().enumerate() {
                let position = Position { x, y };
                let tile = Tile::from_symbol(symbol)
                    .ok_or(GameError::UnknownSymbol { symbol, x, y })?;
                match tile {
                    Tile::Player if player.is_some() => return Err(GameError::PlayerCount),
                    Tile::Player => player = Some(position),
                    Tile::Finish if finish.is_some() => return Err(GameError::FinishCount),
                    Tile::Finish => finish = Some(position),
                    Tile::Key if key.is_some() => return Err(GameError::KeyCount),
                    Tile::Key => key = Some(position),
                    Tile::Chest => {
                        chests.insert(position);
                    }
                    _ => {}
                }
                field.set(position, tile)?;
            }
        }

        let player = player.ok_or(GameError::PlayerCount)?;
        let finish = finish.ok_or(GameError::FinishCount)?;

        config.width = width;
        config.height = height;
        config.chest_count = chests.len();
        config.validate()?;

        let mut used: HashSet<Position> = chests.iter().copied().collect();
        used.insert(player);
        used.insert(finish);
        if let Some(key) = key {
            used.insert(key);
        }

        Ok(Game {
            bombs: config.starting_bombs,
            hit_points: config.max_hit_points,
            config,
            field,
            player,
            player_prev: player,
            finish,
            key,
            chests,
            used,
            keys_collected: 0,
            status: GameStatus::Running,
            rng,
        })
    }

    /// Applies one player command. Does nothing once the game has ended.
    ///
    /// Illegal moves and bombless bomb presses are silently discarded; the
    /// only error surfaced is a field too crowded to regenerate a key on.
    pub fn apply(&mut self, action: Action) -> Result<(), GameError> {
        if self.status != GameStatus::Running {
            return Ok(());
        }
        match action {
            Action::Move(direction) => {
                self.try_move(direction);
                Ok(())
            }
            Action::Interact => self.interact(),
            Action::UseBomb => {
                self.use_bomb();
                Ok(())
            }
        }
    }

    fn try_move(&mut self, direction: Direction) {
        let Some(target) = self.player.step(direction) else {
            return;
        };
        let Some(destination) = self.field.get(target) else {
            return;
        };
        if !destination.is_walkable() {
            return;
        }

        self.field[self.player] = Tile::Air;
        self.used.remove(&self.player);
        self.player_prev = self.player;
        self.player = target;
        self.used.insert(target);
        self.field[target] = Tile::Player;

        // Damage lands only after the step has committed.
        if destination == Tile::Trap {
            self.take_damage(self.config.trap_damage);
        }
    }

    fn interact(&mut self) -> Result<(), GameError> {
        let mut key_collected = false;
        for target in self.scan_block(self.config.interact_radius) {
            let tile = self.field[target];
            match tile {
                Tile::Finish if self.all_keys_collected() => {
                    self.status = GameStatus::Won;
                    return Ok(());
                }
                // One key per interact: a replacement key landing inside
                // the same scan block must not be collected again.
                Tile::Key if !key_collected => {
                    key_collected = true;
                    self.collect_key(target)?;
                }
                Tile::Chest => {
                    self.field[target] = Tile::Air;
                    self.used.remove(&target);
                    self.chests.remove(&target);
                    self.bombs += self.rng.random_range(1..self.config.starting_bombs);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn collect_key(&mut self, target: Position) -> Result<(), GameError> {
        self.field[target] = Tile::Air;
        self.used.remove(&target);
        self.key = None;
        self.keys_collected += 1;

        if self.keys_collected < self.config.keys_required {
            let replacement = place_unique(
                &mut self.rng,
                self.config.width,
                self.config.height,
                &mut self.used,
                "key",
                self.config.max_placement_attempts,
            )?;
            // Stamped over whatever terrain sits there, walls included.
            self.field[replacement] = Tile::Key;
            self.key = Some(replacement);
        }
        Ok(())
    }

    fn use_bomb(&mut self) {
        if self.bombs == 0 {
            return;
        }
        for target in self.scan_block(self.config.bomb_radius) {
            if matches!(self.field[target], Tile::Wall | Tile::Trap) {
                self.field[target] = Tile::Air;
            }
        }
        self.bombs -= 1;
    }

    fn take_damage(&mut self, amount: u32) {
        self.hit_points = self.hit_points.saturating_sub(amount);
        if self.hit_points == 0 {
            self.status = GameStatus::Dead;
        }
    }

    /// In-bounds cells of the square block of Chebyshev distance `radius`
    /// around the player, in row-major order (y outer, x inner).
    fn scan_block(&self, radius: usize) -> Vec<Position> {
        let radius = radius as isize;
        let mut cells = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let Some(x) = self.player.x.checked_add_signed(dx) else {
                    continue;
                };
                let Some(y) = self.player.y.checked_add_signed(dy) else {
                    continue;
                };
                let candidate = Position { x, y };
                if self.field.is_within(candidate) {
                    cells.push(candidate);
                }
            }
        }
        cells
    }

    pub fn all_keys_collected(&self) -> bool {
        self.keys_collected == self.config.keys_required
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn player(&self) -> Position {
        self.player
    }

    /// The cell the player stood on before the last committed move.
    pub fn previous_player(&self) -> Position {
        self.player_prev
    }

    pub fn finish(&self) -> Position {
        self.finish
    }

    /// The key currently waiting on the field, if any remain to collect.
    pub fn key(&self) -> Option<Position> {
        self.key
    }

    pub fn chests(&self) -> &HashSet<Position> {
        &self.chests
    }

    pub fn bombs(&self) -> u32 {
        self.bombs
    }

    pub fn keys_collected(&self) -> u32 {
        self.keys_collected
    }

    pub fn keys_required(&self) -> u32 {
        self.config.keys_required
    }

    pub fn hit_points(&self) -> u32 {
        self.hit_points
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }
}

/// One populator draw: a wall with `wall_frequency` probability, downgraded
/// to a trap with `trap_frequency` probability, air otherwise.
fn roll_tile(rng: &mut StdRng, config: &GameConfig) -> Tile {
    if rng.random::<f64>() <= config.wall_frequency {
        if rng.random::<f64>() <= config.trap_frequency {
            Tile::Trap
        } else {
            Tile::Wall
        }
    } else {
        Tile::Air
    }
}
