use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// The symbolic content of one field cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Air,
    Wall,
    Trap,
    Key,
    Chest,
    Finish,
    Player,
}

impl Tile {
    /// The single character the tile is drawn as.
    pub fn symbol(self) -> char {
        match self {
            Tile::Air => '.',
            Tile::Wall => 'O',
            Tile::Trap => 'x',
            Tile::Key => 'K',
            Tile::Chest => 'C',
            Tile::Finish => 'F',
            Tile::Player => '@',
        }
    }

    /// Parses a map symbol back into a tile. Inverse of [`Tile::symbol`].
    pub fn from_symbol(symbol: char) -> Option<Tile> {
        match symbol {
            '.' => Some(Tile::Air),
            'O' => Some(Tile::Wall),
            'x' => Some(Tile::Trap),
            'K' => Some(Tile::Key),
            'C' => Some(Tile::Chest),
            'F' => Some(Tile::Finish),
            '@' => Some(Tile::Player),
            _ => None,
        }
    }

    /// Whether the player may stand on this tile. Everything else blocks
    /// movement and is consumed or used through an interact instead.
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Air | Tile::Trap)
    }
}

/// Errors that can occur within field operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("coordinates ({x}, {y}) are out of bounds for field size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// The labyrinth field: a fixed-size 2D arrangement of [`Tile`]s.
///
/// Tiles are stored in a flat vector in row-major order. Indexing by
/// [`Position`] panics on out-of-bounds access; callers are expected to
/// validate coordinates with [`Field::is_within`] first, or go through the
/// checked [`Field::get`]/[`Field::set`] pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Field {
    /// Creates a field of the given dimensions filled with [`Tile::Air`].
    pub fn new(width: usize, height: usize) -> Self {
        let size = width.checked_mul(height).expect("field size overflow");
        Field {
            width,
            height,
            tiles: vec![Tile::Air; size],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks whether the position lies strictly inside the field boundaries.
    #[inline]
    pub fn is_within(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    #[inline]
    fn index_of(&self, position: Position) -> Option<usize> {
        if self.is_within(position) {
            Some(position.y * self.width + position.x)
        } else {
            None
        }
    }

    /// Returns the tile at `position`, or `None` when out of bounds.
    pub fn get(&self, position: Position) -> Option<Tile> {
        self.index_of(position).map(|index| self.tiles[index])
    }

    /// Replaces the tile at `position`.
    pub fn set(&mut self, position: Position, tile: Tile) -> Result<(), FieldError> {
        let index = self.index_of(position).ok_or(FieldError::OutOfBounds {
            x: position.x,
            y: position.y,
            width: self.width,
            height: self.height,
        })?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Iterates over all cells as `(Position, Tile)` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles.iter().enumerate().map(|(index, tile)| {
            let position = Position {
                x: index % self.width,
                y: index / self.width,
            };
            (position, *tile)
        })
    }

    /// Iterates over the field one row at a time, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width)
    }
}

impl Index<Position> for Field {
    type Output = Tile;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.index_of(position) {
            Some(index) => &self.tiles[index],
            None => panic!(
                "field index ({}, {}) out of bounds for field size ({}, {})",
                position.x, position.y, self.width, self.height
            ),
        }
    }
}

impl IndexMut<Position> for Field {
    #[inline]
    fn index_mut(&mut self, position: Position) -> &mut Self::Output {
        let (width, height) = (self.width, self.height);
        match self.index_of(position) {
            Some(index) => &mut self.tiles[index],
            None => panic!(
                "field index ({}, {}) out of bounds for field size ({}, {})",
                position.x, position.y, width, height
            ),
        }
    }
}
