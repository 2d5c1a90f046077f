use labyrinth_core::{
    Position,
    config::{ConfigError, GameConfig},
    field::{Field, Tile},
    game::{Game, GameError},
};
use rand::{SeedableRng, rngs::StdRng};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn tile_count(game: &Game, wanted: Tile) -> usize {
    game.field()
        .enumerate()
        .filter(|(_, tile)| *tile == wanted)
        .count()
}

#[test]
fn bounds_predicate_matches_field_borders() {
    let field = Field::new(10, 10);

    assert!(field.is_within(Position { x: 0, y: 0 }));
    assert!(field.is_within(Position { x: 5, y: 5 }));
    assert!(field.is_within(Position { x: 9, y: 9 }));

    assert!(!field.is_within(Position { x: 10, y: 5 }));
    assert!(!field.is_within(Position { x: 5, y: 10 }));
    assert!(!field.is_within(Position { x: 10, y: 10 }));
}

#[test]
fn generated_entities_are_unique_and_stamped() {
    let config = GameConfig::default();
    let game = Game::new(config.clone(), rng(42)).expect("generation succeeds");

    let player = game.player();
    let finish = game.finish();
    let key = game.key().expect("a key is placed");
    assert_ne!(player, finish);
    assert_ne!(player, key);
    assert_ne!(finish, key);
    for &chest in game.chests() {
        assert_ne!(chest, player);
        assert_ne!(chest, finish);
        assert_ne!(chest, key);
    }

    assert_eq!(game.field()[player], Tile::Player);
    assert_eq!(game.field()[finish], Tile::Finish);
    assert_eq!(game.field()[key], Tile::Key);

    assert_eq!(tile_count(&game, Tile::Player), 1);
    assert_eq!(tile_count(&game, Tile::Finish), 1);
    assert_eq!(tile_count(&game, Tile::Key), 1);
    assert_eq!(tile_count(&game, Tile::Chest), config.chest_count);
}

#[test]
fn certain_wall_rolls_fill_every_free_cell() {
    let config = GameConfig {
        wall_frequency: 1.0,
        trap_frequency: 1.0,
        ..GameConfig::default()
    };
    let game = Game::new(config.clone(), rng(7)).expect("generation succeeds");

    let free_cells = config.width * config.height - config.entity_count();
    assert_eq!(tile_count(&game, Tile::Trap), free_cells);
    assert_eq!(tile_count(&game, Tile::Wall), 0);
    assert_eq!(tile_count(&game, Tile::Air), 0);
}

#[test]
fn zero_wall_frequency_leaves_the_field_open() {
    let config = GameConfig {
        wall_frequency: 0.0,
        ..GameConfig::default()
    };
    let game = Game::new(config.clone(), rng(7)).expect("generation succeeds");

    let free_cells = config.width * config.height - config.entity_count();
    assert_eq!(tile_count(&game, Tile::Air), free_cells);
    assert_eq!(tile_count(&game, Tile::Wall), 0);
    assert_eq!(tile_count(&game, Tile::Trap), 0);
}

#[test]
fn no_key_is_placed_when_none_are_required() {
    let config = GameConfig {
        keys_required: 0,
        ..GameConfig::default()
    };
    let game = Game::new(config, rng(9)).expect("generation succeeds");

    assert_eq!(game.key(), None);
    assert_eq!(tile_count(&game, Tile::Key), 0);
    assert!(game.all_keys_collected(), "the finish is armed from the start");
}

#[test]
fn exhausted_placement_is_an_error() {
    let config = GameConfig {
        max_placement_attempts: 0,
        ..GameConfig::default()
    };
    let err = Game::new(config, rng(1)).unwrap_err();

    assert!(matches!(
        err,
        GameError::PlacementExhausted {
            entity: "player",
            attempts: 0
        }
    ));
}

#[test]
fn degenerate_configs_are_rejected() {
    assert!(GameConfig::default().validate().is_ok());

    let too_small = GameConfig {
        width: 0,
        ..GameConfig::default()
    };
    assert!(matches!(
        too_small.validate(),
        Err(ConfigError::FieldTooSmall { .. })
    ));

    let bad_frequency = GameConfig {
        wall_frequency: 1.5,
        ..GameConfig::default()
    };
    assert!(matches!(
        bad_frequency.validate(),
        Err(ConfigError::FrequencyOutOfRange {
            name: "wall_frequency",
            ..
        })
    ));

    let bombless = GameConfig {
        starting_bombs: 1,
        ..GameConfig::default()
    };
    assert_eq!(bombless.validate(), Err(ConfigError::TooFewBombs(1)));

    let lifeless = GameConfig {
        max_hit_points: 0,
        ..GameConfig::default()
    };
    assert_eq!(lifeless.validate(), Err(ConfigError::NoHitPoints));
}

#[test]
fn fixed_map_loads_with_parsed_dimensions() {
    let config = GameConfig {
        keys_required: 1,
        ..GameConfig::default()
    };
    let game = Game::from_map_str(
        config,
        "\
@.K
.OF",
        rng(3),
    )
    .expect("map should load");

    assert_eq!(game.field().width(), 3);
    assert_eq!(game.field().height(), 2);
    assert_eq!(game.player(), Position { x: 0, y: 0 });
    assert_eq!(game.finish(), Position { x: 2, y: 1 });
    assert_eq!(game.key(), Some(Position { x: 2, y: 0 }));
    assert_eq!(game.field()[Position { x: 1, y: 1 }], Tile::Wall);
}

#[test]
fn malformed_maps_are_rejected() {
    let config = || GameConfig {
        keys_required: 1,
        ..GameConfig::default()
    };

    let ragged = Game::from_map_str(config(), "@.F\n..", rng(0)).unwrap_err();
    assert!(matches!(
        ragged,
        GameError::RaggedMap {
            row: 1,
            expected: 3,
            found: 2
        }
    ));

    let unknown = Game::from_map_str(config(), "@?F", rng(0)).unwrap_err();
    assert!(matches!(
        unknown,
        GameError::UnknownSymbol {
            symbol: '?',
            x: 1,
            y: 0
        }
    ));

    let twins = Game::from_map_str(config(), "@@F", rng(0)).unwrap_err();
    assert!(matches!(twins, GameError::PlayerCount));

    let nobody = Game::from_map_str(config(), "..F", rng(0)).unwrap_err();
    assert!(matches!(nobody, GameError::PlayerCount));

    let no_exit = Game::from_map_str(config(), "@..", rng(0)).unwrap_err();
    assert!(matches!(no_exit, GameError::FinishCount));

    let two_keys = Game::from_map_str(config(), "@KKF", rng(0)).unwrap_err();
    assert!(matches!(two_keys, GameError::KeyCount));

    let empty = Game::from_map_str(config(), "", rng(0)).unwrap_err();
    assert!(matches!(empty, GameError::EmptyMap));
}
