use anyhow::{Context, Result};
use clap::Parser;
use labyrinth_core::{
    Direction,
    config::GameConfig,
    field::Tile,
    game::{Action, Game, GameStatus},
};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    crossterm::{
        event::{self, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RNG seed for labyrinth generation; drawn from OS entropy when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    /// Field width in cells
    #[arg(long)]
    width: Option<usize>,
    /// Field height in cells
    #[arg(long)]
    height: Option<usize>,
    /// Number of keys to collect before the finish unlocks
    #[arg(short, long)]
    keys: Option<u32>,
    /// Fixed map file to play instead of a generated labyrinth
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,
}

struct App {
    /// The core game state.
    game: Game,
    /// Seed the run was generated from, shown so a layout can be replayed.
    seed: u64,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(args: Args) -> Result<Self> {
        let mut config = GameConfig::default();
        if let Some(width) = args.width {
            config.width = width;
        }
        if let Some(height) = args.height {
            config.height = height;
        }
        if let Some(keys) = args.keys {
            config.keys_required = keys;
        }

        let seed = args.seed.unwrap_or_else(rand::random);
        let rng = StdRng::seed_from_u64(seed);

        let game = match args.map {
            Some(path) => {
                let map = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read map file {}", path.display()))?;
                Game::from_map_str(config, &map, rng)?
            }
            None => Game::new(config, rng)?,
        };

        Ok(App {
            game,
            seed,
            should_quit: false,
        })
    }

    /// Handles one key press: quit keys, the game-over screen, or a game
    /// action. Keys outside the command set are ignored.
    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        if self.game.status() != GameStatus::Running {
            // The results screen waits for exactly one more key press.
            self.quit();
            return Ok(());
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            code => {
                if let Some(action) = map_key(code) {
                    self.game.apply(action)?;
                }
            }
        }
        Ok(())
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Translates a key press into a game action, or `None` for anything
/// outside the command set.
fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(Action::Move(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(Action::Move(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(Action::Move(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(Action::Move(Direction::Right)),
        KeyCode::Enter => Some(Action::Interact),
        KeyCode::Char(' ') => Some(Action::UseBomb),
        _ => None,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Create the application state before touching the terminal so config
    // and map errors print normally.
    let mut app = App::new(args)?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    result
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop: draw, block on one key press, apply one command.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            app.handle_key(key.code)?;
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Area for the field
            Constraint::Length(5), // Area for the status readout
            Constraint::Length(2), // Area for help text
        ])
        .split(frame.area());

    if app.game.status() == GameStatus::Running {
        render_field(frame, main_layout[0], &app.game);
    } else {
        render_outcome(frame, main_layout[0], &app.game);
    }
    render_status(frame, main_layout[1], app);

    let help_text =
        Paragraph::new("Arrows/WASD: move | Enter: interact | Space: bomb | q/Esc: quit")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the labyrinth field, one colored character per tile.
fn render_field(frame: &mut Frame, area: Rect, game: &Game) {
    let field = game.field();
    let mut lines: Vec<Line> = Vec::with_capacity(field.height());

    for row in field.rows() {
        let spans: Vec<Span> = row.iter().map(|tile| tile_span(*tile)).collect();
        lines.push(Line::from(spans));
    }

    let field_paragraph = Paragraph::new(lines)
        .block(Block::default().title("The Labyrinth").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(field_paragraph, area);
}

/// Color mapping for the tiles.
fn tile_span(tile: Tile) -> Span<'static> {
    let style = match tile {
        Tile::Player => Style::default().fg(Color::Magenta).bold(),
        Tile::Wall => Style::default().fg(Color::Yellow),
        Tile::Air => Style::default().fg(Color::White),
        Tile::Finish => Style::default().fg(Color::Blue),
        Tile::Key => Style::default().fg(Color::Green),
        Tile::Trap => Style::default().fg(Color::Red),
        Tile::Chest => Style::default().fg(Color::LightYellow),
    };
    Span::styled(tile.symbol().to_string(), style)
}

/// Renders the win/death screen shown once the game has ended.
fn render_outcome(frame: &mut Frame, area: Rect, game: &Game) {
    let (message, style) = match game.status() {
        GameStatus::Won => ("YOU WIN!", Style::default().fg(Color::Green).bold()),
        _ => ("YOU ARE DEAD", Style::default().fg(Color::Red).bold()),
    };
    let lines = vec![
        Line::from(""),
        Line::styled(message, style),
        Line::from(""),
        Line::from("Press any key to exit."),
    ];
    let outcome = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().title("The Labyrinth").borders(Borders::ALL));
    frame.render_widget(outcome, area);
}

/// Renders hit points, bombs and key progress.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let game = &app.game;
    let keys_style = if game.all_keys_collected() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };

    let lines = vec![
        Line::from(format!(
            "HIT POINTS: {} / {}",
            game.hit_points(),
            game.config().max_hit_points
        )),
        Line::from(format!("BOMBS: {}", game.bombs())),
        Line::styled(
            format!(
                "KEYS COLLECTED: {} / {}",
                game.keys_collected(),
                game.keys_required()
            ),
            keys_style,
        ),
    ];

    let status = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Status (seed {})", app.seed)),
    );
    frame.render_widget(status, area);
}
