use anyhow::Context;
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    fs::File,
    io::stdout,
    time::{Duration, Instant},
};

use tetramaster::board::{CellState, GRID_HEIGHT, GRID_WIDTH};
use tetramaster::clock::GravityClock;
use tetramaster::config::Config;
use tetramaster::game::{Command, Game, Snapshot};
use tetramaster::input::{self, Action, KEY_HELP};
use tetramaster::tetromino::{RandomPieceProvider, TetrominoType};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const PREVIEW_SIZE: usize = 4;

// Upper bound on how long input polling blocks while the clock is cancelled
const IDLE_POLL: Duration = Duration::from_millis(250);

// ============================================================================
// Color Mapping
// ============================================================================

fn tetromino_color(t: TetrominoType) -> Color {
    match t {
        TetrominoType::I => Color::Rgb(242, 233, 228),
        TetrominoType::O => Color::Rgb(224, 122, 95),
        TetrominoType::T => Color::Rgb(61, 64, 91),
        TetrominoType::S => Color::Rgb(129, 178, 154),
        TetrominoType::Z => Color::Rgb(244, 162, 97),
        TetrominoType::J => Color::Rgb(85, 107, 47),
        TetrominoType::L => Color::Rgb(154, 140, 152),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, view: &Snapshot, show_controls: bool) {
    let area = frame.size();

    render_game(frame, view, show_controls, area);
    if view.game_over {
        render_game_over(frame, view, area);
    }
}

fn render_game(frame: &mut Frame, view: &Snapshot, show_controls: bool, area: Rect) {
    let grid_display_width = (GRID_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = GRID_HEIGHT as u16 + 2;
    let sidebar_width = 22;
    let total_width = grid_display_width + sidebar_width + 2;

    let main_area = centered_rect(total_width, grid_display_height, area);

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(sidebar_width),
    ])
    .split(main_area);

    render_grid(frame, view, horizontal[0]);

    let mut sidebar = vec![Constraint::Length(6), Constraint::Length(11)];
    if show_controls {
        sidebar.push(Constraint::Fill(1));
    }
    let sidebar = Layout::vertical(sidebar).split(horizontal[1]);

    render_preview(frame, view, sidebar[0]);
    render_info(frame, view, sidebar[1]);
    if show_controls {
        render_controls(frame, sidebar[2]);
    }
}

fn render_grid(frame: &mut Frame, view: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" TetraMaster ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = view
        .grid
        .iter()
        .map(|row| Line::from(row.iter().map(|&cell| cell_span(cell)).collect::<Vec<_>>()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn cell_span(cell: CellState) -> Span<'static> {
    match cell {
        CellState::Empty => Span::raw(EMPTY_CHAR),
        CellState::Filled(kind) => {
            Span::styled(BLOCK_CHAR, Style::default().fg(tetromino_color(kind)))
        }
    }
}

fn render_preview(frame: &mut Frame, view: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let kind = view.next.tetromino_type;
    let lines: Vec<Line> = (0..PREVIEW_SIZE)
        .map(|row| {
            let mut spans = vec![Span::raw(" ")];
            spans.extend((0..PREVIEW_SIZE).map(|col| {
                if view.next.shape.is_occupied(col, row) {
                    cell_span(CellState::Filled(kind))
                } else {
                    cell_span(CellState::Empty)
                }
            }));
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, view: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", view.score)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", view.level)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", view.lines_cleared)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Controls ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = KEY_HELP
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:>8} "), Style::default().fg(Color::Yellow)),
                Span::styled(*action, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_game_over(frame: &mut Frame, view: &Snapshot, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", view.score)),
        Line::from(format!("Lines: {}", view.lines_cleared)),
        Line::from(format!("Level: {}", view.level)),
        Line::from(""),
        Line::from(Span::styled(
            "R to restart, Esc to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(28, 12, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let log_file = File::create(&config.log_file)
        .with_context(|| format!("creating log file {}", config.log_file.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init()
        .context("initializing logger")?;
    Ok(())
}

/// Feeds clock ticks and decoded keys to the engine one at a time.
fn run<B: Backend>(terminal: &mut Terminal<B>, mut game: Game, config: &Config) -> anyhow::Result<()> {
    let mut clock = GravityClock::new(Instant::now());

    loop {
        let view = game.snapshot();
        terminal.draw(|frame| render(frame, &view, config.show_controls))?;

        let timeout = clock.time_until_tick(Instant::now()).unwrap_or(IDLE_POLL);

        let mut commands = Vec::new();
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match input::decode(key) {
                    Some(Action::Quit) => break,
                    Some(Action::Game(command)) => commands.push(command),
                    None => {}
                }
            }
        }
        if clock.poll(Instant::now()) {
            commands.push(Command::GravityTick);
        }

        for command in commands {
            game.apply(command);
            let now = Instant::now();
            for event in game.take_events() {
                clock.observe(&event, now);
            }
        }
    }

    info!(
        "quit with score {}, lines {}, level {}",
        game.score,
        game.lines_cleared,
        game.level + 1
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("using default configuration: {err}");
            Config::default()
        }
    };
    init_logging(&config)?;
    info!("starting TetraMaster");

    let game = match config.seed {
        Some(seed) => {
            info!("using piece seed {seed}");
            Game::with_provider(Box::new(RandomPieceProvider::seeded(seed)))
        }
        None => Game::new(),
    };

    enable_raw_mode().context("enabling raw mode")?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, game, &config);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    if let Err(err) = &result {
        error!("game loop failed: {err:?}");
    }
    result
}
