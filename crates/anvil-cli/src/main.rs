use anvil_config::Config;
use anvil_engine::io::validate_content_dir;
use anvil_engine::registry::{self, BlockRegistry};
use anvil_engine::{
    Block as PageBlock, BlockId, Cmd, ContentFilters, Document, EditingSession, FileStore,
    Location, Renderer, SessionOptions, render_content_page,
};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    time::{Duration, Instant},
};

const TICK: Duration = Duration::from_millis(250);

/// One line of the outline: a block and how deep it sits.
struct Row {
    id: BlockId,
    depth: usize,
    label: String,
}

struct App<'r> {
    session: EditingSession<'r>,
    store: FileStore,
    list_state: ListState,
    status: String,
    confirm_quit: bool,
}

impl<'r> App<'r> {
    fn new(session: EditingSession<'r>, store: FileStore) -> Self {
        let mut app = Self {
            session,
            store,
            list_state: ListState::default(),
            status: String::new(),
            confirm_quit: false,
        };
        if !app.rows().is_empty() {
            app.select_row(0);
        }
        app
    }

    fn rows(&self) -> Vec<Row> {
        outline(self.session.document())
    }

    fn select_row(&mut self, index: usize) {
        let rows = self.rows();
        let Some(row) = rows.get(index) else {
            self.list_state.select(None);
            self.session.select(None);
            return;
        };
        self.list_state.select(Some(index));
        self.session.select(Some(row.id.clone()));
    }

    /// Keep the highlighted row on the session's selected block.
    fn sync_selection(&mut self) {
        let rows = self.rows();
        if rows.is_empty() {
            self.list_state.select(None);
            self.session.select(None);
            return;
        }
        let index = self
            .session
            .selected()
            .and_then(|id| rows.iter().position(|row| &row.id == id))
            .unwrap_or_else(|| self.list_state.selected().unwrap_or(0).min(rows.len() - 1));
        self.select_row(index);
    }

    fn next_block(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.select_row(i);
    }

    fn previous_block(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select_row(i);
    }

    fn selected_id(&self) -> Option<BlockId> {
        self.session.selected().cloned()
    }

    fn apply(&mut self, cmd: Cmd) {
        match self.session.apply(cmd) {
            Some(patch) => self.status = format!("v{}", patch.version),
            None => self.status = "nothing changed".to_string(),
        }
        self.sync_selection();
    }

    /// Move the selected top-level block one place up or down.
    fn shift_selected(&mut self, down: bool) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.session.document().find_location(&id) {
            Some(Location::TopLevel(index)) => {
                let to = if down {
                    index + 1
                } else if index == 0 {
                    return;
                } else {
                    index - 1
                };
                self.apply(Cmd::Move { id, to });
            }
            _ => self.status = "only top-level blocks can be reordered".to_string(),
        }
    }

    /// New paragraph after the selection, in the same container.
    fn insert_paragraph(&mut self) {
        let block_type = "paragraph".to_string();
        let location = self
            .selected_id()
            .and_then(|id| self.session.document().find_location(&id));
        let cmd = match location {
            None => Cmd::InsertNew {
                block_type,
                at: self.session.document().len(),
            },
            Some(Location::TopLevel(index)) => Cmd::InsertNew {
                block_type,
                at: index + 1,
            },
            Some(Location::Column { parent, column, .. }) => Cmd::InsertNewIntoColumn {
                block_type,
                parent,
                column,
            },
        };
        self.apply(cmd);
    }

    fn remove_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.apply(Cmd::Remove { id });
        }
    }

    fn duplicate_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.apply(Cmd::Duplicate { id });
        }
    }

    fn undo(&mut self) {
        self.status = match self.session.undo() {
            Some(_) => "undone".to_string(),
            None => "nothing to undo".to_string(),
        };
        self.sync_selection();
    }

    fn redo(&mut self) {
        self.status = match self.session.redo() {
            Some(_) => "redone".to_string(),
            None => "nothing to redo".to_string(),
        };
        self.sync_selection();
    }

    fn save(&mut self) {
        self.status = match self.session.save(&mut self.store) {
            Ok(()) => format!("saved {}", self.session.content_id()),
            Err(e) => format!("save failed: {e}"),
        };
    }

    fn tick(&mut self) {
        match self.session.poll_autosave(Instant::now(), &mut self.store) {
            Ok(true) => self.status = "autosaved".to_string(),
            Ok(false) => {}
            Err(e) => self.status = format!("autosave failed: {e}"),
        }
    }

    fn preview(&self) -> String {
        let Some(block) = self.selected_id().and_then(|id| self.session.document().get(&id)) else {
            return String::new();
        };
        Renderer::new(self.session.registry()).render(block)
    }
}

fn outline(doc: &Document) -> Vec<Row> {
    let mut rows = Vec::new();
    for block in doc.blocks() {
        rows.push(Row {
            id: block.id.clone(),
            depth: 0,
            label: label(block),
        });
        for (column, col) in block.columns.iter().enumerate() {
            for child in &col.blocks {
                rows.push(Row {
                    id: child.id.clone(),
                    depth: 1,
                    label: format!("[{}] {}", column + 1, label(child)),
                });
            }
        }
    }
    rows
}

fn label(block: &PageBlock) -> String {
    let summary = ["content", "title", "text", "url"]
        .iter()
        .find_map(|key| block.attributes.get(*key).and_then(|v| v.as_str()))
        .unwrap_or("");
    let summary: String = summary.chars().take(40).collect();
    format!("{} {summary}", block.block_type)
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} render <content-id> [content-root]");
    eprintln!("       {program} palette");
    eprintln!("       {program} edit <content-id> [content-root]");
    process::exit(1);
}

/// Content root from the command line, else from the config file.
fn resolve_content_root(arg: Option<&String>, config: Option<&Config>) -> PathBuf {
    let config_path = Config::config_path();
    let (content_path, from_config) = match (arg, config) {
        (Some(arg), _) => (PathBuf::from(arg), false),
        (None, Some(config)) => (config.content_path.clone(), true),
        (None, None) => {
            eprintln!("Error: No content root provided and no config file found");
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
    };

    if let Err(e) = validate_content_dir(&content_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Content root '{}'{} is invalid: {e}",
            content_path.display(),
            source
        );
        process::exit(1);
    }
    content_path
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let registry = registry::install(BlockRegistry::with_core_blocks())?;

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("anvil-cli");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    match args.get(1).map(String::as_str) {
        Some("palette") if args.len() == 2 => {
            print_palette(registry);
            Ok(())
        }
        Some("render") if (3..=4).contains(&args.len()) => {
            let root = resolve_content_root(args.get(3), config.as_ref());
            let store = FileStore::new(root);
            let renderer = Renderer::new(registry);
            let html = render_content_page(&store, &args[2], &renderer, &ContentFilters::new())?;
            println!("{html}");
            Ok(())
        }
        Some("edit") if (3..=4).contains(&args.len()) => {
            let root = resolve_content_root(args.get(3), config.as_ref());
            let options = config
                .as_ref()
                .map(|config| SessionOptions {
                    history_limit: config.history_limit,
                    autosave_delay: config.autosave_delay(),
                })
                .unwrap_or_default();
            edit(registry, FileStore::new(root), &args[2], options)
        }
        _ => usage(program),
    }
}

fn print_palette(registry: &BlockRegistry) {
    for category in registry.list_by_category() {
        println!("{}", category.name);
        for definition in category.types {
            println!("  {:<12} {}", definition.name, definition.label);
        }
    }
}

fn edit(
    registry: &'static BlockRegistry,
    store: FileStore,
    content_id: &str,
    options: SessionOptions,
) -> Result<()> {
    let session = EditingSession::load(registry, &store, content_id, options)?;
    log::info!(
        "editing {content_id}: {} blocks, autosave every {:?}",
        session.document().len(),
        options.autosave_delay
    );
    let mut app = App::new(session, store);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            app.tick();
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.code != KeyCode::Char('q') {
                app.confirm_quit = false;
            }
            match key.code {
                KeyCode::Char('q') => {
                    if !app.session.is_dirty() || app.confirm_quit {
                        return Ok(());
                    }
                    app.confirm_quit = true;
                    app.status = "unsaved changes: s to save, q again to quit".to_string();
                }
                KeyCode::Down | KeyCode::Char('j') => app.next_block(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_block(),
                KeyCode::Char('J') => app.shift_selected(true),
                KeyCode::Char('K') => app.shift_selected(false),
                KeyCode::Char('d') => app.remove_selected(),
                KeyCode::Char('p') => app.insert_paragraph(),
                KeyCode::Char('y') => app.duplicate_selected(),
                KeyCode::Char('u') => app.undo(),
                KeyCode::Char('r') => app.redo(),
                KeyCode::Char('s') => app.save(),
                _ => {}
            }
        }
        app.tick();
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(outer[0]);

    // Outline panel
    let items: Vec<ListItem> = app
        .rows()
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            ListItem::new(vec![Line::from(vec![Span::raw(format!("{indent}{}", row.label))])])
        })
        .collect();

    let dirty = if app.session.is_dirty() { " *" } else { "" };
    let title = format!("{}{dirty}", app.session.content_id());
    let blocks_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(blocks_list, chunks[0], &mut app.list_state);

    // Preview panel
    let preview = app.preview();
    let preview_text = if preview.is_empty() {
        vec![Line::from("Select a block to preview its markup")]
    } else {
        vec![Line::from(vec![Span::raw(preview)])]
    };
    let content = Paragraph::new(preview_text)
        .block(Block::default().borders(Borders::ALL).title("HTML"))
        .wrap(Wrap { trim: true });

    f.render_widget(content, chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | j/k: Select | J/K: Move | "),
        Span::raw("p: Paragraph | y: Duplicate | d: Delete | "),
        Span::raw("u/r: Undo/Redo | s: Save"),
    ]);
    let status = Line::from(vec![Span::styled(
        app.status.clone(),
        Style::default().fg(Color::Cyan),
    )]);
    let help = Paragraph::new(vec![help_text, status]).block(Block::default());

    f.render_widget(help, outer[1]);
}
