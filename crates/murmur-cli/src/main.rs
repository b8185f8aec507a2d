/// murmur-chat — terminal client for the murmur mesh.
///
/// Full-stack client: TCP mesh transport + gossip chat protocol +
/// ratatui terminal UI.
///
/// Usage:
///   murmur-chat <listen-addr>                     # Start a node
///   murmur-chat <listen-addr> <peer-addr>...      # Start and dial peers
///   murmur-chat <listen-addr> --name alice        # Pick a username
///   murmur-chat <listen-addr> --headless          # Log events to stdout
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::*;

use murmur_protocol::{ChatEvent, ChatHandle, ChatRuntime, Delivery, RuntimeChannels, RuntimeConfig};
use murmur_transport::{MeshConfig, MeshNode};

// ── App State ────────────────────────────────────────────────────────────

struct App {
    /// Local username (mirrors the runtime session).
    username: String,
    /// Chat lines (timestamp, label, text).
    messages: Vec<ChatLine>,
    /// Current input text.
    input: String,
    /// Connected peer identities.
    peers: Vec<String>,
    /// Rooms currently joined.
    rooms: Vec<String>,
    /// Status line.
    status: String,
    /// Should quit.
    quit: bool,
    /// Scroll offset for messages.
    scroll: u16,
}

struct ChatLine {
    timestamp: String,
    label: String,
    text: String,
    is_system: bool,
}

impl App {
    fn new(username: String, local_addr: SocketAddr) -> Self {
        Self {
            username,
            messages: vec![],
            input: String::new(),
            peers: vec![],
            rooms: vec![],
            status: format!("Listening on {local_addr}"),
            quit: false,
            scroll: 0,
        }
    }

    fn add_system(&mut self, text: String) {
        self.messages.push(ChatLine {
            timestamp: now_hms(),
            label: "system".into(),
            text,
            is_system: true,
        });
        self.scroll_to_bottom();
    }

    fn add_chat(&mut self, label: String, text: String) {
        self.messages.push(ChatLine {
            timestamp: now_hms(),
            label,
            text,
            is_system: false,
        });
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        if self.messages.len() > 20 {
            self.scroll = (self.messages.len() as u16).saturating_sub(20);
        }
    }

    /// Map a runtime event to chat lines and state updates.
    fn apply_event(&mut self, chat_event: ChatEvent) {
        match chat_event {
            ChatEvent::Delivered(delivery) => match delivery {
                Delivery::Public { from, text } => {
                    self.add_chat(format!("[PUBLIC][{from}]"), text);
                }
                Delivery::Direct { from, text } => {
                    self.add_chat(format!("[DM][{from} → you]"), text);
                }
                Delivery::Room { room, from, text } => {
                    self.add_chat(format!("[ROOM:{room}][{from}]"), text);
                }
            },
            ChatEvent::RawPayload { peer, text } => {
                self.add_chat(format!("[{peer}]"), text);
            }
            ChatEvent::PeerConnected { peer } => {
                self.add_system(format!("peer connected: {peer}"));
                if !self.peers.contains(&peer) {
                    self.peers.push(peer);
                }
            }
            ChatEvent::PeerDisconnected { peer } => {
                self.add_system(format!("peer disconnected: {peer}"));
                self.peers.retain(|p| p != &peer);
            }
            ChatEvent::Notice(text) => {
                self.add_system(text);
            }
            ChatEvent::Error { description } => {
                tracing::warn!("{description}");
                self.add_system(format!("error: {description}"));
            }
        }
    }
}

// ── Args ────────────────────────────────────────────────────────────────

struct Args {
    listen_addr: SocketAddr,
    peer_addrs: Vec<SocketAddr>,
    username: Option<String>,
    headless: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut listen_addr = None;
    let mut peer_addrs = Vec::new();
    let mut username = None;
    let mut headless = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => headless = true,
            "--name" => {
                username = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--name requires a value"))?,
                );
            }
            addr => {
                let addr: SocketAddr = addr
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid address '{addr}': {e}"))?;
                if listen_addr.is_none() {
                    listen_addr = Some(addr);
                } else {
                    peer_addrs.push(addr);
                }
            }
        }
    }

    let listen_addr = listen_addr.ok_or_else(|| {
        anyhow::anyhow!("usage: murmur-chat <listen-addr> [peer-addr...] [--name <user>] [--headless]")
    })?;

    Ok(Args {
        listen_addr,
        peer_addrs,
        username,
        headless,
    })
}

// ── Main ─────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    // Init transport
    let (node, mesh_events) = MeshNode::bind(MeshConfig::new(args.listen_addr)).await?;
    let local_id = node.id().to_string();
    let local_addr = node.local_addr();

    let username = args.username.unwrap_or_else(|| local_id.clone());

    // Print node info to stderr (visible after TUI exits)
    eprintln!("╭─────────────────────────────────────────────╮");
    eprintln!("│  murmur-chat v0.1                           │");
    eprintln!("╰─────────────────────────────────────────────╯");
    eprintln!("   node: {local_id}  listening on {local_addr}");

    let channels = ChatRuntime::spawn(
        node,
        mesh_events,
        RuntimeConfig {
            username: username.clone(),
            ..RuntimeConfig::default()
        },
    );

    // Dial initial peers; failures surface as runtime error events.
    for addr in &args.peer_addrs {
        channels.handle.connect(*addr).await?;
    }

    if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
        return run_headless(channels).await;
    }

    run_tui(channels, username, local_addr).await
}

// ── TUI loop ─────────────────────────────────────────────────────────────

async fn run_tui(
    mut channels: RuntimeChannels,
    username: String,
    local_addr: SocketAddr,
) -> anyhow::Result<()> {
    let mut app = App::new(username, local_addr);
    app.add_system(format!("you are '{}'", app.username));
    app.add_system("type /help for commands".into());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        // Handle key events
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit = true;
                    }
                    KeyCode::Esc => {
                        app.quit = true;
                    }
                    KeyCode::Enter => {
                        if !app.input.is_empty() {
                            let text = app.input.drain(..).collect::<String>();
                            handle_input(&mut app, &text, &channels.handle).await;
                        }
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Up => {
                        app.scroll = app.scroll.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        app.scroll = app.scroll.saturating_add(1);
                    }
                    KeyCode::Char(c) => {
                        app.input.push(c);
                    }
                    _ => {}
                }
            }
        }

        // Drain runtime events
        while let Ok(chat_event) = channels.events.try_recv() {
            app.apply_event(chat_event);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.quit {
            break;
        }
    }

    // Cleanup
    channels.handle.shutdown().await;
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

// ── Input handling ───────────────────────────────────────────────────────

async fn handle_input(app: &mut App, text: &str, handle: &ChatHandle) {
    if text.starts_with('/') {
        handle_command(app, text, handle).await;
        return;
    }

    // Plain text is a public broadcast. Own messages loop back deduped,
    // so echo locally.
    if handle.send_public(text).await.is_err() {
        app.add_system("runtime is shut down".into());
        return;
    }
    app.add_chat("[PUBLIC][you]".into(), text.to_string());
}

async fn handle_command(app: &mut App, cmd: &str, handle: &ChatHandle) {
    let parts: Vec<&str> = cmd.splitn(3, ' ').collect();
    let result = match parts[0] {
        "/username" | "/u" => match parts.get(1) {
            Some(name) => {
                app.username = name.to_string();
                handle.set_username(*name).await
            }
            None => {
                app.add_system("Usage: /username <name>".into());
                Ok(())
            }
        },
        "/msg" | "/m" => match (parts.get(1), parts.get(2)) {
            (Some(to), Some(text)) => {
                let sent = handle.send_direct(*to, *text).await;
                if sent.is_ok() {
                    app.add_chat(format!("[DM][you → {to}]"), text.to_string());
                }
                sent
            }
            _ => {
                app.add_system("Usage: /msg <user> <text>".into());
                Ok(())
            }
        },
        "/join" | "/j" => match parts.get(1) {
            Some(room) => {
                let sent = handle.join_room(*room).await;
                if sent.is_ok() {
                    app.rooms = handle.rooms().await;
                }
                sent
            }
            None => {
                app.add_system("Usage: /join <room>".into());
                Ok(())
            }
        },
        "/leave" | "/l" => match parts.get(1) {
            Some(room) => {
                let sent = handle.leave_room(*room).await;
                if sent.is_ok() {
                    app.rooms = handle.rooms().await;
                }
                sent
            }
            None => {
                app.add_system("Usage: /leave <room>".into());
                Ok(())
            }
        },
        "/rooms" => {
            let rooms = handle.rooms().await;
            if rooms.is_empty() {
                app.add_system("no rooms joined".into());
            } else {
                app.add_system(format!("rooms: {}", rooms.join(", ")));
            }
            app.rooms = rooms;
            Ok(())
        }
        "/room" | "/r" => match (parts.get(1), parts.get(2)) {
            (Some(room), Some(text)) => {
                // Membership errors come back as runtime error events.
                let sent = handle.send_room(*room, *text).await;
                if sent.is_ok() && app.rooms.iter().any(|r| r == room) {
                    app.add_chat(format!("[ROOM:{room}][you]"), text.to_string());
                }
                sent
            }
            _ => {
                app.add_system("Usage: /room <room> <text>".into());
                Ok(())
            }
        },
        "/connect" | "/c" => match parts.get(1) {
            Some(addr) => match addr.parse::<SocketAddr>() {
                Ok(addr) => handle.connect(addr).await,
                Err(e) => {
                    app.add_system(format!("invalid address: {e}"));
                    Ok(())
                }
            },
            None => {
                app.add_system("Usage: /connect <addr>".into());
                Ok(())
            }
        },
        "/help" | "/h" => {
            app.add_system("Commands:".into());
            app.add_system("  <text>               — public broadcast".into());
            app.add_system("  /username <name>     — change identity".into());
            app.add_system("  /msg <user> <text>   — direct message".into());
            app.add_system("  /join <room>         — join a room".into());
            app.add_system("  /leave <room>        — leave a room".into());
            app.add_system("  /rooms               — list joined rooms".into());
            app.add_system("  /room <room> <text>  — message a room".into());
            app.add_system("  /connect <addr>      — dial a peer".into());
            app.add_system("  /quit, Ctrl+C, Esc   — exit".into());
            Ok(())
        }
        "/quit" | "/q" => {
            app.quit = true;
            Ok(())
        }
        _ => {
            app.add_system(format!("Unknown command: {}", parts[0]));
            Ok(())
        }
    };

    if result.is_err() {
        tracing::warn!("command dropped, runtime is shut down");
        app.add_system("runtime is shut down".into());
    }
}

// ── UI Drawing ───────────────────────────────────────────────────────────

fn draw_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    // Header
    let rooms = if app.rooms.is_empty() {
        "-".to_string()
    } else {
        app.rooms.join(",")
    };
    let header = Paragraph::new(format!(
        " murmur-chat  |  you: {}  |  peers: {}  |  rooms: {}",
        app.username,
        app.peers.len(),
        rooms
    ))
    .style(Style::default().fg(Color::White).bg(Color::DarkGray).bold());
    f.render_widget(header, chunks[0]);

    // Messages
    let msg_items: Vec<Line> = app
        .messages
        .iter()
        .map(|m| {
            if m.is_system {
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", m.timestamp),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(&m.text, Style::default().fg(Color::Yellow).italic()),
                ])
            } else {
                let is_self = m.label.contains("[you]") || m.label.contains("[you →");
                let label_color = if is_self { Color::Cyan } else { Color::Green };
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", m.timestamp),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{} ", m.label),
                        Style::default().fg(label_color).bold(),
                    ),
                    Span::raw(&m.text),
                ])
            }
        })
        .collect();

    let messages = Paragraph::new(msg_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Messages ")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .scroll((app.scroll, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(messages, chunks[1]);

    // Input
    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Type message (Enter to send, /help for commands) ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(input, chunks[2]);

    // Cursor position
    let cursor_x = chunks[2].x + input_width(&app.input) + 1;
    let cursor_y = chunks[2].y + 1;
    f.set_cursor_position((cursor_x.min(chunks[2].right() - 2), cursor_y));

    // Status
    let status =
        Paragraph::new(format!(" {} ", app.status)).style(Style::default().fg(Color::DarkGray));
    f.render_widget(status, chunks[3]);
}

// ── Headless mode ────────────────────────────────────────────────────────

/// Print runtime events to stdout. Useful for scripted demos and for
/// watching a relay node carry traffic it never displays.
async fn run_headless(mut channels: RuntimeChannels) -> anyhow::Result<()> {
    println!("[murmur] headless mode — Ctrl+C to stop\n");

    while let Some(chat_event) = channels.events.recv().await {
        match chat_event {
            ChatEvent::Delivered(delivery) => match delivery {
                Delivery::Public { from, text } => println!("[PUBLIC][{from}] {text}"),
                Delivery::Direct { from, text } => println!("[DM][{from} → you] {text}"),
                Delivery::Room { room, from, text } => println!("[ROOM:{room}][{from}] {text}"),
            },
            ChatEvent::RawPayload { peer, text } => println!("[{peer}] {text}"),
            ChatEvent::PeerConnected { peer } => println!("[murmur] peer connected: {peer}"),
            ChatEvent::PeerDisconnected { peer } => println!("[murmur] peer disconnected: {peer}"),
            ChatEvent::Notice(text) => println!("[murmur] {text}"),
            ChatEvent::Error { description } => println!("[murmur] error: {description}"),
        }
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Cursor column for the input line. Counts chars, not bytes, so
/// multibyte input ("é", "→") does not push the cursor too far right.
fn input_width(input: &str) -> u16 {
    input.chars().count() as u16
}

/// Minimal HH:MM:SS without pulling in chrono.
fn now_hms() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let h = (secs / 3600) % 24;
    let m = (secs / 60) % 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new("alice".into(), "127.0.0.1:9000".parse().unwrap())
    }

    #[test]
    fn input_width_counts_chars_not_bytes() {
        assert_eq!(input_width(""), 0);
        assert_eq!(input_width("hello"), 5);
        // 5 chars, 9 bytes
        assert_eq!(input_width("é → ç"), 5);
        assert_eq!("é → ç".len(), 9);
    }

    #[test]
    fn error_event_becomes_system_line() {
        let mut app = app();
        app.apply_event(ChatEvent::Error {
            description: "not a member of room 'ops'".into(),
        });

        assert_eq!(app.messages.len(), 1);
        assert!(app.messages[0].is_system);
        assert_eq!(app.messages[0].text, "error: not a member of room 'ops'");
    }

    #[test]
    fn peer_events_track_the_peer_list() {
        let mut app = app();
        app.apply_event(ChatEvent::PeerConnected { peer: "node-7000".into() });
        app.apply_event(ChatEvent::PeerConnected { peer: "node-7001".into() });
        // Re-announce of a known peer must not duplicate it.
        app.apply_event(ChatEvent::PeerConnected { peer: "node-7000".into() });
        assert_eq!(app.peers, vec!["node-7000", "node-7001"]);

        app.apply_event(ChatEvent::PeerDisconnected { peer: "node-7000".into() });
        assert_eq!(app.peers, vec!["node-7001"]);
    }

    #[test]
    fn deliveries_render_with_scope_labels() {
        let mut app = app();
        app.apply_event(ChatEvent::Delivered(Delivery::Public {
            from: "bob".into(),
            text: "hi".into(),
        }));
        app.apply_event(ChatEvent::Delivered(Delivery::Direct {
            from: "bob".into(),
            text: "psst".into(),
        }));
        app.apply_event(ChatEvent::Delivered(Delivery::Room {
            room: "ops".into(),
            from: "bob".into(),
            text: "deploying".into(),
        }));
        app.apply_event(ChatEvent::RawPayload {
            peer: "node-7000".into(),
            text: "plain".into(),
        });

        let labels: Vec<&str> = app.messages.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["[PUBLIC][bob]", "[DM][bob → you]", "[ROOM:ops][bob]", "[node-7000]"]
        );
    }
}
