use std::io::{Stdout, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config;
use crate::controller::{ControllerEvent, PlaybackController, PlaybackState};
use crate::track::display::{display_from_fields, format_mmss};

/// State the terminal front end keeps across iterations.
pub struct EventLoopState {
    /// Queue row that `Enter` would select.
    pub cursor: usize,
}

impl EventLoopState {
    /// Start the cursor on the current track when it is in the queue.
    pub fn new(controller: &PlaybackController) -> Self {
        let cursor = controller
            .queue()
            .current_track_id()
            .and_then(|id| controller.queue().position_of(id))
            .unwrap_or(0);
        Self { cursor }
    }
}

/// Read key presses on a plain thread; crossterm's reader is blocking.
fn spawn_key_reader(tx: UnboundedSender<KeyEvent>) {
    let spawned = thread::Builder::new()
        .name("legato-keys".to_string())
        .spawn(move || {
            loop {
                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            if tx.send(key).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    },
                    Ok(false) => {
                        if tx.is_closed() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not start key reader");
    }
}

/// Main terminal loop: applies controller events and key presses as they
/// arrive and redraws the status line. Returns `Ok(())` when `q` is pressed.
pub async fn run(
    controller: &mut PlaybackController,
    mut events: UnboundedReceiver<ControllerEvent>,
    settings: &config::Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let (key_tx, mut keys) = mpsc::unbounded_channel();
    spawn_key_reader(key_tx);

    let mut state = EventLoopState::new(controller);
    let mut stdout = std::io::stdout();
    let mut redraw = tokio::time::interval(Duration::from_millis(250));

    loop {
        draw_status(&mut stdout, controller, &state, settings)?;

        tokio::select! {
            Some(ev) = events.recv() => controller.handle_event(ev),
            key = keys.recv() => match key {
                Some(key) => {
                    if handle_key_event(key, settings, controller, &mut state) {
                        break;
                    }
                }
                None => break,
            },
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}

/// Returns `true` when shutdown is requested.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    controller: &mut PlaybackController,
    state: &mut EventLoopState,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => controller.toggle_play(),
        KeyCode::Char('l') | KeyCode::Char('n') => {
            controller.next();
            follow_current(controller, state);
        }
        KeyCode::Char('h') | KeyCode::Char('b') => {
            controller.previous();
            follow_current(controller, state);
        }
        KeyCode::Char('L') => scrub(controller, settings.controls.scrub_seconds as i64),
        KeyCode::Char('H') => scrub(controller, -(settings.controls.scrub_seconds as i64)),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let v = controller.volume() + settings.playback.volume_step;
            controller.set_volume(v);
        }
        KeyCode::Char('-') => {
            let v = controller.volume() - settings.playback.volume_step;
            controller.set_volume(v);
        }
        KeyCode::Char('m') => controller.toggle_mute(),
        KeyCode::Char('j') | KeyCode::Down => {
            if state.cursor + 1 < controller.queue().len() {
                state.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.cursor = state.cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(track) = controller.queue().get(state.cursor).cloned() {
                controller.select_track(track);
            }
        }
        _ => {}
    }

    false
}

fn follow_current(controller: &PlaybackController, state: &mut EventLoopState) {
    if let Some(pos) = controller
        .queue()
        .current_track_id()
        .and_then(|id| controller.queue().position_of(id))
    {
        state.cursor = pos;
    }
}

fn scrub(controller: &mut PlaybackController, seconds: i64) {
    let target = controller.progress_ms() as i64 + seconds.saturating_mul(1000);
    controller.seek_to(target.max(0) as u64);
}

fn status_line(
    controller: &PlaybackController,
    state: &EventLoopState,
    settings: &config::Settings,
) -> String {
    let ui = &settings.ui;
    let now_playing = match controller.current_track() {
        Some(t) => display_from_fields(t, &ui.now_playing_track_fields, &ui.now_playing_track_separator),
        None => "nothing selected".to_string(),
    };

    let mut line = format!("[{}] {now_playing}", controller.state().label());

    if controller.state().has_stream() || *controller.state() == PlaybackState::Resolving {
        line.push_str(&format!(
            "  {} / {}",
            format_mmss(controller.progress_ms()),
            format_mmss(controller.duration_ms())
        ));
    }

    if controller.is_muted() {
        line.push_str("  muted");
    } else {
        line.push_str(&format!("  vol {:.0}%", controller.volume() * 100.0));
    }

    let queue = controller.queue();
    if let Some(t) = queue.get(state.cursor) {
        line.push_str(&format!("  | {}/{} > {}", state.cursor + 1, queue.len(), t.title));
    }

    if let Some(msg) = controller.error_message() {
        line.push_str(&format!("  ! {msg}"));
    }

    line
}

fn draw_status(
    out: &mut Stdout,
    controller: &PlaybackController,
    state: &EventLoopState,
    settings: &config::Settings,
) -> std::io::Result<()> {
    let mut line = status_line(controller, state, settings);
    if let Ok((cols, _)) = terminal::size() {
        let max = cols as usize;
        if line.chars().count() > max {
            line = line.chars().take(max).collect();
        }
    }

    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line))?;
    out.flush()
}
