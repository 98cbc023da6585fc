//! Input translation
//!
//! Window systems deliver raw key, button and cursor events. The
//! [`InputTranslator`] folds one frame's worth of them into a [`FrameInput`]:
//! held keys become continuous movement and time-flow changes, fresh presses
//! become one-shot [`Command`]s.
//!
//! | Input | Effect |
//! |-------|--------|
//! | W / A / S / D (held) | move forward / left / backward / right |
//! | Left Shift (held) | run |
//! | `=` / `-` (held) | time-flow multiplier ± step per frame |
//! | Space | pause or resume time |
//! | 1 / 2 | show or hide markers / overlay |
//! | 3 | show true positions (light delay off) |
//! | 4 | Doppler recoloring off (ignored while 3 is active) |
//! | Enter | screenshot |
//! | Escape | quit |
//! | left click | capture or release the cursor |
//! | cursor motion | look around while captured |
//! | scroll | zoom |

use std::collections::HashSet;

use crate::render::camera::MovementDirection;
use crate::simulation::DebugToggles;

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Left shift
    LeftShift,
    /// `=` key
    Equal,
    /// `-` key
    Minus,
    /// Space bar
    Space,
    /// Number row 1
    Num1,
    /// Number row 2
    Num2,
    /// Number row 3
    Num3,
    /// Number row 4
    Num4,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Raw window event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key went down (repeats while held are allowed)
    KeyPressed(KeyCode),
    /// A key went up
    KeyReleased(KeyCode),
    /// A mouse button went down
    MouseButtonPressed(MouseButton),
    /// A mouse button went up
    MouseButtonReleased(MouseButton),
    /// Cursor position in window pixels
    CursorMoved {
        /// Horizontal position
        x: f64,
        /// Vertical position, growing downwards
        y: f64,
    },
    /// Vertical scroll offset
    Scrolled(f32),
    /// Framebuffer size changed
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
}

/// One-shot action triggered by a fresh press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pause or resume simulation time
    TogglePause,
    /// Flip a debug toggle
    Toggle(DebugToggles),
    /// Write a screenshot
    Screenshot,
    /// Leave the main loop
    Quit,
}

/// Everything one frame of input asks for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// One-shot commands in press order
    pub commands: Vec<Command>,
    /// Movement directions held this frame
    pub movement: Vec<MovementDirection>,
    /// Whether the running modifier is held
    pub running: bool,
    /// Change of the time-flow multiplier
    pub flow_delta: f32,
    /// Accumulated look offset `(x, y)`, y positive upwards
    pub look: (f32, f32),
    /// Accumulated scroll
    pub zoom: f32,
    /// Latest framebuffer size, if it changed
    pub resized: Option<(u32, u32)>,
    /// Whether the cursor is captured after this frame
    pub cursor_captured: bool,
}

impl FrameInput {
    /// Whether `command` was issued this frame
    pub fn has(&self, command: Command) -> bool {
        self.commands.contains(&command)
    }
}

/// Stateful translator from raw events to per-frame input
#[derive(Debug, Clone)]
pub struct InputTranslator {
    held: HashSet<KeyCode>,
    last_cursor: Option<(f64, f64)>,
    cursor_captured: bool,
    flow_step: f32,
}

impl InputTranslator {
    /// Create a translator; the cursor starts captured
    pub fn new(flow_step: f32) -> Self {
        Self {
            held: HashSet::new(),
            last_cursor: None,
            cursor_captured: true,
            flow_step,
        }
    }

    /// Whether `key` is currently held
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Whether cursor motion currently rotates the observer
    pub fn is_cursor_captured(&self) -> bool {
        self.cursor_captured
    }

    /// Fold one frame's events, in arrival order
    pub fn process(&mut self, events: &[InputEvent]) -> FrameInput {
        let mut input = FrameInput::default();

        for event in events {
            match *event {
                InputEvent::KeyPressed(key) => {
                    if self.held.insert(key) {
                        if let Some(command) = Self::command_for(key) {
                            input.commands.push(command);
                        }
                    }
                }
                InputEvent::KeyReleased(key) => {
                    self.held.remove(&key);
                }
                InputEvent::MouseButtonPressed(MouseButton::Left) => {
                    self.cursor_captured = !self.cursor_captured;
                    log::debug!("Cursor {}", if self.cursor_captured { "captured" } else { "released" });
                }
                InputEvent::MouseButtonPressed(_) | InputEvent::MouseButtonReleased(_) => {}
                InputEvent::CursorMoved { x, y } => {
                    let (last_x, last_y) = self.last_cursor.unwrap_or((x, y));
                    self.last_cursor = Some((x, y));

                    if self.cursor_captured {
                        input.look.0 += (x - last_x) as f32;
                        input.look.1 += (last_y - y) as f32;
                    }
                }
                InputEvent::Scrolled(offset) => input.zoom += offset,
                InputEvent::Resized { width, height } => input.resized = Some((width, height)),
            }
        }

        for (key, direction) in [
            (KeyCode::W, MovementDirection::Forward),
            (KeyCode::S, MovementDirection::Backward),
            (KeyCode::D, MovementDirection::Right),
            (KeyCode::A, MovementDirection::Left),
        ] {
            if self.is_held(key) {
                input.movement.push(direction);
            }
        }

        input.running = self.is_held(KeyCode::LeftShift);
        if self.is_held(KeyCode::Equal) {
            input.flow_delta += self.flow_step;
        }
        if self.is_held(KeyCode::Minus) {
            input.flow_delta -= self.flow_step;
        }
        input.cursor_captured = self.cursor_captured;

        input
    }

    fn command_for(key: KeyCode) -> Option<Command> {
        match key {
            KeyCode::Space => Some(Command::TogglePause),
            KeyCode::Num1 => Some(Command::Toggle(DebugToggles::SHOW_MARKERS)),
            KeyCode::Num2 => Some(Command::Toggle(DebugToggles::SHOW_OVERLAY)),
            KeyCode::Num3 => Some(Command::Toggle(DebugToggles::POSITION_BYPASS)),
            KeyCode::Num4 => Some(Command::Toggle(DebugToggles::DOPPLER_OFF)),
            KeyCode::Enter => Some(Command::Screenshot),
            KeyCode::Escape => Some(Command::Quit),
            _ => None,
        }
    }
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(0.1)
    }
}
