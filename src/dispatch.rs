// src/dispatch.rs - Key press back ends and the command emitter
use crate::command::Command;
use tracing::{debug, info};

/// Fire-and-forget key press sink.
pub trait KeyDispatcher {
    fn press(&mut self, command: Command);

    fn name(&self) -> &'static str;
}

impl<D: KeyDispatcher + ?Sized> KeyDispatcher for Box<D> {
    fn press(&mut self, command: Command) {
        (**self).press(command)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Dry-run dispatcher: logs the key that would have been pressed.
#[derive(Debug, Default)]
pub struct LogDispatcher {
    presses: u64,
}

impl LogDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presses(&self) -> u64 {
        self.presses
    }
}

impl KeyDispatcher for LogDispatcher {
    fn press(&mut self, command: Command) {
        if let Some(key) = command.key_name() {
            self.presses += 1;
            info!(key, "press");
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(feature = "uinput")]
pub use self::virtual_keyboard::UinputDispatcher;

#[cfg(feature = "uinput")]
mod virtual_keyboard {
    use super::KeyDispatcher;
    use crate::command::Command;
    use std::time::Duration;
    use tracing::warn;
    use uinput::device::Device;
    use uinput::event::keyboard;

    // Hold time between press and release so games register the tap
    const TAP_HOLD: Duration = Duration::from_millis(10);

    /// Virtual keyboard on `/dev/uinput`.
    pub struct UinputDispatcher {
        dev: Device,
    }

    impl UinputDispatcher {
        pub fn new() -> Result<Self, uinput::Error> {
            let dev = uinput::default()?
                .name("gesture-control-keyboard")?
                .event(uinput::event::Keyboard::All)?
                .create()?;

            Ok(Self { dev })
        }

        fn key_tap(&mut self, key: keyboard::Key) -> Result<(), uinput::Error> {
            self.dev.press(&keyboard::Keyboard::Key(key))?;
            self.dev.synchronize()?;
            std::thread::sleep(TAP_HOLD);
            self.dev.release(&keyboard::Keyboard::Key(key))?;
            self.dev.synchronize()
        }
    }

    impl KeyDispatcher for UinputDispatcher {
        fn press(&mut self, command: Command) {
            let key = match command {
                Command::Left => keyboard::Key::Left,
                Command::Right => keyboard::Key::Right,
                Command::Up => keyboard::Key::Up,
                Command::Down => keyboard::Key::Down,
                Command::Action => keyboard::Key::Space,
                Command::None => return,
            };

            if let Err(e) = self.key_tap(key) {
                warn!("uinput key tap {:?} failed: {}", command, e);
            }
        }

        fn name(&self) -> &'static str {
            "uinput"
        }
    }
}

/// Last stage of the pipeline: forwards admitted commands and remembers
/// what is currently on screen.
pub struct CommandEmitter<D: KeyDispatcher> {
    dispatcher: D,
    current_action: Command,
}

impl<D: KeyDispatcher> CommandEmitter<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            current_action: Command::None,
        }
    }

    /// Returns the command actually dispatched, if any.
    pub fn emit(&mut self, command: Command) -> Option<Command> {
        self.current_action = command;

        if command.is_none() {
            return None;
        }

        debug!("dispatching {} via {}", command, self.dispatcher.name());
        self.dispatcher.press(command);
        Some(command)
    }

    pub fn current_action(&self) -> Command {
        self.current_action
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }
}
