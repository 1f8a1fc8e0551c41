use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
};
use serde::Deserialize;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClipboardAction {
    Paste,
    Copy,
    Cut,
}

/// An input surface whose clipboard traffic can be intercepted.
pub trait ClipboardSurface {
    /// Start routing clipboard actions to the host instead of the input.
    fn intercept(&mut self) -> io::Result<()>;
    fn release(&mut self) -> io::Result<()>;
}

/// Terminal surface: with bracketed paste on, a paste arrives as one event
/// the host can reject instead of a burst of keystrokes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalClipboard;

impl ClipboardSurface for TerminalClipboard {
    fn intercept(&mut self) -> io::Result<()> {
        execute!(io::stdout(), EnableBracketedPaste)
    }

    fn release(&mut self) -> io::Result<()> {
        execute!(io::stdout(), DisableBracketedPaste)
    }
}

/// Interception held for the lifetime of one exercise attempt.
///
/// Released on drop, so ending, restarting or abandoning an attempt can never
/// leave another screen with clipboard blocking still active.
#[derive(Debug)]
pub struct ClipboardGuard<S: ClipboardSurface> {
    surface: S,
}

impl<S: ClipboardSurface> ClipboardGuard<S> {
    pub fn acquire(mut surface: S) -> io::Result<Self> {
        surface.intercept()?;
        log::debug!("clipboard interception acquired");
        Ok(Self { surface })
    }
}

impl<S: ClipboardSurface> Drop for ClipboardGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.surface.release() {
            log::warn!("failed to release clipboard interception: {}", e);
        } else {
            log::debug!("clipboard interception released");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Surface that records how many interceptions are active.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSurface {
        pub active: Rc<RefCell<i32>>,
        pub acquisitions: Rc<RefCell<u32>>,
    }

    impl ClipboardSurface for RecordingSurface {
        fn intercept(&mut self) -> io::Result<()> {
            *self.active.borrow_mut() += 1;
            *self.acquisitions.borrow_mut() += 1;
            Ok(())
        }

        fn release(&mut self) -> io::Result<()> {
            *self.active.borrow_mut() -= 1;
            Ok(())
        }
    }
}
