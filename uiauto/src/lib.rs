mod dialog;
mod matcher;
mod pattern;

pub use {
    crate::{
        dialog::popup,
        pattern::{Confidence, Match, Pattern},
    },
    enigo::Button,
};

use {
    anyhow::{bail, Context as _},
    enigo::{Direction, Enigo, Mouse},
    image::{DynamicImage, RgbaImage},
    std::{
        sync::{Arc, Mutex},
        thread::sleep,
        time::{Duration, Instant},
    },
    tracing::debug,
};

/// Interval between capture attempts while waiting for a pattern.
const POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Settle delay after every synthesized input event.
const INPUT_SETTLE: Duration = Duration::from_millis(200);

struct ScreenData {
    enigo: Mutex<Enigo>,
}

/// Handle to the desktop: captures the screen, locates patterns on it and
/// synthesizes mouse input. Cheap to clone.
#[derive(Clone)]
pub struct Screen(Arc<ScreenData>);

impl Screen {
    #[allow(clippy::new_without_default)]
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self(Arc::new(ScreenData {
            enigo: Mutex::new(Enigo::new(&enigo::Settings::default())?),
        })))
    }

    pub fn capture(&self) -> anyhow::Result<RgbaImage> {
        let image = xcap::Monitor::all()?
            .first()
            .context("no monitors found")?
            .capture_image()?;
        Ok(image)
    }

    /// Takes one capture and returns the best occurrence of `pattern`, if its
    /// score clears the pattern's confidence.
    pub fn find(&self, pattern: &Pattern) -> anyhow::Result<Option<Match>> {
        let capture = DynamicImage::ImageRgba8(self.capture()?).into_luma8();
        let found = matcher::locate(&capture, pattern)?;
        if let Some(found) = &found {
            debug!(
                "found pattern {:?} at ({}, {}) with score {:.3}",
                pattern.name(),
                found.x,
                found.y,
                found.score
            );
        }
        Ok(found)
    }

    /// Takes one capture and reports whether `pattern` is currently visible.
    pub fn exists(&self, pattern: &Pattern) -> anyhow::Result<bool> {
        Ok(self.find(pattern)?.is_some())
    }

    /// Polls the screen until `pattern` appears or `timeout` elapses.
    pub fn wait(&self, pattern: &Pattern, timeout: Duration) -> anyhow::Result<Match> {
        let started = Instant::now();
        while started.elapsed() < timeout {
            if let Some(found) = self.find(pattern)? {
                return Ok(found);
            }
            sleep(POLL_INTERVAL);
        }
        bail!(
            "couldn't find pattern {:?} on screen after {:?}",
            pattern.name(),
            timeout
        );
    }

    /// Moves the cursor to the center of `target` and left-clicks it.
    pub fn click(&self, target: &Match) -> anyhow::Result<()> {
        let (x, y) = target.center();
        self.mouse_move_global(x, y)?;
        self.mouse_left_click()
    }

    pub fn wait_click(&self, pattern: &Pattern, timeout: Duration) -> anyhow::Result<Match> {
        let found = self.wait(pattern, timeout)?;
        self.click(&found)?;
        Ok(found)
    }

    pub fn mouse_click(&self, button: Button) -> anyhow::Result<()> {
        self.0
            .enigo
            .lock()
            .unwrap()
            .button(button, Direction::Click)?;
        sleep(INPUT_SETTLE);
        Ok(())
    }

    pub fn mouse_left_click(&self) -> anyhow::Result<()> {
        self.mouse_click(Button::Left)
    }

    pub fn mouse_move_global(&self, x: i32, y: i32) -> anyhow::Result<()> {
        self.0
            .enigo
            .lock()
            .unwrap()
            .move_mouse(x, y, enigo::Coordinate::Abs)?;
        sleep(INPUT_SETTLE);
        Ok(())
    }
}
