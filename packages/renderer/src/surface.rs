use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use chartpatch_parser::{validate, ConfigValue};

/// How the surface rasterizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    #[default]
    Raster,
    Vector,
}

/// Initialization options for a surface binding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderOptions {
    pub kind: SurfaceKind,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_ratio: Option<f32>,
}

/// Snapshot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct SurfaceError(pub String);

/// A mounted display surface the renderer drives.
///
/// Exactly one renderer owns a surface at a time; re-init transfers ownership
/// by releasing the prior binding first. Loading-indicator side effects are
/// scoped to this surface only.
pub trait Surface {
    /// Apply a configuration. `replace` clears prior state instead of
    /// merging into it.
    fn apply_config(&mut self, config: &ConfigValue, replace: bool) -> Result<(), SurfaceError>;

    fn resize(&mut self, width: Option<u32>, height: Option<u32>);

    fn snapshot(&self, format: ImageFormat, pixel_ratio: f32) -> Result<Vec<u8>, SurfaceError>;

    fn show_loading(&mut self, _text: &str) {}

    fn hide_loading(&mut self) {}

    fn clear(&mut self);
}

/// Headless surface used by tests and headless hosts.
///
/// It still validates applied configurations so callers can exercise the
/// render/recover contract without a real backend.
#[derive(Debug)]
pub struct HeadlessSurface {
    state: Rc<RefCell<HeadlessState>>,
}

/// Shared view into a [`HeadlessSurface`] after ownership moves into a
/// renderer.
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    applies: usize,
    resizes: usize,
    clears: usize,
    last_config: Option<ConfigValue>,
    loading: Option<String>,
    size: (Option<u32>, Option<u32>),
}

impl HeadlessSurface {
    pub fn new() -> (Self, HeadlessProbe) {
        let state = Rc::new(RefCell::new(HeadlessState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            HeadlessProbe { state },
        )
    }
}

impl Surface for HeadlessSurface {
    fn apply_config(&mut self, config: &ConfigValue, replace: bool) -> Result<(), SurfaceError> {
        let verdict = validate(config);
        if !verdict.valid {
            return Err(SurfaceError(verdict.errors.join("; ")));
        }
        let mut state = self.state.borrow_mut();
        if replace {
            state.last_config = None;
        }
        state.applies += 1;
        state.last_config = Some(config.clone());
        Ok(())
    }

    fn resize(&mut self, width: Option<u32>, height: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.resizes += 1;
        state.size = (width, height);
    }

    fn snapshot(&self, format: ImageFormat, pixel_ratio: f32) -> Result<Vec<u8>, SurfaceError> {
        let header = match format {
            ImageFormat::Png => "headless-png",
            ImageFormat::Jpeg => "headless-jpeg",
        };
        Ok(format!("{header}@{pixel_ratio}x").into_bytes())
    }

    fn show_loading(&mut self, text: &str) {
        self.state.borrow_mut().loading = Some(text.to_string());
    }

    fn hide_loading(&mut self) {
        self.state.borrow_mut().loading = None;
    }

    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.clears += 1;
        state.last_config = None;
    }
}

impl HeadlessProbe {
    pub fn applies(&self) -> usize {
        self.state.borrow().applies
    }

    pub fn resizes(&self) -> usize {
        self.state.borrow().resizes
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn last_config(&self) -> Option<ConfigValue> {
        self.state.borrow().last_config.clone()
    }

    pub fn loading(&self) -> Option<String> {
        self.state.borrow().loading.clone()
    }

    pub fn size(&self) -> (Option<u32>, Option<u32>) {
        self.state.borrow().size
    }
}
