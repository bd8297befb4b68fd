use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use chartpatch_parser::ConfigValue;

use crate::error::{RenderError, RenderResult};
use crate::observer::{new_state, SizeEvents, SizeState};
use crate::surface::{ImageFormat, RenderOptions, Surface};

/// Renderer lifecycle.
///
/// ```text
/// Uninitialized → Initialized ⇄ Rendering
///        ↓              ↓
///        └───────→ Disposed (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    Initialized,
    Rendering,
    Disposed,
}

/// Drives one display surface and keeps it in sync with a configuration.
///
/// The renderer owns at most one surface binding at a time. A failed render
/// triggers one silent recovery pass with the last configuration that
/// rendered successfully; the failure is still reported to the caller and
/// `last_valid_config` is never clobbered by a bad configuration.
pub struct ChartRenderer {
    state: RendererState,
    surface: Option<Box<dyn Surface>>,
    options: RenderOptions,
    last_valid: Option<ConfigValue>,
    size_state: Option<Rc<RefCell<SizeState>>>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self {
            state: RendererState::Uninitialized,
            surface: None,
            options: RenderOptions::default(),
            last_valid: None,
            size_state: None,
        }
    }

    /// Bind a surface, releasing any prior binding first.
    pub fn init(
        &mut self,
        surface: Option<Box<dyn Surface>>,
        options: RenderOptions,
    ) -> RenderResult<()> {
        if self.state == RendererState::Disposed {
            return Err(RenderError::Disposed);
        }
        let Some(mut surface) = surface else {
            return Err(RenderError::MissingSurface);
        };

        self.release_binding();

        if options.width.is_some() || options.height.is_some() {
            surface.resize(options.width, options.height);
        }
        self.surface = Some(surface);
        self.options = options;
        self.size_state = Some(new_state());
        self.state = RendererState::Initialized;
        debug!("surface bound");
        Ok(())
    }

    /// Render a configuration, merging into current surface state.
    pub fn render(&mut self, config: &ConfigValue) -> RenderResult<()> {
        self.render_with(config, false)
    }

    /// Incremental update; alias for a merging render.
    pub fn update(&mut self, config: &ConfigValue) -> RenderResult<()> {
        self.render_with(config, false)
    }

    /// Full replacement render.
    pub fn rerender(&mut self, config: &ConfigValue) -> RenderResult<()> {
        self.render_with(config, true)
    }

    fn render_with(&mut self, config: &ConfigValue, replace: bool) -> RenderResult<()> {
        match self.state {
            RendererState::Disposed => return Err(RenderError::Disposed),
            RendererState::Uninitialized => return Err(RenderError::NotInitialized),
            RendererState::Initialized | RendererState::Rendering => {}
        }
        if config.as_mapping().is_none() {
            return Err(RenderError::InvalidConfig);
        }
        let Some(surface) = self.surface.as_mut() else {
            return Err(RenderError::NotInitialized);
        };

        self.state = RendererState::Rendering;
        match surface.apply_config(config, replace) {
            Ok(()) => {
                self.last_valid = Some(config.clone());
                self.state = RendererState::Initialized;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "render failed; attempting recovery with the last valid configuration");
                if let Some(last) = &self.last_valid {
                    if let Err(recover_err) = surface.apply_config(last, true) {
                        warn!(%recover_err, "recovery render failed");
                    }
                }
                self.state = RendererState::Initialized;
                Err(RenderError::Surface(err))
            }
        }
    }

    /// Resize the bound surface; no-op outside Initialized/Rendering.
    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>) {
        if !self.is_initialized() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    /// Subscription handle for passive surface-size observation. Goes inert
    /// once the binding is released.
    pub fn size_events(&self) -> SizeEvents {
        SizeEvents::new(match &self.size_state {
            Some(state) => Rc::downgrade(state),
            None => Weak::new(),
        })
    }

    /// Apply at most one pending coalesced resize.
    pub fn pump_resize(&mut self) {
        let pending = self
            .size_state
            .as_ref()
            .and_then(|state| state.borrow_mut().pending.take());
        if let Some(resize) = pending {
            self.resize(resize.width, resize.height);
        }
    }

    /// Encode a snapshot of the current surface.
    pub fn export_image(&self, format: ImageFormat, pixel_ratio: f32) -> RenderResult<Vec<u8>> {
        if !self.is_initialized() {
            return Err(RenderError::ExportBeforeInit);
        }
        let Some(surface) = self.surface.as_ref() else {
            return Err(RenderError::ExportBeforeInit);
        };
        surface
            .snapshot(format, pixel_ratio)
            .map_err(RenderError::Surface)
    }

    pub fn show_loading(&mut self, text: &str) {
        if let Some(surface) = self.surface.as_mut() {
            surface.show_loading(text);
        }
    }

    pub fn hide_loading(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.hide_loading();
        }
    }

    /// Empty the surface and forget the last valid configuration.
    pub fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
            self.last_valid = None;
        }
    }

    /// Release everything. Valid from any state, idempotent, terminal.
    pub fn dispose(&mut self) {
        self.release_binding();
        self.state = RendererState::Disposed;
    }

    pub fn is_initialized(&self) -> bool {
        matches!(
            self.state,
            RendererState::Initialized | RendererState::Rendering
        )
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn last_valid_config(&self) -> Option<&ConfigValue> {
        self.last_valid.as_ref()
    }

    fn release_binding(&mut self) {
        self.surface = None;
        self.size_state = None;
        self.last_valid = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use chartpatch_parser::parse_literal;

    fn valid_config() -> ConfigValue {
        parse_literal("{ series: [{ type: 'line', data: [1, 2, 3] }] }").unwrap()
    }

    fn invalid_config() -> ConfigValue {
        parse_literal("{ series: [] }").unwrap()
    }

    #[test]
    fn init_without_a_surface_fails_and_stays_uninitialized() {
        let mut renderer = ChartRenderer::new();
        let err = renderer.init(None, RenderOptions::default()).unwrap_err();
        assert_eq!(err, RenderError::MissingSurface);
        assert_eq!(err.to_string(), "container element must not be null");
        assert!(!renderer.is_initialized());
    }

    #[test]
    fn successful_render_records_the_last_valid_config() {
        let mut renderer = ChartRenderer::new();
        let (surface, probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();

        let config = valid_config();
        renderer.render(&config).unwrap();
        assert_eq!(renderer.state(), RendererState::Initialized);
        assert_eq!(renderer.last_valid_config(), Some(&config));
        assert_eq!(probe.applies(), 1);
    }

    #[test]
    fn failed_render_recovers_silently_and_keeps_last_valid() {
        let mut renderer = ChartRenderer::new();
        let (surface, probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();

        let good = valid_config();
        renderer.render(&good).unwrap();

        let err = renderer.render(&invalid_config()).unwrap_err();
        assert!(matches!(err, RenderError::Surface(_)));
        // One recovery pass re-applied the last valid configuration.
        assert_eq!(probe.applies(), 2);
        assert_eq!(probe.last_config(), Some(good.clone()));
        assert_eq!(renderer.last_valid_config(), Some(&good));
        assert_eq!(renderer.state(), RendererState::Initialized);
    }

    #[test]
    fn rendering_null_reports_invalid_config_without_touching_state() {
        let mut renderer = ChartRenderer::new();
        let (surface, _probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();
        let good = valid_config();
        renderer.render(&good).unwrap();

        let err = renderer.render(&ConfigValue::null()).unwrap_err();
        assert_eq!(err, RenderError::InvalidConfig);
        assert_eq!(renderer.last_valid_config(), Some(&good));
    }

    #[test]
    fn render_before_init_is_reported() {
        let mut renderer = ChartRenderer::new();
        assert_eq!(
            renderer.render(&valid_config()).unwrap_err(),
            RenderError::NotInitialized
        );
    }

    #[test]
    fn resize_is_a_no_op_outside_initialized_states() {
        let mut renderer = ChartRenderer::new();
        renderer.resize(Some(10), Some(10)); // no surface, no panic

        let (surface, probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();
        renderer.resize(Some(320), Some(240));
        assert_eq!(probe.resizes(), 1);
        assert_eq!(probe.size(), (Some(320), Some(240)));

        renderer.dispose();
        renderer.resize(Some(1), Some(1));
        assert_eq!(probe.resizes(), 1);
    }

    #[test]
    fn size_events_coalesce_into_one_resize_per_pump() {
        let mut renderer = ChartRenderer::new();
        let (surface, probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();

        let events = renderer.size_events();
        events.emit(Some(100), Some(100));
        events.emit(Some(300), Some(200));
        renderer.pump_resize();
        renderer.pump_resize(); // nothing left pending

        assert_eq!(probe.resizes(), 1);
        assert_eq!(probe.size(), (Some(300), Some(200)));
    }

    #[test]
    fn dispose_tears_down_the_size_subscription() {
        let mut renderer = ChartRenderer::new();
        let (surface, _probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();
        let events = renderer.size_events();
        assert!(events.is_connected());

        renderer.dispose();
        assert!(!events.is_connected());
        events.emit(Some(5), Some(5)); // inert

        // Dispose is idempotent and terminal.
        renderer.dispose();
        assert_eq!(renderer.state(), RendererState::Disposed);
        assert_eq!(
            renderer
                .init(
                    Some(Box::new(HeadlessSurface::new().0)),
                    RenderOptions::default()
                )
                .unwrap_err(),
            RenderError::Disposed
        );
    }

    #[test]
    fn reinit_releases_the_prior_binding_first() {
        let mut renderer = ChartRenderer::new();
        let (first, first_probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(first)), RenderOptions::default())
            .unwrap();
        renderer.render(&valid_config()).unwrap();

        let (second, second_probe) = HeadlessSurface::new();
        renderer
            .init(
                Some(Box::new(second)),
                RenderOptions {
                    width: Some(640),
                    height: Some(480),
                    ..RenderOptions::default()
                },
            )
            .unwrap();

        // Prior binding released, last valid forgotten with it.
        assert!(renderer.last_valid_config().is_none());
        assert_eq!(first_probe.applies(), 1);
        assert_eq!(second_probe.size(), (Some(640), Some(480)));
        assert!(renderer.is_initialized());
    }

    #[test]
    fn export_requires_an_initialized_renderer() {
        let mut renderer = ChartRenderer::new();
        assert_eq!(
            renderer
                .export_image(ImageFormat::Png, 1.0)
                .unwrap_err(),
            RenderError::ExportBeforeInit
        );

        let (surface, _probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();
        let bytes = renderer.export_image(ImageFormat::Png, 2.0).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "headless-png@2x");
    }

    #[test]
    fn loading_indicator_is_scoped_to_the_surface() {
        let mut renderer = ChartRenderer::new();
        let (surface, probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();

        renderer.show_loading("loading…");
        assert_eq!(probe.loading().as_deref(), Some("loading…"));
        renderer.hide_loading();
        assert_eq!(probe.loading(), None);
    }

    #[test]
    fn clear_forgets_the_last_valid_config() {
        let mut renderer = ChartRenderer::new();
        let (surface, probe) = HeadlessSurface::new();
        renderer
            .init(Some(Box::new(surface)), RenderOptions::default())
            .unwrap();
        renderer.render(&valid_config()).unwrap();

        renderer.clear();
        assert!(renderer.last_valid_config().is_none());
        assert_eq!(probe.clears(), 1);
        assert_eq!(probe.last_config(), None);
    }
}
