//! # Chartpatch Renderer
//!
//! Lifecycle management for one live rendering surface.
//!
//! The renderer is an explicit state machine (Uninitialized → Initialized ⇄
//! Rendering → Disposed) that owns at most one [`Surface`] binding, applies
//! configurations incrementally, recovers with the last valid configuration
//! when a render fails, and observes surface-size changes through a
//! cancellable, coalescing subscription.
//!
//! Hosts implement [`Surface`] over their actual display technology; the
//! bundled [`HeadlessSurface`] serves tests and headless use.

mod error;
mod observer;
mod renderer;
mod surface;

pub use error::{RenderError, RenderResult};
pub use observer::{PendingResize, SizeEvents};
pub use renderer::{ChartRenderer, RendererState};
pub use surface::{
    HeadlessProbe, HeadlessSurface, ImageFormat, RenderOptions, Surface, SurfaceError, SurfaceKind,
};
