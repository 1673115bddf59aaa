//! Viewport-driven inlay hint pipeline.
//!
//! Keeps the inline annotations of one document in step with the visible
//! viewport and with asynchronous hint computation by language providers.
//! Each document owns exactly one [`InlayHintPipeline`]:
//!
//! - [`debounce::Debouncer`] collapses bursts of scroll/edit notifications into
//!   one fetch cycle.
//! - [`regions::CoveredRanges`] remembers which viewport bands are already
//!   painted so repeated renders of the same viewport are no-ops.
//! - [`cancel::RequestCanceller`] keeps at most one live fetch per document.
//! - [`painter::OverlayPainter`] turns fetched hints into a single atomic
//!   [`painter::OverlayBatch`] against the host's rendering surface.
//!
//! The host supplies the collaborators: [`document::HintDocument`],
//! [`viewport::ViewportQuery`], [`provider::InlayHintSource`] and
//! [`painter::OverlaySurface`].

pub mod cancel;
pub mod config;
pub mod debounce;
pub mod document;
mod error;
pub mod events;
pub mod painter;
pub mod pipeline;
pub mod provider;
pub mod range;
pub mod regions;
#[cfg(test)]
mod test_support;
pub mod viewport;

pub use config::{InlayHintConfig, RenderMode};
pub use error::{Error, Result};
pub use events::DocumentEvent;
pub use lsp_types;
pub use pipeline::{FetchPhase, InlayHintPipeline, PipelineParts, RefreshEvent, RenderOutcome, StaleReason};
pub use provider::{DocumentSelector, InlayHintProvider, InlayHintSource, ProvidedHint, ProviderId, ProviderRegistry};
pub use range::LineSpan;
