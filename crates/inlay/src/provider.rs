//! Inlay hint providers and their registry.
//!
//! The pipeline talks to an [`InlayHintSource`]: "is anyone able to produce
//! hints for this document" and "produce hints for this range". The bundled
//! [`ProviderRegistry`] answers both by fanning out to every registered
//! [`InlayHintProvider`] whose [`DocumentSelector`] matches the document and
//! tagging each hint with the [`ProviderId`] that produced it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures::future::join_all;
use lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, Range};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cancel::FetchToken;
use crate::config::matches_filetype;
use crate::document::HintDocument;

/// Identity of a registered provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub u64);

/// A hint together with the provider that produced it.
///
/// Never mutated after construction; a new fetch yields new values.
#[derive(Debug, Clone)]
pub struct ProvidedHint {
	pub provider: ProviderId,
	pub hint: InlayHint,
}

impl ProvidedHint {
	pub fn new(provider: ProviderId, hint: InlayHint) -> Self {
		Self { provider, hint }
	}

	/// Display text: the plain label or the concatenated label part values.
	pub fn label(&self) -> String {
		match &self.hint.label {
			InlayHintLabel::String(text) => text.clone(),
			InlayHintLabel::LabelParts(parts) => parts.iter().map(|part| part.value.as_str()).collect(),
		}
	}

	pub fn padding_left(&self) -> bool {
		self.hint.padding_left.unwrap_or(false)
	}

	pub fn padding_right(&self) -> bool {
		self.hint.padding_right.unwrap_or(false)
	}

	pub fn kind(&self) -> Option<InlayHintKind> {
		self.hint.kind
	}
}

/// Registry-level view the pipeline fetches through.
#[async_trait]
pub trait InlayHintSource: Send + Sync {
	/// Returns true if at least one provider applies to `document`.
	fn has_provider(&self, document: &dyn HintDocument) -> bool;

	/// Computes hints for `range`.
	///
	/// `Ok(None)` means no provider produced a result (unavailable or
	/// cancelled). Provider failures are returned as errors.
	async fn provide_inlay_hints(&self, document: &dyn HintDocument, range: Range, token: &FetchToken) -> anyhow::Result<Option<Vec<ProvidedHint>>>;
}

/// A single source of inlay hints, such as one language server.
#[async_trait]
pub trait InlayHintProvider: Send + Sync {
	/// Computes hints for `range`. Implementations should poll `token` and
	/// return `Ok(None)` once it is cancelled.
	async fn provide_inlay_hints(&self, document: &dyn HintDocument, range: Range, token: &FetchToken) -> anyhow::Result<Option<Vec<InlayHint>>>;
}

/// File types a provider applies to. `*` matches every file type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSelector {
	filetypes: Vec<String>,
}

impl DocumentSelector {
	pub fn new<I, S>(filetypes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			filetypes: filetypes.into_iter().map(Into::into).collect(),
		}
	}

	/// Selector matching every document.
	pub fn any() -> Self {
		Self::new(["*"])
	}

	pub fn matches(&self, document: &dyn HintDocument) -> bool {
		matches_filetype(&self.filetypes, &document.file_type())
	}
}

struct Entry {
	id: ProviderId,
	selector: DocumentSelector,
	provider: Arc<dyn InlayHintProvider>,
}

#[derive(Default)]
struct RegistryInner {
	next_id: AtomicU64,
	entries: RwLock<Vec<Entry>>,
}

/// Set of registered providers.
///
/// Cheap to clone; clones share the same registrations.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
	inner: Arc<RegistryInner>,
}

impl std::fmt::Debug for ProviderRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProviderRegistry").field("providers", &self.len()).finish()
	}
}

/// Handle returned by [`ProviderRegistry::register`].
#[derive(Debug)]
pub struct ProviderRegistration {
	id: ProviderId,
	registry: Weak<RegistryInner>,
}

impl ProviderRegistration {
	pub fn id(&self) -> ProviderId {
		self.id
	}

	/// Removes the provider from its registry.
	pub fn dispose(self) {
		if let Some(registry) = self.registry.upgrade() {
			registry.entries.write().retain(|entry| entry.id != self.id);
			debug!(provider = self.id.0, "inlay.provider.unregister");
		}
	}
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `provider` for documents matching `selector`.
	pub fn register(&self, selector: DocumentSelector, provider: Arc<dyn InlayHintProvider>) -> ProviderRegistration {
		let id = ProviderId(self.inner.next_id.fetch_add(1, Ordering::AcqRel).wrapping_add(1));
		self.inner.entries.write().push(Entry { id, selector, provider });
		debug!(provider = id.0, "inlay.provider.register");
		ProviderRegistration {
			id,
			registry: Arc::downgrade(&self.inner),
		}
	}

	pub fn len(&self) -> usize {
		self.inner.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn matching(&self, document: &dyn HintDocument) -> Vec<(ProviderId, Arc<dyn InlayHintProvider>)> {
		self.inner
			.entries
			.read()
			.iter()
			.filter(|entry| entry.selector.matches(document))
			.map(|entry| (entry.id, Arc::clone(&entry.provider)))
			.collect()
	}
}

#[async_trait]
impl InlayHintSource for ProviderRegistry {
	fn has_provider(&self, document: &dyn HintDocument) -> bool {
		self.inner.entries.read().iter().any(|entry| entry.selector.matches(document))
	}

	async fn provide_inlay_hints(&self, document: &dyn HintDocument, range: Range, token: &FetchToken) -> anyhow::Result<Option<Vec<ProvidedHint>>> {
		let providers = self.matching(document);
		if providers.is_empty() || token.is_cancelled() {
			return Ok(None);
		}

		let results = join_all(
			providers
				.iter()
				.map(|(_, provider)| provider.provide_inlay_hints(document, range, token)),
		)
		.await;

		if token.is_cancelled() {
			trace!(generation = token.generation(), "inlay.provider.cancelled");
			return Ok(None);
		}

		let mut merged: Option<Vec<ProvidedHint>> = None;
		for ((id, _), result) in providers.iter().zip(results) {
			let Some(hints) = result? else {
				continue;
			};
			merged
				.get_or_insert_with(Vec::new)
				.extend(hints.into_iter().map(|hint| ProvidedHint::new(*id, hint)));
		}
		Ok(merged)
	}
}
