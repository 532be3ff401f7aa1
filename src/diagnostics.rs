//! Operator-visible diagnostics. Emitting one never changes control flow.

use crate::dom::NodeId;

/// What a diagnostic is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Element also carries a foreign interaction binding.
    AttributeConflict,
    /// Effect or button attribute names an unsupported kind.
    UnknownDirective,
    /// Counter text holds no recognizable number.
    UnparseableCounter,
    /// Split target contains inline markup.
    InlineMarkupInSplit,
    /// Custom child selector could not be parsed.
    InvalidSelector,
    /// The engine scripts failed to load.
    EngineLoadFailed,
    /// Initialization did not reach ready in time.
    InitTimeout,
    /// Engine finished loading.
    EngineLoaded,
    /// Page needs no engine.
    CssOnly,
    /// Initialization finished.
    Ready,
    /// Teardown finished.
    Destroyed,
    /// Trigger positions recomputed.
    Refreshed,
}

impl DiagnosticKind {
    /// Warnings indicate something the operator should look at; the rest are milestones.
    pub fn is_warning(self) -> bool {
        matches!(
            self,
            Self::AttributeConflict
                | Self::UnknownDirective
                | Self::UnparseableCounter
                | Self::InlineMarkupInSplit
                | Self::InvalidSelector
                | Self::EngineLoadFailed
                | Self::InitTimeout
        )
    }
}

/// One emitted diagnostic.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    /// Category.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// Element concerned, if any.
    pub node: Option<NodeId>,
}

/// Collects diagnostics and mirrors them to `tracing`.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Record and log a diagnostic.
    pub fn emit(&mut self, kind: DiagnosticKind, node: Option<NodeId>, message: impl Into<String>) {
        let message = message.into();
        if kind.is_warning() {
            tracing::warn!(?kind, ?node, "{message}");
        } else {
            tracing::info!(?kind, "{message}");
        }
        self.entries.push(Diagnostic {
            kind,
            message,
            node,
        });
    }

    /// Everything recorded so far.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of entries of `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}
