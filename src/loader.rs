//! On-demand loading of the animation engine.
//!
//! One load sequence at most is ever in flight: every requester that arrives while it runs gets a
//! clone of the same shared future. A settled load is never retried; teardown is the only way
//! back to [`LoadState::Unloaded`].

use std::rc::{Rc, Weak};

use futures::FutureExt as _;
use futures::future::{self, LocalBoxFuture, Shared};

use crate::context::Inner;
use crate::diagnostics::DiagnosticKind;
use crate::foundation::error::LoadError;
use crate::safety;

/// Future every requester of one load sequence awaits.
pub(crate) type LoadFuture = Shared<LocalBoxFuture<'static, Result<(), LoadError>>>;

/// Engine availability.
#[derive(Clone, Default)]
pub(crate) enum LoadState {
    #[default]
    Unloaded,
    Loading(LoadFuture),
    Loaded,
    Failed(LoadError),
}

impl LoadState {
    pub fn phase(&self) -> LoadPhase {
        match self {
            Self::Unloaded => LoadPhase::Unloaded,
            Self::Loading(_) => LoadPhase::Loading,
            Self::Loaded => LoadPhase::Loaded,
            Self::Failed(_) => LoadPhase::Failed,
        }
    }
}

/// Observable load phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadPhase {
    /// Nothing requested yet.
    Unloaded,
    /// A fetch sequence is in flight.
    Loading,
    /// Core and extension are registered.
    Loaded,
    /// The sequence failed; content was forced visible.
    Failed,
}

/// Resolve once the engine is usable.
///
/// When the engine is already present the state flips to loaded synchronously and the returned
/// future is immediately ready.
pub(crate) fn ensure_loaded(inner: &Rc<Inner>) -> LocalBoxFuture<'static, Result<(), LoadError>> {
    match &inner.ctx.borrow().load {
        LoadState::Loaded => return future::ready(Ok(())).boxed_local(),
        LoadState::Failed(err) => return future::ready(Err(err.clone())).boxed_local(),
        LoadState::Loading(shared) => return shared.clone().boxed_local(),
        LoadState::Unloaded => {}
    }

    let present = {
        let engine = inner.engine.borrow();
        engine.core_present() && engine.extension_present()
    };
    if present {
        let registered = inner
            .engine
            .borrow_mut()
            .register_extension()
            .map_err(|e| LoadError::Register(e.to_string()));
        settle(inner, &registered, "engine already present");
        return future::ready(registered).boxed_local();
    }

    tracing::debug!("starting engine load");
    let shared = sequence(Rc::downgrade(inner)).boxed_local().shared();
    inner.ctx.borrow_mut().load = LoadState::Loading(shared.clone());
    shared.boxed_local()
}

async fn sequence(weak: Weak<Inner>) -> Result<(), LoadError> {
    let result = fetch_all(&weak).await;
    if let Some(inner) = weak.upgrade() {
        // Teardown may have reset the state while the fetches were in flight.
        let current = matches!(inner.ctx.borrow().load, LoadState::Loading(_));
        if current {
            settle(&inner, &result, "engine loaded");
        }
    }
    result
}

/// Fetch the core, confirm it, then fetch and register the extension.
async fn fetch_all(weak: &Weak<Inner>) -> Result<(), LoadError> {
    let (engine, fetcher, core_url, extension_url) = {
        let inner = weak.upgrade().ok_or(LoadError::Cancelled)?;
        (
            inner.engine.clone(),
            inner.fetcher.clone(),
            inner.cfg.engine_core_url(),
            inner.cfg.engine_extension_url(),
        )
    };

    if !engine.borrow().core_present() {
        fetcher
            .fetch(&core_url)
            .await
            .map_err(|reason| LoadError::Fetch {
                url: core_url.clone(),
                reason,
            })?;
        if !engine.borrow().core_present() {
            return Err(LoadError::CoreMissing { url: core_url });
        }
    }
    if !engine.borrow().extension_present() {
        fetcher
            .fetch(&extension_url)
            .await
            .map_err(|reason| LoadError::Fetch {
                url: extension_url.clone(),
                reason,
            })?;
    }
    engine
        .borrow_mut()
        .register_extension()
        .map_err(|e| LoadError::Register(e.to_string()))
}

fn settle(inner: &Inner, result: &Result<(), LoadError>, milestone: &str) {
    match result {
        Ok(()) => {
            let mut ctx = inner.ctx.borrow_mut();
            ctx.load = LoadState::Loaded;
            ctx.note(DiagnosticKind::EngineLoaded, milestone);
        }
        Err(err) => {
            {
                let mut ctx = inner.ctx.borrow_mut();
                ctx.load = LoadState::Failed(err.clone());
                ctx.note(DiagnosticKind::EngineLoadFailed, err.to_string());
            }
            safety::force_visible(inner);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/loader/loader.rs"]
mod tests;
