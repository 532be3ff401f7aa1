use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt as _;
use futures::future::LocalBoxFuture;

use crate::config::MotionConfig;
use crate::engine::{HeadlessEngine, ScriptFetcher};
use crate::runtime::RuntimeHandle;

/// Which engine script a URL serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    /// Tween core.
    Core,
    /// Scroll-trigger extension.
    Extension,
}

/// How a simulated request ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchBehaviour {
    /// Resolve after the latency.
    Succeed,
    /// Reject after the latency.
    Fail(String),
    /// Never resolve.
    Hang,
}

struct Route {
    script: Script,
    behaviour: FetchBehaviour,
}

/// Script fetcher backed by the runtime's virtual clock.
///
/// Served scripts install themselves on the shared [`HeadlessEngine`] when they resolve, the way
/// evaluating a script tag defines its globals. Unknown URLs fail like a 404.
pub struct SimulatedNetwork {
    rt: RuntimeHandle,
    engine: Rc<RefCell<HeadlessEngine>>,
    latency: Duration,
    routes: RefCell<HashMap<String, Route>>,
    requests: RefCell<Vec<String>>,
}

impl std::fmt::Debug for SimulatedNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedNetwork")
            .field("latency", &self.latency)
            .field("requests", &self.requests.borrow().len())
            .finish_non_exhaustive()
    }
}

impl SimulatedNetwork {
    /// Network serving nothing yet.
    pub fn new(rt: RuntimeHandle, engine: Rc<RefCell<HeadlessEngine>>, latency: Duration) -> Self {
        Self {
            rt,
            engine,
            latency,
            routes: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Network serving both engine scripts at the URLs `cfg` points to.
    pub fn for_config(
        rt: RuntimeHandle,
        engine: Rc<RefCell<HeadlessEngine>>,
        latency: Duration,
        cfg: &MotionConfig,
    ) -> Self {
        let net = Self::new(rt, engine, latency);
        net.serve(cfg.engine_core_url(), Script::Core);
        net.serve(cfg.engine_extension_url(), Script::Extension);
        net
    }

    /// Serve `script` at `url`.
    pub fn serve(&self, url: impl Into<String>, script: Script) {
        self.routes.borrow_mut().insert(
            url.into(),
            Route {
                script,
                behaviour: FetchBehaviour::Succeed,
            },
        );
    }

    /// Change how requests for `url` end. Unserved URLs are ignored.
    pub fn set_behaviour(&self, url: &str, behaviour: FetchBehaviour) {
        if let Some(route) = self.routes.borrow_mut().get_mut(url) {
            route.behaviour = behaviour;
        }
    }

    /// Every URL requested, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of requests made for `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }
}

impl ScriptFetcher for SimulatedNetwork {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<(), String>> {
        tracing::debug!(url, "fetch script");
        self.requests.borrow_mut().push(url.to_owned());
        let route = self
            .routes
            .borrow()
            .get(url)
            .map(|r| (r.script, r.behaviour.clone()));
        let sleep = self.rt.sleep(self.latency);
        let engine = self.engine.clone();
        async move {
            let Some((script, behaviour)) = route else {
                sleep.await;
                return Err("404 not found".to_owned());
            };
            if behaviour == FetchBehaviour::Hang {
                return futures::future::pending().await;
            }
            sleep.await;
            if let FetchBehaviour::Fail(reason) = behaviour {
                return Err(reason);
            }
            let mut engine = engine.borrow_mut();
            match script {
                Script::Core => engine.install_core(),
                Script::Extension => engine.install_extension(),
            }
            Ok(())
        }
        .boxed_local()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/network.rs"]
mod tests;
