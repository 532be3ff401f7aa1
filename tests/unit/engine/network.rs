use super::*;
use crate::engine::AnimationEngine as _;
use crate::runtime::Runtime;
use std::cell::Cell;

fn setup(latency_ms: u64) -> (Runtime, Rc<RefCell<HeadlessEngine>>, SimulatedNetwork) {
    let rt = Runtime::new();
    let engine = Rc::new(RefCell::new(HeadlessEngine::new()));
    let net = SimulatedNetwork::for_config(
        rt.handle(),
        engine.clone(),
        Duration::from_millis(latency_ms),
        &MotionConfig::default(),
    );
    (rt, engine, net)
}

#[test]
fn served_scripts_install_after_latency() {
    let (mut rt, engine, net) = setup(100);
    let cfg = MotionConfig::default();
    let done = Rc::new(Cell::new(None));
    let d = done.clone();
    let fut = net.fetch(&cfg.engine_core_url());
    rt.handle().spawn(async move {
        d.set(Some(fut.await));
    });
    rt.advance(Duration::from_millis(99));
    assert_eq!(done.take(), None);
    assert!(!engine.borrow().core_present());
    rt.advance(Duration::from_millis(1));
    assert_eq!(done.take(), Some(Ok(())));
    assert!(engine.borrow().core_present());
    assert!(!engine.borrow().extension_present());
    assert_eq!(net.request_count(&cfg.engine_core_url()), 1);
}

#[test]
fn failures_and_unknown_urls_reject() {
    let (mut rt, engine, net) = setup(10);
    let cfg = MotionConfig::default();
    net.set_behaviour(&cfg.engine_core_url(), FetchBehaviour::Fail("boom".to_owned()));
    let results = Rc::new(RefCell::new(Vec::new()));
    for url in [cfg.engine_core_url(), "https://example.invalid/x.js".to_owned()] {
        let fut = net.fetch(&url);
        let r = results.clone();
        rt.handle().spawn(async move {
            let out = fut.await;
            r.borrow_mut().push(out);
        });
    }
    rt.advance(Duration::from_millis(20));
    assert_eq!(
        *results.borrow(),
        vec![Err("boom".to_owned()), Err("404 not found".to_owned())]
    );
    assert!(!engine.borrow().core_present());
    assert_eq!(net.requests().len(), 2);
}

#[test]
fn hanging_requests_never_resolve() {
    let (mut rt, _engine, net) = setup(10);
    let cfg = MotionConfig::default();
    net.set_behaviour(&cfg.engine_core_url(), FetchBehaviour::Hang);
    let done = Rc::new(Cell::new(false));
    let d = done.clone();
    let fut = net.fetch(&cfg.engine_core_url());
    rt.handle().spawn(async move {
        let _ = fut.await;
        d.set(true);
    });
    rt.advance(Duration::from_secs(60));
    assert!(!done.get());
}
