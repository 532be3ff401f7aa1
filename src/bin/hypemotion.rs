use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use hypemotion::{
    Document, FetchBehaviour, FlowLayout, HeadlessEngine, Motion, MotionConfig, Page, PageDef,
    Rect, Runtime, SegmentKind, SimulatedNetwork, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "hypemotion", version)]
struct Cli {
    /// Log filter level for stderr output.
    #[arg(long, global = true, default_value = "warn")]
    log: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a page fixture and print a JSON report.
    Run(RunArgs),
    /// Split a text string and print the segments as JSON.
    Segment(SegmentArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input page fixture JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Optional configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine is already on the page; no scripts are fetched.
    #[arg(long, default_value_t = false)]
    preloaded: bool,

    /// Simulated latency of each script fetch, in milliseconds.
    #[arg(long, default_value_t = 50)]
    latency_ms: u64,

    /// Make the engine core fetch fail.
    #[arg(long, default_value_t = false)]
    fail_engine: bool,

    /// Make the engine core fetch never resolve.
    #[arg(long, default_value_t = false)]
    hang_engine: bool,

    /// Scroll positions to visit, in order, after initialization.
    #[arg(long = "scroll")]
    scrolls: Vec<f64>,

    /// Virtual time to run after init and after every scroll, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    advance_ms: u64,

    /// Jump due engine animations to their end state after every step.
    #[arg(long, default_value_t = false)]
    settle: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Lines,
    Words,
    Chars,
}

impl From<KindArg> for SegmentKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Lines => SegmentKind::Lines,
            KindArg::Words => SegmentKind::Words,
            KindArg::Chars => SegmentKind::Chars,
        }
    }
}

#[derive(Parser, Debug)]
struct SegmentArgs {
    /// Text to split.
    #[arg(long)]
    text: String,

    /// Granularity.
    #[arg(long, value_enum, default_value_t = KindArg::Words)]
    kind: KindArg,

    /// Width of the containing block, in pixels.
    #[arg(long, default_value_t = 320.0)]
    width: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log)
        .init();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Segment(args) => cmd_segment(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let def = PageDef::from_path(&args.in_path)
        .with_context(|| format!("load page fixture '{}'", args.in_path.display()))?;
    let cfg = match &args.config {
        Some(p) => MotionConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => MotionConfig::default(),
    };
    let page = Rc::new(def.build().context("build page")?);

    let mut rt = Runtime::new();
    let engine = Rc::new(RefCell::new(if args.preloaded {
        HeadlessEngine::preloaded()
    } else {
        HeadlessEngine::new()
    }));
    let network = SimulatedNetwork::for_config(
        rt.handle(),
        engine.clone(),
        Duration::from_millis(args.latency_ms),
        &cfg,
    );
    if args.hang_engine {
        network.set_behaviour(&cfg.engine_core_url(), FetchBehaviour::Hang);
    } else if args.fail_engine {
        network.set_behaviour(
            &cfg.engine_core_url(),
            FetchBehaviour::Fail("simulated network error".to_owned()),
        );
    }

    let motion = Motion::new(page.clone(), engine.clone(), Rc::new(network), rt.handle(), cfg)
        .context("create orchestrator")?;
    motion.init().context("init")?;

    let step = Duration::from_millis(args.advance_ms);
    rt.advance(step);
    if args.settle {
        engine.borrow_mut().settle_on(&page);
    }
    for y in args.scrolls {
        page.scroll_to(y);
        rt.advance(step);
        if args.settle {
            engine.borrow_mut().settle_on(&page);
        }
    }

    let report = motion.report();
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize report")?
    );
    Ok(())
}

fn cmd_segment(args: SegmentArgs) -> anyhow::Result<()> {
    if !(args.width > 0.0) {
        anyhow::bail!("--width must be > 0");
    }
    let mut doc = Document::new();
    let p = doc.create_element("p");
    doc.set_frame(p, Some(Rect::new(0.0, 0.0, args.width, 10_000.0)));
    let text = doc.create_text(args.text.as_str());
    doc.append_child(p, text).context("build paragraph")?;
    doc.append_child(doc.body(), p).context("attach paragraph")?;

    let page = Page::with_layout(
        doc,
        Viewport::new(args.width, 800.0),
        Box::new(FlowLayout::default()),
    );
    let cfg = MotionConfig::default();
    let split = {
        let mut doc = page.doc_mut();
        hypemotion::segment(
            &mut doc,
            page.layout(),
            p,
            args.kind.into(),
            cfg.line_tolerance_px,
        )
        .context("split text")?
    };
    let texts: Vec<&str> = split.segments.iter().map(|s| s.text.as_str()).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "kind": SegmentKind::from(args.kind),
            "inline_markup": split.inline_markup,
            "segments": texts,
        }))
        .context("serialize segments")?
    );
    Ok(())
}
