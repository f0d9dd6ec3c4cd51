//! src/main.rs
//! Terminal demo: rows act as elements with bound actions.
//!
//! Click a row to dispatch its action (alt-click is allowed on the second
//! row), press `r` to re-render, `q` to quit. Each input event is one turn;
//! the run loop flushes after it.

use std::cell::RefCell;
use std::io::{self, Stdout, Write};
use std::rc::Rc;

use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEventKind},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{info, warn};

use action_core::{
    ActionHelper, ActionResult, Config, InputEvent, LoggerBuilder, RunLoop, TemplateContext, Value,
    controller::{ActionDescriptor, Receiver, TargetSpec},
    model::{ActionMap, AllowedKeys, Element, PropertyStore},
};

struct Demo {
    store: PropertyStore,
    run_loop: Rc<RunLoop>,
    helper: ActionHelper,
    context: TemplateContext,
    rows: Vec<Element>,
    status: Rc<RefCell<String>>,
    renders: i32,
}

impl Demo {
    fn new(config: &Config) -> Self {
        let store = PropertyStore::new();
        let run_loop = Rc::new(RunLoop::new(&config.scheduler));
        let helper = ActionHelper::new(
            Rc::new(store.clone()),
            run_loop.clone(),
            config.dispatch.clone(),
        );

        let status = Rc::new(RefCell::new(String::from("click a row")));
        let controller: Rc<dyn Receiver> = Rc::new(status_actions("controller", &status));
        let inspector: Rc<dyn Receiver> = Rc::new(status_actions("inspector", &status));
        store.set("inspector", Value::object(inspector));
        store.set("selection", Value::from("row-2"));

        Self {
            store,
            run_loop,
            helper,
            context: TemplateContext::new(Value::Null).with_receiver(controller),
            rows: Vec::new(),
            status,
            renders: 0,
        }
    }

    /// Tear down the previous rows and bind fresh ones.
    fn render(&mut self) -> ActionResult<()> {
        for row in self.rows.drain(..) {
            row.teardown();
        }
        self.renders = self.renders.saturating_add(1);

        let descriptors = [
            (
                "save",
                ActionDescriptor::literal("save")
                    .param(self.renders)
                    .allowed_keys(AllowedKeys::parse_optional(None)?),
            ),
            (
                "inspect (alt ok)",
                ActionDescriptor::literal("inspect")
                    .param_path("selection")
                    .allowed_keys(AllowedKeys::parse_optional(Some("alt"))?)
                    .target(TargetSpec::Path("inspector".into())),
            ),
        ];

        for (label, descriptor) in descriptors {
            let element = Element::new("button");
            element.set_attribute("label", label);
            self.helper.bind_element(&element, descriptor, &self.context);
            self.rows.push(element);
        }

        info!(
            renders = self.renders,
            live = self.helper.registry().len(),
            subscriptions = self.store.live_subscriptions(),
            "rendered"
        );
        Ok(())
    }

    fn draw(&self, out: &mut Stdout) -> io::Result<()> {
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        for (y, row) in self.rows.iter().enumerate() {
            execute!(out, MoveTo(0, u16::try_from(y).unwrap_or(u16::MAX)))?;
            let label = row.attribute("label").unwrap_or_default();
            write!(out, "<{}> {label}", row.tag())?;
        }

        let status_row = u16::try_from(self.rows.len()).unwrap_or(u16::MAX);
        execute!(out, MoveTo(0, status_row.saturating_add(1)))?;
        write!(
            out,
            "{}  [selection: {}]  (r: re-render, q: quit)",
            self.status.borrow(),
            self.store.get("selection").to_text()
        )?;
        out.flush()
    }

    fn on_mouse(&self, row: u16, mut input: InputEvent) {
        input.event_type = "click".into();
        if let Some(target) = self.rows.get(usize::from(row)) {
            self.helper.handle_element(target, &mut input);
        }
    }
}

fn status_actions(owner: &'static str, status: &Rc<RefCell<String>>) -> ActionMap {
    let on_save = status.clone();
    let on_inspect = status.clone();
    ActionMap::new(owner)
        .with_method("save", move |args| {
            *on_save.borrow_mut() = format!("{owner}.save({args:?})");
        })
        .with_method("inspect", move |args| {
            *on_inspect.borrow_mut() = format!("{owner}.inspect({args:?})");
        })
}

fn run(demo: &mut Demo, out: &mut Stdout) -> Result<()> {
    demo.render()?;
    loop {
        demo.draw(out)?;

        match event::read()? {
            Event::Key(key) if key.code == KeyCode::Char('q') => return Ok(()),
            Event::Key(key) if key.code == KeyCode::Char('r') => demo.render()?,
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Up(_)) => {
                demo.on_mouse(mouse.row, InputEvent::from_mouse(&mouse));
            }
            _ => {}
        }

        if let Err(e) = demo.run_loop.flush() {
            warn!("dispatch failed: {e}");
            *demo.status.borrow_mut() = e.to_string();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load().await.context("Failed to load config")?;
    let _guard = LoggerBuilder::new()
        .with_config(config.logging.clone())
        .build()
        .await
        .context("Failed to initialize logging")?;

    let mut demo = Demo::new(&config);
    let mut out = io::stdout();

    terminal::enable_raw_mode()?;
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;

    let result = run(&mut demo, &mut out);

    execute!(out, DisableMouseCapture, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    info!(stats = ?demo.run_loop.stats(), "demo exited");
    result
}
