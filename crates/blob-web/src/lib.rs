#![cfg(target_arch = "wasm32")]
//! Browser front-end: DOM chat panel, speech playback and WebGPU rendering
//! around the blob-core reaction machine.

mod chat;
mod classify;
mod dom;
mod frame;
mod overlay;
mod render;
mod sampler;
mod speech;
mod ui;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use blob_core::{
    BlobMesh, PresetTable, ReactionMachine, BLOB_HEIGHT_SEGMENTS, BLOB_RADIUS,
    BLOB_WIDTH_SEGMENTS,
};
use instant::Instant;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use classify::ChatMessage;
use speech::SpeechSource;

/// Shared handles threaded through UI closures, the chat flow and the frame
/// loop. The reaction machine is the sole owner of visualizer state; everyone
/// else goes through its three operations and published snapshots.
#[derive(Clone)]
pub struct App {
    pub machine: Rc<RefCell<ReactionMachine>>,
    pub speech_source: Rc<Cell<SpeechSource>>,
    pub audio: Rc<RefCell<Option<sampler::AudioGraph>>>,
    pub history: Rc<RefCell<Vec<ChatMessage>>>,
    pub busy: Rc<Cell<bool>>,
    pub epoch: Instant,
}

impl App {
    /// Seconds since startup; the single clock every deadline is measured in.
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// Create the WebAudio graph if it does not exist yet. Must be called from a
/// user gesture the first time.
pub(crate) fn ensure_audio(app: &App) {
    let mut slot = app.audio.borrow_mut();
    if slot.is_none() {
        match sampler::AudioGraph::new() {
            Ok(graph) => {
                let _ = graph.context().resume();
                *slot = Some(graph);
            }
            Err(e) => log::error!("AudioContext error: {:?}", e),
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("blob-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document =
        dom::window_document().ok_or_else(|| anyhow::anyhow!("no window/document"))?;

    let canvas_el = document
        .get_element_by_id("blob-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #blob-canvas"))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    dom::sync_canvas_backing_size(&canvas);
    dom::wire_resize_listener(&canvas);

    let machine = ReactionMachine::new(PresetTable::builtin())?;
    let app = App {
        machine: Rc::new(RefCell::new(machine)),
        speech_source: Rc::new(Cell::new(SpeechSource::None)),
        audio: Rc::new(RefCell::new(None)),
        history: Rc::new(RefCell::new(Vec::new())),
        busy: Rc::new(Cell::new(false)),
        epoch: Instant::now(),
    };

    ui::wire_preset_buttons(&document, &app);
    ui::wire_chat(&document, &app);
    {
        let app = app.clone();
        let document_start = document.clone();
        dom::add_click_listener(&document, "start-button", move || {
            ensure_audio(&app);
            overlay::hide(&document_start);
        });
    }
    ui::update_status(&document, &app.machine.borrow().snapshot());

    let mesh = BlobMesh::uv_sphere(BLOB_RADIUS, BLOB_WIDTH_SEGMENTS, BLOB_HEIGHT_SEGMENTS);
    let gpu = frame::init_gpu(&canvas, &mesh).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        app,
        mesh,
        gpu,
        canvas,
        last_revision: None,
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
