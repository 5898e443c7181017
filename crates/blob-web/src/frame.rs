//! Per-frame pipeline driven by requestAnimationFrame: advance the reaction
//! machine's deadline work, read one audio sample, displace the mesh and
//! render.

use std::cell::RefCell;
use std::rc::Rc;

use blob_core::{
    displace_mesh, BlobMesh, FrameDisplacement, BLOB_AUDIO_SCALE_GAIN, BLOB_BASE_SCALE,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::speech::SpeechSource;
use crate::{dom, render, sampler, ui, App};

pub struct FrameContext {
    pub app: App,
    pub mesh: BlobMesh,
    pub gpu: Option<render::GpuState<'static>>,
    pub canvas: web::HtmlCanvasElement,
    pub last_revision: Option<u64>,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = self.app.now();
        self.app.machine.borrow_mut().tick(now);
        let snapshot = self.app.machine.borrow().snapshot();

        let sample = match self.app.speech_source.get() {
            SpeechSource::Analyser => self.app.audio.borrow_mut().as_mut().map(|g| g.sample()),
            SpeechSource::Simulated => Some(sampler::simulated_sample()),
            SpeechSource::None => None,
        };

        let displacement = FrameDisplacement::new(
            &snapshot.animation,
            &snapshot.visual,
            now,
            sample,
            snapshot.speech_active,
        );
        displace_mesh(&mut self.mesh, &displacement);

        if self.last_revision != Some(snapshot.revision) {
            self.last_revision = Some(snapshot.revision);
            if let Some(doc) = dom::window_document() {
                ui::update_status(&doc, &snapshot);
            }
        }

        // The whole mesh swells slightly with the voice.
        let scale = match sample {
            Some(s) if snapshot.speech_active => {
                BLOB_BASE_SCALE * (1.0 + s.amplitude * BLOB_AUDIO_SCALE_GAIN)
            }
            _ => BLOB_BASE_SCALE,
        };

        if let Some(gpu) = &mut self.gpu {
            gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
            if let Err(e) = gpu.render(&self.mesh, &snapshot.visual, scale, now as f32) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    mesh: &BlobMesh,
) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas, mesh).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ = w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
