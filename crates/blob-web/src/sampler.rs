//! WebAudio analyser sampling.
//!
//! While the assistant's reply is playing, the analyser is read once per
//! rendered frame and reduced to the two-channel amplitude shape the
//! displacement engine consumes.

use blob_core::AudioSample;
use web_sys as web;

/// Number of leading frequency bins treated as bass.
const BASS_BINS: usize = 10;

pub struct AudioGraph {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    buf: Vec<u8>,
}

impl AudioGraph {
    pub fn new() -> Result<Self, wasm_bindgen::JsValue> {
        let ctx = web::AudioContext::new()?;
        let analyser = web::AnalyserNode::new(&ctx)?;
        analyser.set_fft_size(256);
        let bins = analyser.frequency_bin_count() as usize;
        Ok(Self {
            ctx,
            analyser,
            buf: vec![0; bins],
        })
    }

    pub fn context(&self) -> &web::AudioContext {
        &self.ctx
    }

    pub fn analyser(&self) -> &web::AnalyserNode {
        &self.analyser
    }

    /// One amplitude reading, both channels normalized to [0, 1].
    pub fn sample(&mut self) -> AudioSample {
        self.analyser.get_byte_frequency_data(&mut self.buf);
        let n = self.buf.len().max(1);
        let average =
            self.buf.iter().map(|&b| b as f32).sum::<f32>() / n as f32 / 255.0;
        let bass_n = self.buf.len().min(BASS_BINS).max(1);
        let bass =
            self.buf[..bass_n].iter().map(|&b| b as f32).sum::<f32>() / bass_n as f32 / 255.0;
        AudioSample {
            amplitude: average,
            bass,
        }
    }
}

/// Stand-in amplitude for the browser-voice fallback, which plays outside the
/// analyser graph.
pub fn simulated_sample() -> AudioSample {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    AudioSample {
        amplitude: 0.3 + rng.gen::<f32>() * 0.4,
        bass: 0.2 + rng.gen::<f32>() * 0.3,
    }
}
