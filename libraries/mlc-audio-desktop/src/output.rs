/// CPAL output engine with a dedicated audio thread
use crate::error::{DesktopAudioError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use mlc_core::{AudioEvent, AudioEventSender, HandleId, PlayId};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// A decoded clip in device layout, plus its play position
pub struct Voice {
    handle: HandleId,
    samples: Arc<Vec<f32>>,
    /// Position in samples, not frames
    position: AtomicUsize,
    playing: AtomicBool,
    /// Play id of the most recent start
    play: AtomicU64,
}

impl Voice {
    pub fn new(handle: HandleId, samples: Vec<f32>) -> Self {
        Self {
            handle,
            samples: Arc::new(samples),
            position: AtomicUsize::new(0),
            playing: AtomicBool::new(false),
            play: AtomicU64::new(0),
        }
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn play_id(&self) -> PlayId {
        PlayId::new(self.play.load(Ordering::Acquire))
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn position(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    pub fn pause(&self) {
        self.playing.store(false, Ordering::Release);
    }

    pub fn rewind(&self) {
        self.position.store(0, Ordering::Relaxed);
    }

    /// Copy the next samples into `output`, padding with silence
    ///
    /// Returns `true` when this call reached the end of the clip; the voice is
    /// then no longer playing and stays at the end until rewound.
    pub fn render_into(&self, output: &mut [f32]) -> bool {
        if !self.is_playing() {
            output.fill(0.0);
            return false;
        }

        let start = self.position().min(self.samples.len());
        let available = self.samples.len() - start;
        let count = available.min(output.len());

        output[..count].copy_from_slice(&self.samples[start..start + count]);
        output[count..].fill(0.0);

        let end = start + count;
        self.position.store(end, Ordering::Relaxed);

        if end >= self.samples.len() {
            self.pause();
            return true;
        }
        false
    }
}

/// Commands sent to the audio thread
enum AudioCommand {
    /// Make a voice current and start it
    Start {
        voice: Arc<Voice>,
        reply: oneshot::Sender<Result<PlayId>>,
    },
    /// Shutdown the audio thread
    Shutdown,
}

/// State shared between the audio thread and the stream callback
struct EngineState {
    current: Mutex<Option<Arc<Voice>>>,
    events: AudioEventSender,
    next_play: AtomicU64,
}

impl EngineState {
    fn current(&self) -> MutexGuard<'_, Option<Arc<Voice>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Device layout every voice is converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLayout {
    pub channels: u16,
    pub sample_rate: u32,
}

/// CPAL output engine
///
/// **Architecture**: a dedicated thread owns the CPAL `Stream`, which is not
/// `Send` on every platform. Other threads talk to it through a command
/// channel. One voice is current at a time; starting a voice replaces the
/// previous one.
pub struct OutputEngine {
    command_tx: Sender<AudioCommand>,
    layout: DeviceLayout,
    state: Arc<EngineState>,
    _audio_thread: Option<JoinHandle<()>>,
}

impl OutputEngine {
    /// Open the default output device
    ///
    /// Natural end of a clip is reported as [`AudioEvent::Ended`] on `events`.
    ///
    /// # Errors
    /// Returns an error if no device is found or its default configuration
    /// cannot be used
    pub fn new(events: AudioEventSender) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DesktopAudioError::DeviceNotFound)?;

        let supported = device.default_output_config()?;
        if supported.sample_format() != SampleFormat::F32 {
            return Err(DesktopAudioError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        let layout = DeviceLayout {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
        };
        let config = supported.config();

        info!(
            channels = layout.channels,
            sample_rate = layout.sample_rate,
            "Opened audio output device"
        );

        let state = Arc::new(EngineState {
            current: Mutex::new(None),
            events,
            next_play: AtomicU64::new(1),
        });
        let (command_tx, command_rx) = bounded::<AudioCommand>(32);

        let state_clone = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("mlc-audio".to_string())
            .spawn(move || Self::audio_thread_run(device, config, state_clone, command_rx))
            .map_err(|e| DesktopAudioError::StreamBuildError(e.to_string()))?;

        Ok(Self {
            command_tx,
            layout,
            state,
            _audio_thread: Some(audio_thread),
        })
    }

    pub fn layout(&self) -> DeviceLayout {
        self.layout
    }

    /// Make `voice` current and resolve once the stream is running
    ///
    /// Returns the id carried by events for this start.
    pub async fn start(&self, voice: Arc<Voice>) -> Result<PlayId> {
        let (reply, done) = oneshot::channel();
        self.command_tx
            .send(AudioCommand::Start { voice, reply })
            .map_err(|_| DesktopAudioError::ThreadGone)?;
        done.await.map_err(|_| DesktopAudioError::ThreadGone)?
    }

    /// Handle of the current voice if it is playing
    pub fn playing(&self) -> Option<HandleId> {
        self.state
            .current()
            .as_ref()
            .filter(|voice| voice.is_playing())
            .map(|voice| voice.handle())
    }

    /// Audio thread main loop
    ///
    /// The stream is built on first start and kept open afterwards; an idle
    /// voice renders silence.
    fn audio_thread_run(
        device: cpal::Device,
        config: StreamConfig,
        state: Arc<EngineState>,
        command_rx: Receiver<AudioCommand>,
    ) {
        let mut stream: Option<Stream> = None;

        while let Ok(cmd) = command_rx.recv() {
            match cmd {
                AudioCommand::Start { voice, reply } => {
                    let result = Self::ensure_stream(&device, &config, &state, &mut stream)
                        .map(|()| {
                            let mut current = state.current();
                            if let Some(previous) = current.replace(Arc::clone(&voice)) {
                                if previous.handle() != voice.handle() {
                                    previous.pause();
                                }
                            }
                            let play = state.next_play.fetch_add(1, Ordering::Relaxed);
                            voice.play.store(play, Ordering::Release);
                            voice.playing.store(true, Ordering::Release);
                            debug!(handle = %voice.handle(), play, "Voice started");
                            PlayId::new(play)
                        });
                    let _ = reply.send(result);
                }
                AudioCommand::Shutdown => {
                    if let Some(s) = stream.take() {
                        drop(s);
                    }
                    break;
                }
            }
        }
    }

    fn ensure_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        state: &Arc<EngineState>,
        stream: &mut Option<Stream>,
    ) -> Result<()> {
        if stream.is_some() {
            return Ok(());
        }

        let state_for_callback = Arc::clone(state);
        let state_for_errors = Arc::clone(state);
        let built = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                Self::audio_callback(data, &state_for_callback);
            },
            move |err| Self::stream_error(&err.to_string(), &state_for_errors),
            None,
        )?;
        built.play()?;

        *stream = Some(built);
        Ok(())
    }

    /// Audio callback function (runs in real-time audio thread)
    fn audio_callback(output: &mut [f32], state: &EngineState) {
        let voice = state.current().clone();

        let Some(voice) = voice else {
            output.fill(0.0);
            return;
        };

        if voice.render_into(output) {
            let _ = state.events.send(AudioEvent::Ended {
                handle: voice.handle(),
                play: voice.play_id(),
            });
        }
    }

    fn stream_error(message: &str, state: &EngineState) {
        error!(error = %message, "Audio stream error");

        let voice = state.current().clone();
        if let Some(voice) = voice.filter(|v| v.is_playing()) {
            voice.pause();
            let _ = state.events.send(AudioEvent::Failed {
                handle: voice.handle(),
                play: voice.play_id(),
                message: message.to_string(),
            });
        }
    }
}

impl Drop for OutputEngine {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
    }
}
