use std::{ fs::File, path::{ Path, PathBuf }, time::Duration };

use anyhow::Context;
use crossbeam_channel::Sender;
use rodio::{ Decoder, OutputStream, OutputStreamBuilder, Sink, Source };

use super::{ DeviceEvent, PlaybackDevice };
use crate::{ episode::Episode, error::DeviceError };

/// Device that plays local files on the default audio output
pub struct RodioDevice {
    events: Sender<DeviceEvent>,
    // Dropping the stream silences the sink
    _stream: OutputStream,
    sink: Sink,
    source: Option<PathBuf>,
    looping: bool,
}

impl RodioDevice {
    pub fn try_new_default(events: Sender<DeviceEvent>) -> anyhow::Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .context("Cannot open the default audio output")?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        log::info!("Audio output ready");
        Ok(RodioDevice { events, _stream: stream, sink, source: None, looping: false })
    }

    fn emit(&self, event: DeviceEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Device event {} dropped, no listener", event);
        }
    }

    /// Decode the source and queue it on the sink, returning its duration
    fn append_source(&self, path: &Path) -> Result<Option<Duration>, DeviceError> {
        let file = File::open(path)?;
        let decoder = Decoder::try_from(file).map_err(|e| DeviceError::Decode(e.to_string()))?;
        let duration = decoder.total_duration();
        self.sink.append(decoder);
        Ok(duration)
    }
}

/// Turn an episode url into a local path. Only plain paths and `file://`
/// urls can be played.
fn resolve_local_path(url: &str) -> Result<PathBuf, DeviceError> {
    let path = match url.strip_prefix("file://") {
        Some(rest) => rest,
        None if url.contains("://") => {
            return Err(DeviceError::UnsupportedSource(url.to_string()));
        }
        None => url,
    };

    let path = PathBuf::from(path);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DeviceError::SourceNotFound(url.to_string()))
    }
}

impl PlaybackDevice for RodioDevice {
    fn load(&mut self, episode: &Episode) -> Result<(), DeviceError> {
        let path = resolve_local_path(&episode.url)?;

        self.sink.clear();
        self.source = None;
        let duration = self.append_source(&path)?;
        self.sink.pause();
        self.source = Some(path);

        log::debug!("Loaded {} ({:?})", episode.url, duration);
        self.emit(DeviceEvent::LoadedMetadata { duration: duration.map(|d| d.as_secs_f64()) });
        Ok(())
    }

    fn unload(&mut self) {
        self.sink.clear();
        self.source = None;
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        if self.source.is_none() {
            return Err(DeviceError::NoSource);
        }
        if self.sink.is_paused() {
            self.sink.play();
            self.emit(DeviceEvent::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if self.source.is_some() && !self.sink.is_paused() {
            self.sink.pause();
            self.emit(DeviceEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.source.is_none() || self.sink.is_paused()
    }

    fn current_time(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), DeviceError> {
        if self.source.is_none() {
            return Err(DeviceError::NoSource);
        }
        self.sink
            .try_seek(Duration::from_secs_f64(seconds.max(0.0)))
            .map_err(|e| DeviceError::Seek(e.to_string()))
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn poll(&mut self, _elapsed: Duration) {
        let Some(path) = self.source.clone() else {
            return;
        };
        if self.sink.is_paused() {
            return;
        }

        if !self.sink.empty() {
            self.emit(DeviceEvent::TimeUpdate { position: self.current_time() });
            return;
        }

        if self.looping {
            match self.append_source(&path) {
                Ok(_) => {
                    self.emit(DeviceEvent::TimeUpdate { position: 0.0 });
                    return;
                }
                Err(e) => log::warn!("Failed to restart {}: {}", path.display(), e),
            }
        }

        self.sink.pause();
        self.emit(DeviceEvent::Ended);
    }
}
