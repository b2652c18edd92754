// audio.rs - 旁白播放：rodio 输出设备 + 每页一个 Sink

use crate::host::TransportFactory;
use crate::page::{AudioTransport, SilentTransport};
use rodio::{Decoder, OutputStream, OutputStreamHandle, PlayError, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Opens the default output device. The returned stream must stay alive for
/// as long as any transport built from the handle plays.
pub fn open_output() -> Option<(OutputStream, OutputStreamHandle)> {
    match OutputStream::try_default() {
        Ok(output) => Some(output),
        Err(e) => {
            log::warn!("no audio output, narration disabled: {}", e);
            None
        }
    }
}

/// Narration on a rodio sink. The sink starts paused; `play` resumes it.
pub struct RodioTransport {
    sink: Sink,
}

impl RodioTransport {
    pub fn new(handle: &OutputStreamHandle) -> Result<Self, PlayError> {
        Ok(Self::from_sink(Sink::try_new(handle)?))
    }

    pub fn from_sink(sink: Sink) -> Self {
        sink.pause();
        Self { sink }
    }
}

impl AudioTransport for RodioTransport {
    fn load(&mut self, path: &Path) {
        let decoded = File::open(path)
            .map_err(|e| e.to_string())
            .and_then(|f| Decoder::new(BufReader::new(f)).map_err(|e| e.to_string()));
        match decoded {
            Ok(source) => {
                log::info!("narration {}", path.display());
                self.sink.append(source);
            }
            Err(e) => log::warn!("could not open narration {}: {}", path.display(), e),
        }
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

/// Builds a rodio transport per narrated page, or a silent one when there is
/// no output device or the sink cannot be created.
pub fn transport_factory(handle: Option<OutputStreamHandle>) -> TransportFactory {
    Box::new(move || {
        let Some(handle) = handle.as_ref() else {
            return Box::new(SilentTransport) as Box<dyn AudioTransport>;
        };
        match RodioTransport::new(handle) {
            Ok(transport) => Box::new(transport),
            Err(e) => {
                log::warn!("narration sink: {}", e);
                Box::new(SilentTransport)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes a short silent 16-bit mono PCM wav.
    fn write_wav(path: &Path) {
        let samples = 800u32;
        let data_len = samples * 2;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&8000u32.to_le_bytes());
        bytes.extend_from_slice(&16000u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(bytes.len() + data_len as usize, 0);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn loaded_narration_waits_for_play() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Story_1.wav");
        write_wav(&path);

        let (sink, _queue) = Sink::new_idle();
        let mut transport = RodioTransport::from_sink(sink);
        transport.load(&path);
        assert_eq!(transport.sink.len(), 1);
        assert!(transport.sink.is_paused());

        transport.play();
        assert!(!transport.sink.is_paused());
        transport.pause();
        assert!(transport.sink.is_paused());
        assert!(transport.is_audible());
    }

    #[test]
    fn undecodable_narration_queues_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Story_1.mp3");
        std::fs::write(&path, b"not audio").unwrap();

        let (sink, _queue) = Sink::new_idle();
        let mut transport = RodioTransport::from_sink(sink);
        transport.load(&path);
        transport.load(&tmp.path().join("missing.mp3"));
        assert!(transport.sink.empty());
    }

    #[test]
    fn no_output_device_falls_back_to_silence() {
        let factory = transport_factory(None);
        assert!(!factory().is_audible());
    }
}
