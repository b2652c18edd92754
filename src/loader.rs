// loader.rs - 后台解码页面图片，按请求代数丢弃过期结果

use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Result of one background decode, delivered only if it is still wanted.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded { index: usize, image: RgbaImage },
    Failed { index: usize, path: PathBuf, error: String },
}

type Tagged = (u64, LoadEvent);

/// Decodes page images off the UI thread. Every `request` or `cancel` starts
/// a new generation; results from earlier generations are dropped, so a slow
/// decode from a previous page or story never replaces the current image.
pub struct ImageLoader {
    generation: u64,
    pending: bool,
    tx: Sender<Tagged>,
    rx: Receiver<Tagged>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            generation: 0,
            pending: false,
            tx,
            rx,
        }
    }

    /// True until the latest request has been delivered, loaded or failed.
    pub fn is_loading(&self) -> bool {
        self.pending
    }

    pub fn request(&mut self, index: usize, path: PathBuf) {
        self.generation += 1;
        self.pending = true;
        let generation = self.generation;
        let tx = self.tx.clone();

        thread::spawn(move || {
            log::info!("loading {:?} in background", path);
            let event = match decode(&path) {
                Ok(image) => {
                    log::info!("page {} image {}x{}", index, image.width(), image.height());
                    LoadEvent::Loaded { index, image }
                }
                Err(e) => LoadEvent::Failed {
                    index,
                    path,
                    error: e.to_string(),
                },
            };
            if tx.send((generation, event)).is_err() {
                log::warn!("viewer closed before page {} finished loading", index);
            }
        });
    }

    /// Forget any request in flight, e.g. for a page with no image.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = false;
    }

    /// Next current result without blocking.
    pub fn try_recv(&mut self) -> Option<LoadEvent> {
        while let Ok(tagged) = self.rx.try_recv() {
            if let Some(event) = self.accept(tagged) {
                return Some(event);
            }
        }
        None
    }

    /// Next current result, waiting at most `timeout` overall.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<LoadEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(tagged) => {
                    if let Some(event) = self.accept(tagged) {
                        return Some(event);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, (generation, event): Tagged) -> Option<LoadEvent> {
        if generation != self.generation {
            log::debug!("dropping stale image result (generation {})", generation);
            return None;
        }
        self.pending = false;
        if let LoadEvent::Failed { path, error, .. } = &event {
            log::error!("could not decode {}: {}", path.display(), error);
        }
        Some(event)
    }
}

pub fn decode(path: &Path) -> image::ImageResult<RgbaImage> {
    let mut reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(image::ImageError::IoError)?;
    reader.no_limits();
    Ok(reader.decode()?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::new(width, height).save(path).unwrap();
    }

    #[test]
    fn loads_requested_image() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Story_0.png");
        write_png(&path, 4, 2);

        let mut loader = ImageLoader::new();
        assert!(!loader.is_loading());
        loader.request(0, path);
        assert!(loader.is_loading());

        match loader.recv_timeout(WAIT) {
            Some(LoadEvent::Loaded { index, image }) => {
                assert_eq!(index, 0);
                assert_eq!(image.dimensions(), (4, 2));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!loader.is_loading());
    }

    #[test]
    fn failed_decode_ends_loading() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Story_1.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let mut loader = ImageLoader::new();
        loader.request(1, path.clone());
        match loader.recv_timeout(WAIT) {
            Some(LoadEvent::Failed { index, path: failed, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(failed, path);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!loader.is_loading());
    }

    #[test]
    fn same_page_of_an_earlier_story_is_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let old_cover = tmp.path().join("old.png");
        let new_cover = tmp.path().join("new.png");
        write_png(&old_cover, 8, 4);
        write_png(&new_cover, 4, 2);

        let mut loader = ImageLoader::new();
        loader.request(0, old_cover);
        loader.request(0, new_cover);

        match loader.recv_timeout(WAIT) {
            Some(LoadEvent::Loaded { index: 0, image }) => assert_eq!(image.dimensions(), (4, 2)),
            other => panic!("unexpected {:?}", other),
        }
        assert!(loader.recv_timeout(Duration::from_millis(500)).is_none());
    }

    #[test]
    fn cancel_discards_in_flight_result() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Story_0.png");
        write_png(&path, 2, 1);

        let mut loader = ImageLoader::new();
        loader.request(0, path);
        loader.cancel();
        assert!(!loader.is_loading());
        assert!(loader.recv_timeout(Duration::from_millis(300)).is_none());
    }
}
