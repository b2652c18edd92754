// page.rs - 单页内容：封面或全景页（相机 + 文本 + 旁白音频）

use crate::assets::{AssetProbe, AUDIO_EXT};
use crate::camera::OrbitCamera;
use crate::pages::{Page, PageKind};
use std::path::PathBuf;

/// Playback backend for narration audio.
pub trait AudioTransport {
    fn load(&mut self, path: &std::path::Path);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    /// False for transports that never produce sound.
    fn is_audible(&self) -> bool {
        true
    }
}

/// Transport that plays nothing. Used when no audio backend is available.
#[derive(Debug, Default)]
pub struct SilentTransport;

impl AudioTransport for SilentTransport {
    fn load(&mut self, path: &std::path::Path) {
        log::info!("narration available at {} (no audio backend)", path.display());
    }
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn stop(&mut self) {}

    fn is_audible(&self) -> bool {
        false
    }
}

pub struct Narration {
    path: PathBuf,
    playing: bool,
    transport: Box<dyn AudioTransport>,
}

impl Narration {
    pub fn new(path: PathBuf, autoplay: bool, mut transport: Box<dyn AudioTransport>) -> Self {
        transport.load(&path);
        if autoplay {
            transport.play();
        }
        Self {
            path,
            playing: autoplay,
            transport,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a play/pause control means anything to the listener.
    pub fn is_audible(&self) -> bool {
        self.transport.is_audible()
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.transport.pause();
        } else {
            self.transport.play();
        }
        self.playing = !self.playing;
    }
}

impl Drop for Narration {
    fn drop(&mut self) {
        self.transport.stop();
    }
}

impl std::fmt::Debug for Narration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narration")
            .field("path", &self.path)
            .field("playing", &self.playing)
            .finish()
    }
}

/// Per-page options decided by the application.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub image_ext: String,
    /// Start narration playing when the page opens.
    pub autoplay: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            image_ext: crate::assets::DEFAULT_IMAGE_EXT.to_string(),
            autoplay: true,
        }
    }
}

/// Everything one visible page owns. Built fresh per page and dropped when
/// the page is replaced, which ends any deceleration and stops narration.
#[derive(Debug)]
pub struct StoryPage {
    page: Page,
    image: Option<PathBuf>,
    camera: Option<OrbitCamera>,
    text: String,
    narration: Option<Narration>,
}

impl StoryPage {
    pub fn open(
        page: Page,
        probe: &dyn AssetProbe,
        options: &PageOptions,
        transport: impl FnOnce() -> Box<dyn AudioTransport>,
    ) -> Self {
        let image = probe.locate(page.index, &options.image_ext);
        if image.is_none() {
            log::warn!("page {} has no image", page.index);
        }

        match page.kind {
            PageKind::Cover => Self {
                page,
                image,
                camera: None,
                text: String::new(),
                narration: None,
            },
            PageKind::Panoramic => {
                let text = probe.read_text(page.index).unwrap_or_default();
                let narration = probe
                    .locate(page.index, AUDIO_EXT)
                    .map(|path| Narration::new(path, options.autoplay, transport()));
                log::debug!(
                    "opened page {}/{} (text {} bytes, narration {})",
                    page.index,
                    page.total_pages,
                    text.len(),
                    narration.is_some()
                );
                Self {
                    page,
                    image,
                    camera: Some(OrbitCamera::new()),
                    text,
                    narration,
                }
            }
        }
    }

    pub fn index(&self) -> usize {
        self.page.index
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn kind(&self) -> PageKind {
        self.page.kind
    }

    pub fn image(&self) -> Option<&std::path::Path> {
        self.image.as_deref()
    }

    pub fn camera(&self) -> Option<&OrbitCamera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut OrbitCamera> {
        self.camera.as_mut()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn narration(&self) -> Option<&Narration> {
        self.narration.as_ref()
    }

    pub fn narration_mut(&mut self) -> Option<&mut Narration> {
        self.narration.as_mut()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pages::PageSequence;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    /// In-memory asset set: `(index, ext)` pairs plus page texts.
    #[derive(Default)]
    pub(crate) struct FakeAssets {
        pub files: HashSet<(usize, String)>,
        pub texts: std::collections::HashMap<usize, String>,
    }

    impl FakeAssets {
        pub fn with_images(count: usize) -> Self {
            let mut assets = Self::default();
            for i in 0..count {
                assets.files.insert((i, "jpg".to_string()));
            }
            assets
        }
    }

    impl AssetProbe for FakeAssets {
        fn locate(&self, index: usize, ext: &str) -> Option<PathBuf> {
            self.files
                .contains(&(index, ext.to_string()))
                .then(|| PathBuf::from(crate::assets::asset_name(index, ext)))
        }

        fn read_text(&self, index: usize) -> Option<String> {
            self.texts.get(&index).cloned()
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct RecordingTransport(pub Rc<RefCell<Vec<&'static str>>>);

    impl AudioTransport for RecordingTransport {
        fn load(&mut self, _path: &std::path::Path) {
            self.0.borrow_mut().push("load");
        }
        fn play(&mut self) {
            self.0.borrow_mut().push("play");
        }
        fn pause(&mut self) {
            self.0.borrow_mut().push("pause");
        }
        fn stop(&mut self) {
            self.0.borrow_mut().push("stop");
        }
    }

    fn open(
        assets: &FakeAssets,
        index: usize,
        autoplay: bool,
        rec: &RecordingTransport,
    ) -> StoryPage {
        let seq = PageSequence::probe(assets, "jpg");
        let options = PageOptions {
            autoplay,
            ..PageOptions::default()
        };
        let rec = rec.clone();
        StoryPage::open(seq.page(index).unwrap(), assets, &options, move || {
            Box::new(rec) as Box<dyn AudioTransport>
        })
    }

    #[test]
    fn cover_has_no_camera_text_or_audio() {
        let mut assets = FakeAssets::with_images(3);
        assets.files.insert((0, "mp3".to_string()));
        assets.texts.insert(0, "ignored".to_string());
        let rec = RecordingTransport::default();

        let page = open(&assets, 0, true, &rec);
        assert_eq!(page.kind(), PageKind::Cover);
        assert!(page.camera().is_none());
        assert!(page.narration().is_none());
        assert_eq!(page.text(), "");
        assert_eq!(page.image(), Some(std::path::Path::new("Story_0.jpg")));
        assert!(rec.0.borrow().is_empty());
    }

    #[test]
    fn panoramic_page_without_text_or_audio_degrades() {
        let assets = FakeAssets::with_images(3);
        let page = open(&assets, 2, true, &RecordingTransport::default());
        assert_eq!(page.kind(), PageKind::Panoramic);
        assert_eq!(page.text(), "");
        assert!(page.narration().is_none());
        assert_eq!(page.camera().unwrap().orientation(), OrbitCamera::new().orientation());
    }

    #[test]
    fn narration_starts_per_autoplay_setting() {
        let mut assets = FakeAssets::with_images(2);
        assets.files.insert((1, "mp3".to_string()));
        assets.texts.insert(1, "Once upon a time".to_string());

        let rec = RecordingTransport::default();
        let page = open(&assets, 1, true, &rec);
        assert_eq!(page.text(), "Once upon a time");
        assert!(page.narration().unwrap().is_playing());
        assert_eq!(*rec.0.borrow(), vec!["load", "play"]);

        let rec = RecordingTransport::default();
        let page = open(&assets, 1, false, &rec);
        assert!(!page.narration().unwrap().is_playing());
        assert_eq!(*rec.0.borrow(), vec!["load"]);
    }

    #[test]
    fn toggle_and_drop_drive_transport() {
        let mut assets = FakeAssets::with_images(2);
        assets.files.insert((1, "mp3".to_string()));
        let rec = RecordingTransport::default();

        let mut page = open(&assets, 1, true, &rec);
        let narration = page.narration_mut().unwrap();
        narration.toggle();
        assert!(!narration.is_playing());
        narration.toggle();
        assert!(narration.is_playing());
        drop(page);

        assert_eq!(*rec.0.borrow(), vec!["load", "play", "pause", "play", "stop"]);
    }

    #[test]
    fn silent_narration_is_not_audible() {
        let path = PathBuf::from("Story_1.mp3");
        let narration = Narration::new(path.clone(), true, Box::new(SilentTransport));
        assert!(narration.is_playing());
        assert!(!narration.is_audible());

        let narration = Narration::new(path, true, Box::new(RecordingTransport::default()));
        assert!(narration.is_audible());
    }
}
