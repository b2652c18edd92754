// host.rs - 翻页宿主：持有当前页，按页面序列前后切换

use crate::assets::AssetProbe;
use crate::page::{AudioTransport, PageOptions, StoryPage};
use crate::pages::{Direction, PageError, PageSequence};

pub type TransportFactory = Box<dyn Fn() -> Box<dyn AudioTransport>>;

pub struct PageHost {
    probe: Box<dyn AssetProbe>,
    sequence: PageSequence,
    options: PageOptions,
    transport: TransportFactory,
    current: Option<StoryPage>,
}

impl PageHost {
    /// Opens the cover (page 0) unless the sequence is empty.
    pub fn new(
        probe: Box<dyn AssetProbe>,
        sequence: PageSequence,
        options: PageOptions,
        transport: TransportFactory,
    ) -> Self {
        let mut host = Self {
            probe,
            sequence,
            options,
            transport,
            current: None,
        };
        if host.sequence.is_empty() {
            log::warn!("story has no pages");
        } else {
            host.current = host.open(0).ok();
        }
        host
    }

    fn open(&self, index: usize) -> Result<StoryPage, PageError> {
        let page = self.sequence.page(index)?;
        Ok(StoryPage::open(page, self.probe.as_ref(), &self.options, || {
            (self.transport)()
        }))
    }

    pub fn sequence(&self) -> PageSequence {
        self.sequence
    }

    pub fn current(&self) -> Option<&StoryPage> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut StoryPage> {
        self.current.as_mut()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.as_ref().map(StoryPage::index)
    }

    fn neighbor(&self, direction: Direction) -> Result<usize, PageError> {
        match self.current_index() {
            Some(index) => self.sequence.neighbor(index, direction),
            None => Err(PageError::NoSuchPage {
                index: 0,
                direction,
            }),
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.neighbor(Direction::Previous).is_ok()
    }

    pub fn can_go_forward(&self) -> bool {
        self.neighbor(Direction::Next).is_ok()
    }

    /// Replace the current page with its neighbor. At a boundary the current
    /// page is left untouched.
    pub fn go_to(&mut self, direction: Direction) -> Result<usize, PageError> {
        let index = self.neighbor(direction)?;
        self.replace(index)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<usize, PageError> {
        self.sequence.page(index)?;
        self.replace(index)
    }

    fn replace(&mut self, index: usize) -> Result<usize, PageError> {
        // 先释放旧页（停止旁白、丢弃惯性），再构建新页
        self.current = None;
        self.current = Some(self.open(index)?);
        log::info!("page {}/{}", index + 1, self.sequence.total_pages());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::GestureEvent;
    use crate::page::tests::{FakeAssets, RecordingTransport};
    use crate::pages::PageKind;

    fn host_with(assets: FakeAssets, rec: &RecordingTransport) -> PageHost {
        let sequence = PageSequence::probe(&assets, "jpg");
        let rec = rec.clone();
        PageHost::new(
            Box::new(assets),
            sequence,
            PageOptions::default(),
            Box::new(move || Box::new(rec.clone()) as Box<dyn AudioTransport>),
        )
    }

    #[test]
    fn empty_story_is_navigable_nowhere() {
        let mut host = host_with(FakeAssets::default(), &RecordingTransport::default());
        assert!(host.current().is_none());
        assert!(!host.can_go_back());
        assert!(!host.can_go_forward());
        assert!(host.go_to(Direction::Next).is_err());
        assert!(host.go_to(Direction::Previous).is_err());
        assert!(host.jump_to(0).is_err());
    }

    #[test]
    fn starts_on_cover() {
        let host = host_with(FakeAssets::with_images(3), &RecordingTransport::default());
        let page = host.current().unwrap();
        assert_eq!(page.index(), 0);
        assert_eq!(page.kind(), PageKind::Cover);
        assert!(!host.can_go_back());
        assert!(host.can_go_forward());
    }

    #[test]
    fn walks_forward_and_back_within_bounds() {
        let mut host = host_with(FakeAssets::with_images(3), &RecordingTransport::default());

        assert_eq!(host.go_to(Direction::Next), Ok(1));
        assert_eq!(host.go_to(Direction::Next), Ok(2));
        assert!(!host.can_go_forward());
        assert_eq!(
            host.go_to(Direction::Next),
            Err(PageError::NoSuchPage {
                index: 2,
                direction: Direction::Next
            })
        );
        assert_eq!(host.current_index(), Some(2));

        assert_eq!(host.go_to(Direction::Previous), Ok(1));
        assert_eq!(host.go_to(Direction::Previous), Ok(0));
        assert!(host.go_to(Direction::Previous).is_err());
        assert_eq!(host.current_index(), Some(0));
    }

    #[test]
    fn single_page_story() {
        let mut host = host_with(FakeAssets::with_images(1), &RecordingTransport::default());
        assert_eq!(host.current_index(), Some(0));
        assert!(!host.can_go_back());
        assert!(!host.can_go_forward());
        assert!(host.go_to(Direction::Next).is_err());
    }

    #[test]
    fn each_page_gets_a_fresh_camera() {
        let mut host = host_with(FakeAssets::with_images(3), &RecordingTransport::default());
        host.go_to(Direction::Next).unwrap();

        let cam = host.current_mut().unwrap().camera_mut().unwrap();
        cam.apply(GestureEvent::PanChanged { dx: 50.0, dy: 30.0 });
        cam.apply(GestureEvent::PanEnded { velocity_x: 900.0 });
        assert!(cam.is_decelerating());

        host.go_to(Direction::Next).unwrap();
        host.go_to(Direction::Previous).unwrap();
        let cam = host.current().unwrap().camera().unwrap();
        assert_eq!(cam.yaw(), 0.0);
        assert_eq!(cam.pitch(), 0.0);
        assert!(!cam.is_decelerating());
    }

    #[test]
    fn leaving_a_page_stops_its_narration() {
        let mut assets = FakeAssets::with_images(3);
        assets.files.insert((1, "mp3".to_string()));
        let rec = RecordingTransport::default();
        let mut host = host_with(assets, &rec);

        host.go_to(Direction::Next).unwrap();
        assert_eq!(*rec.0.borrow(), vec!["load", "play"]);
        host.go_to(Direction::Next).unwrap();
        assert_eq!(*rec.0.borrow(), vec!["load", "play", "stop"]);
    }

    #[test]
    fn jump_to_validates_index() {
        let mut host = host_with(FakeAssets::with_images(4), &RecordingTransport::default());
        assert_eq!(host.jump_to(3), Ok(3));
        assert!(matches!(host.jump_to(4), Err(PageError::OutOfRange { .. })));
        assert_eq!(host.current_index(), Some(3));
    }
}
