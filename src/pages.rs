// pages.rs - 页面序列：页数探测与前后翻页

use crate::assets::AssetProbe;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Index 0: flat cover image, no panorama, audio or text.
    Cover,
    Panoramic,
}

impl PageKind {
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            PageKind::Cover
        } else {
            PageKind::Panoramic
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub total_pages: usize,
    pub kind: PageKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("no page {direction:?} of page {index}")]
    NoSuchPage { index: usize, direction: Direction },
    #[error("page {index} is out of range (total {total_pages})")]
    OutOfRange { index: usize, total_pages: usize },
}

/// How many pages the story has, fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSequence {
    total_pages: usize,
}

impl PageSequence {
    /// Probe `Story_0.<ext>`, `Story_1.<ext>`, ... until the first missing
    /// image. Performs exactly `total_pages + 1` existence checks.
    pub fn probe(probe: &dyn AssetProbe, image_ext: &str) -> Self {
        let total_pages = compute_total_pages(probe, image_ext);
        log::info!("story has {} page(s) ({} images)", total_pages, image_ext);
        Self { total_pages }
    }

    /// Explicit page count from configuration; no probing.
    pub fn from_manifest(total_pages: usize) -> Self {
        Self { total_pages }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.total_pages == 0
    }

    pub fn neighbor(&self, index: usize, direction: Direction) -> Result<usize, PageError> {
        let found = match direction {
            Direction::Previous => index.checked_sub(1).filter(|i| *i < self.total_pages),
            Direction::Next => index.checked_add(1).filter(|next| *next < self.total_pages),
        };
        found.ok_or(PageError::NoSuchPage { index, direction })
    }

    pub fn page(&self, index: usize) -> Result<Page, PageError> {
        if index >= self.total_pages {
            return Err(PageError::OutOfRange {
                index,
                total_pages: self.total_pages,
            });
        }
        Ok(Page {
            index,
            total_pages: self.total_pages,
            kind: PageKind::for_index(index),
        })
    }
}

pub fn compute_total_pages(probe: &dyn AssetProbe, image_ext: &str) -> usize {
    let mut index = 0;
    while probe.exists(index, image_ext) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    /// Reports images 0..present as existing and counts every check.
    struct CountingProbe {
        present: usize,
        checks: Cell<usize>,
    }

    impl CountingProbe {
        fn new(present: usize) -> Self {
            Self {
                present,
                checks: Cell::new(0),
            }
        }
    }

    impl AssetProbe for CountingProbe {
        fn locate(&self, index: usize, ext: &str) -> Option<PathBuf> {
            self.checks.set(self.checks.get() + 1);
            (ext == "jpg" && index < self.present)
                .then(|| PathBuf::from(crate::assets::asset_name(index, ext)))
        }
    }

    #[test]
    fn five_images_give_five_pages_with_six_checks() {
        let probe = CountingProbe::new(5);
        assert_eq!(compute_total_pages(&probe, "jpg"), 5);
        assert_eq!(probe.checks.get(), 6);
    }

    #[test]
    fn missing_cover_gives_empty_sequence() {
        let probe = CountingProbe::new(0);
        let seq = PageSequence::probe(&probe, "jpg");
        assert!(seq.is_empty());
        assert_eq!(probe.checks.get(), 1);
        assert!(seq.neighbor(0, Direction::Next).is_err());
        assert!(seq.neighbor(0, Direction::Previous).is_err());
    }

    #[test]
    fn probe_uses_requested_extension() {
        let probe = CountingProbe::new(3);
        assert_eq!(compute_total_pages(&probe, "png"), 0);
    }

    #[test]
    fn neighbors_stay_in_range() {
        let seq = PageSequence::from_manifest(5);
        assert_eq!(
            seq.neighbor(0, Direction::Previous),
            Err(PageError::NoSuchPage {
                index: 0,
                direction: Direction::Previous
            })
        );
        assert!(matches!(
            seq.neighbor(4, Direction::Next),
            Err(PageError::NoSuchPage { index: 4, .. })
        ));
        for i in 1..5 {
            assert_eq!(seq.neighbor(i, Direction::Previous), Ok(i - 1));
        }
        for i in 0..4 {
            assert_eq!(seq.neighbor(i, Direction::Next), Ok(i + 1));
        }
    }

    #[test]
    fn single_page_has_no_neighbors() {
        let seq = PageSequence::from_manifest(1);
        assert!(seq.neighbor(0, Direction::Previous).is_err());
        assert!(seq.neighbor(0, Direction::Next).is_err());
    }

    #[test]
    fn out_of_range_index_has_no_neighbors() {
        let seq = PageSequence::from_manifest(3);
        assert!(seq.neighbor(usize::MAX, Direction::Next).is_err());
        assert!(seq.neighbor(7, Direction::Previous).is_err());
    }

    #[test]
    fn page_descriptors_mark_cover() {
        let seq = PageSequence::from_manifest(3);
        assert_eq!(seq.page(0).unwrap().kind, PageKind::Cover);
        assert_eq!(
            seq.page(2).unwrap(),
            Page {
                index: 2,
                total_pages: 3,
                kind: PageKind::Panoramic
            }
        );
        assert!(seq.page(3).is_err());
    }
}
