// assets.rs - Story_<n>.<ext> 资源探测与定位

use std::path::PathBuf;

/// File stem shared by every story asset: `Story_<n>.<ext>`.
pub const ASSET_PREFIX: &str = "Story_";
pub const DEFAULT_IMAGE_EXT: &str = "jpg";
pub const TEXT_EXT: &str = "txt";
pub const AUDIO_EXT: &str = "mp3";

pub fn asset_name(index: usize, ext: &str) -> String {
    format!("{}{}.{}", ASSET_PREFIX, index, ext)
}

/// Answers whether `Story_<index>.<ext>` exists, and where.
pub trait AssetProbe {
    fn exists(&self, index: usize, ext: &str) -> bool {
        self.locate(index, ext).is_some()
    }

    fn locate(&self, index: usize, ext: &str) -> Option<PathBuf>;

    /// Narration text for a page. Missing or unreadable files are `None`.
    fn read_text(&self, index: usize) -> Option<String> {
        let path = self.locate(index, TEXT_EXT)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("could not read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// A directory holding the story assets side by side.
///
/// Extensions are matched case-insensitively (`Story_3.TXT` satisfies a
/// lookup for `txt`); an exact-case match is preferred when both exist.
#[derive(Debug, Clone)]
pub struct StoryDir {
    root: PathBuf,
}

impl StoryDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn scan_case_insensitive(&self, index: usize, ext: &str) -> Option<PathBuf> {
        let stem = format!("{}{}", ASSET_PREFIX, index);
        let entries = std::fs::read_dir(&self.root).ok()?;

        for entry in entries.flatten() {
            let path = entry.path();
            let stem_matches = path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str());
            let ext_matches = path
                .extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case(ext));

            if stem_matches && ext_matches && path.is_file() {
                return Some(path);
            }
        }
        None
    }
}

impl AssetProbe for StoryDir {
    fn locate(&self, index: usize, ext: &str) -> Option<PathBuf> {
        let exact = self.root.join(asset_name(index, ext));
        if exact.is_file() {
            return Some(exact);
        }
        self.scan_case_insensitive(index, ext)
    }
}

/// Find the story directory by searching:
/// 1) <exe_dir>/story
/// 2) ./story  (dev working dir)
pub fn find_default_story_dir() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("story");
            if p.is_dir() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("story");
    if p.is_dir() {
        return Some(p);
    }

    None
}
