// config.rs - 命令行 / 环境变量配置
//
// Story directory selection:
// - CLI: --story-dir <path>
// - Env: STORYBOOK_DIR
// - Default: <exe_dir>/story, then ./story
//
// Language: --lang <code> or STORYBOOK_LANG, default en.

use crate::assets::DEFAULT_IMAGE_EXT;
use crate::page::PageOptions;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Clone, Parser)]
#[command(name = "panoramic_storybook", version, about = "Panoramic picture book viewer")]
pub struct Config {
    /// Directory holding Story_<n>.jpg / .txt / .mp3
    #[arg(long, env = "STORYBOOK_DIR")]
    pub story_dir: Option<PathBuf>,

    /// UI language (en, zh-Hans, zh-Hant, ja, ko, fr, ru, ar)
    #[arg(long, env = "STORYBOOK_LANG", default_value = DEFAULT_LANG)]
    pub lang: String,

    /// Extension of the page images
    #[arg(long, default_value = DEFAULT_IMAGE_EXT)]
    pub image_ext: String,

    /// Page count; skips probing for Story_<n> images
    #[arg(long)]
    pub pages: Option<usize>,

    /// Page to open first (0 is the cover)
    #[arg(long, default_value_t = 0)]
    pub start_page: usize,

    /// Start narration paused
    #[arg(long)]
    pub muted: bool,

    /// Disable vertical sync
    #[arg(long)]
    pub no_vsync: bool,
}

impl Config {
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            image_ext: self.image_ext.trim_start_matches('.').to_string(),
            autoplay: !self.muted,
        }
    }

    pub fn vsync(&self) -> bool {
        !self.no_vsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["panoramic_storybook"]).unwrap();
        assert_eq!(cfg.image_ext, "jpg");
        assert_eq!(cfg.start_page, 0);
        assert_eq!(cfg.pages, None);
        assert!(cfg.page_options().autoplay);
        assert!(cfg.vsync());
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "panoramic_storybook",
            "--story-dir",
            "/tmp/story",
            "--lang",
            "ja",
            "--image-ext",
            ".png",
            "--pages",
            "4",
            "--start-page",
            "2",
            "--muted",
            "--no-vsync",
        ])
        .unwrap();
        assert_eq!(cfg.story_dir, Some(PathBuf::from("/tmp/story")));
        assert_eq!(cfg.lang, "ja");
        assert_eq!(cfg.pages, Some(4));
        assert_eq!(cfg.start_page, 2);
        let options = cfg.page_options();
        assert_eq!(options.image_ext, "png");
        assert!(!options.autoplay);
        assert!(!cfg.vsync());
    }

    #[test]
    fn rejects_non_numeric_page_count() {
        assert!(Config::try_parse_from(["panoramic_storybook", "--pages", "many"]).is_err());
    }
}
