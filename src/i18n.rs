// i18n.rs - 运行时界面文字
//
// Strings live in either:
//   A) assets/i18n/<lang>.json              { "key": "value" }
//   B) assets/i18n.json                     { "<lang>": { "key": "value" } }
// The bundled copy of (B) is compiled in and used when neither is found
// next to the executable or in the working directory.
// Lookup order: selected lang -> en -> key itself.

use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

const FALLBACK_LANG: &str = "en";
const BUNDLED: &str = include_str!("../assets/i18n.json");

/// Languages offered in the Language menu: (code, native name).
pub const LANGUAGES: [(&str, &str); 8] = [
    ("en", "English"),
    ("zh-Hans", "简体中文"),
    ("zh-Hant", "繁體中文"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("fr", "Français"),
    ("ru", "Русский"),
    ("ar", "العربية"),
];

type Table = HashMap<String, String>;

#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
struct Bundle(HashMap<String, Table>);

#[derive(Debug, Clone)]
pub struct I18n {
    pub lang: String,
    map: Table,
    fallback_map: Table,
}

impl I18n {
    pub fn load(lang: &str) -> Self {
        let map = load_lang(lang);
        let fallback_map = if lang == FALLBACK_LANG {
            map.clone()
        } else {
            load_lang(FALLBACK_LANG)
        };
        Self {
            lang: lang.to_string(),
            map,
            fallback_map,
        }
    }

    pub fn get(&self, key: &str) -> String {
        self.map
            .get(key)
            .or_else(|| self.fallback_map.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn load_table(path: &Path) -> Option<Table> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(t) => Some(t),
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

fn load_bundle_entry(text: &str, lang: &str) -> Option<Table> {
    let Bundle(mut all) = serde_json::from_str(text).ok()?;
    all.remove(lang)
}

/// Look for `rel` under <exe_dir>/assets, then ./assets.
fn find_asset(rel: &Path) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::from(".")))
        .map(|dir| dir.join("assets").join(rel))
        .find(|p| p.exists())
}

fn load_lang(lang: &str) -> Table {
    let per_lang = Path::new("i18n").join(format!("{}.json", lang));
    if let Some(t) = find_asset(&per_lang).and_then(|p| load_table(&p)) {
        return t;
    }

    if let Some(p) = find_asset(Path::new("i18n.json")) {
        if let Some(t) = std::fs::read_to_string(&p)
            .ok()
            .and_then(|text| load_bundle_entry(&text, lang))
        {
            return t;
        }
    }

    load_bundle_entry(BUNDLED, lang).unwrap_or_default()
}

/// Initialize global i18n. Later calls switch language.
pub fn init(lang: &str) {
    let i = I18n::load(lang);
    log::debug!("ui language {} ({} strings)", i.lang, i.map.len());

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

/// Localized text by key; the key itself when missing.
pub fn tr(key: &str) -> String {
    match I18N.get().and_then(|l| l.read().ok()) {
        Some(i) => i.get(key),
        None => key.to_string(),
    }
}

/// Localized text with `{name}` placeholders substituted.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        s = s.replace(&format!("{{{}}}", k), v);
    }
    s
}
