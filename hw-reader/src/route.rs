//! View router: location fragment to view
//!
//! Fragment forms (leading `#` optional, query string after `?`):
//! - `` / `prayers` -> language list
//! - `prayers/<lang>[?page=N][&filter=unmatched]` -> prayers in a language
//! - `prayer/<version>` -> single prayer
//! - `prayercode/<code>[?page=N]` -> all versions sharing a phelps code
//! - `prayercode/<code>/<lang>` -> first version of a code in a language
//! - `search/prayers/<term>[?page=N]` -> search results
//! - `<AB1234X>` -> redirect to `prayercode/AB1234X`
//!
//! Anything else falls back to the language list.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Two letters, three to five digits, up to three letters
static SHORT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([A-Z]{2}\d{3,5}[A-Z]{0,3})$").expect("short code pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Languages,
    Language {
        lang: String,
        page: Option<u32>,
        unmatched: bool,
    },
    Prayer {
        version: String,
    },
    PrayerCode {
        code: String,
        page: Option<u32>,
    },
    PrayerCodeLanguage {
        code: String,
        lang: String,
    },
    Search {
        term: String,
        page: Option<u32>,
    },
    /// Navigate the browser to this fragment instead of rendering
    Redirect(String),
}

/// Recognized query parameters
#[derive(Debug, Default, PartialEq, Eq)]
struct QueryParams {
    page: Option<u32>,
    unmatched: bool,
}

impl QueryParams {
    fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(value);
            match key {
                "page" => params.page = value.trim().parse::<u32>().ok().filter(|p| *p > 0),
                "filter" => params.unmatched = value == "unmatched",
                _ => {}
            }
        }
        params
    }
}

/// Percent-decode a path segment; malformed input is kept as-is
fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

impl Route {
    pub fn parse(fragment: &str) -> Route {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let (path, query) = fragment.split_once('?').unwrap_or((fragment, ""));
        let params = QueryParams::parse(query);

        if let Some(term) = path.strip_prefix("search/prayers/") {
            return Route::Search {
                term: decode(term),
                page: params.page,
            };
        }

        if let Some(rest) = path.strip_prefix("prayercode/") {
            let mut segments = rest.split('/');
            let code = decode(segments.next().unwrap_or_default());
            let lang = segments.next().map(decode).unwrap_or_default();
            return match (code.is_empty(), lang.is_empty()) {
                (true, _) => Route::Languages,
                (false, false) => Route::PrayerCodeLanguage { code, lang },
                (false, true) => Route::PrayerCode {
                    code,
                    page: params.page,
                },
            };
        }

        if let Some(version) = path.strip_prefix("prayer/") {
            let version = decode(version);
            return if version.is_empty() {
                Route::Languages
            } else {
                Route::Prayer { version }
            };
        }

        if let Some(lang) = path.strip_prefix("prayers/") {
            let lang = decode(lang);
            return if lang.is_empty() {
                Route::Languages
            } else {
                Route::Language {
                    lang,
                    page: params.page,
                    unmatched: params.unmatched,
                }
            };
        }

        if let Some(captures) = SHORT_CODE.captures(path) {
            let code = captures[1].to_uppercase();
            let page = match params.page {
                Some(page) if page > 1 => format!("?page={page}"),
                _ => String::new(),
            };
            return Route::Redirect(format!("#prayercode/{code}{page}"));
        }

        Route::Languages
    }
}

/// Fragment for a language listing page
pub fn language_fragment(lang: &str, page: u32, unmatched: bool) -> String {
    let filter = if unmatched { "&filter=unmatched" } else { "" };
    format!("#prayers/{}?page={page}{filter}", urlencoding::encode(lang))
}

pub fn prayer_fragment(version: &str) -> String {
    format!("#prayer/{}", urlencoding::encode(version))
}

pub fn code_fragment(code: &str) -> String {
    format!("#prayercode/{}", urlencoding::encode(code))
}

pub fn code_language_fragment(code: &str, lang: &str) -> String {
    format!(
        "#prayercode/{}/{}",
        urlencoding::encode(code),
        urlencoding::encode(lang)
    )
}

pub fn search_fragment(term: &str) -> String {
    format!("#search/prayers/{}", urlencoding::encode(term))
}

/// Which listing a remembered page belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKey {
    Language { lang: String, unmatched: bool },
    Search(String),
    Code(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LanguagePage {
    page: u32,
    unmatched: bool,
}

/// Last page shown per language, search term and phelps code
#[derive(Debug, Default)]
pub struct PageMemory {
    languages: HashMap<String, LanguagePage>,
    searches: HashMap<String, u32>,
    codes: HashMap<String, u32>,
}

impl PageMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page to show: the explicit one, else the remembered one, else 1
    ///
    /// A remembered language page only applies when its filter flag matches.
    pub fn resume(&self, key: &PageKey, explicit: Option<u32>) -> u32 {
        if let Some(page) = explicit {
            return page;
        }
        let remembered = match key {
            PageKey::Language { lang, unmatched } => self
                .languages
                .get(lang)
                .filter(|state| state.unmatched == *unmatched)
                .map(|state| state.page),
            PageKey::Search(term) => self.searches.get(term).copied(),
            PageKey::Code(code) => self.codes.get(code).copied(),
        };
        remembered.unwrap_or(1)
    }

    pub fn remember(&mut self, key: PageKey, page: u32) {
        match key {
            PageKey::Language { lang, unmatched } => {
                self.languages.insert(lang, LanguagePage { page, unmatched });
            }
            PageKey::Search(term) => {
                self.searches.insert(term, page);
            }
            PageKey::Code(code) => {
                self.codes.insert(code, page);
            }
        }
    }

    /// Forget everything (visiting the language list)
    pub fn reset(&mut self) {
        self.languages.clear();
        self.searches.clear();
        self.codes.clear();
    }

    /// Link back to the last listing page seen for `lang`
    pub fn language_return_fragment(&self, lang: &str) -> String {
        match self.languages.get(lang) {
            Some(state) => language_fragment(lang, state.page, state.unmatched),
            None => language_fragment(lang, 1, false),
        }
    }
}
