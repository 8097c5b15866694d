//! User-facing strings, Turkish first with an English fallback set.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Tr,
    En,
}

impl Lang {
    pub fn parse(code: &str) -> Option<Lang> {
        match code.trim().to_ascii_lowercase().as_str() {
            "tr" => Some(Lang::Tr),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::Tr => "tr",
            Lang::En => "en",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Messages {
    lang: Lang,
}

impl Messages {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn results_found(&self, count: usize) -> String {
        match self.lang {
            Lang::Tr => format!("{count} sonuç bulundu"),
            Lang::En => format!("{count} results found"),
        }
    }

    pub fn no_results(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "Sonuç bulunamadı",
            Lang::En => "No results found",
        }
    }

    pub fn loading_results(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "Sonuçlar yükleniyor...",
            Lang::En => "Loading results...",
        }
    }

    pub fn category_loading(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "Yükleniyor...",
            Lang::En => "Loading...",
        }
    }

    pub fn category_load_failed(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "Yüklenemedi.",
            Lang::En => "Failed to load.",
        }
    }

    pub fn links_load_failed(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "Bağlantılar yüklenemedi.",
            Lang::En => "Failed to load links.",
        }
    }

    pub fn search_placeholder(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "İsim veya içerik ara...",
            Lang::En => "Search by name or content...",
        }
    }

    pub fn official_source(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "Resmi kaynak",
            Lang::En => "Official source",
        }
    }

    pub fn favorites_title(&self) -> &'static str {
        match self.lang {
            Lang::Tr => "Favorilerim",
            Lang::En => "My Favorites",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turkish_is_the_default() {
        let messages = Messages::default();
        assert_eq!(messages.lang(), Lang::Tr);
        assert_eq!(messages.results_found(3), "3 sonuç bulundu");
        assert_eq!(messages.no_results(), "Sonuç bulunamadı");
    }

    #[test]
    fn unknown_language_codes_are_rejected() {
        assert_eq!(Lang::parse("EN"), Some(Lang::En));
        assert_eq!(Lang::parse(" tr "), Some(Lang::Tr));
        assert_eq!(Lang::parse("de"), None);
    }
}
