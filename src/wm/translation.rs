use serde::Serialize;

use super::Title;

/// A single foreign-language equivalent decoded from a `{{t|...}}` template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub language_code: String,
    pub translation: String,
    /// False when the translation is a phrase made of individually linked words.
    pub is_equivalent_term: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal_translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl Translation {
    pub fn new(language_code: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            translation: translation.into(),
            is_equivalent_term: true,
            gender: None,
            script_code: None,
            transliteration: None,
            alternate_form: None,
            literal_translation: None,
            qualifier: None,
        }
    }
}

/// Translations listed under one sense of a headword, in markup order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationGroup {
    pub meaning: String,
    pub translations: Vec<Translation>,
}

impl TranslationGroup {
    pub fn new(meaning: impl Into<String>) -> Self {
        Self {
            meaning: meaning.into(),
            translations: Vec::new(),
        }
    }

    /// If any translation is in `language`, remove all translations in other languages.
    ///
    /// ```
    /// use yue_wiktparser::wm::{Translation, TranslationGroup};
    ///
    /// let mut group = TranslationGroup::new("far");
    /// group.translations.push(Translation::new("cmn", "远"));
    /// group.translations.push(Translation::new("yue", "遠"));
    /// group.retain_preferred("yue");
    /// assert_eq!(vec![Translation::new("yue", "遠")], group.translations);
    ///
    /// group.retain_preferred("nan");
    /// assert_eq!(1, group.translations.len());
    /// ```
    pub fn retain_preferred(&mut self, language: &str) {
        if self
            .translations
            .iter()
            .any(|t| t.language_code == language)
        {
            self.translations.retain(|t| t.language_code == language);
        }
    }
}

/// All translation groups recorded for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub title: Title,
    pub groups: Vec<TranslationGroup>,
}

impl Page {
    pub fn translation_count(&self) -> usize {
        self.groups.iter().map(|g| g.translations.len()).sum()
    }
}
