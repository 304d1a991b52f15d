//! Borrowed view of the engine state handed to each lookup component.

use crate::dictionary::{DictionarySnapshot, LanguageAssets};
use crate::language::{Language, LanguageMode};
use crate::learning::LearningStore;
use crate::rejections::RejectedCorrections;

#[derive(Clone, Copy)]
pub struct LookupContext<'a> {
    pub snapshot: &'a DictionarySnapshot,
    pub mode: LanguageMode,
    pub learning: &'a LearningStore,
    pub rejections: &'a RejectedCorrections,
}

impl<'a> LookupContext<'a> {
    pub fn assets(&self, language: Language) -> &'a LanguageAssets {
        self.snapshot.get(language)
    }

    /// Assets of every language the mode allows.
    pub fn active(&self) -> impl Iterator<Item = &'a LanguageAssets> + 'a {
        let snapshot = self.snapshot;
        self.mode
            .languages()
            .iter()
            .map(move |&language| snapshot.get(language))
    }
}
