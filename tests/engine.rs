use std::fs;
use std::sync::Arc;

use ahash::AHashMap;
use bilingual_autocorrect::learning::{LearnedTable, LearningStore};
use bilingual_autocorrect::{
    AssetPaths, Config, DictionarySnapshot, FileStore, Language, LanguageAssets, LanguageMode,
    LearningConfig, MemoryStore, StateStore, SwipeTypingSession, TypingEngine,
};

fn assets(
    language: Language,
    words: &[(&str, u64)],
    bigrams: &[(&str, &str, u64)],
) -> LanguageAssets {
    let unigrams: AHashMap<String, u64> = words.iter().map(|(w, f)| (w.to_string(), *f)).collect();
    let bigrams: Vec<(String, String, u64)> = bigrams
        .iter()
        .map(|(p, c, f)| (p.to_string(), c.to_string(), *f))
        .collect();
    LanguageAssets::from_maps(language, &unigrams, &bigrams)
}

fn snapshot() -> DictionarySnapshot {
    DictionarySnapshot::new(
        assets(
            Language::French,
            &[("bonjour", 500), ("merci", 400), ("maison", 300)],
            &[],
        ),
        assets(
            Language::English,
            &[
                ("hello", 1000),
                ("help", 800),
                ("we", 9000),
                ("with", 8000),
                ("was", 7800),
                ("want", 700),
                ("will", 650),
                ("would", 600),
            ],
            &[
                ("i", "want", 4000),
                ("i", "will", 3900),
                ("i", "would", 3800),
                ("i", "was", 500),
            ],
        ),
    )
}

fn engine() -> TypingEngine {
    TypingEngine::new(&Config::default(), snapshot(), Box::new(MemoryStore::new()))
}

#[test]
fn test_bilingual_correction_uses_previous_word_hint() {
    let engine = engine();
    assert_eq!(engine.correct("helo", Some("I")), Some("hello".to_string()));
}

#[test]
fn test_prediction_examples() {
    let engine = engine();
    assert_eq!(engine.predict_words("w", None), vec!["we", "with", "was"]);
    assert_eq!(engine.predict_words("w", Some("i")), vec!["want", "will", "would"]);
}

#[test]
fn test_embedded_dictionaries() {
    let engine = TypingEngine::new(
        &Config::default(),
        DictionarySnapshot::embedded(),
        Box::new(MemoryStore::new()),
    );
    assert_eq!(engine.correct("helo", Some("I")), Some("hello".to_string()));
    assert_eq!(engine.predict_words("w", Some("i")), vec!["want", "will", "would"]);
    assert_eq!(engine.correct("bonjour", None), None);
}

fn engine_with_learned_bigram(previous: &str, word: &str, count: u32) -> TypingEngine {
    let mut store = MemoryStore::new();
    store
        .write(
            LearnedTable::Bigram.name(),
            &format!(r#"{{"{previous}|{word}": {count}}}"#),
        )
        .unwrap();
    TypingEngine::new(&Config::default(), snapshot(), Box::new(store))
}

#[test]
fn test_sentence_end_drops_context_predictions() {
    let engine = engine_with_learned_bigram("alpha", "would", 1_000_000);
    engine.commit_word("alpha");
    assert_eq!(engine.predict_words("w", Some("zzz"))[0], "would");

    engine.commit_word(".");
    assert!(engine.sentence().is_empty());
    assert_eq!(engine.predict_words("w", Some("zzz")), vec!["we", "with", "was"]);
}

#[test]
fn test_reset_sentence_drops_context_predictions() {
    let engine = engine_with_learned_bigram("alpha", "would", 1_000_000);
    engine.commit_word("alpha");
    assert_eq!(engine.predict_words("w", Some("zzz"))[0], "would");

    engine.reset_sentence();
    assert_eq!(engine.predict_words("w", Some("zzz")), vec!["we", "with", "was"]);
}

#[test]
fn test_rejected_twice_is_never_proposed_again() {
    let engine = engine();
    assert_eq!(engine.correct("helo", None), Some("hello".to_string()));

    engine.reject_correction("helo", "hello");
    assert_eq!(engine.correct("helo", None), Some("hello".to_string()));
    engine.reject_correction("helo", "hello");
    assert_ne!(engine.correct("helo", None), Some("hello".to_string()));

    assert!(engine.predict_words("he", None).contains(&"hello".to_string()));
    engine.reject_correction("he", "hello");
    engine.reject_correction("he", "hello");
    assert!(!engine.predict_words("he", None).contains(&"hello".to_string()));
}

#[test]
fn test_mode_restricts_lexicons() {
    let engine = engine();
    engine.set_mode(LanguageMode::FrenchOnly);
    assert_eq!(engine.correct("helo", None), None);
    assert!(engine.predict_words("w", None).is_empty());

    engine.set_mode(LanguageMode::EnglishOnly);
    assert_eq!(engine.mode(), LanguageMode::EnglishOnly);
    assert_eq!(engine.correct("helo", None), Some("hello".to_string()));
    assert_eq!(engine.correct("bonjuor", None), None);
}

#[test]
fn test_snapshot_swap_clears_caches() {
    let engine = TypingEngine::new(
        &Config::default(),
        DictionarySnapshot::empty(),
        Box::new(MemoryStore::new()),
    );
    assert_eq!(engine.correct("helo", None), None);
    engine.install_snapshot(snapshot());
    assert_eq!(engine.correct("helo", None), Some("hello".to_string()));
}

#[test]
fn test_background_asset_loading() {
    let dir = tempfile::tempdir().unwrap();
    let english = dir.path().join("en.txt");
    let french = dir.path().join("fr.txt");
    fs::write(&english, "1 kitten 500\n2 kitchen 400\n").unwrap();
    fs::write(&french, "chaton 300\n").unwrap();

    let engine = Arc::new(TypingEngine::new(
        &Config::default(),
        DictionarySnapshot::empty(),
        Box::new(MemoryStore::new()),
    ));
    let paths = AssetPaths {
        english_unigrams: Some(english),
        french_unigrams: Some(french),
        ..AssetPaths::default()
    };
    engine.load_assets_in_background(paths).join().unwrap();

    assert_eq!(engine.correct("kiten", None), Some("kitten".to_string()));
    assert_eq!(engine.correct("chatn", None), Some("chaton".to_string()));
}

#[test]
fn test_missing_asset_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AssetPaths {
        english_unigrams: Some(dir.path().join("missing.txt")),
        ..AssetPaths::default()
    };
    let snapshot = DictionarySnapshot::load(&paths);
    assert!(snapshot.get(Language::English).is_empty());
    assert!(!snapshot.get(Language::French).is_empty());

    let engine = TypingEngine::new(&Config::default(), snapshot, Box::new(MemoryStore::new()));
    engine.set_mode(LanguageMode::EnglishOnly);
    assert_eq!(engine.correct("helo", None), None);
    assert!(engine.predict_words("he", None).is_empty());
}

#[test]
fn test_swipe_resolution_and_learning() {
    let engine = engine();
    let session = SwipeTypingSession::from_tokens([
        ('h', 120),
        ('g', 20),
        ('e', 110),
        ('r', 10),
        ('k', 15),
        ('l', 140),
        ('o', 100),
    ]);
    let word = engine.resolve_swipe_path(&session);
    assert_eq!(word.as_deref(), Some("hello"));

    engine.commit_swipe("hello");
    assert_eq!(engine.sentence(), vec!["hello"]);

    let short = SwipeTypingSession::from_tokens([('h', 300)]);
    assert_eq!(engine.resolve_swipe_path(&short), None);
}

#[test]
fn test_learned_counters_roundtrip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());

    let mut learning = LearningStore::new(LearningConfig::default());
    learning.record_commit(None, None, "bonjour");
    learning.record_commit(None, Some("bonjour"), "tout");
    learning.record_commit(Some("bonjour"), Some("tout"), "le");
    learning.record_accepted_prediction(Some("bonjour"), Some("tout"), "le");
    learning.flush(&mut store).unwrap();

    let reloaded = LearningStore::load(LearningConfig::default(), &store);
    for table in LearnedTable::ALL {
        assert_eq!(reloaded.len(table), learning.len(table));
    }
    assert_eq!(reloaded.unigram("bonjour"), 1);
    assert_eq!(reloaded.bigram("bonjour", "tout"), 1);
    assert_eq!(reloaded.trigram("bonjour", "tout", "le"), 4);
    assert_eq!(reloaded.unigram("le"), 4);
}

#[test]
fn test_malformed_state_resets_only_that_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store
        .write(LearnedTable::Unigram.name(), r#"{"bonjour": 3}"#)
        .unwrap();
    store
        .write(LearnedTable::Bigram.name(), "not json at all")
        .unwrap();

    let learning = LearningStore::load(LearningConfig::default(), &store);
    assert_eq!(learning.unigram("bonjour"), 3);
    assert_eq!(learning.len(LearnedTable::Bigram), 0);
}

#[test]
fn test_engine_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let engine = TypingEngine::new(
            &Config::default(),
            snapshot(),
            Box::new(FileStore::new(dir.path())),
        );
        engine.commit_word("i");
        engine.commit_word("would");
        engine.reject_correction("helo", "hello");
        engine.reject_correction("helo", "hello");
        // Dropping the engine flushes.
    }

    let engine = TypingEngine::new(
        &Config::default(),
        snapshot(),
        Box::new(FileStore::new(dir.path())),
    );
    assert_ne!(engine.correct("helo", None), Some("hello".to_string()));
    for _ in 0..3 {
        engine.commit_word("i");
        engine.commit_word("would.");
    }
    assert_eq!(engine.predict_words("w", Some("i"))[0], "would");
}
