//! Bilingual (French/English) typing intelligence for a soft keyboard.
//!
//! The engine turns a noisy word into a correction, a partial word plus
//! context into ranked completions, and a tokenized swipe path into a word.
//!
//! # Modules
//!
//! - `text`, `distance`: normalization, folding and bounded edit distance
//! - `trie`, `lexicon`, `model`, `dictionary`: immutable per-language assets
//! - `learning`, `rejections`, `persistence`: what the user taught the engine
//! - `autocorrect`, `fuzzy`, `predictor`, `swipe`: the lookup paths
//! - `engine`: [`TypingEngine`], the public entry point
//!
//! ```no_run
//! use bilingual_autocorrect::{Config, TypingEngine};
//!
//! let engine = TypingEngine::from_config(&Config::default());
//! assert_eq!(engine.correct("helo", Some("I")).as_deref(), Some("hello"));
//! let next = engine.predict_words("w", Some("i"));
//! ```

pub mod autocorrect;
pub mod cache;
pub mod config;
pub mod context;
pub mod curated;
pub mod dictionary;
pub mod distance;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod language;
pub mod learning;
pub mod lexicon;
pub mod model;
pub mod persistence;
pub mod predictor;
pub mod rejections;
pub mod swipe;
pub mod text;
pub mod trie;

pub use config::Config;
pub use dictionary::{AssetPaths, DictionarySnapshot, LanguageAssets};
pub use engine::TypingEngine;
pub use error::{AssetError, StoreError};
pub use language::{Language, LanguageHint, LanguageMode};
pub use learning::LearningConfig;
pub use persistence::{FileStore, MemoryStore, StateStore};
pub use swipe::{SwipeConfig, SwipeTypingSession, SwipeWeights};
