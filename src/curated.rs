//! Hand-maintained word tables.

use crate::language::Language;

pub const ENGLISH_ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '\'',
];

pub const FRENCH_ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'à', 'â', 'æ', 'ç', 'é', 'è', 'ê', 'ë', 'î', 'ï',
    'ô', 'œ', 'ù', 'û', 'ü', 'ÿ', '\'', '-',
];

/// Pronouns, articles and determiners that mark a French context.
pub const FRENCH_FUNCTION_WORDS: &[&str] = &[
    "je", "j'", "tu", "il", "elle", "on", "nous", "vous", "ils", "elles", "le", "la", "les",
    "l'", "un", "une", "des", "du", "au", "aux", "ce", "cette", "ces", "mon", "ma", "mes",
    "ton", "ta", "tes", "son", "sa", "ses", "notre", "votre", "leur", "leurs", "c'est", "et",
    "est", "pas", "qui", "que",
];

/// Pronouns, articles and determiners that mark an English context.
pub const ENGLISH_FUNCTION_WORDS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "the", "an", "my", "your", "his", "her",
    "our", "their", "this", "that", "these", "those", "is", "are", "was", "were", "to", "of",
    "and", "i'm", "it's", "don't",
];

/// Everyday words that earn a bonus during fuzzy correction and swipe.
pub fn core_lexicon(language: Language) -> &'static [&'static str] {
    match language {
        Language::French => FRENCH_CORE,
        Language::English => ENGLISH_CORE,
    }
}

const FRENCH_CORE: &[&str] = &[
    "bonjour", "merci", "oui", "non", "avec", "pour", "dans", "mais", "très", "bien", "aussi",
    "toujours", "beaucoup", "maintenant", "demain", "aujourd'hui", "hier", "maison", "travail",
    "école", "être", "avoir", "faire", "aller", "venir", "vouloir", "pouvoir", "savoir", "voir",
    "parce", "quand", "comment", "pourquoi", "quelque", "chose", "temps", "jour", "soir",
    "matin", "semaine", "ça", "c'est", "j'ai", "d'accord", "salut", "bonsoir", "voilà",
];

const ENGLISH_CORE: &[&str] = &[
    "hello", "thanks", "thank", "please", "yes", "with", "about", "because", "would", "could",
    "should", "there", "their", "they're", "people", "really", "today", "tomorrow",
    "yesterday", "tonight", "morning", "evening", "weekend", "work", "home", "going", "know",
    "think", "want", "need", "like", "love", "good", "great", "time", "what", "when", "where",
    "which", "don't", "can't", "won't", "i'm", "it's", "that's", "okay", "sorry", "maybe",
];

/// Explicit `typo → correction` pairs, consulted before the fuzzy search.
pub fn typo_table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::French => FRENCH_TYPOS,
        Language::English => ENGLISH_TYPOS,
    }
}

const FRENCH_TYPOS: &[(&str, &str)] = &[
    ("jai", "j'ai"),
    ("cest", "c'est"),
    ("cetait", "c'était"),
    ("jsuis", "je suis"),
    ("daccord", "d'accord"),
    ("dacc", "d'accord"),
    ("bcp", "beaucoup"),
    ("tjrs", "toujours"),
    ("tjs", "toujours"),
    ("pcq", "parce que"),
    ("qqch", "quelque chose"),
    ("aujourdhui", "aujourd'hui"),
    ("ca", "ça"),
    ("lecole", "l'école"),
    ("jaime", "j'aime"),
    ("sil", "s'il"),
    ("quil", "qu'il"),
    ("nest", "n'est"),
];

const ENGLISH_TYPOS: &[(&str, &str)] = &[
    ("teh", "the"),
    ("adn", "and"),
    ("taht", "that"),
    ("thier", "their"),
    ("recieve", "receive"),
    ("becuase", "because"),
    ("beacuse", "because"),
    ("definately", "definitely"),
    ("seperate", "separate"),
    ("occured", "occurred"),
    ("untill", "until"),
    ("wierd", "weird"),
    ("dont", "don't"),
    ("cant", "can't"),
    ("wont", "won't"),
    ("didnt", "didn't"),
    ("doesnt", "doesn't"),
    ("isnt", "isn't"),
    ("im", "i'm"),
    ("ive", "i've"),
    ("youre", "you're"),
    ("thats", "that's"),
];

/// `(broken ending, repaired ending, penalty)` rules for inflectional suffixes.
pub fn suffix_rules(language: Language) -> &'static [(&'static str, &'static str, f32)] {
    match language {
        Language::French => FRENCH_SUFFIX_RULES,
        Language::English => ENGLISH_SUFFIX_RULES,
    }
}

const FRENCH_SUFFIX_RULES: &[(&str, &str, f32)] = &[
    ("emnt", "ement", 1.2),
    ("ement", "ements", 1.6),
    ("tino", "tion", 1.2),
    ("toin", "tion", 1.2),
    ("sion", "tion", 1.8),
    ("ez", "er", 1.6),
    ("er", "é", 1.6),
    ("é", "er", 1.6),
    ("ai", "ais", 1.8),
    ("ait", "ais", 1.8),
    ("ent", "ant", 1.8),
];

const ENGLISH_SUFFIX_RULES: &[(&str, &str, f32)] = &[
    ("ign", "ing", 1.2),
    ("nig", "ing", 1.2),
    ("in", "ing", 1.4),
    ("tino", "tion", 1.2),
    ("toin", "tion", 1.2),
    ("ley", "ly", 1.4),
    ("full", "ful", 1.4),
    ("ment", "ments", 1.8),
    ("d", "ed", 1.6),
    ("s", "es", 1.8),
];

/// Likely next words for a previous word, in preference order.
pub fn context_hints(language: Language, previous: &str) -> &'static [&'static str] {
    let table = match language {
        Language::French => FRENCH_CONTEXT_HINTS,
        Language::English => ENGLISH_CONTEXT_HINTS,
    };
    table
        .iter()
        .find(|(key, _)| *key == previous)
        .map(|(_, next)| *next)
        .unwrap_or(&[])
}

const FRENCH_CONTEXT_HINTS: &[(&str, &[&str])] = &[
    ("je", &["suis", "vais", "pense", "veux", "sais", "peux", "crois"]),
    ("tu", &["es", "as", "veux", "peux", "vas", "sais"]),
    ("il", &["est", "a", "y", "faut", "fait", "va"]),
    ("on", &["va", "est", "peut", "se", "fait"]),
    ("c'est", &["pas", "vrai", "bon", "ça", "bien"]),
    ("merci", &["beaucoup", "pour", "bien"]),
    ("à", &["demain", "bientôt", "plus", "tout"]),
    ("bonne", &["journée", "soirée", "nuit", "chance"]),
    ("très", &["bien", "bon", "content", "beau"]),
];

const ENGLISH_CONTEXT_HINTS: &[(&str, &[&str])] = &[
    ("i", &["am", "think", "have", "was", "will", "don't", "know"]),
    ("you", &["are", "can", "have", "know", "want"]),
    ("thank", &["you", "god"]),
    ("how", &["are", "is", "do", "much", "about"]),
    ("see", &["you", "it", "that"]),
    ("let", &["me", "us", "it"]),
    ("going", &["to", "on", "home"]),
    ("good", &["morning", "night", "luck", "job"]),
    ("on", &["the", "my", "it", "time"]),
];
