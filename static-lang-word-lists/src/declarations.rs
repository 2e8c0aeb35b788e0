//! Declarations of the bundled per-script word lists.
//!
//! Hand-authored (the codegen that would normally produce this file,
//! `xtask egg`, walks `data/diffenator/**` at development time; this is its
//! checked-in output for the bundled script set).

use std::{collections::HashMap, sync::LazyLock};

use crate::{WordList, WordListMetadata, wordlist};

wordlist! {
    ident: ARABIC,
    metadata: WordListMetadata::new("Arabic", Some("Arabic"), Some("ar")),
    bytes: include_bytes!(concat!(env!("OUT_DIR"), "/diffenator/Arabic.txt.br")),
    features_attr: #[cfg(feature = "diffenator")],
}

wordlist! {
    ident: CYRILLIC,
    metadata: WordListMetadata::new("Cyrillic", Some("Cyrillic"), Some("ru")),
    bytes: include_bytes!(concat!(env!("OUT_DIR"), "/diffenator/Cyrillic.txt.br")),
    features_attr: #[cfg(feature = "diffenator")],
}

wordlist! {
    ident: DEVANAGARI,
    metadata: WordListMetadata::new("Devanagari", Some("Devanagari"), Some("hi")),
    bytes: include_bytes!(concat!(env!("OUT_DIR"), "/diffenator/Devanagari.txt.br")),
    features_attr: #[cfg(feature = "diffenator")],
}

wordlist! {
    ident: GREEK,
    metadata: WordListMetadata::new("Greek", Some("Greek"), Some("el")),
    bytes: include_bytes!(concat!(env!("OUT_DIR"), "/diffenator/Greek.txt.br")),
    features_attr: #[cfg(feature = "diffenator")],
}

wordlist! {
    ident: LATIN,
    metadata: WordListMetadata::new("Latin", Some("Latin"), None),
    bytes: include_bytes!(concat!(env!("OUT_DIR"), "/diffenator/Latin.txt.br")),
    features_attr: #[cfg(feature = "diffenator")],
}

/// Every bundled word list, in declaration order.
#[cfg(feature = "diffenator")]
pub static ALL_WORD_LISTS: &[&WordList] =
    &[&ARABIC, &CYRILLIC, &DEVANAGARI, &GREEK, &LATIN];

/// Bundled word lists keyed by their Unicode `Script` long name (e.g.
/// `"Latin"`, `"Cyrillic"`), the form produced by a cmap script tally.
///
/// Used by the script-tally-driven word scan (see
/// [`fontdiff`](https://docs.rs/fontdiff)'s word-scan facade) to find the
/// bundled list for a script that appears often enough in a font's cmap to
/// be worth scanning.
#[cfg(feature = "diffenator")]
pub static LOOKUP_TABLE: LazyLock<HashMap<&'static str, &'static WordList>> =
    LazyLock::new(|| {
        ALL_WORD_LISTS
            .iter()
            .copied()
            .filter_map(|list| list.script().map(|script| (script, list)))
            .collect()
    });
