//! Parses wordlist rows (C10 facing API) and looks up the bundled
//! per-script wordlist for a multi-script scan.
//!
//! Row storage itself (brotli-compressed, lazily decompressed, one line
//! per entry) is handled by the `static-lang-word-lists` crate; this module
//! only adds the structured `string,script,lang,features...` row format on
//! top of it.

use static_lang_word_lists::WordList;

/// One parsed wordlist row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRow {
    pub string: String,
    pub script: Option<String>,
    pub language: Option<String>,
    pub features: Vec<String>,
}

impl WordRow {
    /// Parses a single line of `<string>[,<script>[,<language>[,<feature>...]]]`.
    ///
    /// A bare word with no commas is valid and parses with `script`/
    /// `language` both `None`.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split(',');
        let string = parts.next().unwrap_or_default().to_string();
        let script = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
        let language = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
        let features = parts.map(str::to_string).collect();
        WordRow { string, script, language, features }
    }
}

/// Parses every non-empty line of a bundled or user-supplied [`WordList`].
pub fn rows(word_list: &WordList) -> impl Iterator<Item = WordRow> + '_ {
    word_list.iter().map(|word| WordRow::parse(word.as_ref()))
}

/// Parses every non-empty line of a user-supplied wordlist file's contents
/// (the `--user-wordlist` CLI flag).
pub fn rows_from_str(contents: &str) -> impl Iterator<Item = WordRow> + '_ {
    contents.lines().filter(|line| !line.is_empty()).map(WordRow::parse)
}

/// Looks up the bundled wordlist for a Unicode `Script` long name (e.g.
/// `"Latin"`). A miss is logged and treated as a no-op, never an error.
#[must_use]
pub fn lookup(script: &str) -> Option<&'static WordList> {
    let found = static_lang_word_lists::LOOKUP_TABLE.get(script).copied();
    if found.is_none() {
        log::warn!("no bundled wordlist for script {script}");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::WordRow;

    #[test]
    fn parses_a_bare_word_with_no_commas() {
        let row = WordRow::parse("hello");
        assert_eq!(row.string, "hello");
        assert_eq!(row.script, None);
        assert_eq!(row.language, None);
        assert!(row.features.is_empty());
    }

    #[test]
    fn parses_script_and_language_without_features() {
        let row = WordRow::parse("salam,arab,ARA");
        assert_eq!(row.string, "salam");
        assert_eq!(row.script, Some("arab".to_string()));
        assert_eq!(row.language, Some("ARA".to_string()));
        assert!(row.features.is_empty());
    }

    #[test]
    fn parses_trailing_features() {
        let row = WordRow::parse("fi,latn,,liga,kern");
        assert_eq!(row.string, "fi");
        assert_eq!(row.script, Some("latn".to_string()));
        assert_eq!(row.language, None);
        assert_eq!(row.features, vec!["liga".to_string(), "kern".to_string()]);
    }

    #[test]
    fn empty_script_or_language_fields_parse_as_none() {
        let row = WordRow::parse("word,,");
        assert_eq!(row.script, None);
        assert_eq!(row.language, None);
    }
}
