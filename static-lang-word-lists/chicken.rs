// Generated by `cargo run -p xtask -- egg` from `data/diffenator/**`.
// Lists the word list files, relative to `data/`, that `build.rs` compresses
// into `OUT_DIR`.
static WORD_LISTS: &[&str] = &[
    "diffenator/Arabic.txt",
    "diffenator/Cyrillic.txt",
    "diffenator/Devanagari.txt",
    "diffenator/Greek.txt",
    "diffenator/Latin.txt",
];
