//! Regenerates `static-lang-word-lists`' `src/declarations.rs` and
//! `chicken.rs` from the word lists under `static-lang-word-lists/data`.
//!
//! Each `data/<set>/<Script>.txt` with a sibling `<Script>.toml` metadata
//! file becomes one `wordlist!` declaration, keyed by `<SCREAMING_SNAKE>`
//! (derived from the file stem).

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use heck::ToShoutySnakeCase;
use pico_args::Arguments;
use proc_macro2::TokenStream;
use quote::quote;
use serde::Deserialize;
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
    script: Option<String>,
    language: Option<String>,
}

struct Entry {
    ident: String,
    relative_path: String,
    metadata: Metadata,
}

pub fn main(mut args: Arguments) -> Result<()> {
    let crate_root = args
        .opt_value_from_str::<_, String>("--crate-root")?
        .unwrap_or_else(|| "static-lang-word-lists".to_string());
    let crate_root = Path::new(&crate_root);
    let data_dir = crate_root.join("data");

    let mut entries = collect_entries(&data_dir)?;
    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let declarations = render_declarations(&entries);
    let declarations_path = crate_root.join("src/declarations.rs");
    fs::write(&declarations_path, declarations).with_context(|| {
        format!("failed to write {}", declarations_path.display())
    })?;

    let chicken = render_chicken(&entries);
    let chicken_path = crate_root.join("chicken.rs");
    fs::write(&chicken_path, chicken)
        .with_context(|| format!("failed to write {}", chicken_path.display()))?;

    Ok(())
}

fn collect_entries(data_dir: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(data_dir) {
        let entry = entry?;
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("txt") {
            continue;
        }

        let toml_path = entry.path().with_extension("toml");
        if !toml_path.exists() {
            bail!(
                "word list {} has no sibling metadata file {}",
                entry.path().display(),
                toml_path.display()
            );
        }
        let metadata_src = fs::read_to_string(&toml_path)
            .with_context(|| format!("reading {}", toml_path.display()))?;
        let metadata: Metadata = toml::from_str(&metadata_src)
            .with_context(|| format!("parsing {}", toml_path.display()))?;

        let stem = entry
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("word_list");
        let ident = stem.to_shouty_snake_case();

        let relative_path = entry
            .path()
            .strip_prefix(data_dir)?
            .to_string_lossy()
            .replace('\\', "/");

        entries.push(Entry {
            ident,
            relative_path,
            metadata,
        });
    }
    Ok(entries)
}

fn render_declarations(entries: &[Entry]) -> String {
    let mut declarations = TokenStream::new();
    let mut idents = Vec::new();

    for entry in entries {
        let ident = quote::format_ident!("{}", entry.ident);
        idents.push(ident.clone());

        let name = &entry.metadata.name;
        let script = option_tokens(entry.metadata.script.as_deref());
        let language = option_tokens(entry.metadata.language.as_deref());
        let br_path = format!("/{}.br", entry.relative_path);

        declarations.extend(quote! {
            wordlist! {
                ident: #ident,
                metadata: WordListMetadata::new(#name, #script, #language),
                bytes: include_bytes!(concat!(env!("OUT_DIR"), #br_path)),
                features_attr: #[cfg(feature = "diffenator")],
            }
        });
    }

    let file: syn::File = syn::parse2(quote! {
        //! Declarations of the bundled per-script word lists.
        //!
        //! Generated by `cargo run -p xtask -- egg` from
        //! `static-lang-word-lists/data/**`. Do not edit by hand.

        use std::{collections::HashMap, sync::LazyLock};

        use crate::{WordList, WordListMetadata, wordlist};

        #declarations

        /// Every bundled word list, in declaration order.
        #[cfg(feature = "diffenator")]
        pub static ALL_WORD_LISTS: &[&WordList] = &[#(&#idents),*];

        /// Bundled word lists keyed by their Unicode `Script` long name.
        #[cfg(feature = "diffenator")]
        pub static LOOKUP_TABLE: LazyLock<HashMap<&'static str, &'static WordList>> =
            LazyLock::new(|| {
                ALL_WORD_LISTS
                    .iter()
                    .copied()
                    .filter_map(|list| list.script().map(|script| (script, list)))
                    .collect()
            });
    })
    .expect("generated declarations should be valid Rust");

    prettyplease::unparse(&file)
}

fn render_chicken(entries: &[Entry]) -> String {
    let mut out = String::from(
        "// Generated by `cargo run -p xtask -- egg` from `data/**`.\n\
         static WORD_LISTS: &[&str] = &[\n",
    );
    for entry in entries {
        out.push_str(&format!("    {:?},\n", entry.relative_path));
    }
    out.push_str("];\n");
    out
}

fn option_tokens(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => quote! { Some(#value) },
        None => quote! { None },
    }
}
