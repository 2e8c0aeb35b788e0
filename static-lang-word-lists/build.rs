#![allow(missing_docs)]

use std::{
    env,
    fs,
    fs::{File, OpenOptions},
    io::Cursor,
    path::{Path, PathBuf},
    thread,
};

use brotli::enc::{
    BrotliEncoderParams, backward_references::BrotliEncoderMode,
};

// Provides WORD_LISTS: &[&str] for word list relative path, generated by
// `cargo run -p xtask -- egg` from `data/diffenator`.
include!("chicken.rs");

fn main() {
    println!("cargo::rerun-if-changed=data");
    println!("cargo::rerun-if-changed=chicken.rs");
    println!("cargo::rerun-if-changed=build.rs");

    let word_list_source_dir = PathBuf::from("data");

    // This speeds up debug builds significantly but still does a good job of
    // reducing size
    let compression_level = if env::var("PROFILE").as_deref() == Ok("debug") {
        8
    } else {
        11
    };

    thread::scope(|s| {
        let wordlist_source_dir = word_list_source_dir.as_path();
        WORD_LISTS.iter().copied().for_each(|rel_path| {
            s.spawn(move || {
                let bytes = get_a_file(rel_path, wordlist_source_dir);
                // Validate the bytes are UTF-8 now so we don't need to at
                // runtime
                str::from_utf8(&bytes)
                    .expect("word list should be valid UTF-8");
                compress(&bytes, rel_path, compression_level);
            });
        });
    });
}

fn get_a_file(path: &str, data_dir: &Path) -> Vec<u8> {
    let repo_path = data_dir.join(path);
    fs::read(&repo_path).unwrap_or_else(|err| {
        panic!(
            "failed to read local word list file {}: {err}",
            repo_path.display()
        );
    })
}

fn compress(
    bytes: &[u8],
    relative_path: &str,
    compression_level: u8,
) -> PathBuf {
    let br_path = out_dir_path(relative_path).with_extension("txt.br");
    let mut br_file = open_path(&br_path);

    let mut cursor = Cursor::new(bytes);
    brotli::BrotliCompress(&mut cursor, &mut br_file, &BrotliEncoderParams {
        mode: BrotliEncoderMode::BROTLI_MODE_TEXT,
        quality: compression_level as i32,
        size_hint: bytes.len(),
        ..Default::default()
    })
    .unwrap_or_else(|err| panic!("failed to compress {relative_path}: {err}"));

    br_path
}

fn out_dir_path(name: &str) -> PathBuf {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    PathBuf::from(out_dir).join(name)
}

fn open_path(path: &Path) -> File {
    let Some(parent) = path.parent() else {
        unreachable!(
            "open_path will always be called on a file with a parent directory"
        );
    };
    fs::create_dir_all(parent).expect("failed to create parent directories");
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .unwrap_or_else(|err| {
            panic!("unable to open output file {}: {err}", path.display())
        })
}
