#![allow(missing_docs)]

mod fmt;

use std::{
    collections::HashSet,
    fs,
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use env_logger::Env;
use fontdiff::{Font, Matcher, diff_fonts::DiffFonts, utils};
use log::info;

use crate::fmt::write_report;

fn main() -> ExitCode {
    match _main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            eprintln!("{why}");
            ExitCode::FAILURE
        },
    }
}

// Default to debug logs on debug builds, info otherwise
#[cfg(debug_assertions)]
type FontdiffVerbosity = Verbosity<clap_verbosity_flag::DebugLevel>;
#[cfg(not(debug_assertions))]
type FontdiffVerbosity = Verbosity<clap_verbosity_flag::InfoLevel>;

#[derive(Debug, Parser)]
#[command(version, about)]
enum Cli {
    /// Compare two fonts and write an HTML report of where their rendered
    /// output differs
    Diff(DiffArgs),
}

#[derive(Debug, Parser)]
struct DiffArgs {
    /// The font to diff from
    before: PathBuf,

    /// The font to diff against
    after: PathBuf,

    /// Pin both fonts to this variation-coordinate location (`wght=400,wdth=100`)
    /// instead of letting the matcher pick one
    #[arg(long)]
    coords: Option<String>,

    /// Mean absolute per-channel pixel delta above which a word/glyph is
    /// reported as changed
    #[arg(long, default_value_t = 0.90)]
    threshold: f32,

    /// Em size used to rasterise words/glyphs for comparison
    #[arg(long = "font-size", default_value_t = 28.0)]
    font_size: f32,

    /// Skip the bundled-wordlist shaping regression scan
    #[arg(long = "no-words")]
    no_words: bool,

    /// Skip the structural font-table diff
    #[arg(long = "no-tables")]
    no_tables: bool,

    /// Run the word scan against an additional user-supplied wordlist file
    #[arg(long = "user-wordlist")]
    user_wordlist: Option<PathBuf>,

    /// Keep only report entries whose string matches this character-class
    /// regex (e.g. `n|t`, `\p{Latin}`)
    #[arg(long)]
    characters: Option<String>,

    /// Where to write the report bundle
    #[arg(short, long = "out", default_value = "out")]
    out_dir: PathBuf,

    #[command(flatten)]
    verbosity: FontdiffVerbosity,
}

fn _main() -> anyhow::Result<()> {
    let Cli::Diff(args) = Cli::parse();

    env_logger::builder()
        .filter_level(args.verbosity.into())
        .parse_env(Env::new().filter("FONTDIFF_LOG"))
        .init();

    let before_bytes = fs::read(&args.before).context("failed to read 'before' font file")?;
    let after_bytes = fs::read(&args.after).context("failed to read 'after' font file")?;

    let start = Instant::now();

    let mut before = Font::open(&before_bytes, "old").context("failed to load 'before' font")?;
    let mut after = Font::open(&after_bytes, "new").context("failed to load 'after' font")?;

    let coords = args
        .coords
        .as_deref()
        .map(|s| utils::parse_coords(s).context("invalid --coords value"))
        .transpose()?;

    let mut matcher = Matcher::new(&mut before, &mut after);
    matcher.diffenator(coords)?;
    let upm_ratio = matcher.upms();
    info!(
        "matched {} => {}",
        before.family_name(),
        after.family_name()
    );

    let mut diff = DiffFonts::new(&before, &after, args.threshold, args.font_size, upm_ratio);

    if !args.no_tables {
        diff.diff_tables()?;
    }
    if !args.no_words {
        diff.diff_words()?;
    }
    if let Some(path) = &args.user_wordlist {
        let contents = fs::read_to_string(path).context("failed to read --user-wordlist file")?;
        diff.diff_strings(&contents)?;
    }

    if let Some(pattern) = &args.characters {
        let universe: String = before
            .fontref()
            .charmap()
            .mappings()
            .chain(after.fontref().charmap().mappings())
            .filter_map(|(cp, _)| char::from_u32(cp))
            .collect();
        let kept = utils::filter_characters(&universe, pattern).context("invalid --characters regex")?;
        let keep_set: HashSet<char> = kept.chars().collect();
        diff.filter_characters(&keep_set);
    }

    fs::create_dir_all(&args.out_dir).context("failed to create output directory")?;
    write_report(diff.report(), &before, &after, &args.out_dir)?;

    info!("wrote report to {} in {:?}", args.out_dir.display(), start.elapsed());
    Ok(())
}
