use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use msx::index::{
    build_index, load_document_array, load_index, load_meta, load_text, with_suffix,
    write_archive, Mode,
};
use msx::output::SequenceWriter;
use msx::query::QueryEngine;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "msx")]
#[command(about = "Matching statistics and pseudo-matching lengths over an r-index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Matching statistics (lengths and reference pointers)
    Ms,
    /// Pseudo-matching lengths
    Pml,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ms => Mode::Ms,
            ModeArg::Pml => Mode::Pml,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble builder artifacts into a serialized index archive
    Build {
        /// Reference prefix (the builder wrote <ref>.bwt*, <ref>.thrbv, ...)
        ref_prefix: PathBuf,

        /// Which statistic the archive will serve
        #[arg(short, long, value_enum, default_value = "ms")]
        mode: ModeArg,
    },
    /// Compute MS or PML for every read in a pattern file
    Run {
        /// Reference prefix of a previously built archive
        ref_prefix: PathBuf,

        /// Pattern file, one read per line
        #[arg(short, long)]
        patterns: PathBuf,

        /// Which statistic to compute
        #[arg(short, long, value_enum, default_value = "ms")]
        mode: ModeArg,

        /// Also emit document ids (requires <ref>.doc)
        #[arg(long)]
        docs: bool,

        /// Output prefix (defaults to the pattern file path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (defaults to all cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Show archive statistics
    Stats {
        /// Reference prefix of a previously built archive
        ref_prefix: PathBuf,

        /// Which archive to inspect
        #[arg(short, long, value_enum, default_value = "ms")]
        mode: ModeArg,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { ref_prefix, mode } => cmd_build(&ref_prefix, mode.into()),
        Commands::Run {
            ref_prefix,
            patterns,
            mode,
            docs,
            output,
            threads,
        } => cmd_run(&ref_prefix, &patterns, mode.into(), docs, output, threads),
        Commands::Stats { ref_prefix, mode } => cmd_stats(&ref_prefix, mode.into()),
    }
}

fn cmd_build(ref_prefix: &Path, mode: Mode) -> Result<()> {
    let start = Instant::now();
    let index = build_index(ref_prefix, mode)?;
    let path = write_archive(&index, ref_prefix)?;

    let n = index.text_len();
    let r = index.num_runs();
    println!("Text length:     n = {}", n);
    println!("BWT runs:        r = {}", r);
    println!("Rate:            n/r = {:.4}", n as f64 / r as f64);
    println!(
        "Archive written: {} ({:.2}s)",
        path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn cmd_run(
    ref_prefix: &Path,
    pattern_path: &Path,
    mode: Mode,
    use_docs: bool,
    output: Option<PathBuf>,
    threads: Option<usize>,
) -> Result<()> {
    if let Some(threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the worker pool")?;
    }

    let index = load_index(ref_prefix, mode)?;
    let doc_array = if use_docs {
        Some(load_document_array(ref_prefix, &index)?)
    } else {
        None
    };

    let engine = match &doc_array {
        Some(docs) => QueryEngine::with_documents(&index, docs),
        None => QueryEngine::new(&index),
    };

    let patterns = read_patterns(pattern_path)?;
    let out_prefix = output.unwrap_or_else(|| pattern_path.to_path_buf());
    let start = Instant::now();

    match mode {
        Mode::Ms => {
            let text = load_text(ref_prefix)?;
            let results: Vec<_> = patterns
                .par_iter()
                .map(|read| engine.matching_statistics(read, &text))
                .collect();

            let mut lengths_out = SequenceWriter::create(&with_suffix(&out_prefix, ".lengths"))?;
            let mut pointers_out =
                SequenceWriter::create(&with_suffix(&out_prefix, ".pointers"))?;
            let mut docs_out = open_doc_writer(use_docs, &out_prefix)?;

            for (k, out) in results.iter().enumerate() {
                let name = format!("read_{}", k);
                lengths_out.write_record(&name, &out.lengths)?;
                pointers_out.write_record(&name, &out.pointers)?;
                if let (Some(writer), Some(doc_ids)) = (docs_out.as_mut(), &out.doc_ids) {
                    writer.write_record(&name, doc_ids)?;
                }
            }
            lengths_out.finish()?;
            pointers_out.finish()?;
            if let Some(writer) = docs_out {
                writer.finish()?;
            }
        }
        Mode::Pml => {
            let results: Vec<_> = patterns
                .par_iter()
                .map(|read| engine.pseudo_matching_lengths(read))
                .collect();

            let mut lengths_out =
                SequenceWriter::create(&with_suffix(&out_prefix, ".pseudo_lengths"))?;
            let mut docs_out = open_doc_writer(use_docs, &out_prefix)?;

            for (k, out) in results.iter().enumerate() {
                let name = format!("read_{}", k);
                lengths_out.write_record(&name, &out.lengths)?;
                if let (Some(writer), Some(doc_ids)) = (docs_out.as_mut(), &out.doc_ids) {
                    writer.write_record(&name, doc_ids)?;
                }
            }
            lengths_out.finish()?;
            if let Some(writer) = docs_out {
                writer.finish()?;
            }
        }
    }

    println!(
        "Processed {} reads in {:.2}s",
        patterns.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn cmd_stats(ref_prefix: &Path, mode: Mode) -> Result<()> {
    let meta = load_meta(ref_prefix, mode)?;
    let index = load_index(ref_prefix, mode)?;

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Mode:            {:?}", meta.mode);
    println!("Text length:     {}", meta.text_len);
    println!("BWT runs:        {}", meta.num_runs);
    println!(
        "Rate:            n/r = {:.4}",
        meta.text_len as f64 / meta.num_runs as f64
    );
    println!();
    println!("Serialized component sizes (bytes):");
    for (name, bytes) in index.component_sizes() {
        println!("  {:20} {}", name, bytes);
    }
    Ok(())
}

fn open_doc_writer(use_docs: bool, out_prefix: &Path) -> Result<Option<SequenceWriter>> {
    if use_docs {
        Ok(Some(SequenceWriter::create(&with_suffix(
            out_prefix,
            ".doc_numbers",
        ))?))
    } else {
        Ok(None)
    }
}

/// Read a pattern file: one read per line, raw bytes, blank lines skipped.
fn read_patterns(path: &Path) -> Result<Vec<Vec<u8>>> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read pattern file {}", path.display()))?;
    if data.is_empty() {
        bail!("pattern file {} is empty", path.display());
    }

    let mut patterns = Vec::new();
    for line in data.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if !line.is_empty() {
            patterns.push(line.to_vec());
        }
    }
    Ok(patterns)
}
