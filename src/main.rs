//! chartsmith - convert between Clone Hero charts and MIDI files.
//!
//! # Usage
//!
//! ```bash
//! chartsmith build song.mid --audio song.wav --meta song.json -o out/song
//! chartsmith export notes.chart -o notes.mid
//! chartsmith batch songs/ -o out/
//! ```

use anyhow::{bail, Context, Result};
use chartsmith::audio::WavAudioService;
use chartsmith::pipeline::{
    batch_build, build_song, export_chart, DefaultMetadataProvider, JsonMetadataProvider,
    MetadataProvider,
};
use std::path::PathBuf;

/// Parsed command line.
enum Command {
    /// Build a song directory from a MIDI file.
    Build {
        midi: PathBuf,
        audio: Option<PathBuf>,
        meta: Option<PathBuf>,
        out_dir: PathBuf,
    },
    /// Export a chart file to a MIDI file.
    Export { chart: PathBuf, out: PathBuf },
    /// Build every MIDI file under a directory.
    Batch { input: PathBuf, out_root: PathBuf },
}

fn print_usage(program: &str) {
    eprintln!("chartsmith - convert between Clone Hero charts and MIDI files");
    eprintln!();
    eprintln!("Usage: {} <COMMAND> [OPTIONS]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  build <song.mid>     Build notes.chart + song.ini from a MIDI file");
    eprintln!("      --audio PATH     WAV stream to copy into the song directory");
    eprintln!("      --meta PATH      JSON metadata sidecar");
    eprintln!("      -o, --out DIR    Output directory (default: song name)");
    eprintln!("  export <notes.chart> Convert a chart to a Standard MIDI File");
    eprintln!("      -o, --out PATH   Output file (default: chart name with .mid)");
    eprintln!("  batch <DIR>          Build every .mid under DIR (parallel)");
    eprintln!("      -o, --out DIR    Output root (default: output_songs)");
}

impl Command {
    /// Parses command-line arguments.
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let program = args.first().map(String::as_str).unwrap_or("chartsmith");

        let Some(command) = args.get(1) else {
            print_usage(program);
            std::process::exit(1);
        };
        if command == "--help" || command == "-h" {
            print_usage(program);
            std::process::exit(0);
        }

        let mut positional: Vec<PathBuf> = Vec::new();
        let mut audio: Option<PathBuf> = None;
        let mut meta: Option<PathBuf> = None;
        let mut out: Option<PathBuf> = None;

        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--audio" => {
                    i += 1;
                    let path = args.get(i).context("--audio requires a path argument")?;
                    audio = Some(PathBuf::from(path));
                }
                "--meta" => {
                    i += 1;
                    let path = args.get(i).context("--meta requires a path argument")?;
                    meta = Some(PathBuf::from(path));
                }
                "--out" | "-o" => {
                    i += 1;
                    let path = args.get(i).context("--out requires a path argument")?;
                    out = Some(PathBuf::from(path));
                }
                other if other.starts_with('-') => {
                    bail!("unknown option: {} (use --help for usage)", other)
                }
                other => positional.push(PathBuf::from(other)),
            }
            i += 1;
        }

        match command.as_str() {
            "build" => {
                let [midi] = positional.as_slice() else {
                    bail!("build expects exactly one MIDI file argument");
                };
                let out_dir = out.unwrap_or_else(|| {
                    midi.file_stem()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from("song"))
                });
                Ok(Command::Build {
                    midi: midi.clone(),
                    audio,
                    meta,
                    out_dir,
                })
            }
            "export" => {
                let [chart] = positional.as_slice() else {
                    bail!("export expects exactly one chart file argument");
                };
                let out = out.unwrap_or_else(|| chart.with_extension("mid"));
                Ok(Command::Export {
                    chart: chart.clone(),
                    out,
                })
            }
            "batch" => {
                let [input] = positional.as_slice() else {
                    bail!("batch expects exactly one directory argument");
                };
                Ok(Command::Batch {
                    input: input.clone(),
                    out_root: out.unwrap_or_else(|| PathBuf::from("output_songs")),
                })
            }
            other => bail!("unknown command: {} (use --help for usage)", other),
        }
    }
}

fn main() -> Result<()> {
    let command = Command::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match command {
        Command::Build {
            midi,
            audio,
            meta,
            out_dir,
        } => {
            let provider: Box<dyn MetadataProvider> = match meta {
                Some(path) => Box::new(JsonMetadataProvider::new(path)),
                None => Box::new(DefaultMetadataProvider),
            };
            let report = build_song(
                &midi,
                audio.as_deref(),
                &WavAudioService,
                provider.as_ref(),
                &out_dir,
            )?;
            for note in &report.dropped_notes {
                eprintln!("warning: {}", note);
            }
            println!("wrote {}", report.chart_path.display());
            println!("wrote {}", report.ini_path.display());
        }
        Command::Export { chart, out } => {
            export_chart(&chart, &out)?;
            println!("wrote {}", out.display());
        }
        Command::Batch { input, out_root } => {
            let entries = batch_build(&input, &out_root, &WavAudioService)?;
            let failed = entries.iter().filter(|e| e.result.is_err()).count();
            for entry in &entries {
                match &entry.result {
                    Ok(report) => println!("{} -> {}", entry.source.display(), report.chart_path.display()),
                    Err(e) => eprintln!("{}: failed: {:#}", entry.source.display(), e),
                }
            }
            println!("{} built, {} failed", entries.len() - failed, failed);
            if failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
