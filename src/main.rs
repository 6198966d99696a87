// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, Context, Result};
use harmonia::config::EngineConfig;
use harmonia::music::interval::parse_formula;
use harmonia::music::symbol::find_chord_symbol;
use harmonia::music::voicing::{find_nearest_chord, spread_voicing_with};
use harmonia::music::{Chord, Harmonic, Key, MidiNote, NearestChordOptions, Note, Scale};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;

fn print_usage() {
    println!("harmonia - Music Theory Engine");
    println!();
    println!("Usage: harmonia [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --scale <ROOT> <TYPE>             Spell a scale (e.g. --scale G# minor)");
    println!("  --chord <NAME>                    Spell a chord (e.g. --chord Am7)");
    println!("  --identify \"<INTERVALS>\"          Name a chord from intervals (e.g. \"1P 3m 5P 7m\")");
    println!("  --key <ROOT> <MODE> [SEED]        Show a key's modes and diatonic chords");
    println!("  --nearest \"<MIDI>\" \"<NOTES>\"      Voice-lead pitch classes to a MIDI chord");
    println!("  --spread \"<MIDI>\" <MIN>           Spread a MIDI chord to a minimum spacing");
    println!("  --config <FILE> [SEED]            Show the key or custom scale a config file describes");
    println!("  --help                            Show this help message");
}

fn print_harmonic(label: &str, item: &impl Harmonic) {
    println!("{}", label);
    println!("  Notes:   {}", item.pitches().join(" "));
    println!(
        "  MIDI:    {}",
        item.midi().iter().map(|m| m.to_string()).collect::<Vec<_>>().join(" ")
    );
    println!(
        "  Freqs:   {}",
        item.freqs().iter().map(|f| format!("{:.2}", f)).collect::<Vec<_>>().join(" ")
    );
}

fn show_scale(root: &str, scale_type: &str) -> Result<()> {
    let scale = Scale::parse(root, scale_type)
        .with_context(|| format!("Failed to build scale {} {}", root, scale_type))?;
    print_harmonic(&format!("{} ({})", scale, scale.formula()), &scale);
    Ok(())
}

fn show_chord(name: &str) -> Result<()> {
    let chord = Chord::from_name(name).with_context(|| format!("Failed to build chord {}", name))?;
    print_harmonic(&format!("{} ({})", chord, chord.formula()), &chord);
    Ok(())
}

fn identify(formula: &str) -> Result<()> {
    let intervals = parse_formula(formula).context("Failed to parse interval formula")?;
    match find_chord_symbol(&intervals)? {
        Some(symbol) => println!("{}", symbol),
        None => println!("No chord symbol fits {}", formula),
    }
    Ok(())
}

fn show_key(key: &Key, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    print_harmonic(&format!("{} (position {})", key, key.mode_position_roman()), key);
    println!();
    println!("Modes:");
    for mode in key.modes() {
        let chord = key.chord_at(mode.degree, &mut rng)?;
        println!(
            "  {:<4} {:<3} {:<11} {}",
            mode.degree.roman(),
            mode.root.name(),
            mode.mode.name(),
            chord
        );
    }
    Ok(())
}

fn parse_midi_list(list: &str) -> Result<Vec<MidiNote>> {
    list.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let midi: i32 = s.parse().map_err(|_| anyhow!("Invalid MIDI note: {}", s))?;
            Ok(Note::from_midi(midi)?.midi())
        })
        .collect()
}

fn format_midi(notes: &[MidiNote]) -> String {
    notes.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(" ")
}

fn require<'a>(args: &'a [String], index: usize, message: &str) -> &'a str {
    match args.get(index) {
        Some(arg) => arg,
        None => {
            eprintln!("Error: {}", message);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_seed(args: &[String], index: usize) -> Result<u64> {
    match args.get(index) {
        Some(seed) => seed.parse().map_err(|_| anyhow!("Invalid seed: {}", seed)),
        None => Ok(0),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("harmonia - Music Theory Engine");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--scale" => {
            let root = require(&args, 2, "--scale requires a root note");
            let scale_type = require(&args, 3, "--scale requires a scale type");
            show_scale(root, scale_type)?;
        }
        "--chord" => {
            show_chord(require(&args, 2, "--chord requires a chord name"))?;
        }
        "--identify" => {
            identify(require(&args, 2, "--identify requires an interval formula"))?;
        }
        "--key" => {
            let root = require(&args, 2, "--key requires a root note");
            let mode = require(&args, 3, "--key requires a mode");
            let key = Key::parse(root, mode).with_context(|| format!("Failed to build key {} {}", root, mode))?;
            show_key(&key, parse_seed(&args, 4)?)?;
        }
        "--nearest" => {
            let base = parse_midi_list(require(&args, 2, "--nearest requires a base MIDI chord"))?;
            let targets: Vec<&str> = require(&args, 3, "--nearest requires target notes")
                .split_whitespace()
                .collect();
            let options = NearestChordOptions {
                sort: true,
                ..Default::default()
            };
            println!("{}", format_midi(&find_nearest_chord(&base, &targets, options)?));
        }
        "--spread" => {
            let chord = parse_midi_list(require(&args, 2, "--spread requires a MIDI chord"))?;
            let min = require(&args, 3, "--spread requires a minimum distance");
            let min: u8 = min.parse().map_err(|_| anyhow!("Invalid distance: {}", min))?;
            let config = EngineConfig::default();
            println!("{}", format_midi(&spread_voicing_with(&chord, min, &config.limits)?));
        }
        "--config" => {
            let path = require(&args, 2, "--config requires a file path");
            let config = EngineConfig::load(path)?;
            let scale = config.build_scale()?;
            if Key::is_mode(&scale.formula()) {
                let key = Key::from_config(&config).context("Failed to build key from config")?;
                show_key(&key, parse_seed(&args, 3)?)?;
            } else {
                print_harmonic(&format!("{} ({})", scale, scale.formula()), &scale);
            }
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
