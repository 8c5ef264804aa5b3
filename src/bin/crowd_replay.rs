use qcrowd::classifier::PanicDebounce;
use qcrowd::error::Error;
use qcrowd::{BehaviorEngine, EngineConfig, Frame};
use std::io::BufRead;

const USAGE: &str =
    "usage: crowd_replay <tracks file> [config.json] [panic threshold] [debounce frames]";
const DEFAULT_DEBOUNCE_FRAMES: u32 = 3;

fn parse_arg<T: std::str::FromStr>(arg: Option<String>, what: &str) -> Result<Option<T>, Error> {
    match arg {
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Parse(format!("bad {}: {}", what, s))),
        None => Ok(None),
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let mut args = std::env::args().skip(1);

    let in_file_name = match args.next() {
        Some(name) => name,
        None => {
            eprintln!("{}", USAGE);
            return Ok(());
        }
    };

    let config = match args.next() {
        Some(path) if path != "-" => EngineConfig::from_file(path)?,
        _ => EngineConfig::default(),
    };

    let threshold =
        parse_arg::<f32>(args.next(), "panic threshold")?.unwrap_or(config.panic_threshold);
    let debounce_frames =
        parse_arg::<u32>(args.next(), "debounce frames")?.unwrap_or(DEFAULT_DEBOUNCE_FRAMES);

    let tracks_file = std::fs::File::open(&in_file_name)?;

    log::info!(
        "replaying {} on a {}x{} field, threshold {}",
        in_file_name,
        config.width,
        config.height,
        threshold
    );

    let mut engine = BehaviorEngine::new(config)?;
    let mut debounce = PanicDebounce::new(debounce_frames);

    println!("frame occupancy avg_velocity panic alert");

    for (lineno, line) in std::io::BufReader::new(tracks_file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let frame = match Frame::parse_line(&line) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("line {}: {}", lineno + 1, err);
                continue;
            }
        };

        let (panic, avg_velocity) = engine.process(&frame.tracks, threshold);
        let alert = debounce.update(panic);

        println!(
            "{} {} {:.2} {} {}",
            frame.index,
            engine.occupancy(),
            avg_velocity,
            panic,
            alert
        );
    }

    log::info!(
        "done after {} frames, {} identities in history, peak heat {:.1}",
        engine.frames_processed(),
        engine.history().len(),
        engine.heatmap().max_intensity()
    );

    Ok(())
}
