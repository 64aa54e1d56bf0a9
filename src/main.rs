use clap::Parser;
use image::ImageReader;
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

use platescan::{DetectionParams, KNearest, PlateDetector, PlateReading};

#[derive(Parser)]
#[command(name = "platescan")]
#[command(about = "Locate license plates in a photo and read their characters")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Training labels, one character code per line
    #[arg(long, value_name = "FILE", default_value = "classifications.txt")]
    classifications: PathBuf,

    /// Training samples, flattened 20x30 images
    #[arg(long, value_name = "FILE", default_value = "images.txt")]
    samples: PathBuf,

    /// JSON file overriding detection parameters
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Scale scenes down so neither side exceeds this many pixels
    #[arg(long, value_name = "PIXELS")]
    max_dimension: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .parse_default_env()
        .init();

    let mut params = match &args.params {
        Some(path) => DetectionParams::from_json_file(path)?,
        None => DetectionParams::default(),
    };
    if let Some(max_dimension) = args.max_dimension {
        params.max_scene_dimension = max_dimension;
    }

    // Training data problems are reported before any image is touched
    let classifier =
        KNearest::from_files(&args.classifications, &args.samples, params.sample_len())
            .map_err(|e| anyhow::anyhow!("Failed to load classifier: {}", e))?;

    let mut detector = PlateDetector::new(Arc::new(classifier)).with_params(params);
    detector.check_classifier()?;
    if let Some(debug_dir) = args.debug_out {
        detector = detector.with_debug(debug_dir)?;
    }

    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    log::info!("image loaded: {}x{}", img.width(), img.height());

    let (plates, reading) = detector.recognize(&img)?;

    println!("\n=== Number Plate Detection Results ===");
    println!("Possible plates: {}", plates.len());

    if args.verbose {
        for (i, plate) in plates.iter().enumerate() {
            let loc = &plate.location;
            println!(
                "  Plate {} at ({:.0}, {:.0}) {:.0}x{:.0}, angle {:.1} - '{}'",
                i + 1,
                loc.center_x,
                loc.center_y,
                loc.width,
                loc.height,
                loc.angle_deg,
                plate.display_text()
            );
        }
    }

    match reading {
        PlateReading::NoPlates => println!("No number plates detected"),
        PlateReading::NoCharacters { .. } => println!("No number plate found"),
        PlateReading::Plate { text, index } => println!("Plate {}: {}", index + 1, text),
    }

    Ok(())
}
