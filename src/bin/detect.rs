use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use vehicle_detector::api::{DetectionClient, ImagePayload};
use vehicle_detector::presenter::{
    self, DisplaySource, NO_PREDICTIONS_MESSAGE, Presentation, capitalize, format_percent,
    short_id,
};
use vehicle_detector::settings::{Settings, SettingsOverrides};

/// Run vehicle detection on one image from the command line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Image to submit
    image: PathBuf,

    #[command(flatten)]
    overrides: SettingsOverrides,

    /// Write the annotated image returned by the service to this path
    #[arg(long, value_name = "PATH")]
    save_annotated: Option<PathBuf>,

    /// Print the raw service output as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let args = Args::parse();
    let settings = args.overrides.apply(Settings::default());

    if settings.api_key.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "No API key given; pass --api-key or set {}",
            vehicle_detector::settings::API_KEY_ENV
        ));
    }

    let image = ImagePayload::from_path(&args.image)?;
    if let Some(warning) = image.size_warning() {
        eprintln!("{warning}");
    }

    let client = DetectionClient::new(settings)?;
    let used = client.settings();
    println!(
        "Using {} (confidence {:.2}, overlap {:.2})",
        used.api_url, used.confidence_threshold, used.overlap_threshold
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Detecting vehicles in {}", image.name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = match client.detect(&image).await {
        Ok(outcome) => outcome,
        Err(err) => {
            spinner.abandon_with_message("Detection failed");
            return Err(err.into());
        }
    };
    spinner.finish_with_message(format!("Received {} response", outcome.response.shape()));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.response.output())?);
    }

    let presentation = Presentation::from_response(&outcome.response, outcome.elapsed);
    if !args.json {
        print_summary(&presentation);
    }

    if let Some(path) = &args.save_annotated {
        match &presentation.display {
            DisplaySource::Annotated(encoded) => {
                let bytes = STANDARD.decode(encoded.trim())?;
                fs::write(path, bytes)?;
                println!("Wrote annotated image to {}", path.display());
            }
            DisplaySource::Original => {
                eprintln!("The service returned no annotated image; nothing written");
            }
        }
    }

    Ok(())
}

fn print_summary(presentation: &Presentation) {
    println!();
    println!("Total Vehicles:  {}", presentation.count_label());
    println!("Avg Confidence:  {}", presentation.average_confidence_label());
    println!("Processing Time: {}", presentation.processing_time_label());
    if let Some(size) = presentation.reported_size {
        println!("Image Size:      {}", presentation.size_label(size));
    }

    let Some(classes) = &presentation.breakdown else {
        println!("\n{NO_PREDICTIONS_MESSAGE}");
        return;
    };

    println!("\nDetected Vehicles ({}):", presentation.breakdown_total());
    for class in classes {
        println!("  {:<16} {}", capitalize(&class.class), class.count);
    }

    if presentation.detections.is_empty() {
        return;
    }

    println!("\nDetections:");
    for detection in &presentation.detections {
        println!(
            "  {:<12} {:>6}  at ({:.0}, {:.0})  {}×{}  {}",
            capitalize(presenter::class_label(detection)),
            format_percent(detection.confidence),
            detection.x,
            detection.y,
            detection.width,
            detection.height,
            short_id(&detection.detection_id),
        );
    }
}
