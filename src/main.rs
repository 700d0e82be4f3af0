use clap::{Parser, Subcommand};
use gpcolorpicker::config::{self, Settings};
use gpcolorpicker::events::PointerEvent;
use gpcolorpicker::geometry::{Point, radians_to_degrees};
use gpcolorpicker::matpalette::{PaletteCollection, PaletteName, io};
use gpcolorpicker::picker::{NoPreviews, ObjectContext, PickerOutcome, PickerSession};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gpcolorpicker", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// List the materials of a palette file with their wheel angles
    Angles {
        file: PathBuf,

        /// Only show this palette
        #[arg(short = 'p', long)]
        palette: Option<String>,
    },
    /// Pick the material under a pointer offset from the wheel center
    Pick {
        file: PathBuf,

        #[arg(short, long, allow_negative_numbers = true)]
        x: f64,

        #[arg(short, long, allow_negative_numbers = true)]
        y: f64,

        /// Palette to pick from (defaults to the last one in the file)
        #[arg(short = 'p', long)]
        palette: Option<String>,

        /// Ignore default brushes, as when holding shift
        #[arg(long)]
        shift: bool,
    },
    /// Re-export a palette file after import and angle allocation
    Export { input: PathBuf, output: PathBuf },
    /// Write the default settings file if there is none
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Angles { file, palette } => list_angles(&file, palette),
        Commands::Pick {
            file,
            x,
            y,
            palette,
            shift,
        } => pick(&file, Point::new(x, y), palette, shift),
        Commands::Export { input, output } => {
            let collection = load(&input, None)?;
            io::export_file(&collection, &output)?;
            println!("Exported {} palettes to {}", collection.count(), output.display());
            Ok(())
        }
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn load(path: &Path, palette: Option<String>) -> anyhow::Result<PaletteCollection> {
    let only: Vec<PaletteName> = palette.into_iter().map(PaletteName::new).collect();
    let mut collection = PaletteCollection::new();
    let report = io::import_file(path, &only, &mut collection)?;

    for (name, error) in &report.failed {
        eprintln!("Skipped palette '{}': {}", name, error);
    }
    if collection.is_empty() {
        anyhow::bail!("No palette could be imported from {}", path.display());
    }
    Ok(collection)
}

fn list_angles(path: &Path, palette: Option<String>) -> anyhow::Result<()> {
    let collection = load(path, palette)?;

    for palette in collection.palettes() {
        println!("{}", palette.name);
        for material in palette.materials() {
            let angle = material.angle();
            println!(
                "  {:<24} {:>7.2}° {}",
                material.name.as_str(),
                angle.value().map(radians_to_degrees).unwrap_or_default(),
                if angle.is_custom() { "custom" } else { "auto" }
            );
        }
    }
    Ok(())
}

fn pick(path: &Path, offset: Point, palette: Option<String>, shift: bool) -> anyhow::Result<()> {
    let settings: Settings = config::load_or_default();
    let mut collection = load(path, palette)?;
    let object = ObjectContext::default();
    let mut previews = NoPreviews;

    let mut session = PickerSession::new(settings, &collection, &object, &mut previews);
    let events = [
        PointerEvent::Modifier { shift },
        PointerEvent::Move(offset),
        PointerEvent::Confirm,
    ];

    for event in events {
        if let PickerOutcome::Picked(pick) =
            session.handle(event, &mut collection, &object, &mut previews)
        {
            print!("{}", pick.material);
            if let Some(brush) = pick.brush {
                print!(" brush={}", brush);
            }
            if let Some(layer) = pick.layer {
                print!(" layer={}", layer);
            }
            println!();
            return Ok(());
        }
    }

    println!("Nothing selected");
    Ok(())
}
