//! flowtower CLI - calibration program generator and previewer

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowtower::settings::{default_settings_path, load_raw_settings};
use flowtower::{
    archive_file_name, init_logging, layered_settings, plate_file_name, preview_options_for,
    render, FlowTowerGenerator, PlateBundle, PrinterCatalog, RawSettings, ViewOptions,
};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "flowtower")]
#[command(about = "Flow and temperature tower calibration for FFF printers", long_about = None)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")")
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the printer catalog
    Printers {
        /// JSON catalog file to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Generate calibration programs
    Generate {
        /// Printer catalog index or model name
        #[arg(short, long)]
        printer: String,
        /// JSON catalog file to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Settings file (.json or .toml); defaults to the user settings file if present
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Override a setting, e.g. --set startFlow=8
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        /// Directory for the generated files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Pack all plates into one ZIP archive
        #[arg(long)]
        zip: bool,
        /// Also write an SVG preview next to each plate
        #[arg(long)]
        preview: bool,
    },
    /// Render a G-code program to SVG
    Preview {
        /// Program file
        input: PathBuf,
        /// SVG output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON file with view options
        #[arg(long)]
        options: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Printers { catalog } => list_printers(catalog.as_deref())?,
        Commands::Generate {
            printer,
            catalog,
            settings,
            overrides,
            out_dir,
            zip,
            preview,
        } => {
            let request = GenerateRequest {
                printer,
                catalog,
                settings,
                overrides,
                out_dir,
                zip,
                preview,
            };
            generate_plates(&request)?;
        }
        Commands::Preview {
            input,
            output,
            options,
        } => preview_file(&input, output.as_deref(), options.as_deref())?,
    }

    Ok(())
}

struct GenerateRequest {
    printer: String,
    catalog: Option<PathBuf>,
    settings: Option<PathBuf>,
    overrides: Vec<String>,
    out_dir: PathBuf,
    zip: bool,
    preview: bool,
}

fn load_catalog(path: Option<&Path>) -> Result<Cow<'static, PrinterCatalog>> {
    match path {
        Some(path) => {
            let catalog = PrinterCatalog::load_from_file(path)
                .with_context(|| format!("Failed to load printer catalog {}", path.display()))?;
            Ok(Cow::Owned(catalog))
        }
        None => Ok(Cow::Borrowed(PrinterCatalog::builtin())),
    }
}

fn list_printers(catalog: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog)?;
    for (index, profile) in catalog.iter().enumerate() {
        println!(
            "{:>3}  {:<12} {} x {} mm  {} excluded area(s)",
            index,
            profile.model,
            profile.build_volume.width,
            profile.build_volume.depth,
            profile.excluded_areas.len()
        );
    }
    Ok(())
}

fn generate_plates(request: &GenerateRequest) -> Result<()> {
    let catalog = load_catalog(request.catalog.as_deref())?;
    let index = catalog
        .select(&request.printer)
        .with_context(|| format!("Unknown printer '{}'", request.printer))?;
    let profile = catalog.profile_or_unknown(index).clone();

    let mut layers = Vec::new();
    let settings_path = request
        .settings
        .clone()
        .or_else(|| default_settings_path().filter(|path| path.exists()));
    if let Some(path) = settings_path {
        let raw = load_raw_settings(&path)
            .with_context(|| format!("Failed to load settings {}", path.display()))?;
        layers.push(raw);
    }
    let mut overrides = RawSettings::new();
    for pair in &request.overrides {
        overrides
            .set_from_pair(pair)
            .with_context(|| format!("Invalid --set value '{}'", pair))?;
    }
    layers.push(overrides);

    let settings = layered_settings(&profile, &layers);
    debug!("Resolved settings: {:?}", settings);

    let generator = FlowTowerGenerator::new(settings, profile);
    let plates = generator.generate();
    let model = generator.profile().model.as_str();

    fs::create_dir_all(&request.out_dir)
        .with_context(|| format!("Failed to create {}", request.out_dir.display()))?;

    if request.zip {
        let bytes = PlateBundle::from_plates(model, &plates)
            .to_zip_bytes()
            .context("Failed to build plate archive")?;
        let path = request.out_dir.join(archive_file_name(model));
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} plate(s) to {}", plates.len(), path.display());
    } else {
        for plate in &plates {
            let path = request
                .out_dir
                .join(plate_file_name(model, plate.index, plates.len()));
            fs::write(&path, &plate.gcode)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote plate {} ({} sites) to {}", plate.index, plate.steps, path.display());
        }
    }

    if request.preview {
        let options = preview_options_for(generator.settings());
        for plate in &plates {
            let path = request
                .out_dir
                .join(plate_file_name(model, plate.index, plates.len()))
                .with_extension("svg");
            fs::write(&path, render(&plate.gcode, &options))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote preview {}", path.display());
        }
    }

    Ok(())
}

fn preview_file(input: &Path, output: Option<&Path>, options: Option<&Path>) -> Result<()> {
    let program = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let options = match options {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<ViewOptions>(&content)
                .with_context(|| format!("Invalid view options in {}", path.display()))?
        }
        None => ViewOptions::default(),
    };

    let svg = render(&program, &options);
    match output {
        Some(path) => {
            fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote preview {}", path.display());
        }
        None => println!("{}", svg),
    }
    Ok(())
}
