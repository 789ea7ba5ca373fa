use clap::Parser;
use framefit::compositor::DEFAULT_JPEG_QUALITY;
use framefit::{
    generate_previews, probe_dimensions, reduced_aspect, AspectRatio, CatalogLoader,
    CompositeConfig, DirSource, JsonFileLoader, MatchConfig, OutputFormat, OverlayDescriptor,
    PhotoSource, PreviewConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Framefit CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FormatConfig {
    Jpeg,
    Png,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CompositeConfigJson {
    format: FormatConfig,
    quality: u8,
    parallel: bool,
}

impl Default for CompositeConfigJson {
    fn default() -> Self {
        Self {
            format: FormatConfig::Jpeg,
            quality: DEFAULT_JPEG_QUALITY,
            parallel: true,
        }
    }
}

impl From<&CompositeConfigJson> for CompositeConfig {
    fn from(value: &CompositeConfigJson) -> Self {
        let format = match value.format {
            FormatConfig::Jpeg => OutputFormat::Jpeg {
                quality: value.quality,
            },
            FormatConfig::Png => OutputFormat::Png,
        };
        Self {
            format,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    catalog_path: String,
    photo_path: String,
    artwork_dir: String,
    output_dir: Option<String>,
    top_n: usize,
    photo_width: Option<u32>,
    photo_height: Option<u32>,
    composite: CompositeConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: String::new(),
            photo_path: String::new(),
            artwork_dir: String::new(),
            output_dir: None,
            top_n: MatchConfig::default().top_n,
            photo_width: None,
            photo_height: None,
            composite: CompositeConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PreviewRecord<'a> {
    size_token: &'a str,
    template_key: &'a str,
    score: f64,
    overlay: &'a OverlayDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    photo_width: u32,
    photo_height: u32,
    aspect: Option<AspectRatio>,
    previews: Vec<PreviewRecord<'a>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("framefit=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.catalog_path.is_empty()
        || config.photo_path.is_empty()
        || config.artwork_dir.is_empty()
    {
        return Err("catalog_path, photo_path and artwork_dir must be set in the config".into());
    }
    if config.top_n == 0 {
        return Err("top_n must be at least 1".into());
    }

    let catalog = JsonFileLoader::new(&config.catalog_path).load()?;
    let photo_bytes = fs::read(&config.photo_path)?;
    let photo = PhotoSource::Bytes(&photo_bytes);
    let (photo_width, photo_height) = match config.photo_width.zip(config.photo_height) {
        Some(dims) => dims,
        None => probe_dimensions(&photo)?,
    };
    let artwork = DirSource::new(&config.artwork_dir);

    let cfg = PreviewConfig {
        matching: MatchConfig {
            top_n: config.top_n,
        },
        composite: CompositeConfig::from(&config.composite),
    };
    let previews = generate_previews(
        &photo,
        Some((photo_width, photo_height)),
        &catalog,
        &artwork,
        cfg,
    )?;

    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir)?;
    }

    let mut records = Vec::with_capacity(previews.len());
    for preview in &previews {
        let mut output_path = None;
        let mut error = None;
        match (&preview.outcome, &config.output_dir) {
            (Ok(image), Some(dir)) => {
                let name = format!("{}.{}", preview.size_token, image.format.extension());
                let path = Path::new(dir).join(name);
                fs::write(&path, &image.bytes)?;
                tracing::info!(
                    path = %path.display(),
                    bytes = image.bytes.len(),
                    "composite written"
                );
                output_path = Some(path.display().to_string());
            }
            (Ok(_), None) => {}
            (Err(err), _) => {
                tracing::warn!(key = %preview.template_key, error = %err, "composite failed");
                error = Some(err.to_string());
            }
        }
        records.push(PreviewRecord {
            size_token: preview.size_token.as_str(),
            template_key: &preview.template_key,
            score: preview.score,
            overlay: &preview.overlay,
            output_path,
            error,
        });
    }

    let output = Output {
        photo_width,
        photo_height,
        aspect: reduced_aspect(photo_width, photo_height),
        previews: records,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
