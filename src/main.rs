use anyhow::Context;
use clap::{Parser, Subcommand};
use color_mapper::Color;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledmap::assets::{AssetCategory, AssetLoader};
use ledmap::models::AppConfig;
use ledmap::services::LuaRuntime;

#[derive(Parser)]
#[command(name = "ledmap")]
#[command(about = "Map RGB colors onto hardware LED palettes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the nearest palette color for a color
    Match {
        /// Color as #RRGGBB, 0xRRGGBB or a decimal number
        color: String,

        /// Palette name (defaults to default_palette from the config)
        #[arg(short, long)]
        palette: Option<String>,
    },
    /// List configured palettes
    Palettes,
    /// Run a controller script and print its result as JSON
    Run {
        /// Script path, relative to the scripts directory
        script: PathBuf,

        /// Script parameter as key=value (value is parsed as YAML)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, serde_yaml::Value)>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledmap=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Some(Commands::Match { color, palette }) => run_match_command(&color, palette.as_deref()),
        Some(Commands::Palettes) => run_palettes_command(),
        Some(Commands::Run { script, params }) => run_script_command(script, params),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Parse a `key=value` script parameter
fn parse_param(s: &str) -> Result<(String, serde_yaml::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    let value = serde_yaml::from_str(value).map_err(|e| format!("invalid value for '{key}': {e}"))?;
    Ok((key.to_string(), value))
}

/// Parse a color given on the command line
fn parse_color_arg(s: &str) -> anyhow::Result<Color> {
    if s.starts_with('#') {
        return s
            .parse::<Color>()
            .with_context(|| format!("invalid color '{s}'"));
    }
    // from_str_radix and parse both accept a leading '+'
    let packed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16)
        }
        None if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse::<u32>(),
        _ => anyhow::bail!("invalid color '{s}': expected #RRGGBB, 0xRRGGBB or a decimal number"),
    }
    .with_context(|| format!("invalid color '{s}'"))?;
    Ok(Color::from_rgb24(packed))
}

fn load_config() -> (Arc<AssetLoader>, Arc<AppConfig>) {
    let asset_loader = Arc::new(AssetLoader::from_env());
    let config = Arc::new(AppConfig::load_from_assets(&asset_loader));
    (asset_loader, config)
}

/// Look up the nearest palette color and print the match as JSON
fn run_match_command(color: &str, palette: Option<&str>) -> anyhow::Result<()> {
    let query = parse_color_arg(color)?;
    let (_, config) = load_config();

    println!("{}", match_json(&config, query, palette)?);
    Ok(())
}

/// Match `query` against a palette, `default_palette` if none is named
fn match_json(
    config: &AppConfig,
    query: Color,
    palette: Option<&str>,
) -> anyhow::Result<serde_json::Value> {
    let name = config.resolve_palette_name(palette)?;
    let mapper = config.build_mapper(name)?;
    let entry = mapper.nearest_entry(query);

    tracing::debug!(palette = %name, %query, matched = %entry.color, "Matched color");

    Ok(serde_json::json!({
        "palette": name,
        "query": query.to_string(),
        "color": entry.color.to_string(),
        "value": serde_json::to_value(&entry.value)?,
    }))
}

/// Print configured palettes with their entry counts
fn run_palettes_command() -> anyhow::Result<()> {
    let (_, config) = load_config();

    let names = config.palette_names();
    if names.is_empty() {
        println!("No palettes configured.");
        return Ok(());
    }

    for name in names {
        let marker = if config.default_palette.as_deref() == Some(name) {
            " (default)"
        } else {
            ""
        };
        let palette = config.get_palette(name)?;
        let status = match config.build_mapper(name) {
            Ok(mapper) => format!("{} colors", mapper.len()),
            Err(e) => format!("invalid: {e}"),
        };
        match palette.description {
            Some(ref description) => println!("{name}{marker}: {status} - {description}"),
            None => println!("{name}{marker}: {status}"),
        }
    }
    Ok(())
}

/// Run a controller script and print what it returned
fn run_script_command(
    script: PathBuf,
    params: Vec<(String, serde_yaml::Value)>,
) -> anyhow::Result<()> {
    let (asset_loader, config) = load_config();
    let runtime = LuaRuntime::new(asset_loader, config);

    let params: HashMap<String, serde_yaml::Value> = params.into_iter().collect();
    let result = runtime
        .run_script(&script, &params)
        .map_err(|e| anyhow::anyhow!("script {} failed: {e}", script.display()))?;

    println!("{}", serde_json::to_string_pretty(&result.data)?);
    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    print!("{}", status_report(&AssetLoader::from_env()));
}

/// Status text: version, environment overrides and where assets come from
fn status_report(loader: &AssetLoader) -> String {
    use std::fmt::Write;

    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let not_set = || "(not set)".to_string();
    let config_file = loader.config_file();
    let scripts_dir = loader.scripts_dir();

    let mut out = String::new();
    let _ = writeln!(out, "ledmap v{VERSION}");
    let _ = writeln!(out, "Nearest-color mapping for LED palettes\n");

    let _ = writeln!(out, "Environment Variables:");
    let _ = writeln!(
        out,
        "  CONFIG_FILE = {}",
        config_file.map_or_else(not_set, |p| p.display().to_string())
    );
    let _ = writeln!(
        out,
        "  SCRIPTS_DIR = {}",
        scripts_dir.map_or_else(not_set, |p| p.display().to_string())
    );

    let _ = writeln!(out, "\nAsset Sources:");

    let embedded_config = AssetLoader::list_embedded(AssetCategory::Config).join(", ");
    let config_source = match config_file {
        Some(path) if path.exists() => path.display().to_string(),
        Some(_) => format!("embedded {embedded_config} (file not found)"),
        None => format!("embedded {embedded_config}"),
    };
    let _ = writeln!(out, "  Config:  {config_source}");

    let scripts_count = loader.list_scripts().len();
    let embedded_count = AssetLoader::list_embedded(AssetCategory::Scripts).len();
    match scripts_dir {
        Some(path) if path.exists() => {
            let _ = writeln!(
                out,
                "  Scripts: {} ({scripts_count} {}, {embedded_count} embedded)",
                path.display(),
                plural(scripts_count)
            );
        }
        _ => {
            let _ = writeln!(
                out,
                "  Scripts: embedded ({embedded_count} {})",
                plural(embedded_count)
            );
        }
    }

    let _ = writeln!(out, "\nCommands:");
    let _ = writeln!(out, "  ledmap match     Find the nearest palette color");
    let _ = writeln!(out, "  ledmap palettes  List configured palettes");
    let _ = writeln!(out, "  ledmap run       Run a controller script");
    let _ = writeln!(out, "\nRun 'ledmap --help' for more details.");
    out
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "file"
    } else {
        "files"
    }
}
