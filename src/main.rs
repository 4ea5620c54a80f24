use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use weatherguard::config::LoggingConfig;
use weatherguard::models::icon_url;
use weatherguard::units::{fahrenheit_to_celsius, round_half_up};
use weatherguard::{WeatherBundle, WeatherFacade, WeatherGuardConfig, WeatherProvider, logging};

/// Current conditions, five-day forecast and weather map for a location
#[derive(Parser, Debug)]
#[command(name = "weatherguard", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print weather for a location
    Weather {
        /// City name, optionally with country code, e.g. "Portland,US"
        #[arg(short, long)]
        location: Option<String>,

        /// Show temperatures in Celsius
        #[arg(long)]
        celsius: bool,

        /// Print the bundle as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Write the composited map to this PNG file
        #[arg(long)]
        map_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = WeatherGuardConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;

    let logging_config = if cli.verbose {
        LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    logging::init(&logging_config)?;

    match cli.command {
        Command::Weather {
            location,
            celsius,
            json,
            map_out,
        } => run_weather(&config, location, celsius, json, map_out),
    }
}

fn run_weather(
    config: &WeatherGuardConfig,
    location: Option<String>,
    celsius: bool,
    json: bool,
    map_out: Option<PathBuf>,
) -> Result<()> {
    let Some(location) = location.or_else(|| config.defaults.location.clone()) else {
        bail!("No location given. Use --location or set defaults.location in the config file");
    };
    let Some(api_key) = config.weather.api_key() else {
        bail!(
            "No API key configured. Set weather.api_key, WEATHERGUARD_WEATHER__API_KEY or apiKey in config.properties"
        );
    };

    let mut facade = WeatherFacade::new(api_key, &location, config)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if celsius {
        facade.set_temperature_unit(false);
    }

    let bundle = facade.all_weather_info();

    if let Some(path) = map_out {
        match &bundle.map {
            Some(map) => {
                let png = map.encode_png()?;
                std::fs::write(&path, png)
                    .with_context(|| format!("Failed to write map to {}", path.display()))?;
                info!("Wrote weather map to {}", path.display());
            }
            None => eprintln!("No weather map available; nothing written"),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&bundle.to_json())?);
    } else {
        print!(
            "{}",
            render_text(&facade, &bundle, &config.weather.icon_base_url)
        );
    }

    if !bundle.is_complete() {
        bail!("Weather data for '{location}' is incomplete");
    }
    Ok(())
}

fn render_text<P: WeatherProvider>(
    facade: &WeatherFacade<P>,
    bundle: &WeatherBundle,
    icon_base: &str,
) -> String {
    let temperature =
        |f: f64| facade.formatted_temperature(round_half_up(f), fahrenheit_to_celsius(f));
    let mut out = String::new();

    match &bundle.current {
        Some(current) => {
            out.push_str(&format!(
                "{}, {}\n{}\n\n",
                current.location_name,
                current.country_code,
                current.observed_display()
            ));
            out.push_str(&format!(
                "{}  {} (high {}, low {})\n",
                temperature(f64::from(current.temperature_f)),
                current.description,
                temperature(f64::from(current.max_temp_f)),
                temperature(f64::from(current.min_temp_f))
            ));
            out.push_str(&format!(
                "Humidity {}%  Visibility {} km  Wind {} m/s\n",
                current.humidity_pct, current.visibility_km, current.wind_speed
            ));
            out.push_str(&format!(
                "Sunrise {}  Sunset {}\n",
                current.sunrise_display(),
                current.sunset_display()
            ));
            out.push_str(&format!("Icon {}\n", icon_url(icon_base, &current.icon_code)));
        }
        None => out.push_str("Current conditions unavailable\n"),
    }

    out.push('\n');
    match &bundle.forecast {
        Some(forecast) => {
            for day in &forecast.days {
                out.push_str(&format!(
                    "{:<8} {:>6} / {:<6} {}\n",
                    forecast.day_label(day),
                    temperature(f64::from(day.high_temp_f)),
                    temperature(f64::from(day.low_temp_f)),
                    day.description
                ));
            }
            if let (Some(high), Some(low)) = (forecast.average_high(), forecast.average_low()) {
                out.push_str(&format!(
                    "Average high {}, average low {}\n",
                    temperature(high),
                    temperature(low)
                ));
            }
        }
        None => out.push_str("Forecast unavailable\n"),
    }

    match &bundle.map {
        Some(map) => out.push_str(&format!(
            "\nMap {}x{} at zoom {} with {} layer(s)\n",
            map.width(),
            map.height(),
            map.zoom,
            map.layers_applied.len()
        )),
        None => out.push_str("\nWeather map unavailable\n"),
    }

    out
}
