use anyhow::Context;
use clap::Parser;
use distmap::{cli, config, convert, export, loader, map, session, view};
use cli::{Cli, Commands, ViewArgs};
use config::Config;
use distmap_common::{zone_counts, RenderOutcome, RenderPass};
use export::ReportOptions;
use loader::Dataset;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load(config: &Config, data: Option<&Path>) -> anyhow::Result<&'static Dataset> {
    let path = config.resolve_data_path(data);
    loader::cached_dataset(&path)
        .with_context(|| format!("cargando el dataset de clientes {}", path.display()))
}

/// Render the view; `None` (after telling the user) when no zone is selected
fn render_or_warn(dataset: &Dataset, config: &Config, view_args: &ViewArgs) -> anyhow::Result<Option<RenderPass>> {
    let state = view_args.to_state();
    match view::render_view(&dataset.records, &state, view_args.all, &config.render_options())? {
        RenderOutcome::Ready(pass) => Ok(Some(pass)),
        RenderOutcome::NoZoneSelected => {
            println!("Ninguna zona seleccionada, o las zonas elegidas no tienen clientes. Elija zonas con --zone (ver `distmap zones`).");
            Ok(None)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = Config::load()?;

    match cli.command {
        Commands::Zones => {
            let dataset = load(&config, cli.data.as_deref())?;
            let counts = zone_counts(&dataset.records);
            println!("Zonas ({} clientes):", dataset.records.len());
            print!("{}", view::format_zone_counts(&counts));
            if dataset.dropped > 0 {
                println!("({} filas sin coordenadas omitidas)", dataset.dropped);
            }
        }

        Commands::Table { view: view_args, json } => {
            let dataset = load(&config, cli.data.as_deref())?;
            let Some(pass) = render_or_warn(dataset, &config, &view_args)? else {
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(pass.table.rows())?);
            } else {
                print!("{}", view::format_table(&pass.table));
                println!("\n{}", view::status_line(pass.status));
            }
        }

        Commands::Map { view: view_args, html, png } => {
            let dataset = load(&config, cli.data.as_deref())?;
            let Some(pass) = render_or_warn(dataset, &config, &view_args)? else {
                return Ok(());
            };

            println!("🗺  distmap - mapa\n");
            println!("✔ {} ({} marcador(es))", view::status_line(pass.status), pass.map.markers.len());

            let wrote_any = html.is_some() || png.is_some();
            if let Some(path) = html {
                map::write_html(&pass.map, &config.map_title, &path)?;
                println!("✔ HTML: {}", path.display());
            }
            if let Some(path) = png {
                let snapshot = map::rasterize(&pass.map, config.map_width_px, config.map_height_px)?;
                map::write_png(&snapshot, &path)?;
                println!("✔ PNG: {} (zoom {})", path.display(), snapshot.zoom);
            }
            if !wrote_any {
                for path in session::write_map_files(&pass, &config, Path::new("."))? {
                    println!("✔ {}", path.display());
                }
            }
        }

        Commands::Export { view: view_args, format, output, title } => {
            println!("📄 distmap - exportar\n");

            println!("[1/3] Cargando clientes...");
            let dataset = load(&config, cli.data.as_deref())?;
            println!("✔ {} clientes\n", dataset.records.len());

            println!("[2/3] Armando la selección...");
            let Some(pass) = render_or_warn(dataset, &config, &view_args)? else {
                return Ok(());
            };
            println!("✔ {}\n", view::status_line(pass.status));

            println!("[3/3] Exportando...");
            let mut options = ReportOptions::from_config(&config);
            if let Some(title) = title {
                options.title = title;
            }
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            export::export_selection(&pass, &format, &output_dir, &options)?;

            println!("\n✅ Exportación completa");
        }

        Commands::Dashboard { output } => {
            let dataset = load(&config, cli.data.as_deref())?;
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            session::run_dashboard(dataset, &config, &output_dir)?;
        }

        Commands::Convert { input, output, backup_dir } => {
            println!("🔄 distmap - convertir exportación de MyMaps\n");
            let output = output.unwrap_or_else(|| config.resolve_data_path(cli.data.as_deref()));

            let summary = convert::convert_file(&input, &output, backup_dir.as_deref())
                .with_context(|| format!("convirtiendo {}", input.display()))?;

            println!("✔ Respaldo: {}", summary.backup.display());
            println!("✔ Dataset limpio: {}", summary.output.display());
            println!(
                "Filas: {} | sin coordenadas: {}",
                summary.rows, summary.missing_coordinates
            );
        }

        Commands::Config { set_data_path, set_zoom, show } => {
            if let Some(path) = set_data_path {
                config.set_data_path(path)?;
                println!("✔ Ruta del dataset actualizada");
            }

            if let Some(zoom) = set_zoom {
                config.set_zoom(zoom)?;
                println!("✔ Zoom actualizado");
            }

            if show {
                println!("Configuración:");
                println!("  Dataset: {}", config.resolve_data_path(cli.data.as_deref()).display());
                println!("  Zoom: {}", config.zoom);
                println!("  Imagen del mapa: {}x{}px", config.map_width_px, config.map_height_px);
                println!("  Enlace de Maps: {}", config.maps_url_template);
                println!("  Prefijo de archivo: {}", config.file_prefix);
                for (zone, color) in config.zone_colors.entries() {
                    println!("  {}: {}", zone, color);
                }
            }
        }
    }

    Ok(())
}
