//! One-shot coverage fetch from the command line.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use wcslayer::{
    Coverage, CoverageRequest, CoverageTextureLoader, LonLatBounds, WebCoverageService,
};

use crate::error::CliError;

/// Arguments for the `fetch` command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// WCS endpoint base URL, including the trailing `?` and any fixed
    /// query parameters (e.g. "https://host/wcs?map=earth")
    #[arg(long)]
    pub url: String,

    /// Coverage identifier to request
    #[arg(long)]
    pub coverage: String,

    /// Western edge of the requested extent, degrees
    #[arg(long, default_value_t = -180.0, allow_hyphen_values = true)]
    pub min_lon: f64,

    /// Eastern edge of the requested extent, degrees
    #[arg(long, default_value_t = 180.0, allow_hyphen_values = true)]
    pub max_lon: f64,

    /// Southern edge of the requested extent, degrees
    #[arg(long, default_value_t = -90.0, allow_hyphen_values = true)]
    pub min_lat: f64,

    /// Northern edge of the requested extent, degrees
    #[arg(long, default_value_t = 90.0, allow_hyphen_values = true)]
    pub max_lat: f64,

    /// Raster band to decode (1-based)
    #[arg(long)]
    pub band: Option<u32>,

    /// Layer for the RANGESUBSET clause
    #[arg(long)]
    pub layer: Option<i32>,

    /// Maximum output dimension in pixels; 0 leaves the size unscaled
    #[arg(long, default_value_t = 0)]
    pub max_size: u32,

    /// Optional time slice, e.g. "2026-01-01T00:00:00Z"
    #[arg(long)]
    pub time: Option<String>,

    /// MIME format to request (defaults to image/tiff)
    #[arg(long)]
    pub format: Option<String>,

    /// Native raster width of the coverage, pixels
    #[arg(long, default_value_t = 1024)]
    pub native_width: u32,

    /// Native raster height of the coverage, pixels
    #[arg(long, default_value_t = 1024)]
    pub native_height: u32,

    /// Number of selectable layers the coverage advertises
    #[arg(long, default_value_t = 1)]
    pub num_layers: i32,

    /// Skip the on-disk cache for this request
    #[arg(long)]
    pub no_cache: bool,
}

/// Run the `fetch` command, printing a summary of the decoded texture.
pub fn run(args: FetchArgs, cache_dir: PathBuf) -> Result<(), CliError> {
    let loader = CoverageTextureLoader::new(cache_dir).map_err(|_| CliError::Fetch)?;

    let service = WebCoverageService::new(args.url);
    let coverage = Coverage {
        id: args.coverage,
        bounds: LonLatBounds::default(),
        axis_labels: ["Long".to_string(), "Lat".to_string()],
        axis_resolution: [args.native_width, args.native_height],
        num_layers: args.num_layers,
    };
    let request = CoverageRequest {
        bounds: LonLatBounds::new(args.min_lon, args.max_lon, args.min_lat, args.max_lat),
        band: args.band,
        layer: args.layer,
        max_size: args.max_size,
        time: args.time,
        format: args.format,
    };

    info!(coverage = %coverage.id, "Requesting coverage");
    let texture = loader
        .load(&service, &coverage, &request, !args.no_cache)
        .ok_or(CliError::Fetch)?;

    println!("Coverage:  {}", coverage.id);
    println!("Size:      {}x{} px", texture.width, texture.height);
    println!("Texels:    {:?} ({} bytes)", texture.kind, texture.data.len());
    println!("Bands:     {}", texture.bands);
    println!(
        "Values:    {:.3} .. {:.3}",
        texture.value_range.0, texture.value_range.1
    );
    println!(
        "Bounds:    {:.4} .. {:.4} lon, {:.4} .. {:.4} lat (deg)",
        texture.bounds.west.to_degrees(),
        texture.bounds.east.to_degrees(),
        texture.bounds.south.to_degrees(),
        texture.bounds.north.to_degrees()
    );
    Ok(())
}
