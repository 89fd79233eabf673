use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgGroup, Parser};
use log::LevelFilter;

use watermark_eraser::{
    default_mask_path, export_directory, export_file, ExportOptions, ExportResult, Point,
    SelectionRect, SessionConfig, UploadPolicy,
};

#[derive(Parser)]
#[command(
    name = "watermark-eraser",
    about = "Build inpainting masks that mark a watermark region for removal",
    version,
    group(ArgGroup::new("region").required(true).args(["rect", "drag"])),
    after_help = "Simple usage: watermark-eraser <image> --rect 100,100,200,150\n\n\
                  The mask is a PNG the same size as the image: white where the\n\
                  inpainting service should regenerate pixels, black elsewhere."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output mask file or directory (default: {name}_mask.png)
    #[arg(short, long)]
    output: Option<String>,

    /// Selection as X,Y,WIDTH,HEIGHT
    #[arg(long, value_parser = parse_quad)]
    rect: Option<[f32; 4]>,

    /// Selection as a drag from X1,Y1 to X2,Y2
    #[arg(long, value_parser = parse_quad)]
    drag: Option<[f32; 4]>,

    /// Coordinates are on a canvas displayed at WIDTHxHEIGHT instead of image pixels
    #[arg(long, value_parser = parse_size)]
    display: Option<(f32, f32)>,

    /// Guidance text for the inpainting model, saved next to the mask
    #[arg(short, long)]
    prompt: Option<String>,

    /// Also write a preview with the selection drawn on the image
    #[arg(long)]
    preview: bool,

    /// Largest accepted input file in megabytes
    #[arg(long, default_value = "10")]
    max_size_mb: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn parse_quad(s: &str) -> Result<[f32; 4], String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    parts
        .try_into()
        .map_err(|_| "expected four comma-separated numbers".to_string())
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let w: f32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if w <= 0.0 || h <= 0.0 {
        return Err("display size must be positive".to_string());
    }
    Ok((w, h))
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut opts = ExportOptions {
        display: cli.display,
        prompt: cli.prompt.clone(),
        preview: cli.preview,
        session: SessionConfig {
            upload: UploadPolicy {
                max_bytes: cli.max_size_mb.saturating_mul(1024 * 1024),
                ..UploadPolicy::default()
            },
            ..SessionConfig::default()
        },
        verbose: cli.verbose,
        quiet: cli.quiet,
        ..ExportOptions::default()
    };
    if let Some([x, y, width, height]) = cli.rect {
        opts = opts.with_rect(SelectionRect {
            x,
            y,
            width,
            height,
        });
    } else if let Some([x1, y1, x2, y2]) = cli.drag {
        opts.from = Point::new(x1, y1);
        opts.to = Point::new(x2, y2);
    }

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: watermark-eraser <input_dir> --rect X,Y,W,H -o <output_dir>");
            process::exit(1);
        };
        export_directory(input_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_mask_path(input_path),
        };
        vec![export_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Exported: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ExportResult, opts: &ExportOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !opts.quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !opts.quiet {
            match result.selection {
                Some(r) => eprintln!(
                    "[OK] {filename} ({}x{} at {},{})",
                    r.width, r.height, r.x, r.y
                ),
                None => eprintln!("[OK] {filename}"),
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
