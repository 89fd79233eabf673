//! Write the inpainting mask for a rectangle on a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example export_mask -- input.png mask.png 100 100 200 150
//! ```

use std::env;
use std::process;

use watermark_eraser::{export_file, ExportOptions, SelectionRect};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 7 {
        eprintln!("Usage: {} <input> <mask.png> <x> <y> <width> <height>", args[0]);
        process::exit(1);
    }

    let numbers: Result<Vec<f32>, _> = args[3..7].iter().map(|a| a.parse::<f32>()).collect();
    let Ok(numbers) = numbers else {
        eprintln!("Error: x, y, width and height must be numbers");
        process::exit(1);
    };

    let rect = SelectionRect {
        x: numbers[0],
        y: numbers[1],
        width: numbers[2],
        height: numbers[3],
    };
    let opts = ExportOptions::default().with_rect(rect);
    let result = export_file(args[1].as_ref(), args[2].as_ref(), &opts);

    if result.skipped {
        println!("Skipped: {}", result.message);
    } else if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
