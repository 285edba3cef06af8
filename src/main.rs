//! # Pageflow CLI
//!
//! Usage:
//!   pageflow report.md -o pages.json
//!   cat report.md | pageflow --slides
//!   pageflow report.md --html -o pages.html

use std::env;
use std::fs;
use std::io::{self, Read};

use pageflow::{paginate, paginate_slides, render, PageGeometry};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("usage: pageflow [input] [-o output] [--slides] [--html]");
        return;
    }

    let slides = args.iter().any(|a| a == "--slides");
    let as_html = args.iter().any(|a| a == "--html");

    // Read input: first non-flag argument, or stdin.
    let input = match args.iter().skip(1).find(|a| !a.starts_with('-')) {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("✗ Failed to read {path}: {e}");
            std::process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .expect("Failed to read stdin");
            buf
        }
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone());

    let geometry = if slides {
        PageGeometry::slide_16x9()
    } else {
        PageGeometry::a4_portrait()
    };
    let pages = if slides {
        paginate_slides(&input, &geometry)
    } else {
        paginate(&input, &geometry)
    };

    let rendered = if as_html {
        render::render_document(&pages, &geometry)
    } else {
        serde_json::to_string_pretty(&pages).expect("page array serializes")
    };

    match output_path {
        Some(path) => {
            fs::write(&path, &rendered).unwrap_or_else(|e| {
                eprintln!("✗ Failed to write {path}: {e}");
                std::process::exit(1);
            });
            eprintln!("✓ Written {} page(s) to {}", pages.len(), path);
        }
        None => println!("{rendered}"),
    }
}
