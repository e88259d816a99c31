//! Prints the header fields of a BMP file and the channels of one pixel.
//!
//! Optionally re-encodes the decoded image to a new file.
//!
//! Run with `cargo run --example bmp_print -- image.bmp --row 0 --col 0 --output copy.bmp`.
//! Set `RUST_LOG=bmpparser=debug` to see the decoder's log output.

use std::{fs::File, path::PathBuf, process::ExitCode};

use bmpparser::{header::total_header_size, Bmp, BmpError, Channel, HeaderField, ReadTarget};
use clap::Parser;

#[derive(Parser)]
#[clap(about = "Print information about a 24 BPP BMP file")]
struct Args {
    /// BMP file to read.
    bmp_file: PathBuf,

    /// Pixel row, counted from the bottom of the image.
    #[clap(long, default_value_t = 0)]
    row: usize,

    /// Pixel column, counted from the left of the image.
    #[clap(long, default_value_t = 0)]
    col: usize,

    /// Write the decoded image to this path.
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn print_fields(file: &mut File) -> Result<(), BmpError> {
    for field in [
        HeaderField::FileSize,
        HeaderField::PixelArrayOffset,
        HeaderField::DibHeaderSize,
        HeaderField::Width,
        HeaderField::Height,
        HeaderField::BitDepth,
        HeaderField::CompressionMethod,
        HeaderField::ImportantColors,
    ] {
        let value = field.read(file)?;
        match field {
            HeaderField::Width | HeaderField::Height => println!("{}: {}", field, value as i32),
            _ => println!("{}: {}", field, value),
        }
    }
    println!("total header size: {}", total_header_size(file)?);

    Ok(())
}

fn run(args: &Args) -> Result<(), BmpError> {
    let mut file = File::open(&args.bmp_file).map_err(|e| BmpError::Read {
        target: ReadTarget::File,
        kind: e.kind(),
    })?;
    print_fields(&mut file)?;

    let bmp = Bmp::from_reader(&mut file)?;
    let header = bmp.header();
    println!(
        "stride: {} ({} padding bytes per row)",
        header.bytes_per_row(),
        header.padding_len()
    );
    println!("row order: {:?}", header.row_order);

    match bmp.pixels().get(args.row, args.col) {
        Some(pixel) => println!(
            "pixel ({}, {}): blue {} green {} red {}",
            args.row,
            args.col,
            pixel[Channel::Blue],
            pixel[Channel::Green],
            pixel[Channel::Red],
        ),
        None => println!(
            "pixel ({}, {}) is outside the {}x{} image",
            args.row, args.col, header.width, header.height
        ),
    }

    if let Some(output) = &args.output {
        bmp.save(output)?;
        tracing::info!(path = %output.display(), "wrote BMP");
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(file = %args.bmp_file.display(), "{}", e);
            ExitCode::FAILURE
        }
    }
}
