#![allow(clippy::print_stdout)]

mod args;
mod config;
mod logger;

use std::{process::ExitCode, time::Instant};

use ansi_term::Colour;
use args::{InputArgs, LogArgs, OutputArgs};
use clap::Parser;

use fardel::{BundleOutput, Bundler, Format};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Commands {
  #[clap(flatten)]
  input: InputArgs,

  #[clap(flatten)]
  output: OutputArgs,

  #[clap(flatten)]
  log: LogArgs,
}

fn kind(format: Format) -> &'static str {
  match format {
    Format::Script => "script",
    Format::Style => "style",
    Format::Markup => "markup",
    Format::Json => "json",
    Format::WebManifest => "manifest",
    Format::Binary => "asset",
  }
}

fn print_output(output: &BundleOutput) {
  let mut rows = Vec::with_capacity(output.assets.len() + output.skipped.len());
  for asset in &output.assets {
    let size = format!("{:.2} kB", kb(asset.content.len()));
    rows.push((asset.filename.as_str(), kind(asset.format), size));
  }
  for filename in &output.skipped {
    rows.push((filename.as_str(), "skipped", String::new()));
  }
  rows.sort_by(|a, b| a.0.cmp(b.0));

  let left = rows.iter().map(|row| row.0.len()).max().unwrap_or_default();
  let dim = Colour::White.dimmed();
  let color = Colour::Cyan;

  for (filename, kind, size) in rows {
    let padding = " ".repeat(left - filename.len());
    if size.is_empty() {
      println!("{}{}{padding} {}", dim.paint("<DIR>/"), dim.paint(filename), dim.paint(kind));
    } else {
      println!(
        "{}{}{padding} {}{}{size}",
        dim.paint("<DIR>/"),
        color.paint(filename),
        dim.paint(kind),
        dim.paint(" │ size: "),
      );
    }
  }
}

#[allow(clippy::cast_precision_loss)]
fn kb(bytes: usize) -> f64 {
  bytes as f64 / 1024.0
}

fn print_errors<'a>(errors: impl IntoIterator<Item = &'a fardel::BuildDiagnostic>) {
  for error in errors {
    println!("{} {error}", Colour::Red.paint("Error:"));
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Commands::parse();
  logger::init_logger(args.log.verbose, args.log.silent);
  let silent = args.log.silent;

  let options = match config::load_options(args.input, args.output) {
    Ok(options) => options,
    Err(message) => {
      println!("{} {message}", Colour::Red.paint("Error:"));
      return ExitCode::FAILURE;
    }
  };

  let start = Instant::now();
  let mut bundler = match Bundler::new(options) {
    Ok(bundler) => bundler,
    Err(errors) => {
      print_errors(errors.iter());
      return ExitCode::FAILURE;
    }
  };

  let output = match bundler.build().await {
    Ok(output) => output,
    Err(errors) => {
      print_errors(errors.iter());
      return ExitCode::FAILURE;
    }
  };
  if let Err(errors) = bundler.write_output(&output) {
    print_errors(errors.iter());
    return ExitCode::FAILURE;
  }

  if !silent {
    print_output(&output);
  }
  if !output.is_ok() {
    print_errors(output.failed.iter().map(|(_, err)| err));
    return ExitCode::FAILURE;
  }

  if !silent {
    let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
    println!("\n{} Finished in {}", Colour::Green.paint("✔"), Colour::White.bold().paint(elapsed));
  }
  ExitCode::SUCCESS
}
