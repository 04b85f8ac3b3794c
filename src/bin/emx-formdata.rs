//! emx-formdata CLI
//!
//! Build a multipart/form-data body from fields and files (similar to curl -F).

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use emx_formdata::{mime, Boundary, EncodedBody, Encoder, EncoderConfig, FormData};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "emx-formdata")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "multipart/form-data body builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a request body; the Content-Type value goes to stderr
    Build {
        /// Text field, NAME=VALUE
        #[arg(short = 'f', long = "field", value_parser = parse_field_spec)]
        fields: Vec<(String, String)>,

        /// File attachment, NAME=PATH or NAME=PATH;filename=FILENAME
        #[arg(short = 'F', long = "file", value_parser = parse_file_spec)]
        files: Vec<FileSpec>,

        /// Attach every file under a directory, NAME=DIR
        #[arg(short = 'd', long = "dir", value_parser = parse_field_spec)]
        dirs: Vec<(String, String)>,

        /// Output file for the body (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Write the body base64 encoded
        #[arg(long)]
        base64: bool,

        /// Use this boundary instead of a random one
        #[arg(long)]
        boundary: Option<String>,

        /// Regenerate the boundary if it occurs in the content
        #[arg(long)]
        check_collisions: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the MIME type used for file names
    Mime {
        /// File names to resolve
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// A `--file` argument
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileSpec {
    name: String,
    path: PathBuf,
    file_name: Option<String>,
}

fn parse_field_spec(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("empty field name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

fn parse_file_spec(s: &str) -> Result<FileSpec, String> {
    let (name, rest) = parse_field_spec(s)?;
    let (path, file_name) = match rest.split_once(";filename=") {
        Some((path, file_name)) => (path.to_string(), Some(file_name.to_string())),
        None => (rest, None),
    };
    if path.is_empty() {
        return Err(format!("empty path in '{}'", s));
    }
    Ok(FileSpec {
        name,
        path: PathBuf::from(path),
        file_name,
    })
}

fn init_tracing(verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(if verbose { "debug" } else { "info" }))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            fields,
            files,
            dirs,
            output,
            base64,
            boundary,
            check_collisions,
            verbose,
        } => {
            init_tracing(verbose)?;
            let form = build_form(fields, files, dirs, verbose)?;
            let body = encode_form(&form, boundary, check_collisions)?;
            write_body(&body, output, base64, verbose)?;
        }
        Commands::Mime { names } => {
            for name in names {
                println!("{}  {}", name, mime::mime_for_file_name(&name));
            }
        }
    }

    Ok(())
}

fn build_form(
    fields: Vec<(String, String)>,
    files: Vec<FileSpec>,
    dirs: Vec<(String, String)>,
    verbose: bool,
) -> Result<FormData> {
    let mut form = FormData::new();

    for (name, value) in fields {
        form.append(name, value);
    }

    for spec in &files {
        form.try_append_file(spec.name.as_str(), &spec.path, spec.file_name.as_deref())
            .with_context(|| format!("Failed to attach file for field '{}'", spec.name))?;

        if verbose {
            eprintln!("Added: {} -> {}", spec.name, spec.path.display());
        }
    }

    for (name, dir) in &dirs {
        add_directory(&mut form, name, Path::new(dir), verbose)?;
    }

    Ok(form)
}

fn add_directory(form: &mut FormData, name: &str, dir: &Path, verbose: bool) -> Result<()> {
    let entries = walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect::<Vec<_>>();

    for entry in entries {
        let path = entry.path();

        let relative_path = path.strip_prefix(dir)
            .map_err(|_| anyhow::anyhow!("Failed to get relative path"))?;
        let file_name = relative_path.to_string_lossy().replace('\\', "/");

        form.try_append_file(name, path, Some(&file_name))
            .with_context(|| format!("Failed to read: {}", path.display()))?;

        if verbose {
            eprintln!("Added: {} -> {}", name, file_name);
        }
    }

    Ok(())
}

fn encode_form(form: &FormData, boundary: Option<String>, check_collisions: bool) -> Result<EncodedBody> {
    let encoder = Encoder::with_config(EncoderConfig {
        regenerate_on_collision: check_collisions,
        ..Default::default()
    });

    let body = match boundary {
        Some(value) => {
            let boundary = Boundary::new(value).context("Invalid --boundary")?;
            encoder.encode_form_with_boundary(form, boundary)
        }
        None => encoder.encode(form),
    };

    Ok(body)
}

fn write_body(body: &EncodedBody, output: Option<PathBuf>, base64: bool, verbose: bool) -> Result<()> {
    let data = if base64 {
        base64::engine::general_purpose::STANDARD
            .encode(body.buffer())
            .into_bytes()
    } else {
        body.buffer().to_vec()
    };

    if let Some(output_path) = output {
        fs::write(&output_path, &data)
            .with_context(|| format!("Failed to write: {}", output_path.display()))?;

        if verbose {
            eprintln!("Created: {} ({} bytes)", output_path.display(), data.len());
        }
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&data)?;
        stdout.flush()?;
    }

    eprintln!("Content-Type: {}", body.content_type());
    Ok(())
}
