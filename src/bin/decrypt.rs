// Decrypts data using an RSA private key

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rsakit::{decrypt, keyfile};

#[derive(Parser, Debug)]
#[command(name = "rsakit-decrypt", version, about = "Decrypt data using RSA decryption")]
struct Args {
    /// Input file of data to decrypt (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file for decrypted data (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Private key file
    #[arg(short = 'n', long, default_value = "rsa.priv")]
    key: PathBuf,

    /// Display key components and their bit lengths
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if args.verbose { "info" } else { "warn" })
        }))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let private = keyfile::read_private(&args.key)
        .with_context(|| format!("cannot read private key from {}", args.key.display()))?;

    info!("n ({} bits) = {}", private.n.bits(), private.n);
    info!("d ({} bits) = {}", private.d.bits(), private.d);

    let mut input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };

    decrypt::decrypt_stream(&mut input, &mut output, &private.n, &private.d)?;
    output.flush()?;

    Ok(())
}
