// Encrypts data using an RSA public key
// Verifies the key's embedded username signature before touching any data

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rsakit::{encrypt, keyfile};

#[derive(Parser, Debug)]
#[command(name = "rsakit-encrypt", version, about = "Encrypt data using RSA encryption")]
struct Args {
    /// Input file of data to encrypt (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file for encrypted data (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Public key file
    #[arg(short = 'n', long, default_value = "rsa.pub")]
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

    let public = keyfile::read_public(&args.key)
        .with_context(|| format!("cannot read public key from {}", args.key.display()))?;

    info!("user = {}", public.username);
    info!("s ({} bits) = {}", public.signature.bits(), public.signature);
    info!("n ({} bits) = {}", public.n.bits(), public.n);
    info!("e ({} bits) = {}", public.e.bits(), public.e);

    if !public.verify_identity() {
        anyhow::bail!("signature verification failed for user {:?}; refusing to encrypt", public.username);
    }

    let mut input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    };
    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };

    encrypt::encrypt_stream(&mut input, &mut output, &public.n, &public.e)?;
    output.flush()?;

    Ok(())
}
