// Generates an RSA public/private key pair

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rsakit::keyfile;
use rsakit::keygen::{self, PrivateKey, PublicKey};

#[derive(Parser, Debug)]
#[command(name = "rsakit-keygen", version, about = "Generate an RSA public/private key pair")]
struct Args {
    /// Minimum bits needed for the public modulus n
    #[arg(short, long, default_value_t = 256)]
    bits: u64,

    /// Miller-Rabin iterations for testing primes
    #[arg(short, long, default_value_t = 50)]
    confidence: u64,

    /// Public key file
    #[arg(short = 'n', long, default_value = "rsa.pub")]
    public: PathBuf,

    /// Private key file
    #[arg(short = 'd', long, default_value = "rsa.priv")]
    private: PathBuf,

    /// Random seed, for reproducible key material
    #[arg(short, long)]
    seed: Option<u64>,

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

    if args.bits < 32 {
        anyhow::bail!("modulus of {} bits is too narrow to frame a data block", args.bits);
    }

    let mut rng = match args.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let username = env::var("USER").context("USER environment variable is not set")?;

    let (p, q, n, e) = keygen::make_public(args.bits, args.confidence, &mut rng);
    let d = keygen::make_private(&e, &p, &q)?;
    let s = keygen::sign(&keygen::username_to_int(&username), &d, &n);

    info!("user = {}", username);
    info!("s ({} bits) = {}", s.bits(), s);
    info!("p ({} bits) = {}", p.bits(), p);
    info!("q ({} bits) = {}", q.bits(), q);
    info!("n ({} bits) = {}", n.bits(), n);
    info!("e ({} bits) = {}", e.bits(), e);
    info!("d ({} bits) = {}", d.bits(), d);

    let public = PublicKey {
        n: n.clone(),
        e,
        signature: s,
        username,
    };
    let private = PrivateKey { n, d };

    keyfile::write_public(&args.public, &public)
        .with_context(|| format!("cannot write public key to {}", args.public.display()))?;
    keyfile::write_private(&args.private, &private)
        .with_context(|| format!("cannot write private key to {}", args.private.display()))?;

    Ok(())
}
