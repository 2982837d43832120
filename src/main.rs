//! Veilbyte - hide encrypted files inside images and audio
//!
//! CLI over the veilbyte library: hide a secret file in an image or WAV
//! carrier, extract it with the matching private key, generate RSA key
//! pairs, and measure how much a carrier changed.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use veilbyte::crypto::{load_private_key, load_public_key, KeyPair, DEFAULT_KEY_BITS};
use veilbyte::quality::psnr;
use veilbyte::{extract, hide, AudioCarrier, ImageCarrier};

/// Veilbyte - hide encrypted files inside images and audio
#[derive(Parser)]
#[command(name = "veilbyte")]
#[command(version)]
#[command(about = "Hide encrypted files inside images and audio")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a secret file inside an image or WAV carrier
    Hide {
        /// Path to the host image (.png/.bmp/.tga/.tif) or audio (.wav)
        #[arg(short, long)]
        carrier: PathBuf,

        /// Path to the secret file to hide
        #[arg(short, long)]
        secret: PathBuf,

        /// Path to the recipient's RSA public key (PEM)
        #[arg(short, long)]
        key: PathBuf,

        /// Path for the output carrier with embedded data
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite the output file without asking
        #[arg(short, long)]
        force: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract a hidden file from a carrier
    Extract {
        /// Path to the carrier with embedded data
        #[arg(short, long)]
        carrier: PathBuf,

        /// Path to your RSA private key (PEM)
        #[arg(short, long)]
        key: PathBuf,

        /// Passphrase for an encrypted private key
        #[arg(short, long)]
        passphrase: Option<String>,

        /// Output path (defaults to the embedded filename)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file without asking
        #[arg(short, long)]
        force: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate an RSA key pair as <prefix>.pub and <prefix>.key
    Keygen {
        /// Output prefix for the key files
        #[arg(short, long, default_value = "veilbyte")]
        output: PathBuf,

        /// Modulus size in bits
        #[arg(short, long, default_value_t = DEFAULT_KEY_BITS)]
        bits: usize,

        /// Encrypt the private key with this passphrase
        #[arg(short, long)]
        passphrase: Option<String>,
    },

    /// Measure PSNR between an original carrier and its embedded copy
    Psnr {
        /// Path to the original carrier
        #[arg(short, long)]
        original: PathBuf,

        /// Path to the modified carrier
        #[arg(short, long)]
        modified: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hide {
            carrier,
            secret,
            key,
            output,
            force,
            verbose,
        } => hide_cmd(&carrier, &secret, &key, &output, force, verbose),

        Commands::Extract {
            carrier,
            key,
            passphrase,
            output,
            force,
            verbose,
        } => extract_cmd(&carrier, &key, passphrase.as_deref(), output.as_deref(), force, verbose),

        Commands::Keygen {
            output,
            bits,
            passphrase,
        } => keygen_cmd(&output, bits, passphrase.as_deref()),

        Commands::Psnr { original, modified } => psnr_cmd(&original, &modified),
    }
}

/// Returns true when the path looks like a WAV carrier.
fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("wav"))
}

/// Asks before clobbering an existing file, unless `force` is set.
fn confirm_overwrite(path: &Path, force: bool) -> Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }

    eprint!(
        "The file '{}' already exists. Overwrite? (y/n): ",
        path.display()
    );
    std::io::stderr().flush().ok();

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read answer")?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn hide_cmd(
    carrier_path: &Path,
    secret_path: &Path,
    key_path: &Path,
    output: &Path,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let public_key = load_public_key(key_path)
        .with_context(|| format!("Failed to load public key from {}", key_path.display()))?;

    let secret = std::fs::read(secret_path)
        .with_context(|| format!("Failed to read secret file {}", secret_path.display()))?;

    let filename = secret_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("secret");

    if !confirm_overwrite(output, force)? {
        eprintln!("Cancelled.");
        return Ok(());
    }

    let report = if is_wav(carrier_path) {
        let mut carrier = AudioCarrier::from_file(carrier_path)
            .with_context(|| format!("Failed to load carrier {}", carrier_path.display()))?;
        let report = hide(&mut carrier, &secret, filename.as_bytes(), &public_key)?;
        carrier
            .save(output)
            .with_context(|| format!("Failed to save {}", output.display()))?;
        report
    } else {
        let mut carrier = ImageCarrier::from_file(carrier_path)
            .with_context(|| format!("Failed to load carrier {}", carrier_path.display()))?;
        let report = hide(&mut carrier, &secret, filename.as_bytes(), &public_key)?;
        carrier
            .save(output)
            .with_context(|| format!("Failed to save {}", output.display()))?;
        report
    };

    if verbose {
        eprintln!(
            "Envelope of {} bytes occupies {} of {} carrier cells ({:.1}%)",
            report.envelope_len,
            report.cells_used,
            report.capacity,
            report.cells_used as f64 / report.capacity as f64 * 100.0
        );
    }

    println!(
        "File '{}' has been hidden in '{}'.",
        secret_path.display(),
        output.display()
    );

    Ok(())
}

fn extract_cmd(
    carrier_path: &Path,
    key_path: &Path,
    passphrase: Option<&str>,
    output: Option<&Path>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let private_key = load_private_key(key_path, passphrase)
        .with_context(|| format!("Failed to load private key from {}", key_path.display()))?;

    let secret = if is_wav(carrier_path) {
        let carrier = AudioCarrier::from_file(carrier_path)
            .with_context(|| format!("Failed to load carrier {}", carrier_path.display()))?;
        extract(&carrier, &private_key)?
    } else {
        let carrier = ImageCarrier::from_file(carrier_path)
            .with_context(|| format!("Failed to load carrier {}", carrier_path.display()))?;
        extract(&carrier, &private_key)?
    };

    if verbose {
        eprintln!(
            "Recovered {} bytes stored as '{}'",
            secret.data.len(),
            secret.filename
        );
    }

    // Keep only the file-name component of the embedded name; a hostile
    // envelope must not steer the write outside the working directory
    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => Path::new(&secret.filename)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("extracted.bin")),
    };

    if !confirm_overwrite(&output_path, force)? {
        eprintln!("Cancelled.");
        return Ok(());
    }

    std::fs::write(&output_path, &secret.data)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("File extracted to {}", output_path.display());

    Ok(())
}

fn keygen_cmd(output: &Path, bits: usize, passphrase: Option<&str>) -> Result<()> {
    eprintln!("Generating {bits}-bit RSA key pair...");

    let pair = KeyPair::generate(bits).context("Key generation failed")?;
    let (pub_path, key_path) = pair
        .save_to_files(output, passphrase)
        .context("Failed to save key pair")?;

    println!("Key pair generated:");
    println!("  Public key:  {}", pub_path.display());
    println!("  Private key: {}", key_path.display());
    println!();
    println!("Share the public key with anyone who should hide files for you.");
    if passphrase.is_some() {
        println!("The private key is passphrase-protected.");
    } else {
        println!("Keep the private key secret and secure.");
    }

    Ok(())
}

fn psnr_cmd(original: &Path, modified: &Path) -> Result<()> {
    if is_wav(original) != is_wav(modified) {
        bail!("Carriers must be of the same media type");
    }

    let value = if is_wav(original) {
        let a = AudioCarrier::from_file(original)
            .with_context(|| format!("Failed to load {}", original.display()))?;
        let b = AudioCarrier::from_file(modified)
            .with_context(|| format!("Failed to load {}", modified.display()))?;

        let peak = ((1u64 << a.spec().bits_per_sample) - 1) as f64;
        psnr(&a.samples_f64(), &b.samples_f64(), peak)
    } else {
        let a = ImageCarrier::from_file(original)
            .with_context(|| format!("Failed to load {}", original.display()))?;
        let b = ImageCarrier::from_file(modified)
            .with_context(|| format!("Failed to load {}", modified.display()))?;

        let to_f64 = |carrier: &ImageCarrier| -> Vec<f64> {
            carrier.raw_samples().iter().map(|&s| f64::from(s)).collect()
        };
        psnr(&to_f64(&a), &to_f64(&b), 255.0)
    };

    match value {
        Some(db) if db.is_infinite() => println!("PSNR: inf dB (carriers are identical)"),
        Some(db) => println!("PSNR: {db:.2} dB"),
        None => bail!("Carriers have different sample counts"),
    }

    Ok(())
}
