//! # CLI Interface
//!
//! Defines the command-line argument structure for `veritas` using `clap`
//! derive. Six subcommands: `derive`, `sign`, `check`, `hash-credential`,
//! `demo` and `version`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// VERITAS attestation tools.
///
/// Local key derivation, signing and credential hashing for the VERITAS
/// replay-safe Schnorr protocol. Every invocation runs its own in-process
/// nonce registry; replay protection only means something inside one
/// long-lived authority, so `check` reports mathematical validity only.
#[derive(Parser, Debug)]
#[command(
    name = "veritas",
    about = "VERITAS replay-safe Schnorr attestation tools",
    version,
    propagate_version = true
)]
pub struct VeritasCli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the public key for a secret key.
    Derive(DeriveArgs),
    /// Sign a message and print the signature as JSON.
    Sign(SignArgs),
    /// Check the Schnorr equation of a signature (no replay state).
    Check(CheckArgs),
    /// Print the digest of a credential subject JSON document.
    HashCredential(HashCredentialArgs),
    /// Run sign / verify / replay end to end in one process.
    Demo,
    /// Print version information and exit.
    Version,
}

/// Where the secret key comes from.
#[derive(Args, Debug)]
pub struct SecretKeyArg {
    /// Hex-encoded 32-byte secret key (big-endian scalar).
    ///
    /// **Avoid passing real keys on the command line**; prefer the
    /// environment variable.
    #[arg(long, env = "VERITAS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,
}

/// A message given either as UTF-8 text or as hex bytes.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct MessageArg {
    /// Message as UTF-8 text.
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Message as hex bytes.
    #[arg(long)]
    pub message_hex: Option<String>,
}

/// Arguments for the `derive` subcommand.
#[derive(Parser, Debug)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub key: SecretKeyArg,

    /// Also print the 32-byte compressed encoding.
    #[arg(long)]
    pub compressed: bool,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub key: SecretKeyArg,

    #[command(flatten)]
    pub message: MessageArg,

    /// Authority configuration (JSON). Selects the nonce context.
    #[arg(long, short = 'c', env = "VERITAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hash the message before signing, so messages longer than 32 bytes
    /// are bound in full instead of truncated.
    #[arg(long)]
    pub prehash: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub message: MessageArg,

    /// Signature JSON file, or `-` for stdin.
    #[arg(long, short = 's')]
    pub signature: PathBuf,

    /// The message was prehashed at signing time.
    #[arg(long)]
    pub prehash: bool,
}

/// Arguments for the `hash-credential` subcommand.
#[derive(Parser, Debug)]
pub struct HashCredentialArgs {
    /// Credential subject JSON file, or `-` for stdin.
    pub subject: PathBuf,
}
