// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # VERITAS Command-Line Tools
//!
//! Entry point for the `veritas` binary. Parses CLI arguments, initializes
//! logging, and dispatches to one of:
//!
//! - `derive`          — secret key → public key
//! - `sign`            — sign a message, print signature JSON
//! - `check`           — check the Schnorr equation of a signature
//! - `hash-credential` — digest of a credential subject
//! - `demo`            — sign, verify and replay in one process
//! - `version`         — build version information

mod cli;
mod logging;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use veritas_protocol::attestation::Authority;
use veritas_protocol::config::{AuthorityConfig, CURVE_NAME, PROTOCOL_FINGERPRINT, PROTOCOL_VERSION};
use veritas_protocol::crypto::encoding::{is_truncated, prehash};
use veritas_protocol::crypto::keys::VeritasKeypair;
use veritas_protocol::crypto::signatures::{verify_equation, Signature};
use veritas_protocol::identity::{hash_credential_subject, CredentialSubject};
use veritas_protocol::nonce::{NonceContext, NonceRegistry};

use cli::{Commands, MessageArg, SecretKeyArg, VeritasCli};

fn main() -> Result<()> {
    let cli = VeritasCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format.into());

    match cli.command {
        Commands::Derive(args) => derive(args),
        Commands::Sign(args) => sign(args),
        Commands::Check(args) => check(args),
        Commands::HashCredential(args) => hash_credential(args),
        Commands::Demo => demo(),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn derive(args: cli::DeriveArgs) -> Result<()> {
    for line in derive_lines(&args)? {
        println!("{line}");
    }
    Ok(())
}

/// Hex public key, followed by the compressed form when requested.
fn derive_lines(args: &cli::DeriveArgs) -> Result<Vec<String>> {
    let pk = load_keypair(&args.key)?.public_key();

    let mut lines = vec![pk.to_hex()];
    if args.compressed {
        lines.push(hex::encode(pk.to_compressed()));
    }
    Ok(lines)
}

fn sign(args: cli::SignArgs) -> Result<()> {
    let signature = sign_message(&args)?;
    println!("{}", signature.to_json()?);
    Ok(())
}

fn sign_message(args: &cli::SignArgs) -> Result<Signature> {
    let keypair = load_keypair(&args.key)?;
    let message = message_bytes(&args.message, args.prehash)?;

    if is_truncated(&message) {
        tracing::warn!(
            len = message.len(),
            "message is longer than 32 bytes and will be truncated; consider --prehash"
        );
    }

    let config = match &args.config {
        Some(path) => AuthorityConfig::from_json(&read_input(path)?)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AuthorityConfig::default(),
    };
    let authority = Authority::from_config(&config, Arc::new(NonceRegistry::new()))
        .context("invalid authority config")?;

    authority
        .sign(&message, &keypair.secret_key_bytes())
        .context("signing failed")
}

fn check(args: cli::CheckArgs) -> Result<()> {
    let signature = check_signature(&args)?;
    println!("valid (pk={}, nonce={})", signature.pk.short_hex(), signature.nonce);
    Ok(())
}

/// Parse the signature file and check its equation against the message.
fn check_signature(args: &cli::CheckArgs) -> Result<Signature> {
    let message = message_bytes(&args.message, args.prehash)?;
    let json = read_input(&args.signature)?;
    let signature = Signature::from_json(&json)
        .with_context(|| format!("failed to parse signature {}", args.signature.display()))?;

    if !verify_equation(&message, &signature) {
        bail!("signature equation does not hold");
    }
    Ok(signature)
}

fn hash_credential(args: cli::HashCredentialArgs) -> Result<()> {
    println!("{}", credential_digest(&args)?);
    Ok(())
}

fn credential_digest(args: &cli::HashCredentialArgs) -> Result<String> {
    let json = read_input(&args.subject)?;
    let subject: CredentialSubject = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse credential subject {}", args.subject.display()))?;

    if subject.has_truncated_fields() {
        tracing::warn!("credential subject has fields longer than 32 bytes; they are truncated");
    }
    Ok(hex::encode(hash_credential_subject(&subject)))
}

/// The three canonical scenarios, narrated.
fn demo() -> Result<()> {
    let authority = Authority::standalone(NonceContext::default());
    let sk = [0x11u8; 32];

    let pk = authority.derive_public_key(&sk)?;
    println!("public key        : {}", pk.to_hex());

    let sig = authority.sign(b"Test message", &sk)?;
    println!("signature nonce   : {}", sig.nonce);
    println!("verify            : {}", authority.verify(b"Test message", &sig));
    println!("verify (replay)   : {}", authority.verify(b"Test message", &sig));

    let sig1 = authority.sign(b"msg1", &sk)?;
    let sig2 = authority.sign(b"msg2", &sk)?;
    println!("nonces msg1/msg2  : {} / {}", sig1.nonce, sig2.nonce);
    println!("verify msg1, sig2 : {}", authority.verify(b"msg1", &sig2));

    let subject = CredentialSubject::new(
        CredentialSubject::new_id(),
        "Ada",
        "Lovelace",
        [0x42; 32],
        631_152_000,
    );
    let signed = authority.sign_credential_subject(&subject, &sk)?;
    let mut tampered = signed.clone();
    tampered.subject.first_name = "Eve".into();
    println!(
        "credential digest : {}",
        hex::encode(authority.hash_credential_subject(&subject))
    );
    println!(
        "verify tampered   : {}",
        authority.verify_signed_credential(&tampered)
    );
    println!(
        "verify original   : {}",
        authority.verify_signed_credential(&signed)
    );
    println!(
        "verify (replay)   : {}",
        authority.verify_signed_credential(&signed)
    );
    Ok(())
}

fn load_keypair(arg: &SecretKeyArg) -> Result<VeritasKeypair> {
    VeritasKeypair::from_hex(&arg.secret_key).context("invalid secret key")
}

fn message_bytes(arg: &MessageArg, hashed: bool) -> Result<Vec<u8>> {
    let raw = match (&arg.message, &arg.message_hex) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(hex_str)) => hex::decode(hex_str.trim()).context("message is not valid hex")?,
        (None, None) => bail!("a message is required"),
    };
    Ok(if hashed { prehash(&raw).to_vec() } else { raw })
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Prints version information to stdout.
fn print_version() {
    println!("veritas   {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  {} ({})", PROTOCOL_VERSION, PROTOCOL_FINGERPRINT);
    println!("curve     {}", CURVE_NAME);
}
