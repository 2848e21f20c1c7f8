//! Example: Verify a Sigstore bundle against a trusted root
//!
//! # Usage
//!
//! Verify a certificate-signed bundle over an artifact:
//! ```sh
//! cargo run -p sigstore-verify --example verify_bundle -- \
//!     trusted_root.json artifact.sigstore.json artifact.txt
//! ```
//!
//! Verify with identity requirements:
//! ```sh
//! cargo run -p sigstore-verify --example verify_bundle -- \
//!     --certificate-identity "https://github.com/owner/repo/.github/workflows/release.yml@refs/tags/v1.0.0" \
//!     --certificate-oidc-issuer "https://token.actions.githubusercontent.com" \
//!     trusted_root.json artifact.sigstore.json artifact.txt
//! ```
//!
//! Verify a bundle signed with a managed key:
//! ```sh
//! cargo run -p sigstore-verify --example verify_bundle -- \
//!     --key release.pub --skip-tlog trusted_root.json artifact.sigstore.json artifact.txt
//! ```
//!
//! Set `RUST_LOG=sigstore_verify=debug` to see why individual SCTs or log
//! entries were rejected.

use sigstore_trust_root::TrustedRoot;
use sigstore_types::Bundle;
use sigstore_verify::{
    CertificateIdentity, SignedEntryTimestampVerifier, SignerPolicy, VerificationOptions,
    VerifiedSigner, Verifier,
};
use tracing_subscriber::EnvFilter;

use std::env;
use std::fs;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut identity: Option<String> = None;
    let mut issuer: Option<String> = None;
    let mut key_path: Option<String> = None;
    let mut options = VerificationOptions::default();
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--certificate-identity" | "-i" => {
                identity = Some(option_value(&args, &mut i));
            }
            "--certificate-oidc-issuer" | "-o" => {
                issuer = Some(option_value(&args, &mut i));
            }
            "--key" | "-k" => {
                key_path = Some(option_value(&args, &mut i));
            }
            "--skip-tlog" => options = options.skip_tlog(),
            "--skip-ctlog" => options = options.skip_ctlog(),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                positional.push(arg.to_string());
            }
            unknown => {
                eprintln!("Error: Unknown option: {}", unknown);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if positional.len() < 2 || positional.len() > 3 {
        eprintln!("Error: Expected a trusted root, a bundle and an optional artifact");
        print_usage(&args[0]);
        process::exit(1);
    }

    let root_path = &positional[0];
    let bundle_path = &positional[1];

    let trusted_root = match TrustedRoot::from_file(root_path) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error loading trusted root '{}': {}", root_path, e);
            process::exit(1);
        }
    };

    let bundle_json = match fs::read_to_string(bundle_path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error reading bundle '{}': {}", bundle_path, e);
            process::exit(1);
        }
    };
    let bundle = match Bundle::from_json(&bundle_json) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error parsing bundle: {}", e);
            process::exit(1);
        }
    };

    let artifact = match positional.get(2) {
        Some(path) => match fs::read(path) {
            Ok(data) => Some(data),
            Err(e) => {
                eprintln!("Error reading artifact '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => None,
    };

    if let Some(san) = &identity {
        let expected = match &issuer {
            Some(iss) => CertificateIdentity::new(san, iss),
            None => CertificateIdentity::any_issuer(san),
        };
        options = options.with_signers(SignerPolicy::CertificateIdentities(vec![expected]));
    }

    let mut verifier = Verifier::new(&trusted_root)
        .with_tlog_verifier(SignedEntryTimestampVerifier::new(&trusted_root));
    if let Some(path) = &key_path {
        let pem = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading key '{}': {}", path, e);
                process::exit(1);
            }
        };
        // The example holds a single key, so every hint resolves to it
        verifier = verifier.with_key_selector(move |_: &str| Some(pem.clone()));
    }

    println!("Verifying bundle...");
    println!("  Trusted root: {}", root_path);
    println!("  Bundle: {}", bundle_path);
    println!("  Media Type: {}", bundle.media_type);
    if let Some(path) = positional.get(2) {
        println!("  Artifact: {}", path);
    }
    if let Some(id) = &identity {
        println!("  Required Identity: {}", id);
    }
    if let Some(iss) = &issuer {
        println!("  Required Issuer: {}", iss);
    }

    match verifier.verify(&bundle, &options, artifact.as_deref()) {
        Ok(result) => {
            println!("\nVerification: SUCCESS");
            match &result.signer {
                VerifiedSigner::Certificate {
                    identity, issuer, ..
                } => {
                    if let Some(id) = identity {
                        println!("  Identity: {}", id);
                    }
                    if let Some(iss) = issuer {
                        println!("  Issuer: {}", iss);
                    }
                }
                VerifiedSigner::PublicKey { hint } => {
                    println!("  Key hint: {}", hint);
                }
            }
            if let Some(count) = result.verified_scts {
                println!("  Verified SCTs: {}", count);
            }
            if let Some(count) = result.verified_tlog_entries {
                println!("  Verified log entries: {}", count);
            }
        }
        Err(e) => {
            eprintln!("\nVerification: FAILED [{}]", e.code());
            eprintln!("  {}", e);
            process::exit(1);
        }
    }
}

fn option_value(args: &[String], i: &mut usize) -> String {
    let name = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires a value", name);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} [OPTIONS] <TRUSTED_ROOT> <BUNDLE> [ARTIFACT]",
        program
    );
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <TRUSTED_ROOT>  Path to a trusted_root.json");
    eprintln!("  <BUNDLE>        Path to the Sigstore bundle (.sigstore.json)");
    eprintln!("  [ARTIFACT]      Artifact the bundle signs (required for message signatures)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -i, --certificate-identity <ID>        Required certificate identity");
    eprintln!("  -o, --certificate-oidc-issuer <ISSUER> Required OIDC issuer");
    eprintln!("  -k, --key <PEM>                        Public key for bundles signed with a key");
    eprintln!("      --skip-tlog                        Skip transparency log checks");
    eprintln!("      --skip-ctlog                       Skip Certificate Transparency checks");
    eprintln!("  -h, --help                             Print this help message");
}
