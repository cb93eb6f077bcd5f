//! Outil CLI pour chiffrer le secret partagé de RadioBot
//!
//! Usage:
//!   cargo run --example encrypt_secret -- encrypt "mon_secret"
//!   cargo run --example encrypt_secret -- decrypt "encrypted:ABC123..."
//!   cargo run --example encrypt_secret -- store "mon_secret"

use anyhow::{bail, Result};
use rbconfig::{
    encryption::{decrypt_secret, encrypt_secret, is_encrypted},
    get_config,
};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let (Some(command), Some(value)) = (args.get(1), args.get(2)) else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "encrypt" => {
            let encrypted = encrypt_secret(value)?;
            println!("Encrypted: {}", encrypted);
            println!("\nAdd this to your config.yaml:");
            println!("radio:\n  push_secret: \"{}\"", encrypted);
        }

        "decrypt" => {
            if !is_encrypted(value) {
                bail!("Value does not start with 'encrypted:'");
            }
            match decrypt_secret(value) {
                Ok(secret) => println!("Decrypted: {}", secret),
                Err(e) => {
                    eprintln!("Error: failed to decrypt secret");
                    eprintln!("This value was probably encrypted on a different machine.");
                    eprintln!("Details: {}", e);
                }
            }
        }

        "store" => {
            let config = get_config();
            config.set_push_secret(value)?;
            println!(
                "Push secret stored (encrypted) in {}/config.yaml",
                config.get_config_dir()
            );
        }

        other => {
            eprintln!("Error: Unknown command '{}'", other);
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Usage:");
    println!("  cargo run --example encrypt_secret -- encrypt <secret>");
    println!("  cargo run --example encrypt_secret -- decrypt <encrypted>");
    println!("  cargo run --example encrypt_secret -- store <secret>");
}
