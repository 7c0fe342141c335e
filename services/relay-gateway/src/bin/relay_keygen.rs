//! relay-keygen - generate an Ed25519 keypair for seal signing
//!
//! Prints the private key (seed plus public key, base64) for
//! `RELAY_PRIVATE_KEY` and the public key downstream verifiers can pin.

use relay_crypto::SealKeypair;

fn main() {
    let keypair = SealKeypair::generate();

    println!("Generated Ed25519 keypair for Relay seal signing\n");
    println!("RELAY_PRIVATE_KEY={}", keypair.private_key_base64());
    println!("PUBLIC_KEY={}", keypair.public_key_base64());
    println!("\nStore the private key in your secret provider; the public key");
    println!("is embedded in every seal and safe to distribute.");
}
