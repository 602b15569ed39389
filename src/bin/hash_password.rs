use anyhow::Result;
use clap::Parser;

use merchant_api::auth::password::{hash_password, verify_password};

/// Generate an argon2 password hash for seeding admin accounts.
#[derive(Parser)]
#[command(name = "hash-password")]
struct Args {
    /// Password to hash
    password: String,

    /// Verify the hash after generating it
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let hash = hash_password(&args.password)?;
    println!("{}", hash);

    if args.check {
        let ok = verify_password(&hash, &args.password);
        eprintln!("verify: {}", if ok { "ok" } else { "FAILED" });
    }

    Ok(())
}
