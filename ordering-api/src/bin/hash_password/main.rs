use anyhow::Context;
use auth::PasswordHasher;

/// Prints an argon2 hash suitable for a `[[users]]` entry.
fn main() -> Result<(), anyhow::Error> {
    let password = std::env::args()
        .nth(1)
        .context("usage: hash-password <password>")?;

    let hash = PasswordHasher::new()
        .hash(&password)
        .context("failed to hash password")?;

    println!("{}", hash);
    Ok(())
}
