use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use rollcall_core::{EncryptedEnvelope, encrypt, is_encrypted, load_from_text};

use super::{read_text, write_text};
use crate::output::OutputTarget;

const SHORT_PASSPHRASE: usize = 6;

/// Use the `--passphrase` value, or ask on the terminal. Encryption asks twice.
pub fn resolve_passphrase(given: Option<String>, confirm: bool) -> Result<String> {
    let passphrase = match given {
        Some(passphrase) => passphrase,
        None => {
            let stdin = std::io::stdin();
            prompt_passphrase(&mut stdin.lock(), &mut std::io::stderr(), confirm)?
        }
    };
    if passphrase.is_empty() {
        bail!("a non-empty passphrase is required");
    }
    if confirm && passphrase.chars().count() < SHORT_PASSPHRASE {
        eprintln!(
            "{}",
            format!("⚠️  Passphrase is shorter than {SHORT_PASSPHRASE} characters").yellow()
        );
    }
    Ok(passphrase)
}

fn prompt_passphrase(
    input: &mut impl BufRead,
    prompt: &mut impl Write,
    confirm: bool,
) -> Result<String> {
    let passphrase = read_line(input, prompt, "Passphrase: ")?;
    if confirm && !passphrase.is_empty() {
        let again = read_line(input, prompt, "Confirm passphrase: ")?;
        if again != passphrase {
            bail!("passphrases do not match");
        }
    }
    Ok(passphrase)
}

fn read_line(input: &mut impl BufRead, prompt: &mut impl Write, label: &str) -> Result<String> {
    write!(prompt, "{label}")?;
    prompt.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read passphrase")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn encrypt_file(input: &Path, output: &Path, passphrase: &str) -> Result<()> {
    if passphrase.is_empty() {
        bail!("a non-empty passphrase is required");
    }
    let text = read_text(input)?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;
    if is_encrypted(&raw) {
        bail!("{} is already encrypted", input.display());
    }
    let document = load_from_text(&text, None)
        .with_context(|| format!("{} is not a roster document", input.display()))?;
    log::debug!(
        "sealing {} entries",
        document.entries.as_ref().map_or(0, Vec::len)
    );

    let envelope = encrypt(&text, passphrase, &mut rand::thread_rng())?;
    write_text(output, &serde_json::to_string_pretty(&envelope)?)?;
    println!("🔒 Encrypted {} into {}", input.display(), output.display());
    Ok(())
}

pub fn decrypt_file(input: &Path, passphrase: &str, output: Option<PathBuf>) -> Result<()> {
    let text = read_text(input)?;
    let envelope: EncryptedEnvelope = serde_json::from_str(&text)
        .with_context(|| format!("{} is not an encrypted envelope", input.display()))?;
    let plaintext = envelope.open(passphrase).context("could not open envelope")?;

    let mut target = OutputTarget::new(output.clone())?;
    writeln!(target, "{plaintext}")?;
    target.flush()?;
    if let Some(path) = output {
        eprintln!("🔓 Decrypted into {}", path.display().to_string().green());
    }
    Ok(())
}
