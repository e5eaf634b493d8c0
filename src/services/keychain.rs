use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Command;

use super::{SecretStore, ServiceError};

const SECURITY_BIN: &str = "/usr/bin/security";
const SERVICE: &str = "tuiman";

/// Secrets kept as generic passwords in the macOS login keychain, one
/// account per secret ref under the `tuiman` service.
pub struct Keychain {
    program: PathBuf,
    service: String,
    supported: bool,
}

impl Default for Keychain {
    fn default() -> Self {
        Self::new()
    }
}

impl Keychain {
    /// The system keychain; unsupported anywhere but macOS.
    pub fn new() -> Self {
        Self {
            supported: cfg!(target_os = "macos"),
            ..Self::with_program(PathBuf::from(SECURITY_BIN))
        }
    }

    /// Use a different `security`-compatible binary.
    pub fn with_program(program: PathBuf) -> Self {
        Self {
            program,
            service: SERVICE.to_string(),
            supported: true,
        }
    }

    fn check_supported(&self) -> Result<()> {
        if !self.supported {
            return Err(ServiceError::Unsupported("Secret storage is supported on macOS only.").into());
        }
        Ok(())
    }
}

impl SecretStore for Keychain {
    fn get(&self, secret_ref: &str) -> Result<Option<String>> {
        self.check_supported()?;
        if secret_ref.is_empty() {
            return Ok(None);
        }
        let output = Command::new(&self.program)
            .args(["find-generic-password", "-a", secret_ref, "-s", &self.service, "-w"])
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    fn set(&self, secret_ref: &str, value: &str) -> Result<()> {
        self.check_supported()?;
        if secret_ref.is_empty() {
            bail!("secret ref is required");
        }
        let status = Command::new(&self.program)
            .args([
                "add-generic-password",
                "-a",
                secret_ref,
                "-s",
                &self.service,
                "-w",
                value,
                "-U",
            ])
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?
            .status;
        if !status.success() {
            bail!("failed to store keychain secret for {secret_ref}");
        }
        Ok(())
    }
}
