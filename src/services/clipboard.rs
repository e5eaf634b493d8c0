use anyhow::{anyhow, Result};
use copypasta_ext::prelude::*;

use super::ServiceError;

/// The system clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    context: Option<Box<dyn ClipboardProviderExt>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&mut self) -> Result<&mut Box<dyn ClipboardProviderExt>> {
        if self.context.is_none() {
            self.context = copypasta_ext::try_context();
        }
        self.context.as_mut().ok_or_else(|| {
            ServiceError::Unsupported("System clipboard is not available on this platform.").into()
        })
    }

    pub fn read(&mut self) -> Result<String> {
        self.context()?
            .get_contents()
            .map_err(|e| anyhow!("{e}"))
    }

    pub fn write(&mut self, text: String) -> Result<()> {
        self.context()?
            .set_contents(text)
            .map_err(|e| anyhow!("{e}"))
    }
}
