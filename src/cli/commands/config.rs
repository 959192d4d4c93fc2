use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::config::LabelFlowConfig;

pub struct ConfigInitCommand {
    pub path: PathBuf,
    pub force: bool,
}

impl ConfigInitCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path, force: false }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub async fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            );
        }

        LabelFlowConfig::default().save_to_file(&self.path)?;
        println!("⚙️  Wrote default configuration to {}", self.path.display());
        Ok(())
    }
}
