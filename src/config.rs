use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Result, sampler::Filter};

/// Options for rendering one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub filter: Filter,
    /// `[width, height]` of the output surface. Defaults to the input size.
    pub output_size: Option<[u32; 2]>,
}

impl RenderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        log::info!("loaded render config from {}", path.display());
        Ok(config)
    }

    pub fn output_dimensions(&self, input: (u32, u32)) -> (u32, u32) {
        match self.output_size {
            Some([width, height]) => (width, height),
            None => input,
        }
    }
}
