use regex::Regex;
use serde::de::DeserializeOwned;

use super::{ControlStage, DataStage, Dump};
use crate::constants::{
    CONTROL_STAGE_BEGIN, CONTROL_STAGE_END, DATA_STAGE_BEGIN, DATA_STAGE_END, MOD_CHECKSUM_PATTERN,
};
use crate::core::{DumpStage, ExportError};

/// Extracts the [`Dump`] from the captured output of a game run.
///
/// Either all three parts (data stage, control stage and mod names) are
/// extracted, or a [`ExportError::DumpParse`] naming the failed stage is
/// returned. A partial dump is never produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct DumpExtractor;

impl DumpExtractor {
    /// Create an extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extract the dump from the raw output.
    pub fn extract(&self, output: &str) -> Result<Dump, ExportError> {
        let data_stage: DataStage =
            Self::parse_stage(output, DumpStage::Data, DATA_STAGE_BEGIN, DATA_STAGE_END)?;
        let control_stage: ControlStage =
            Self::parse_stage(output, DumpStage::Control, CONTROL_STAGE_BEGIN, CONTROL_STAGE_END)?;
        let mod_names = Self::extract_mod_names(output)?;

        tracing::debug!(
            target: "factorio",
            "Extracted dump with {} icons, {} items, {} fluids, {} machines and {} mods",
            data_stage.icons.len(),
            control_stage.items.len(),
            control_stage.fluids.len(),
            control_stage.machines.len(),
            mod_names.len()
        );

        Ok(Dump {
            mod_names,
            data_stage,
            control_stage,
        })
    }

    fn parse_stage<T: DeserializeOwned>(
        output: &str,
        stage: DumpStage,
        begin: &str,
        end: &str,
    ) -> Result<T, ExportError> {
        let error = |reason: String| ExportError::DumpParse {
            stage,
            reason,
        };

        let start = output
            .find(begin)
            .map(|position| position + begin.len())
            .ok_or_else(|| error(format!("missing marker {begin}")))?;
        let length = output[start..].find(end).ok_or_else(|| error(format!("missing marker {end}")))?;

        serde_json::from_str(output[start..start + length].trim())
            .map_err(|e| error(format!("invalid JSON: {e}")))
    }

    fn extract_mod_names(output: &str) -> Result<Vec<String>, ExportError> {
        let regex = Regex::new(MOD_CHECKSUM_PATTERN).map_err(|e| ExportError::DumpParse {
            stage: DumpStage::ModNames,
            reason: e.to_string(),
        })?;

        let mod_names: Vec<String> =
            regex.captures_iter(output).map(|captures| captures[1].trim().to_string()).collect();

        if mod_names.is_empty() {
            return Err(ExportError::DumpParse {
                stage: DumpStage::ModNames,
                reason: "no checksum lines found".to_string(),
            });
        }
        Ok(mod_names)
    }
}
