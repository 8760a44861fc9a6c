//! Scenario lookup under `<scenarios_dir>/<tool>/<scenario>.txt`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::ProbeError;

const SCENARIO_EXTENSION: &str = "txt";

/// A scenario known to exist on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScenarioRef {
    pub tool: String,
    pub name: String,
}

impl std::fmt::Display for ScenarioRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.tool, self.name)
    }
}

/// Reads scenario text for `tool/scenario`, trimmed.
///
/// An empty file is a valid scenario with no text, which disables
/// verification for its runs.
pub fn load_scenario(root: &Path, tool: &str, scenario: &str) -> Result<String, ProbeError> {
    let path = root.join(tool).join(format!("{}.{}", scenario, SCENARIO_EXTENSION));
    if !path.is_file() {
        return Err(ProbeError::ScenarioUnavailable {
            tool: tool.to_string(),
            scenario: scenario.to_string(),
            path,
        });
    }
    let text = fs::read_to_string(&path)?;
    debug!(path = %path.display(), chars = text.len(), "Loaded scenario");
    Ok(text.trim().to_string())
}

/// Lists every scenario under `root`, sorted by tool then name.
pub fn list_scenarios(root: &Path) -> Result<Vec<ScenarioRef>, ProbeError> {
    if !root.is_dir() {
        return Err(ProbeError::ScenarioDirectory {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| ProbeError::ScenarioDirectory {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(SCENARIO_EXTENSION)
        {
            continue;
        }
        if let Some(scenario) = scenario_ref(root, path) {
            found.push(scenario);
        }
    }
    found.sort();
    Ok(found)
}

/// Lists the scenarios of one tool.
pub fn list_tool_scenarios(root: &Path, tool: &str) -> Result<Vec<ScenarioRef>, ProbeError> {
    Ok(list_scenarios(root)?
        .into_iter()
        .filter(|s| s.tool == tool)
        .collect())
}

fn scenario_ref(root: &Path, path: &Path) -> Option<ScenarioRef> {
    let relative: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    let tool = relative.parent()?.to_str()?.to_string();
    let name = relative.file_stem()?.to_str()?.to_string();
    Some(ScenarioRef { tool, name })
}
