//! Built-in default pipeline configuration. Loading a user-authored
//! configuration file is out of scope for the engine; this module only
//! supplies the in-memory shape and a zero-config default so the CLI is
//! usable without one.

use crate::check::Registry;
use crate::model::{CheckSpec, E2eMode, PipelineConfig, ReportFormat, StageSpec};

/// The checks shipped as concrete examples of the check contract, wired
/// into the default pipeline's two stages.
pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    crate::builtins::register_all(&mut registry);
    registry
}

/// A fast, parallel structural stage followed by a sequential, heavier
/// stage, so `hex-validate fast|full|ci` works out of the box absent any
/// external configuration.
pub fn default_pipeline() -> PipelineConfig {
    PipelineConfig {
        stages: vec![
            StageSpec {
                name: "fast".to_string(),
                parallel: true,
                fail_on_warn: false,
                checks: vec![
                    CheckSpec { id: "merge-conflict-markers".into(), display_name: None },
                    CheckSpec { id: "no-barrel-imports".into(), display_name: None },
                ],
            },
            StageSpec {
                name: "slow".to_string(),
                parallel: false,
                fail_on_warn: false,
                checks: vec![CheckSpec { id: "forbidden-import".into(), display_name: None }],
            },
        ],
        e2e: E2eMode::Off,
        reporters: vec![ReportFormat::Summary],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_checks_all_resolve_in_builtin_registry() {
        let registry = builtin_registry();
        let pipeline = default_pipeline();
        for stage in &pipeline.stages {
            for check in &stage.checks {
                assert!(registry.contains(&check.id), "unregistered check id: {}", check.id);
            }
        }
    }

    #[test]
    fn default_pipeline_has_two_stages() {
        assert_eq!(default_pipeline().stages.len(), 2);
    }
}
