// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared state every plugin on a page draws from: the global slot registry,
// the name sequencer and the environment probe.

use std::rc::Rc;

use ntvbridge_core::error::Result;
use ntvbridge_core::payload::PayloadParser;
use ntvbridge_core::{BridgeConfig, ExecutionMode, NameSequencer};

use crate::traits::{EnvironmentProbe, SlotRegistry};

/// Environment fixed up front (from config, or by a test).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticEnvironment(pub ExecutionMode);

impl EnvironmentProbe for StaticEnvironment {
    fn execution_mode(&self) -> ExecutionMode {
        self.0
    }
}

/// Composition root for plugins. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BridgeContext {
    registry: Rc<dyn SlotRegistry>,
    sequencer: Rc<NameSequencer>,
    environment: Rc<dyn EnvironmentProbe>,
    parser: PayloadParser,
}

impl BridgeContext {
    pub fn new(
        registry: Rc<dyn SlotRegistry>,
        sequencer: Rc<NameSequencer>,
        environment: Rc<dyn EnvironmentProbe>,
    ) -> Self {
        Self {
            registry,
            sequencer,
            environment,
            parser: PayloadParser::default(),
        }
    }

    /// Context for the current target: window slots on wasm32, an in-memory
    /// registry elsewhere. Contexts built this way share the platform
    /// registry and the sequencer for their prefix.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            crate::platform_registry(),
            crate::platform_sequencer(config),
            Rc::new(StaticEnvironment(config.execution_mode)),
        )
        .with_parser(PayloadParser::from_config(config)))
    }

    pub fn with_parser(mut self, parser: PayloadParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn registry(&self) -> &Rc<dyn SlotRegistry> {
        &self.registry
    }

    pub fn sequencer(&self) -> &NameSequencer {
        &self.sequencer
    }

    pub fn environment(&self) -> &dyn EnvironmentProbe {
        self.environment.as_ref()
    }

    pub fn parser(&self) -> PayloadParser {
        self.parser
    }
}

impl std::fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeContext")
            .field("sequencer", &self.sequencer)
            .field("mode", &self.environment.execution_mode())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ntvbridge_core::BridgeError;

    use super::*;

    fn config(prefix: &str) -> BridgeConfig {
        BridgeConfig {
            callback_prefix: prefix.into(),
            ..BridgeConfig::default()
        }
    }

    #[test]
    fn from_config_honours_mode_and_prefix() {
        let config = BridgeConfig {
            execution_mode: ExecutionMode::Native,
            ..config("_ctx_mode")
        };
        let ctx = BridgeContext::from_config(&config).unwrap();
        assert_eq!(ctx.environment().execution_mode(), ExecutionMode::Native);
        assert_eq!(ctx.sequencer().next_name("scan").unwrap(), "_ctx_mode_scan_1");
    }

    #[test]
    fn clones_share_the_sequencer() {
        let ctx = BridgeContext::from_config(&config("_ctx_clone")).unwrap();
        let other = ctx.clone();
        ctx.sequencer().next_name("scan").unwrap();
        assert_eq!(other.sequencer().next_name("scan").unwrap(), "_ctx_clone_scan_2");
    }

    #[test]
    fn separate_contexts_share_platform_names() {
        let first = BridgeContext::from_config(&config("_ctx_shared")).unwrap();
        let second = BridgeContext::from_config(&config("_ctx_shared")).unwrap();

        assert!(Rc::ptr_eq(first.registry(), second.registry()));
        assert_eq!(first.sequencer().next_name("scan").unwrap(), "_ctx_shared_scan_1");
        assert_eq!(second.sequencer().next_name("scan").unwrap(), "_ctx_shared_scan_2");
        assert_eq!(first.sequencer().issued("scan"), 2);
    }

    #[test]
    fn invalid_prefix_is_rejected_up_front() {
        let err = BridgeContext::from_config(&config("_ctx.bad")).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
