// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    collections::HashMap,
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::{
    debug,
    instrument,
};

use crate::{
    encoders::{
        FramedEncoder,
        OctetEncoder,
        RecordEncoder,
        TextEncoder,
    },
    encoding::SinkEncoder,
    errs::RegistryError,
};

/// Owns every configured encoder and hands out shared, immutable references
/// to sinks by name.
#[derive(Debug, Default)]
pub struct EncoderRegistry {
    encoders: RwLock<HashMap<String, Arc<dyn SinkEncoder>>>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in formats under `octet`, `text`, `record`
    /// and `framed-text`.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        let mut encoders = registry.encoders.write();
        encoders.insert("octet".to_owned(), Arc::new(OctetEncoder::new()));
        encoders.insert("text".to_owned(), Arc::new(TextEncoder::new()));
        encoders.insert("record".to_owned(), Arc::new(RecordEncoder::new()));
        encoders.insert(
            "framed-text".to_owned(),
            Arc::new(FramedEncoder::length_prefixed(TextEncoder::new())),
        );
        drop(encoders);
        registry
    }

    #[instrument(level = "debug", skip(self, encoder))]
    pub fn register(
        &self,
        name: &str,
        encoder: Arc<dyn SinkEncoder>,
    ) -> Result<(), RegistryError> {
        let mut encoders = self.encoders.write();
        if encoders.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_owned()));
        }
        debug!(format = encoder.name(), "registered encoder");
        encoders.insert(name.to_owned(), encoder);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn SinkEncoder>, RegistryError> {
        self.encoders
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))
    }

    /// Remove an encoder. Sinks already holding it keep it alive until they
    /// are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, name: &str) -> Option<Arc<dyn SinkEncoder>> {
        let removed = self.encoders.write().remove(name);
        if removed.is_some() {
            debug!("removed encoder");
        }
        removed
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.encoders.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.encoders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.read().is_empty()
    }
}
