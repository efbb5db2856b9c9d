//! # Descriptor Registry
//!
//! Loads a Protobuf `FileDescriptorSet` and resolves `package.Service/Method` endpoints into the
//! `MethodDescriptor` the JSON codec needs.
use grpcweb_core::prost_reflect::{self, DescriptorPool, MethodDescriptor};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode descriptor set: {0}")]
    Decode(#[from] prost_reflect::DescriptorError),
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
}

pub struct DescriptorRegistry {
    pool: DescriptorPool,
}

impl DescriptorRegistry {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DescriptorError> {
        let pool = DescriptorPool::decode(bytes)?;
        Ok(Self { pool })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DescriptorError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn service_names(&self) -> Vec<String> {
        self.pool
            .services()
            .map(|s| s.full_name().to_string())
            .collect()
    }

    pub fn method(&self, service: &str, method: &str) -> Result<MethodDescriptor, DescriptorError> {
        self.pool
            .get_service_by_name(service)
            .ok_or_else(|| DescriptorError::ServiceNotFound(service.to_string()))?
            .methods()
            .find(|m| m.name() == method)
            .ok_or_else(|| DescriptorError::MethodNotFound(method.to_string()))
    }
}
