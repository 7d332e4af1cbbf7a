//! Graph interface declarations and their signatures.
//!
//! A builder declares its interface before populating a graph. The cache
//! compares the signature of that declaration with the one a cached graph
//! was built for; any difference means the recipe changed and the cached
//! graph is stale.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::graph::{SocketDirection, SocketType};

/// One public parameter of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceSocket {
    pub name: String,
    pub direction: SocketDirection,
    pub socket_type: SocketType,
}

/// Ordered list of a graph's public inputs and outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    sockets: Vec<InterfaceSocket>,
}

impl Interface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input parameter.
    pub fn input(mut self, name: impl Into<String>, socket_type: SocketType) -> Self {
        self.push(name, SocketDirection::Input, socket_type);
        self
    }

    /// Append an output parameter.
    pub fn output(mut self, name: impl Into<String>, socket_type: SocketType) -> Self {
        self.push(name, SocketDirection::Output, socket_type);
        self
    }

    pub fn push(
        &mut self,
        name: impl Into<String>,
        direction: SocketDirection,
        socket_type: SocketType,
    ) {
        self.sockets.push(InterfaceSocket {
            name: name.into(),
            direction,
            socket_type,
        });
    }

    pub fn sockets(&self) -> &[InterfaceSocket] {
        &self.sockets
    }

    pub fn inputs(&self) -> impl Iterator<Item = &InterfaceSocket> {
        self.sockets
            .iter()
            .filter(|s| s.direction == SocketDirection::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &InterfaceSocket> {
        self.sockets
            .iter()
            .filter(|s| s.direction == SocketDirection::Output)
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// Content hash over direction, name and type of every socket, in order.
    pub fn signature(&self) -> InterfaceSignature {
        let mut hasher = Sha256::new();
        for socket in &self.sockets {
            hasher.update(socket.direction.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(socket.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(socket.socket_type.as_str().as_bytes());
            hasher.update([b'\n']);
        }
        InterfaceSignature(format!("{:x}", hasher.finalize()))
    }
}

/// Hex digest identifying an interface declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceSignature(String);

impl InterfaceSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is plenty for log lines.
        f.write_str(&self.0[..self.0.len().min(12)])
    }
}
