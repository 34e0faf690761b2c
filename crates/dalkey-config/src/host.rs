//! Dev server host binding policy.
//!
//! Config files express the host as a tri-state value: `false` keeps the
//! server on loopback, `true` exposes it on all interfaces, and a string
//! binds a specific hostname or IP. Any other type is a shape error.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Network interface policy for the dev server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostBinding {
    /// Bind to loopback only (`host: false`). The default.
    Loopback,
    /// Bind to all interfaces (`host: true`), exposing the server to the LAN.
    AllInterfaces,
    /// Bind to an explicit hostname or IP (`host: "192.168.1.5"`).
    Addr(String),
}

impl Default for HostBinding {
    fn default() -> Self {
        Self::Loopback
    }
}

impl HostBinding {
    /// The address string the dev server should listen on.
    ///
    /// Whether the address actually binds is the server's problem; no
    /// resolution or validation happens here.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        match self {
            Self::Loopback => "127.0.0.1",
            Self::AllInterfaces => "0.0.0.0",
            Self::Addr(host) => host,
        }
    }

    /// Whether the server is reachable from other machines.
    #[must_use]
    pub fn is_exposed(&self) -> bool {
        !matches!(self, Self::Loopback)
    }
}

impl Serialize for HostBinding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Loopback => serializer.serialize_bool(false),
            Self::AllInterfaces => serializer.serialize_bool(true),
            Self::Addr(host) => serializer.serialize_str(host),
        }
    }
}

impl<'de> Deserialize<'de> for HostBinding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HostVisitor;

        impl Visitor<'_> for HostVisitor {
            type Value = HostBinding;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("false, true, or a host string")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(if v {
                    HostBinding::AllInterfaces
                } else {
                    HostBinding::Loopback
                })
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if v.is_empty() {
                    Err(E::custom("host must not be empty"))
                } else {
                    Ok(HostBinding::Addr(v.to_string()))
                }
            }
        }

        deserializer.deserialize_any(HostVisitor)
    }
}
