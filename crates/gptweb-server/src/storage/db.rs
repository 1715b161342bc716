//! Gateway database handle.

gptweb_core::define_database!(GatewayDatabase, "Gateway database migrations complete");
