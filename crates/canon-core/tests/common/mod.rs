//! Shared fixtures for canon-core integration tests

pub mod log_capture;
pub mod stub_cache;
pub mod stub_model;

#[allow(unused_imports)]
pub use log_capture::LogCapture;
#[allow(unused_imports)]
pub use stub_cache::StubCacheService;
#[allow(unused_imports)]
pub use stub_model::StubModel;

use canon_core::{EntityRegistry, Registries};
use canon_types::{EntityRecord, EntityType};

/// Two-chain registry used by the resolution scenarios
#[allow(dead_code)]
pub fn chain_registry() -> EntityRegistry {
    EntityRegistry::new(
        EntityType::Chains,
        vec![
            EntityRecord::new("eth", "Ethereum"),
            EntityRecord::new("bsc", "BSC"),
        ],
    )
    .expect("valid chain registry")
}

#[allow(dead_code)]
pub fn protocol_registry() -> EntityRegistry {
    EntityRegistry::new(
        EntityType::Protocols,
        vec![
            EntityRecord::new("aave-v3", "Aave V3").with_symbol("AAVE"),
            EntityRecord::new("uniswap-v3", "Uniswap V3").with_symbol("UNI"),
            EntityRecord::new("stargate", "Stargate").with_symbol("STG"),
        ],
    )
    .expect("valid protocol registry")
}

#[allow(dead_code)]
pub fn stablecoin_registry() -> EntityRegistry {
    EntityRegistry::new(
        EntityType::Stablecoins,
        vec![
            EntityRecord::new(1u64, "Tether").with_symbol("USDT"),
            EntityRecord::new(2u64, "USD Coin").with_symbol("USDC"),
        ],
    )
    .expect("valid stablecoin registry")
}

#[allow(dead_code)]
pub fn bridge_registry() -> EntityRegistry {
    EntityRegistry::new(
        EntityType::Bridges,
        vec![
            EntityRecord::new(1u64, "Stargate").with_aliases(["layerzero"]),
            EntityRecord::new(5u64, "Wormhole").with_aliases(["portal"]),
        ],
    )
    .expect("valid bridge registry")
}

/// All four standard registries
#[allow(dead_code)]
pub fn all_registries() -> Registries {
    Registries::new()
        .with(protocol_registry())
        .with(chain_registry())
        .with(stablecoin_registry())
        .with(bridge_registry())
}
