//! Registry loading, validation and context serialization tests

use anyhow::Result;
use canon_core::{build_context, EntityRegistry, Registries, RegistryError};
use canon_types::{EntityRecord, EntityType};
use rstest::rstest;
use std::io::Write;

mod common;

#[test]
fn test_context_preserves_registry_order() {
    let registry = common::protocol_registry();
    let context = build_context(registry.records());

    let rows: Vec<&str> = context.lines().collect();
    assert_eq!(
        rows,
        vec![
            "aave-v3|Aave V3|AAVE|",
            "uniswap-v3|Uniswap V3|UNI|",
            "stargate|Stargate|STG|",
        ]
    );
}

#[test]
fn test_context_is_deterministic() {
    let registry = common::bridge_registry();
    assert_eq!(
        build_context(registry.records()),
        build_context(registry.records())
    );
    assert_eq!(
        build_context(registry.records()),
        "1|Stargate||layerzero\n5|Wormhole||portal"
    );
}

#[test]
fn test_empty_registry_builds_empty_context() {
    assert_eq!(build_context(&[]), "");
}

#[test]
fn test_registry_membership() {
    let registry = common::stablecoin_registry();
    assert!(registry.contains("1"));
    assert!(registry.contains("2"));
    assert!(!registry.contains("3"));
    assert!(!registry.contains("USDT"));
    assert_eq!(registry.find("2").unwrap().name, "USD Coin");
    assert!(registry.find("9").is_none());
}

#[test]
fn test_registry_rejects_duplicate_ids() {
    let result = EntityRegistry::new(
        EntityType::Chains,
        vec![
            EntityRecord::new("eth", "Ethereum"),
            EntityRecord::new("eth", "Ether"),
        ],
    );
    assert!(matches!(result, Err(RegistryError::DuplicateId(id)) if id == "eth"));
}

#[test]
fn test_registry_rejects_blank_fields() {
    let blank_id = EntityRegistry::new(EntityType::Protocols, vec![EntityRecord::new("  ", "X")]);
    assert!(matches!(blank_id, Err(RegistryError::EmptyId { index: 0 })));

    let blank_name = EntityRegistry::new(EntityType::Protocols, vec![EntityRecord::new("x", "")]);
    assert!(matches!(blank_name, Err(RegistryError::EmptyName { .. })));
}

#[rstest]
#[case(EntityType::Protocols, "Aave-V3", "aave-v3")]
#[case(EntityType::Protocols, "aave v3", "aavev3")]
#[case(EntityType::Chains, "Ethereum.", "Ethereum")]
#[case(EntityType::Chains, " Ethereum", "Ethereum")]
#[case(EntityType::Chains, "`Base`", "Base")]
fn test_registry_rejects_non_canonical_ids(
    #[case] entity_type: EntityType,
    #[case] id: &str,
    #[case] canonical: &str,
) {
    let result = EntityRegistry::new(entity_type, vec![EntityRecord::new(id, "Some Name")]);
    match result {
        Err(RegistryError::NonCanonicalId {
            entity_type: rejected_type,
            id: rejected,
            expected,
        }) => {
            assert_eq!(rejected_type, entity_type);
            assert_eq!(rejected, id);
            assert_eq!(expected, canonical);
        }
        other => panic!("expected NonCanonicalId for {id:?}, got {other:?}"),
    }
}

#[test]
fn test_registry_accepts_sanitizer_fixed_points() {
    let chains = EntityRegistry::new(
        EntityType::Chains,
        vec![
            EntityRecord::new("Arbitrum One", "Arbitrum One"),
            EntityRecord::new("zkSync Era", "zkSync Era"),
        ],
    );
    assert!(chains.is_ok());

    let protocols = EntityRegistry::new(
        EntityType::Protocols,
        vec![EntityRecord::new("curve_dex-v2", "Curve DEX")],
    );
    assert!(protocols.is_ok());
}

#[test]
fn test_load_rejects_non_canonical_json_ids() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    write!(file, r#"[{{"id": "Uniswap-V3", "name": "Uniswap V3"}}]"#)?;

    let result = EntityRegistry::load(EntityType::Protocols, file.path());
    assert!(matches!(result, Err(RegistryError::NonCanonicalId { .. })));
    Ok(())
}

#[test]
fn test_load_json_registry_file() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    write!(
        file,
        r#"[
            {{"id": 1, "name": "Tether", "symbol": "USDT", "pegType": "peggedUSD"}},
            {{"id": 2, "name": "USD Coin", "symbol": "USDC"}}
        ]"#
    )?;

    let registry = EntityRegistry::load(EntityType::Stablecoins, file.path())?;
    assert_eq!(registry.entity_type(), EntityType::Stablecoins);
    assert_eq!(registry.len(), 2);
    assert!(registry.contains("1"));
    assert_eq!(registry.records()[0].extra["pegType"], "peggedUSD");
    Ok(())
}

#[test]
fn test_load_yaml_registry_file() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile()?;
    writeln!(file, "- id: aave-v3\n  name: Aave V3\n  aliases: [aave]")?;
    writeln!(file, "- id: stargate\n  name: Stargate")?;

    let registry = EntityRegistry::load(EntityType::Protocols, file.path())?;
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.records()[0].aliases, vec!["aave"]);
    Ok(())
}

#[test]
fn test_load_rejects_unknown_extension() -> Result<()> {
    let file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    let result = EntityRegistry::load(EntityType::Chains, file.path());
    assert!(matches!(result, Err(RegistryError::UnsupportedFormat(ext)) if ext == "csv"));
    Ok(())
}

#[test]
fn test_registries_iterate_in_fixed_order() {
    let registries = Registries::new()
        .with(common::bridge_registry())
        .with(common::chain_registry());

    let order: Vec<EntityType> = registries.iter().map(|r| r.entity_type()).collect();
    assert_eq!(order, vec![EntityType::Chains, EntityType::Bridges]);
    assert!(registries.get(EntityType::Protocols).is_none());
    assert_eq!(registries.len(), 2);
}
