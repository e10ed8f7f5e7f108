//! Prompt templates for entity resolution
//!
//! The same rules appear in the cached system instruction and in the inline
//! system message, so a resolver behaves the same whether or not a cache
//! handle is available.

use crate::context::COLUMNS;
use crate::not_found::NOT_FOUND_SENTINEL;
use canon_types::EntityType;

/// What the entities of a type are and what their ids look like
pub fn domain_description(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Chains => {
            "blockchain networks tracked by DeFi analytics. The canonical id is the chain's \
             display name exactly as listed (e.g. \"Ethereum\", \"Arbitrum\", \"BSC\")"
        }
        EntityType::Protocols => {
            "DeFi protocols. The canonical id is the protocol slug: lower-case letters, digits, \
             '-' and '_' (e.g. \"aave-v3\", \"uniswap-v3\", \"stargate\")"
        }
        EntityType::Stablecoins => {
            "stablecoins. The canonical id is a numeric string (e.g. \"1\" for Tether). \
             Inputs are often ticker symbols such as \"USDT\" or \"DAI\""
        }
        EntityType::Bridges => {
            "cross-chain bridges. The canonical id is a numeric string (e.g. \"1\"). Inputs may \
             name the bridge or the protocol that operates it"
        }
    }
}

/// Type-specific tie-break rules appended to the generic ones
pub fn matching_rules(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::Chains => &[
            "Map network nicknames and abbreviations to the chain (\"arb\" -> Arbitrum, \"eth mainnet\" -> Ethereum).",
        ],
        EntityType::Protocols => &[
            "If the input names a protocol without a version, prefer the latest version.",
            "Match on protocol name, symbol or alias; ignore words like \"protocol\" or \"finance\".",
        ],
        EntityType::Stablecoins => &[
            "Match ticker symbols case-insensitively against the symbol column.",
        ],
        EntityType::Bridges => &[
            "Match on bridge name or alias; a protocol name maps to the bridge it operates.",
        ],
    }
}

fn rules_block(entity_type: EntityType) -> String {
    let mut rules = vec![
        "Prefer the closest name, symbol, alias or abbreviation match.".to_string(),
        "Matching is case-insensitive.".to_string(),
    ];
    rules.extend(matching_rules(entity_type).iter().map(|rule| rule.to_string()));
    rules
        .iter()
        .map(|rule| format!("- {rule}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sentinel_instruction() -> String {
    format!(
        "Respond with the canonical id only, with no quotes or explanation. \
         If nothing in the reference list matches, respond with exactly {NOT_FOUND_SENTINEL}. \
         Never explain."
    )
}

/// System instruction stored in the remote cache next to the reference block
pub fn cache_system_instruction(entity_type: EntityType) -> String {
    format!(
        "You are a precise resolver mapping free-text inputs to canonical {entity_type} \
         identifiers. The entities are {domain}.\n\n\
         The reference list has one entity per line with columns {COLUMNS}. \
         Backslash escapes a literal delimiter.\n\n\
         Matching rules:\n{rules}\n\n{sentinel}",
        domain = domain_description(entity_type),
        rules = rules_block(entity_type),
        sentinel = sentinel_instruction(),
    )
}

/// Per-call system message; `context` is `None` when a cache carries it
pub fn resolver_system_message(entity_type: EntityType, context: Option<&str>) -> String {
    let mut message = cache_system_instruction(entity_type);
    if let Some(context) = context {
        message.push_str(&format!("\n\nREFERENCE LIST ({COLUMNS}):\n{context}"));
    }
    message
}

/// Per-call user message carrying the literal input
pub fn resolver_user_message(entity_type: EntityType, name: &str) -> String {
    format!(
        "Resolve this {singular} to its canonical id: \"{name}\"\n\n\
         Guidelines:\n\
         - Prefer the closest name, alias or abbreviation match.\n\
         - Return the bare id only, or {NOT_FOUND_SENTINEL}.",
        singular = entity_type.singular(),
    )
}
