//! モジュール代替ルールのパース

use super::{args, children, first_string, narrow, prop_integer, prop_string, string_args};
use crate::error::{DoctrineError, Result};
use crate::model::{AttributeRule, CargoOverrideRule, MetaFamilyRule, TierGroup};
use kdl::KdlNode;

/// alternatives / no-downgrade ノードをパース
///
/// 各 group の tier の並び順が階層になります。
pub fn parse_tier_groups(node: &KdlNode, allow_downgrade: bool) -> Result<Vec<TierGroup>> {
    let mut groups = Vec::new();
    for group in children(node) {
        if group.name().value() != "group" {
            continue;
        }
        let tiers: Vec<Vec<String>> = children(group)
            .filter(|tier| tier.name().value() == "tier")
            .map(string_args)
            .collect();
        if tiers.iter().all(|tier| tier.is_empty()) {
            return Err(DoctrineError::InvalidConfig(format!(
                "{}: empty group",
                node.name().value()
            )));
        }
        groups.push(TierGroup {
            tiers,
            allow_downgrade,
        });
    }
    Ok(groups)
}

/// from-meta ノードをパース
pub fn parse_meta_family(node: &KdlNode, allow_downgrade: bool) -> Result<MetaFamilyRule> {
    Ok(MetaFamilyRule {
        base: first_string(node, node.name().value())?,
        abyssal: prop_string(node, "abyssal"),
        alternative: prop_string(node, "alternative"),
        allow_downgrade,
    })
}

/// from-attribute ノードをパース
pub fn parse_attribute_rule(node: &KdlNode) -> Result<AttributeRule> {
    let attribute = prop_integer(node, "attribute")
        .or_else(|| args(node).next().and_then(|v| v.as_integer()))
        .ok_or_else(|| {
            DoctrineError::InvalidConfig("from-attribute requires an attribute id".to_string())
        })?;

    let descending = match prop_string(node, "order").as_deref() {
        None | Some("ascending") => false,
        Some("descending") => true,
        Some(other) => {
            return Err(DoctrineError::InvalidConfig(format!(
                "from-attribute: unknown order '{}'",
                other
            )));
        }
    };

    let bases: Vec<String> = children(node)
        .filter(|child| child.name().value() == "base")
        .flat_map(string_args)
        .collect();
    if bases.is_empty() {
        return Err(DoctrineError::InvalidConfig(
            "from-attribute requires at least one base".to_string(),
        ));
    }

    Ok(AttributeRule {
        attribute: narrow(attribute, "from-attribute: attribute id")?,
        descending,
        bases,
    })
}

/// cargo-override ノードをパース
pub fn parse_cargo_override(node: &KdlNode) -> Result<CargoOverrideRule> {
    let detect = prop_string(node, "detect").ok_or_else(|| {
        DoctrineError::InvalidConfig("cargo-override requires detect=".to_string())
    })?;

    let mut rule = CargoOverrideRule {
        detect,
        ..Default::default()
    };

    for child in children(node) {
        match child.name().value() {
            "remove" => rule.remove.extend(string_args(child)),
            "add" => {
                let name = first_string(child, "add")?;
                let amount = args(child)
                    .nth(1)
                    .and_then(|v| v.as_integer())
                    .ok_or_else(|| {
                        DoctrineError::InvalidConfig(format!(
                            "cargo-override: add '{}' requires an amount",
                            name
                        ))
                    })?;
                let amount =
                    narrow(amount, &format!("cargo-override: add '{}' amount", name))?;
                rule.add.push((name, amount));
            }
            _ => {}
        }
    }

    Ok(rule)
}
