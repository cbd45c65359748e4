//! インプラントルールのパース

use super::{args, children, first_string, narrow, prop_string, string_args};
use crate::error::{DoctrineError, Result};
use crate::model::{ImplantSetDecl, ImplantSlotDecl, RequiredImplantDecl, SlotAcceptDecl};
use kdl::KdlNode;

/// implant-set ノードをパース
///
/// ```kdl
/// implant-set "HYBRID" {
///     piece "High-grade Amulet Alpha"
///     piece "% WS-618"
///     unlocks "hybrid"
/// }
/// ```
pub fn parse_implant_set(node: &KdlNode) -> Result<ImplantSetDecl> {
    let mut set = ImplantSetDecl {
        name: first_string(node, "implant-set")?,
        ..Default::default()
    };

    for child in children(node) {
        match child.name().value() {
            "piece" => set.pieces.extend(string_args(child)),
            "unlocks" => {
                for unlock in string_args(child) {
                    let unlock = unlock.to_lowercase();
                    if unlock != "amulet" && unlock != "hybrid" {
                        return Err(DoctrineError::InvalidConfig(format!(
                            "implant-set '{}': unknown unlock '{}'",
                            set.name, unlock
                        )));
                    }
                    set.unlocks.push(unlock);
                }
            }
            _ => {}
        }
    }

    if set.pieces.is_empty() {
        return Err(DoctrineError::InvalidConfig(format!(
            "implant-set '{}' has no pieces",
            set.name
        )));
    }

    Ok(set)
}

/// implant-slot ノードをパース
///
/// ```kdl
/// implant-slot 10 {
///     accept "% LE-1006" { ship "Nightmare" }
///     waive "Nestor"
///     waive-unlisted
///     missing-tag "NO-SLOT10"
/// }
/// ```
pub fn parse_implant_slot(node: &KdlNode) -> Result<ImplantSlotDecl> {
    let slot = args(node)
        .next()
        .and_then(|v| v.as_integer())
        .filter(|slot| (7..=10).contains(slot))
        .ok_or_else(|| {
            DoctrineError::InvalidConfig("implant-slot requires a slot number 7-10".to_string())
        })?;

    let mut decl = ImplantSlotDecl {
        slot: narrow(slot, "implant-slot")?,
        ..Default::default()
    };

    for child in children(node) {
        match child.name().value() {
            "accept" => {
                let pattern = first_string(child, "accept")?;
                decl.accepts.push(SlotAcceptDecl {
                    pattern,
                    ships: ship_children(child),
                });
            }
            "waive" => decl.waived_ships.extend(string_args(child)),
            "waive-unlisted" => decl.waive_unlisted = true,
            "missing-tag" => decl.missing_tag = Some(first_string(child, "missing-tag")?),
            _ => {}
        }
    }

    Ok(decl)
}

/// required-implant ノードをパース
///
/// ```kdl
/// required-implant "% EM-806" tag="NO-EM-806" {
///     ship "Nestor"
/// }
/// ```
pub fn parse_required_implant(node: &KdlNode) -> Result<RequiredImplantDecl> {
    let pattern = first_string(node, "required-implant")?;
    let tag = prop_string(node, "tag").ok_or_else(|| {
        DoctrineError::InvalidConfig(format!("required-implant '{}' requires tag=", pattern))
    })?;
    let ships = ship_children(node);
    if ships.is_empty() {
        return Err(DoctrineError::InvalidConfig(format!(
            "required-implant '{}' requires at least one ship",
            pattern
        )));
    }
    Ok(RequiredImplantDecl {
        pattern,
        tag,
        ships,
    })
}

fn ship_children(node: &KdlNode) -> Vec<String> {
    children(node)
        .filter(|child| child.name().value() == "ship")
        .flat_map(string_args)
        .collect()
}
