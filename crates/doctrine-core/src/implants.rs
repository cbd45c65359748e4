//! インプラントセット判定
//!
//! スロット1-6の名前付きセットと、スロット7-10の個別ルールを評価します。
//! パターンは構築時にアイテム表で ID 集合へ展開されます。

use crate::error::{DoctrineError, Result};
use crate::items::{ItemLookup, resolve, resolve_pattern};
use crate::model::{DoctrineDocument, TypeId};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
struct ImplantSet {
    name: String,
    /// 各ピースはいずれか1つを装着していればよい
    pieces: Vec<BTreeSet<TypeId>>,
    unlocks_amulet: bool,
    unlocks_hybrid: bool,
}

impl ImplantSet {
    fn is_worn(&self, worn: &BTreeSet<TypeId>) -> bool {
        self.pieces
            .iter()
            .all(|piece| !piece.is_disjoint(worn))
    }
}

#[derive(Debug, Clone)]
struct SlotAccept {
    ids: BTreeSet<TypeId>,
    /// 空の場合は全船体
    ships: BTreeSet<TypeId>,
}

#[derive(Debug, Clone)]
struct SlotRule {
    slot: u8,
    accepts: Vec<SlotAccept>,
    waived: BTreeSet<TypeId>,
    waive_unlisted: bool,
    missing_tag: Option<String>,
}

impl SlotRule {
    fn is_satisfied(&self, ship: TypeId, worn: &BTreeSet<TypeId>) -> bool {
        if self.waived.contains(&ship) {
            return true;
        }
        if self.waive_unlisted && !self.accepts.iter().any(|a| a.ships.contains(&ship)) {
            return true;
        }
        self.accepts
            .iter()
            .filter(|a| a.ships.is_empty() || a.ships.contains(&ship))
            .any(|a| !a.ids.is_disjoint(worn))
    }
}

#[derive(Debug, Clone)]
struct RequiredImplant {
    ids: BTreeSet<TypeId>,
    tag: String,
    ships: BTreeSet<TypeId>,
}

/// インプラント判定結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImplantDetection {
    /// 検出されたセット名
    pub set: Option<String>,
    /// セット検出かつスロット7-10が全て満たされている
    pub complete: bool,
    pub can_amulet: bool,
    pub can_hybrid: bool,
    /// 1つのスロットだけが欠けている場合の警告タグ (`NO-SLOT10` など)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_slot_tag: Option<String>,
}

impl ImplantDetection {
    /// 完全なセットのタグ (`<SET>1-10`)
    pub fn tag(&self) -> Option<String> {
        match (&self.set, self.complete) {
            (Some(set), true) => Some(format!("{}1-10", set)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImplantClassifier {
    sets: Vec<ImplantSet>,
    slots: Vec<SlotRule>,
    required: Vec<RequiredImplant>,
}

impl ImplantClassifier {
    #[instrument(skip_all)]
    pub fn build(doc: &DoctrineDocument, items: &dyn ItemLookup) -> Result<Self> {
        let mut sets = Vec::with_capacity(doc.implant_sets.len());
        for decl in &doc.implant_sets {
            let pieces = decl
                .pieces
                .iter()
                .map(|pattern| resolve_pattern(items, pattern))
                .collect::<Result<Vec<_>>>()?;
            debug!(set = %decl.name, pieces = pieces.len(), "Implant set loaded");
            sets.push(ImplantSet {
                name: decl.name.clone(),
                pieces,
                unlocks_amulet: decl.unlocks.iter().any(|u| u == "amulet"),
                unlocks_hybrid: decl.unlocks.iter().any(|u| u == "hybrid"),
            });
        }

        let mut slots: Vec<SlotRule> = Vec::with_capacity(doc.implant_slots.len());
        for decl in &doc.implant_slots {
            if slots.iter().any(|s| s.slot == decl.slot) {
                return Err(DoctrineError::DuplicateDeclaration(format!(
                    "implant-slot {}",
                    decl.slot
                )));
            }
            let mut accepts = Vec::with_capacity(decl.accepts.len());
            for accept in &decl.accepts {
                accepts.push(SlotAccept {
                    ids: resolve_pattern(items, &accept.pattern)?,
                    ships: resolve_ships(items, &accept.ships)?,
                });
            }
            slots.push(SlotRule {
                slot: decl.slot,
                accepts,
                waived: resolve_ships(items, &decl.waived_ships)?,
                waive_unlisted: decl.waive_unlisted,
                missing_tag: decl.missing_tag.clone(),
            });
        }

        let mut required = Vec::with_capacity(doc.required_implants.len());
        for decl in &doc.required_implants {
            required.push(RequiredImplant {
                ids: resolve_pattern(items, &decl.pattern)?,
                tag: decl.tag.clone(),
                ships: resolve_ships(items, &decl.ships)?,
            });
        }

        info!(
            sets = sets.len(),
            slots = slots.len(),
            required = required.len(),
            "Implant rules built"
        );

        Ok(Self {
            sets,
            slots,
            required,
        })
    }

    /// 装着インプラントからセットと完全性を判定
    ///
    /// セットは宣言順に評価し、全ピースが揃った最初のセットを採用します。
    pub fn detect(&self, ship: TypeId, implants: &[TypeId]) -> ImplantDetection {
        let worn: BTreeSet<TypeId> = implants.iter().copied().collect();

        let Some(set) = self.sets.iter().find(|set| set.is_worn(&worn)) else {
            return ImplantDetection::default();
        };

        let unsatisfied: Vec<&SlotRule> = self
            .slots
            .iter()
            .filter(|slot| !slot.is_satisfied(ship, &worn))
            .collect();
        let complete = unsatisfied.is_empty();
        let missing_slot_tag = match unsatisfied.as_slice() {
            [only] => only.missing_tag.clone(),
            _ => None,
        };
        debug!(
            set = %set.name,
            complete,
            missing_slot_tag = ?missing_slot_tag,
            "Implant set detected"
        );

        ImplantDetection {
            set: Some(set.name.clone()),
            complete,
            can_amulet: set.unlocks_amulet,
            can_hybrid: set.unlocks_hybrid,
            missing_slot_tag,
        }
    }

    /// 船体に必須のインプラントが欠けている場合のタグ
    pub fn missing_required(&self, ship: TypeId, implants: &[TypeId]) -> Vec<String> {
        self.required
            .iter()
            .filter(|rule| rule.ships.contains(&ship))
            .filter(|rule| !implants.iter().any(|id| rule.ids.contains(id)))
            .map(|rule| rule.tag.clone())
            .collect()
    }

    /// 必須インプラントのタグか
    pub fn is_required_tag(&self, tag: &str) -> bool {
        self.required.iter().any(|rule| rule.tag == tag)
    }
}

fn resolve_ships(items: &dyn ItemLookup, names: &[String]) -> Result<BTreeSet<TypeId>> {
    names.iter().map(|name| resolve(items, name)).collect()
}
