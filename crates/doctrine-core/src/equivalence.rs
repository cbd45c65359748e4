//! モジュール置換表
//!
//! 宣言的なルール (階層グループ・メタファミリー・T1/T2・属性順位) から、
//! モジュールごとに「代替アイテムと階層差」の一覧を構築します。
//! 階層差 0 は同等、負はダウングレード、正はアップグレードです。

use crate::error::{DoctrineError, Result};
use crate::items::{ItemLookup, resolve};
use crate::model::{AttributeRule, DoctrineDocument, MetaFamilyRule, TierGroup, TypeId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// 属性値を同じ階層とみなす許容誤差
const ATTRIBUTE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variation {
    pub to: TypeId,
    pub tier_delta: i64,
}

/// 構築済みの置換表 (構築後は不変)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalenceTable {
    variations: BTreeMap<TypeId, Vec<Variation>>,
}

impl EquivalenceTable {
    #[instrument(skip_all)]
    pub fn build(doc: &DoctrineDocument, items: &dyn ItemLookup) -> Result<Self> {
        let mut builder = EquivalenceBuilder::new(items);
        builder.add_tier_groups(&doc.tier_groups)?;
        builder.add_meta_families(&doc.meta_families)?;
        builder.add_t1(&doc.accept_t1)?;
        builder.add_by_attribute(&doc.attribute_rules)?;
        let table = builder.finish()?;
        info!(modules = table.variations.len(), "Equivalence table built");
        Ok(table)
    }

    /// 代替一覧 (近い階層から順)
    ///
    /// ルールに登場しないアイテムは None
    pub fn get(&self, from: TypeId) -> Option<&[Variation]> {
        self.variations.get(&from).map(|vars| vars.as_slice())
    }

    /// `from` から `to` への階層差
    pub fn delta(&self, from: TypeId, to: TypeId) -> Option<i64> {
        self.get(from)?
            .iter()
            .find(|v| v.to == to)
            .map(|v| v.tier_delta)
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

struct EquivalenceBuilder<'a> {
    items: &'a dyn ItemLookup,
    /// (from, to) → 階層差
    edges: BTreeMap<(TypeId, TypeId), i64>,
}

impl<'a> EquivalenceBuilder<'a> {
    fn new(items: &'a dyn ItemLookup) -> Self {
        Self {
            items,
            edges: BTreeMap::new(),
        }
    }

    fn name(&self, id: TypeId) -> String {
        self.items
            .name_of(id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// グループ内の全ペアを登録
    ///
    /// 既に別の階層差で登録されているペアは矛盾としてエラーにします。
    fn merge_tiers(&mut self, tiers: &BTreeMap<TypeId, i64>, allow_downgrade: bool) -> Result<()> {
        for (&from, &tier_from) in tiers {
            for (&to, &tier_to) in tiers {
                let delta = tier_to - tier_from;
                if delta < 0 && !allow_downgrade {
                    continue;
                }
                match self.edges.get(&(from, to)) {
                    Some(&existing) if existing != delta => {
                        return Err(DoctrineError::ContradictoryEquivalence(format!(
                            "'{}' -> '{}' は {} と {} の両方で宣言されています",
                            self.name(from),
                            self.name(to),
                            existing,
                            delta
                        )));
                    }
                    _ => {
                        self.edges.insert((from, to), delta);
                    }
                }
            }
        }
        Ok(())
    }

    fn add_tier_groups(&mut self, groups: &[TierGroup]) -> Result<()> {
        for group in groups {
            let mut tiers = BTreeMap::new();
            for (index, tier) in group.tiers.iter().enumerate() {
                for name in tier {
                    let id = resolve(self.items, name)?;
                    if tiers.insert(id, index as i64 + 1).is_some() {
                        return Err(DoctrineError::DuplicateDeclaration(format!(
                            "'{}' appears twice in one group",
                            name
                        )));
                    }
                }
            }
            debug!(members = tiers.len(), allow_downgrade = group.allow_downgrade, "Adding tier group");
            self.merge_tiers(&tiers, group.allow_downgrade)?;
        }
        Ok(())
    }

    fn add_meta_families(&mut self, rules: &[MetaFamilyRule]) -> Result<()> {
        for rule in rules {
            let base_id = resolve(self.items, &rule.base)?;
            let mut family = self.items.type_variations(base_id).ok_or_else(|| {
                DoctrineError::ItemNotFound(format!("meta variations of '{}'", rule.base))
            })?;
            let base_meta = family.get(&base_id).copied().unwrap_or(0);

            for pinned in [&rule.abyssal, &rule.alternative].into_iter().flatten() {
                family.insert(resolve(self.items, pinned)?, base_meta);
            }

            if !rule.allow_downgrade {
                family.retain(|_, meta| *meta >= base_meta);
            }

            debug!(base = %rule.base, members = family.len(), "Adding meta family");
            self.merge_tiers(&family, rule.allow_downgrade)?;
        }
        Ok(())
    }

    fn add_t1(&mut self, names: &[String]) -> Result<()> {
        for t2_name in names {
            let Some(stem) = t2_name.strip_suffix(" II") else {
                return Err(DoctrineError::InvalidConfig(format!(
                    "accept-t1: '{}' is not a tech 2 item",
                    t2_name
                )));
            };
            let t1_name = format!("{} I", stem);
            let tiers = BTreeMap::from([
                (resolve(self.items, t2_name)?, 2),
                (resolve(self.items, &t1_name)?, 1),
            ]);
            self.merge_tiers(&tiers, true)?;
        }
        Ok(())
    }

    fn add_by_attribute(&mut self, rules: &[AttributeRule]) -> Result<()> {
        for rule in rules {
            let mut module_ids = BTreeSet::new();
            for base in &rule.bases {
                let base_id = resolve(self.items, base)?;
                match self.items.type_variations(base_id) {
                    Some(family) => module_ids.extend(family.into_keys()),
                    None => {
                        module_ids.insert(base_id);
                    }
                }
            }

            let mut with_values = Vec::with_capacity(module_ids.len());
            for id in module_ids {
                let value = self.items.attribute(id, rule.attribute).ok_or_else(|| {
                    DoctrineError::InvalidConfig(format!(
                        "'{}' has no attribute {}",
                        self.name(id),
                        rule.attribute
                    ))
                })?;
                with_values.push((id, value));
            }
            with_values.sort_by(|a, b| a.1.total_cmp(&b.1));
            if rule.descending {
                with_values.reverse();
            }

            let mut tiers = BTreeMap::new();
            let mut tier = 1;
            let mut last_value = with_values.first().map(|(_, v)| *v).unwrap_or_default();
            for (id, value) in with_values {
                if (last_value - value).abs() > ATTRIBUTE_EPSILON {
                    tier += 1;
                    last_value = value;
                }
                tiers.insert(id, tier);
            }

            debug!(attribute = rule.attribute, tiers = tier, "Adding attribute ranking");
            self.merge_tiers(&tiers, true)?;
        }
        Ok(())
    }

    /// 循環検出のあと、アイテムごとの代替一覧を組み立てる
    fn finish(self) -> Result<EquivalenceTable> {
        self.check_cycles()?;

        let mut variations: BTreeMap<TypeId, Vec<Variation>> = BTreeMap::new();
        for (&(from, to), &tier_delta) in &self.edges {
            variations
                .entry(from)
                .or_default()
                .push(Variation { to, tier_delta });
        }
        for (&from, vars) in variations.iter_mut() {
            if !vars.iter().any(|v| v.to == from) {
                vars.push(Variation {
                    to: from,
                    tier_delta: 0,
                });
            }
            // 近い階層から、同距離ならアップグレードを先に
            vars.sort_by_key(|v| (v.tier_delta.abs(), v.tier_delta < 0, v.to));
        }

        Ok(EquivalenceTable { variations })
    }

    /// 同等 (階層差 0) のアイテムを1つのノードにまとめ、
    /// アップグレード方向のグラフに循環がないことを確認
    fn check_cycles(&self) -> Result<()> {
        let mut representative: BTreeMap<TypeId, TypeId> = BTreeMap::new();
        for (&(from, to), &delta) in &self.edges {
            if delta == 0 && from != to {
                let a = find_root(&mut representative, from);
                let b = find_root(&mut representative, to);
                if a != b {
                    representative.insert(a.max(b), a.min(b));
                }
            }
        }

        let mut upgrades: BTreeMap<TypeId, BTreeSet<TypeId>> = BTreeMap::new();
        for (&(from, to), &delta) in &self.edges {
            if delta == 0 {
                continue;
            }
            let (lower, upper) = if delta > 0 { (from, to) } else { (to, from) };
            let lower = find_root(&mut representative, lower);
            let upper = find_root(&mut representative, upper);
            if lower == upper {
                return Err(DoctrineError::CircularEquivalence(format!(
                    "'{}' と '{}' は同等かつ異なる階層として宣言されています",
                    self.name(from),
                    self.name(to)
                )));
            }
            upgrades.entry(lower).or_default().insert(upper);
        }

        let mut state = BTreeMap::new();
        let mut path = Vec::new();
        for &node in upgrades.keys() {
            self.visit(node, &upgrades, &mut state, &mut path)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        node: TypeId,
        graph: &BTreeMap<TypeId, BTreeSet<TypeId>>,
        state: &mut BTreeMap<TypeId, VisitState>,
        path: &mut Vec<TypeId>,
    ) -> Result<()> {
        match state.get(&node) {
            Some(VisitState::Done) => return Ok(()),
            Some(VisitState::InProgress) => {
                let start = path.iter().position(|&n| n == node).unwrap_or(0);
                let cycle: Vec<String> = path[start..]
                    .iter()
                    .chain(std::iter::once(&node))
                    .map(|&id| self.name(id))
                    .collect();
                return Err(DoctrineError::CircularEquivalence(cycle.join(" < ")));
            }
            None => {}
        }

        state.insert(node, VisitState::InProgress);
        path.push(node);
        if let Some(next) = graph.get(&node) {
            for &upper in next {
                self.visit(upper, graph, state, path)?;
            }
        }
        path.pop();
        state.insert(node, VisitState::Done);
        Ok(())
    }
}

/// union-find の代表元 (経路圧縮なし)
fn find_root(representative: &mut BTreeMap<TypeId, TypeId>, id: TypeId) -> TypeId {
    let mut current = id;
    while let Some(&parent) = representative.get(&current) {
        if parent == current {
            break;
        }
        current = parent;
    }
    current
}
