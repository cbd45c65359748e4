//! フィット差分とスコアリング
//!
//! テンプレートと提出されたロードアウトを置換表を使って比較し、
//! 不足・余剰・ダウングレード・アップグレードを求めます。

use crate::catalog::TemplateCatalog;
use crate::equivalence::{EquivalenceTable, Variation};
use crate::error::Result;
use crate::items::{ItemLookup, resolve};
use crate::model::{CargoLeeway, DoctrineDocument, FitTemplate, ItemCounts, Loadout, TypeId};
use std::cmp::min;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

const MISSING_WEIGHT: i64 = 12;
const EXTRA_WEIGHT: i64 = 8;
const DOWNGRADE_WEIGHT: i64 = 5;
const UPGRADE_WEIGHT: i64 = 1;

/// 識別用アイテムの重み
const IDENTIFICATION_MULTIPLIER: i64 = 100;

/// 期待アイテム → 代替アイテム → 個数
pub type Substitutions = BTreeMap<TypeId, ItemCounts>;

#[derive(Debug, Default)]
struct SectionDiff {
    missing: ItemCounts,
    extra: ItemCounts,
    upgraded: Substitutions,
    downgraded: Substitutions,
}

/// 1テンプレートとの比較結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub missing: ItemCounts,
    pub extra: ItemCounts,
    pub downgraded: Substitutions,
    pub upgraded: Substitutions,
    pub cargo_missing: ItemCounts,
    pub fit_ok: bool,
    pub cargo_ok: bool,
    pub score: i64,
}

/// 期待カーゴの差し替えルール
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CargoOverride {
    pub remove: BTreeSet<TypeId>,
    pub add: ItemCounts,
}

#[derive(Debug, Clone)]
pub struct FitMatcher {
    equivalence: EquivalenceTable,
    identification: BTreeSet<TypeId>,
    cargo_ignore: BTreeSet<TypeId>,
    /// 検出アイテム → 差し替え
    cargo_overrides: BTreeMap<TypeId, CargoOverride>,
    leeway: CargoLeeway,
}

impl FitMatcher {
    #[instrument(skip_all)]
    pub fn build(doc: &DoctrineDocument, items: &dyn ItemLookup, leeway: CargoLeeway) -> Result<Self> {
        let equivalence = EquivalenceTable::build(doc, items)?;

        // 識別用アイテムは代替も含めて重み付けする
        let mut identification = BTreeSet::new();
        for name in &doc.identification {
            let id = resolve(items, name)?;
            match equivalence.get(id) {
                Some(vars) => identification.extend(vars.iter().map(|v| v.to)),
                None => {
                    identification.insert(id);
                }
            }
        }

        let cargo_ignore = doc
            .cargo_ignore
            .iter()
            .map(|name| resolve(items, name))
            .collect::<Result<BTreeSet<_>>>()?;

        let mut cargo_overrides = BTreeMap::new();
        for rule in &doc.cargo_overrides {
            let detect = resolve(items, &rule.detect)?;
            let remove = rule
                .remove
                .iter()
                .map(|name| resolve(items, name))
                .collect::<Result<BTreeSet<_>>>()?;
            let mut add = ItemCounts::new();
            for (name, amount) in &rule.add {
                add.insert(resolve(items, name)?, *amount);
            }
            cargo_overrides.insert(detect, CargoOverride { remove, add });
        }

        debug!(
            identification = identification.len(),
            cargo_ignore = cargo_ignore.len(),
            cargo_overrides = cargo_overrides.len(),
            "Fit matcher rules resolved"
        );

        Ok(Self {
            equivalence,
            identification,
            cargo_ignore,
            cargo_overrides,
            leeway,
        })
    }

    pub fn equivalence(&self) -> &EquivalenceTable {
        &self.equivalence
    }

    pub fn is_identification(&self, id: TypeId) -> bool {
        self.identification.contains(&id)
    }

    /// 期待 (expected) と実際 (have) を比較
    pub fn diff(&self, expected: &Loadout, have: &Loadout) -> MatchResult {
        let modules = self.section_diff(&expected.modules, &have.modules);

        let expected_cargo = self.expected_cargo(&expected.cargo);
        let cargo = self.section_diff(&expected_cargo, &have.cargo);

        // カーゴのダウングレードは不足として扱う
        let mut cargo_missing = cargo.missing;
        for (type_id, to) in cargo.downgraded {
            for count in to.into_values() {
                let total = cargo_missing.entry(type_id).or_insert(0);
                *total = total.saturating_add(count);
            }
        }

        let leeway = self.leeway;
        let cargo_missing: ItemCounts = cargo_missing
            .into_iter()
            .filter(|(type_id, count)| {
                let expect = expected_cargo.get(type_id).copied().unwrap_or(0);
                if expect >= leeway.min_quantity {
                    i128::from(*count) * 100
                        > i128::from(expect) * i128::from(leeway.missing_percent)
                } else {
                    true
                }
            })
            .collect();

        let fit_ok =
            modules.missing.is_empty() && modules.extra.is_empty() && modules.downgraded.is_empty();
        let cargo_ok = cargo_missing.is_empty();

        let mut result = MatchResult {
            missing: modules.missing,
            extra: modules.extra,
            downgraded: modules.downgraded,
            upgraded: modules.upgraded,
            cargo_missing,
            fit_ok,
            cargo_ok,
            score: 0,
        };
        result.score = self.score(&result);
        result
    }

    /// 無視リストと差し替えルールを適用した期待カーゴ
    fn expected_cargo(&self, cargo: &ItemCounts) -> ItemCounts {
        let mut expected = cargo.clone();
        expected.retain(|id, _| !self.cargo_ignore.contains(id));
        for (detect, change) in &self.cargo_overrides {
            if expected.contains_key(detect) {
                expected.retain(|id, _| !change.remove.contains(id));
                for (&id, &amount) in &change.add {
                    expected.insert(id, amount);
                }
            }
        }
        expected
    }

    /// 2パスで期待数を満たす
    ///
    /// 1パス目は同等 (階層差 0) の代替のみ、2パス目は近い階層から順に消費します。
    fn section_diff(&self, expect: &ItemCounts, actual: &ItemCounts) -> SectionDiff {
        let mut extra = actual.clone();
        let mut missing = expect.clone();
        let mut upgraded = Substitutions::new();
        let mut downgraded = Substitutions::new();

        for (&expect_id, remaining) in missing.iter_mut() {
            let or_else = [Variation {
                to: expect_id,
                tier_delta: 0,
            }];
            let variations = self.equivalence.get(expect_id).unwrap_or(&or_else);
            for variation in variations.iter().filter(|v| v.tier_delta == 0) {
                take(&mut extra, variation.to, remaining);
            }
        }

        for (&expect_id, remaining) in missing.iter_mut() {
            let or_else = [Variation {
                to: expect_id,
                tier_delta: 0,
            }];
            let variations = self.equivalence.get(expect_id).unwrap_or(&or_else);
            for variation in variations {
                let taken = take(&mut extra, variation.to, remaining);
                if taken == 0 {
                    continue;
                }
                let record = match variation.tier_delta {
                    delta if delta > 0 => &mut upgraded,
                    delta if delta < 0 => &mut downgraded,
                    _ => continue,
                };
                let total = record
                    .entry(expect_id)
                    .or_default()
                    .entry(variation.to)
                    .or_insert(0);
                *total = total.saturating_add(taken);
            }
        }

        SectionDiff {
            missing: missing.into_iter().filter(|(_, v)| *v > 0).collect(),
            extra: extra.into_iter().filter(|(_, v)| *v > 0).collect(),
            upgraded,
            downgraded,
        }
    }

    fn weight(&self, id: TypeId) -> i64 {
        if self.identification.contains(&id) {
            IDENTIFICATION_MULTIPLIER
        } else {
            1
        }
    }

    /// スコア (0 が完全一致、低いほど乖離が大きい)
    ///
    /// 極端な個数でも飽和するだけで桁あふれしません。
    pub fn score(&self, result: &MatchResult) -> i64 {
        let penalty = |weight: i64, id: TypeId, count: i64| {
            weight.saturating_mul(count).saturating_mul(self.weight(id))
        };
        let total = |to: &ItemCounts| {
            to.values()
                .fold(0i64, |acc, &count| acc.saturating_add(count))
        };

        let mut sum: i64 = 0;
        for (&id, &count) in &result.missing {
            sum = sum.saturating_add(penalty(MISSING_WEIGHT, id, count));
        }
        for (&id, &count) in &result.extra {
            sum = sum.saturating_add(penalty(EXTRA_WEIGHT, id, count));
        }
        for (&id, to) in &result.downgraded {
            sum = sum.saturating_add(penalty(DOWNGRADE_WEIGHT, id, total(to)));
        }
        for (&id, to) in &result.upgraded {
            sum = sum.saturating_add(penalty(UPGRADE_WEIGHT, id, total(to)));
        }
        sum.saturating_neg()
    }

    /// インプラント条件で候補を絞り込む
    pub fn is_candidate(template: &FitTemplate, can_amulet: bool, can_hybrid: bool) -> bool {
        (can_amulet || !template.is_amulet) && (can_hybrid || !template.is_hybrid)
    }

    /// 同じ船体のテンプレートから最もスコアの高いものを選ぶ
    ///
    /// 同点の場合は宣言順で先のテンプレートを優先します。
    pub fn best_match<'c>(
        &self,
        catalog: &'c TemplateCatalog,
        loadout: &Loadout,
        can_amulet: bool,
        can_hybrid: bool,
    ) -> Option<(&'c FitTemplate, MatchResult)> {
        let mut best: Option<(&'c FitTemplate, MatchResult)> = None;
        for template in catalog.for_ship(loadout.ship) {
            if !Self::is_candidate(template, can_amulet, can_hybrid) {
                continue;
            }
            let result = self.diff(&template.loadout, loadout);
            let better = match &best {
                Some((_, current)) => result.score > current.score,
                None => true,
            };
            if better {
                best = Some((template, result));
            }
        }
        best
    }
}

/// `extra` から `id` を最大 `remaining` 個消費し、消費数を返す
fn take(extra: &mut ItemCounts, id: TypeId, remaining: &mut i64) -> i64 {
    let Some(available) = extra.get_mut(&id) else {
        return 0;
    };
    let taken = min(*remaining, *available);
    if taken > 0 {
        *remaining -= taken;
        *available -= taken;
    }
    taken.max(0)
}
