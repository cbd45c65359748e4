//! スキルゲート
//!
//! 船体ごとの階層別スキル要件と、耐性補正スキルの下限チェックを行います。

use crate::error::{DoctrineError, Result};
use crate::items::{ItemLookup, resolve};
use crate::model::{
    DoctrineDocument, Loadout, SkillLevels, SkillThresholds, SkillTier, TankFloor, TemplateTier,
    TypeId,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// モジュール装備時のタンクスキル要件
#[derive(Debug, Clone, PartialEq, Eq)]
struct ModuleSkill {
    skill: TypeId,
    name: String,
    level: u8,
}

/// アイテムの使用 (船体の操縦・モジュールのオンライン化) に必要なスキル
#[derive(Debug, Clone, PartialEq, Eq)]
struct UsageRequirement {
    name: String,
    skills: BTreeMap<TypeId, u8>,
}

#[derive(Debug, Clone, Default)]
pub struct SkillGate {
    /// 船体ID → スキルID → しきい値 (補完済み)
    requirements: BTreeMap<TypeId, BTreeMap<TypeId, SkillThresholds>>,
    tank_skills: Vec<TypeId>,
    module_skills: BTreeMap<TypeId, Vec<ModuleSkill>>,
    usage: BTreeMap<TypeId, UsageRequirement>,
    tank_floor: TankFloor,
}

impl SkillGate {
    #[instrument(skip_all)]
    pub fn build(doc: &DoctrineDocument, items: &dyn ItemLookup, tank_floor: TankFloor) -> Result<Self> {
        let mut requirements = BTreeMap::new();
        for plan in &doc.skill_plans {
            let ship = resolve(items, &plan.ship)?;
            let mut table = BTreeMap::new();
            for requirement in &plan.skills {
                let skill = resolve(items, &requirement.skill)?;
                let thresholds = SkillThresholds {
                    min: requirement.min,
                    elite: requirement.elite,
                    gold: requirement.gold,
                }
                .backfilled();
                if !thresholds.is_monotonic() {
                    return Err(DoctrineError::InvalidConfig(format!(
                        "skills '{}' / '{}': min <= elite <= gold である必要があります",
                        plan.ship, requirement.skill
                    )));
                }
                if table.insert(skill, thresholds).is_some() {
                    return Err(DoctrineError::DuplicateDeclaration(format!(
                        "skill '{}' for '{}'",
                        requirement.skill, plan.ship
                    )));
                }
            }
            if requirements.insert(ship, table).is_some() {
                return Err(DoctrineError::DuplicateDeclaration(format!(
                    "skills '{}'",
                    plan.ship
                )));
            }
            debug!(ship = %plan.ship, skills = plan.skills.len(), "Skill plan loaded");
        }

        let tank_skills = doc
            .tank_floor
            .iter()
            .map(|name| resolve(items, name))
            .collect::<Result<Vec<_>>>()?;

        let mut module_skills: BTreeMap<TypeId, Vec<ModuleSkill>> = BTreeMap::new();
        for decl in &doc.module_skills {
            let module = resolve(items, &decl.module)?;
            for (name, level) in &decl.skills {
                module_skills.entry(module).or_default().push(ModuleSkill {
                    skill: resolve(items, name)?,
                    name: name.clone(),
                    level: *level,
                });
            }
        }

        let usage: BTreeMap<TypeId, UsageRequirement> = items
            .skill_requirements()
            .into_iter()
            .map(|(id, skills)| {
                let name = items
                    .name_of(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", id));
                (id, UsageRequirement { name, skills })
            })
            .collect();

        info!(
            ships = requirements.len(),
            tank_skills = tank_skills.len(),
            module_rules = module_skills.len(),
            usage_rules = usage.len(),
            "Skill requirements built"
        );

        Ok(Self {
            requirements,
            tank_skills,
            module_skills,
            usage,
            tank_floor,
        })
    }

    pub fn has_requirements(&self, ship: TypeId) -> bool {
        self.requirements.contains_key(&ship)
    }

    /// 指定階層のしきい値を全て満たすか
    ///
    /// 要件が登録されていない船体は常に不合格です。
    pub fn skillcheck(&self, ship: TypeId, skills: &SkillLevels, tier: SkillTier) -> bool {
        let Some(table) = self.requirements.get(&ship) else {
            return false;
        };
        table.iter().all(|(&skill, thresholds)| match thresholds.get(tier) {
            Some(required) => skills.get(skill) >= required,
            None => true,
        })
    }

    /// 満たしている最上位の階層 (gold → elite → min の順に判定)
    pub fn classify(&self, ship: TypeId, skills: &SkillLevels) -> Option<SkillTier> {
        [SkillTier::Gold, SkillTier::Elite, SkillTier::Min]
            .into_iter()
            .find(|&tier| self.skillcheck(ship, skills, tier))
    }

    /// タンクスキルの検証エラー
    ///
    /// 耐性補正スキルの下限 (テンプレート階層に依存) と、
    /// 装備モジュールに紐づくスキル要件を確認します。
    pub fn tank_errors(
        &self,
        loadout: &Loadout,
        skills: &SkillLevels,
        template_tier: Option<TemplateTier>,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        let floor = self.tank_floor.for_tier(template_tier);
        if self.tank_skills.iter().any(|&skill| skills.get(skill) < floor) {
            errors.push(format!(
                "Missing Armor Compensation skills: level {} required",
                floor
            ));
        }

        for (&module, requirements) in &self.module_skills {
            if !loadout.fits_item(module) {
                continue;
            }
            for requirement in requirements {
                if skills.get(requirement.skill) < requirement.level {
                    errors.push(format!(
                        "Missing tank skill: {} {} required",
                        requirement.name, requirement.level
                    ));
                }
            }
        }

        errors
    }

    /// 船体と装備モジュールの使用スキル不足
    ///
    /// 不足のあるアイテムごとに1件、船体を先頭にして返します。
    pub fn usage_errors(&self, loadout: &Loadout, skills: &SkillLevels) -> Vec<String> {
        std::iter::once(loadout.ship)
            .chain(loadout.modules.keys().copied().filter(|&id| id != loadout.ship))
            .filter_map(|id| self.usage.get(&id))
            .filter(|usage| {
                usage
                    .skills
                    .iter()
                    .any(|(&skill, &level)| skills.get(skill) < level)
            })
            .map(|usage| format!("Missing skills to online/use '{}'", usage.name))
            .collect()
    }
}
