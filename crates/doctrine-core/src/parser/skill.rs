//! スキル要件ノードのパース

use super::{args, children, first_string, prop_integer, prop_string, skill_level};
use crate::error::{DoctrineError, Result};
use crate::model::{ModuleSkillDecl, SkillPlanDecl, SkillRequirementDecl};
use kdl::KdlNode;

/// skills ノードをパース
///
/// ```kdl
/// skills "Nightmare" {
///     skill "Large Energy Turret" min=3 elite=4 gold=5
/// }
/// ```
pub fn parse_skill_plan(node: &KdlNode) -> Result<SkillPlanDecl> {
    let ship = first_string(node, "skills")?;
    let mut plan = SkillPlanDecl {
        ship,
        skills: Vec::new(),
    };

    for child in children(node) {
        if child.name().value() != "skill" {
            continue;
        }
        let skill = first_string(child, "skill")?;
        let context = format!("skills '{}' / '{}'", plan.ship, skill);
        let level = |key: &str| {
            prop_integer(child, key)
                .map(|v| skill_level(v, &context))
                .transpose()
        };
        plan.skills.push(SkillRequirementDecl {
            min: level("min")?,
            elite: level("elite")?,
            gold: level("gold")?,
            skill,
        });
    }

    Ok(plan)
}

/// require-skills ノードをパース
///
/// ```kdl
/// require-skills module="Bastion Module I" {
///     skill "Hull Upgrades" 5
/// }
/// ```
pub fn parse_module_skills(node: &KdlNode) -> Result<ModuleSkillDecl> {
    let module = match prop_string(node, "module") {
        Some(module) => module,
        None => first_string(node, "require-skills")?,
    };

    let mut decl = ModuleSkillDecl {
        module,
        skills: Vec::new(),
    };

    for child in children(node) {
        if child.name().value() != "skill" {
            continue;
        }
        let skill = first_string(child, "skill")?;
        let level = args(child).nth(1).and_then(|v| v.as_integer()).ok_or_else(|| {
            DoctrineError::InvalidConfig(format!(
                "require-skills '{}': skill '{}' requires a level",
                decl.module, skill
            ))
        })?;
        let level = skill_level(level, &decl.module)?;
        decl.skills.push((skill, level));
    }

    Ok(decl)
}
