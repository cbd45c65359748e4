use anyhow::{Context, bail};
use colored::Colorize;
use doctrine_core::{
    ComplianceDecision, ImplantClassifier, ItemCounts, ItemLookup, SkillLevels, TypeId,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct EvaluateArgs {
    pub dna: String,
    pub skills: Option<PathBuf>,
    pub implants: Vec<TypeId>,
    pub hours: i64,
    pub json: bool,
}

pub fn handle(data: Option<&Path>, args: EvaluateArgs) -> anyhow::Result<()> {
    let doctrine = super::load(data)?;

    let skills = match &args.skills {
        Some(path) => read_skills(path, &doctrine.items)?,
        None => SkillLevels::new(),
    };

    let decision = doctrine.engine.evaluate(
        &args.dna,
        &skills,
        &args.implants,
        args.hours.saturating_mul(3600),
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print_decision(&decision, &doctrine.items, doctrine.engine.implants());
    }
    Ok(())
}

/// スキルの JSON ファイルを読み込む
///
/// キーはスキル名またはスキル ID
fn read_skills(path: &Path, items: &dyn ItemLookup) -> anyhow::Result<SkillLevels> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("スキルファイルを読み込めません: {}", path.display()))?;
    let raw: BTreeMap<String, u8> = serde_json::from_str(&content)
        .with_context(|| format!("スキルファイルの形式が不正です: {}", path.display()))?;

    let mut skills = SkillLevels::new();
    for (key, level) in raw {
        let id = match key.parse::<TypeId>() {
            Ok(id) => id,
            Err(_) => match items.id_of(&key) {
                Some(id) => id,
                None => bail!("不明なスキルです: {}", key),
            },
        };
        skills.set(id, level);
    }
    Ok(skills)
}

fn print_decision(
    decision: &ComplianceDecision,
    items: &dyn ItemLookup,
    implants: &ImplantClassifier,
) {
    if decision.approved {
        println!("{}", "✓ 承認".green().bold());
    } else {
        println!("{}", "✗ 未承認".red().bold());
    }
    println!("カテゴリ: {}", decision.category.cyan());

    if !decision.tags.is_empty() {
        let tags: Vec<&str> = decision.tags.iter().map(String::as_str).collect();
        println!("タグ: {}", tags.join(", ").yellow());
    }

    let missing: Vec<&str> = decision
        .tags
        .iter()
        .filter(|tag| implants.is_required_tag(tag))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        println!(
            "  {} 必須インプラントが不足しています: {}",
            "✗".red(),
            missing.join(", ").red()
        );
    }

    for error in &decision.errors {
        println!("  {} {}", "⚠".yellow(), error);
    }

    let Some(fit) = &decision.fit_check else {
        println!("一致するフィットテンプレートがありません");
        return;
    };

    println!("テンプレート: {}", fit.name.cyan());
    print_counts("不足", &fit.missing, items);
    print_counts("余分", &fit.extra, items);
    print_counts("カーゴ不足", &fit.cargo_missing, items);
    if !fit.downgraded.is_empty() {
        println!("  ダウングレード:");
        for (expected, substitutes) in &fit.downgraded {
            for (substitute, count) in substitutes {
                println!(
                    "    - {} → {} x{}",
                    item_name(items, *expected),
                    item_name(items, *substitute),
                    count
                );
            }
        }
    }
}

fn print_counts(label: &str, counts: &ItemCounts, items: &dyn ItemLookup) {
    if counts.is_empty() {
        return;
    }
    println!("  {}:", label);
    for (id, count) in counts {
        println!("    - {} x{}", item_name(items, *id), count);
    }
}

fn item_name(items: &dyn ItemLookup, id: TypeId) -> String {
    items
        .name_of(id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", id))
}
