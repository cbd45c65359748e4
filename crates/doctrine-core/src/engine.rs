//! 判定エンジン
//!
//! DNA コーデック・フィット照合・スキルゲート・インプラント判定・カテゴリ割り当てを
//! 決められた順序で実行し、タグ・カテゴリ・承認可否を決定します。
//!
//! 構築後のエンジンは不変で、`evaluate` は入力のみに依存する純粋関数です。
//! 複数スレッドからロックなしで共有できます。

use crate::catalog::TemplateCatalog;
use crate::categories::Categorizer;
use crate::dna::decode;
use crate::error::{ParseError, Result};
use crate::implants::{ImplantClassifier, ImplantDetection};
use crate::items::{ItemLookup, resolve};
use crate::matcher::{FitMatcher, MatchResult};
use crate::model::{
    CategoryDecl, ComplianceDecision, DoctrineDocument, EngineSettings, FitCheckDetail,
    FitTemplate, Loadout, SkillLevels, SkillTier, TypeId,
};
use crate::skills::SkillGate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

pub const TAG_STARTER_SKILLS: &str = "STARTER-SKILLS";
pub const TAG_ELITE_SKILLS: &str = "ELITE-SKILLS";
pub const TAG_GOLD_SKILLS: &str = "GOLD-SKILLS";
pub const TAG_ELITE_FIT: &str = "ELITE-FIT";
pub const TAG_ELITE: &str = "ELITE";
pub const TAG_ELITE_GOLD: &str = "ELITE-GOLD";

const SECONDS_PER_HOUR: i64 = 3600;

#[derive(Debug, Clone)]
pub struct ComplianceEngine {
    matcher: FitMatcher,
    catalog: TemplateCatalog,
    skills: SkillGate,
    implants: ImplantClassifier,
    categorizer: Categorizer,
    /// 禁止モジュール ID → 表示名
    banned: BTreeMap<TypeId, String>,
    settings: EngineSettings,
}

impl ComplianceEngine {
    /// 宣言からすべての表を構築し、テンプレートの自己検証まで行う
    #[instrument(skip_all)]
    pub fn build(
        doc: &DoctrineDocument,
        items: &dyn ItemLookup,
        settings: EngineSettings,
    ) -> Result<Self> {
        let matcher = FitMatcher::build(doc, items, settings.cargo_leeway)?;
        let catalog = TemplateCatalog::build(doc, items)?;
        let skills = SkillGate::build(doc, items, settings.tank_floor)?;
        let implants = ImplantClassifier::build(doc, items)?;
        let categorizer = Categorizer::build(doc, items)?;

        let mut banned = BTreeMap::new();
        for name in &doc.banned {
            banned.insert(resolve(items, name)?, name.clone());
        }

        let engine = Self {
            matcher,
            catalog,
            skills,
            implants,
            categorizer,
            banned,
            settings,
        };
        engine.self_check()?;

        info!(
            templates = engine.catalog.len(),
            substitutions = engine.matcher.equivalence().len(),
            banned = engine.banned.len(),
            "Compliance engine ready"
        );
        Ok(engine)
    }

    /// テンプレートの自己検証
    pub fn self_check(&self) -> Result<()> {
        self.catalog.self_check(&self.matcher)
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn matcher(&self) -> &FitMatcher {
        &self.matcher
    }

    pub fn skills(&self) -> &SkillGate {
        &self.skills
    }

    pub fn implants(&self) -> &ImplantClassifier {
        &self.implants
    }

    pub fn categories(&self) -> &[CategoryDecl] {
        self.categorizer.categories()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// DNA 文字列を判定
    pub fn evaluate(
        &self,
        dna: &str,
        skills: &SkillLevels,
        implants: &[TypeId],
        time_in_fleet_secs: i64,
    ) -> std::result::Result<ComplianceDecision, ParseError> {
        let loadout = decode(dna)?;
        Ok(self.evaluate_loadout(&loadout, skills, implants, time_in_fleet_secs))
    }

    /// デコード済みのロードアウトを判定
    pub fn evaluate_loadout(
        &self,
        loadout: &Loadout,
        skills: &SkillLevels,
        implants: &[TypeId],
        time_in_fleet_secs: i64,
    ) -> ComplianceDecision {
        let mut decision = Evaluation::new(self.categorizer.default_category());

        // 1. スキル階層
        let skill_tier = self.skills.classify(loadout.ship, skills);
        match skill_tier {
            None => {
                decision.tag(TAG_STARTER_SKILLS);
                decision.veto();
            }
            Some(SkillTier::Gold) => decision.tag(TAG_GOLD_SKILLS),
            Some(SkillTier::Elite) => decision.tag(TAG_ELITE_SKILLS),
            Some(SkillTier::Min) => {}
        }

        // 2. インプラント
        let detection = self.implants.detect(loadout.ship, implants);
        if let Some(tag) = detection.tag() {
            decision.tag(&tag);
        }
        if let Some(tag) = &detection.missing_slot_tag {
            decision.tag(tag);
        }

        // 3. フィット照合
        let matched = self.matcher.best_match(
            &self.catalog,
            loadout,
            detection.can_amulet,
            detection.can_hybrid,
        );
        if let Some((template, result)) = &matched {
            if result.fit_ok && template.is_elite() {
                decision.tag(TAG_ELITE_FIT);
            }
            decision.fit_check = Some(fit_check_detail(template, result));
        }
        if let Some(error) = self.locked_template_error(loadout, &detection) {
            decision.errors.push(error);
        }

        // 4. カテゴリ
        let category = self.categorizer.categorize(loadout);
        decision.category = if decision.has(TAG_STARTER_SKILLS)
            && !self.categorizer.is_protected(category)
        {
            self.categorizer.default_category().to_string()
        } else {
            category.to_string()
        };

        // 5. 船体固有の必須インプラント
        for tag in self.implants.missing_required(loadout.ship, implants) {
            decision.tag(&tag);
            decision.veto();
        }

        // 6. 使用スキルとタンクスキル
        decision
            .errors
            .extend(self.skills.usage_errors(loadout, skills));
        let template_tier = matched.as_ref().map(|(template, _)| template.tier);
        decision
            .errors
            .extend(self.skills.tank_errors(loadout, skills, template_tier));

        for (id, name) in &self.banned {
            if loadout.fits_item(*id) {
                decision
                    .errors
                    .push(format!("Fit contains banned module: {}", name));
            }
        }

        // 7. 承認判定
        decision.approved = match &matched {
            Some((template, result)) => {
                decision.approvable
                    && result.fit_ok
                    && result.cargo_ok
                    && self.is_eligible(template, skill_tier, time_in_fleet_secs)
            }
            None => false,
        };

        // 8. タグの統合
        decision.merge_tags();

        debug!(
            ship = loadout.ship,
            template = matched.as_ref().map(|(t, _)| t.name.as_str()),
            category = %decision.category,
            approved = decision.approved,
            tags = ?decision.tags,
            "Loadout evaluated"
        );

        decision.finish()
    }

    /// インプラント不足で候補から外れたテンプレートに完全一致している場合のエラー
    fn locked_template_error(
        &self,
        loadout: &Loadout,
        detection: &ImplantDetection,
    ) -> Option<String> {
        let (can_amulet, can_hybrid) = (detection.can_amulet, detection.can_hybrid);
        if can_amulet && can_hybrid {
            return None;
        }
        let (template, result) = self.matcher.best_match(&self.catalog, loadout, true, true)?;
        if !result.fit_ok || FitMatcher::is_candidate(template, can_amulet, can_hybrid) {
            return None;
        }
        let set = if template.is_amulet && !can_amulet {
            "Amulet"
        } else {
            "Hybrid"
        };
        Some(format!("Missing implants to fly {} fit", set))
    }

    fn is_eligible(
        &self,
        template: &FitTemplate,
        skill_tier: Option<SkillTier>,
        time_in_fleet_secs: i64,
    ) -> bool {
        let skilled = matches!(skill_tier, Some(SkillTier::Elite | SkillTier::Gold));
        if skilled && template.is_elite() {
            return true;
        }
        let hours = self.settings.time_in_fleet_hours.for_tier(template.tier);
        time_in_fleet_secs >= hours.saturating_mul(SECONDS_PER_HOUR)
    }
}

/// 判定途中の状態
struct Evaluation {
    approvable: bool,
    approved: bool,
    category: String,
    tags: BTreeSet<String>,
    errors: Vec<String>,
    fit_check: Option<FitCheckDetail>,
}

impl Evaluation {
    fn new(default_category: &str) -> Self {
        Self {
            approvable: true,
            approved: false,
            category: default_category.to_string(),
            tags: BTreeSet::new(),
            errors: Vec::new(),
            fit_check: None,
        }
    }

    fn tag(&mut self, tag: &str) {
        self.tags.insert(tag.to_string());
    }

    fn has(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// 承認を無条件に不可にする
    fn veto(&mut self) {
        self.approvable = false;
    }

    fn merge_tags(&mut self) {
        if !self.has(TAG_ELITE_FIT) {
            return;
        }
        let merged = if self.tags.remove(TAG_ELITE_SKILLS) {
            TAG_ELITE
        } else if self.tags.remove(TAG_GOLD_SKILLS) {
            TAG_ELITE_GOLD
        } else {
            return;
        };
        self.tags.remove(TAG_ELITE_FIT);
        self.tag(merged);
    }

    fn finish(self) -> ComplianceDecision {
        ComplianceDecision {
            approved: self.approved,
            category: self.category,
            tags: self.tags,
            errors: self.errors,
            fit_check: self.fit_check,
        }
    }
}

fn fit_check_detail(template: &FitTemplate, result: &MatchResult) -> FitCheckDetail {
    let mut ids: BTreeSet<TypeId> = BTreeSet::new();
    ids.extend(result.missing.keys());
    ids.extend(result.extra.keys());
    ids.extend(result.cargo_missing.keys());
    for (id, to) in &result.downgraded {
        ids.insert(*id);
        ids.extend(to.keys());
    }

    FitCheckDetail {
        name: template.name.clone(),
        missing: result.missing.clone(),
        extra: result.extra.clone(),
        downgraded: result.downgraded.clone(),
        cargo_missing: result.cargo_missing.clone(),
        ids: ids.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeInFleetHours;
    use crate::testing::{fixture_document, fixture_engine, fixture_items};

    const ELITE_NIGHTMARE: &str = "17736:3057;4:19327;1:28744;2:4383;1:12816_;100:46002_;1::";
    const BASIC_NIGHTMARE: &str = "17736:3057;4:12084;1:28746;2:4383;1:12816_;100::";
    const ELITE_NESTOR: &str = "33472:3530;4:11269;2:4383;1::";

    const AMULET_SET: [TypeId; 6] = [20499, 20501, 20503, 20505, 20507, 20509];
    const EXTRA_SLOTS: [TypeId; 4] = [33393, 22119, 27102, 27103];

    fn skills(pairs: &[(TypeId, u8)]) -> SkillLevels {
        let mut levels: SkillLevels = pairs.iter().copied().collect();
        for tank in [22806, 22807, 22808, 22809] {
            if levels.get(tank) == 0 {
                levels.set(tank, 4);
            }
        }
        levels
    }

    fn elite_nightmare_skills() -> SkillLevels {
        skills(&[(3339, 5), (3309, 4)])
    }

    fn tags(decision: &ComplianceDecision) -> Vec<&str> {
        decision.tags.iter().map(String::as_str).collect()
    }

    fn hours(h: i64) -> i64 {
        h * SECONDS_PER_HOUR
    }

    #[test]
    fn test_elite_fit_with_elite_skills() {
        let engine = fixture_engine();
        let decision = engine
            .evaluate(ELITE_NIGHTMARE, &elite_nightmare_skills(), &[], hours(150))
            .unwrap();

        assert!(decision.approved);
        assert_eq!(tags(&decision), vec![TAG_ELITE]);
        assert_eq!(decision.category, "dps");
        assert!(decision.errors.is_empty());

        let fit_check = decision.fit_check.unwrap();
        assert_eq!(fit_check.name, "ELITE Nightmare");
        assert!(fit_check.missing.is_empty());
        assert!(fit_check.ids.is_empty());
    }

    #[test]
    fn test_elite_skills_on_elite_template_skip_fleet_time() {
        let engine = fixture_engine();
        let decision = engine
            .evaluate(ELITE_NIGHTMARE, &elite_nightmare_skills(), &[], 0)
            .unwrap();
        assert!(decision.approved);

        // min スキルでは滞在時間が必要
        let min_skills = skills(&[(3339, 4), (3309, 3)]);
        let decision = engine.evaluate(ELITE_NIGHTMARE, &min_skills, &[], 0).unwrap();
        assert!(!decision.approved);
        assert_eq!(tags(&decision), vec![TAG_ELITE_FIT]);

        let decision = engine
            .evaluate(ELITE_NIGHTMARE, &min_skills, &[], hours(150))
            .unwrap();
        assert!(decision.approved);
    }

    #[test]
    fn test_gold_skills_merge() {
        let engine = fixture_engine();
        let gold = skills(&[(3339, 5), (3309, 5)]);
        let decision = engine.evaluate(ELITE_NIGHTMARE, &gold, &[], 0).unwrap();
        assert_eq!(tags(&decision), vec![TAG_ELITE_GOLD]);
        assert!(decision.approved);

        // ELITE-FIT がなければ統合しない
        let decision = engine.evaluate(BASIC_NIGHTMARE, &gold, &[], 0).unwrap();
        assert_eq!(tags(&decision), vec![TAG_GOLD_SKILLS]);
    }

    #[test]
    fn test_starter_skills_veto() {
        let engine = fixture_engine();
        let decision = engine
            .evaluate(ELITE_NIGHTMARE, &SkillLevels::new(), &[], hours(10_000))
            .unwrap();

        assert!(!decision.approved);
        assert!(decision.has_tag(TAG_STARTER_SKILLS));
        assert!(decision.has_tag(TAG_ELITE_FIT));
        // dps から starter に戻される
        assert_eq!(decision.category, "starter");
        assert_eq!(
            decision.errors,
            vec!["Missing Armor Compensation skills: level 4 required".to_string()]
        );
    }

    #[test]
    fn test_starter_skills_keep_protected_category() {
        let engine = fixture_engine();
        let decision = engine
            .evaluate(ELITE_NESTOR, &SkillLevels::new(), &[22119], hours(200))
            .unwrap();
        assert!(decision.has_tag(TAG_STARTER_SKILLS));
        assert_eq!(decision.category, "logi");
        assert!(!decision.approved);
    }

    #[test]
    fn test_fleet_time_by_template_tier() {
        let engine = fixture_engine();
        let min_skills = skills(&[(3339, 4), (3309, 3)]);

        let decision = engine
            .evaluate(BASIC_NIGHTMARE, &min_skills, &[], hours(50) - 1)
            .unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.category, "starter");

        let decision = engine
            .evaluate(BASIC_NIGHTMARE, &min_skills, &[], hours(50))
            .unwrap();
        assert!(decision.approved);

        let starter = "17736:3025;4:12076;1:11269;2:12816_;50::";
        let decision = engine.evaluate(starter, &min_skills, &[], 0).unwrap();
        assert!(decision.approved);
        assert_eq!(decision.fit_check.unwrap().name, "STARTER Nightmare");
    }

    #[test]
    fn test_fit_problems_block_approval() {
        let engine = fixture_engine();
        // MWD なし、Tracking Computer II が余分
        let dna = "17736:3057;4:28744;2:4383;1:1978;1:12816_;100:46001_;1::";
        let decision = engine
            .evaluate(dna, &elite_nightmare_skills(), &[], hours(1000))
            .unwrap();
        assert!(!decision.approved);
        assert!(!decision.has_tag(TAG_ELITE_FIT));
        assert!(decision.has_tag(TAG_ELITE_SKILLS));

        let fit_check = decision.fit_check.unwrap();
        assert_eq!(fit_check.name, "ELITE Nightmare");
        assert_eq!(fit_check.missing, BTreeMap::from([(19327, 1)]));
        assert_eq!(fit_check.extra, BTreeMap::from([(1978, 1)]));
        assert_eq!(fit_check.ids, vec![1978, 19327]);
    }

    #[test]
    fn test_cargo_shortage_blocks_approval() {
        let engine = fixture_engine();
        let dna = "17736:3057;4:19327;1:28744;2:4383;1:12816_;20::";
        let decision = engine
            .evaluate(dna, &elite_nightmare_skills(), &[], hours(1000))
            .unwrap();
        assert!(decision.has_tag(TAG_ELITE));
        assert!(!decision.approved);
        let fit_check = decision.fit_check.unwrap();
        assert_eq!(fit_check.cargo_missing, BTreeMap::from([(12816, 80), (46001, 1)]));
    }

    #[test]
    fn test_downgrade_detail() {
        let engine = fixture_engine();
        let dna = "17736:3025;4:19327;1:28744;2:4383;1:12816_;100:46001_;1::";
        let decision = engine
            .evaluate(dna, &elite_nightmare_skills(), &[], hours(1000))
            .unwrap();
        let fit_check = decision.fit_check.unwrap();
        assert_eq!(fit_check.name, "ELITE Nightmare");
        assert_eq!(
            fit_check.downgraded,
            BTreeMap::from([(3057, BTreeMap::from([(3025, 4)]))])
        );
        assert_eq!(fit_check.ids, vec![3025, 3057]);
        assert!(!decision.approved);
    }

    #[test]
    fn test_complete_implants_tag_and_amulet_template() {
        let engine = fixture_engine();
        let implants: Vec<TypeId> = AMULET_SET.iter().chain(&EXTRA_SLOTS).copied().collect();
        let dna = "17736:3057;4:19327;1:28744;2:4383;1:1978;1:12816_;100:46002_;1::";

        let decision = engine
            .evaluate(dna, &elite_nightmare_skills(), &implants, 0)
            .unwrap();
        assert!(decision.has_tag("AMULET1-10"));
        assert!(decision.has_tag(TAG_ELITE));
        assert!(decision.approved);
        assert_eq!(decision.fit_check.unwrap().name, "ELITE AMULET Nightmare");
        assert_eq!(decision.category, "sniper");

        // インプラントなしでは AMULET テンプレートは選ばれない
        let decision = engine.evaluate(dna, &elite_nightmare_skills(), &[], 0).unwrap();
        assert_eq!(decision.fit_check.unwrap().name, "ELITE Nightmare");
        assert!(!decision.approved);
        assert!(
            decision
                .errors
                .contains(&"Missing implants to fly Amulet fit".to_string())
        );
    }

    #[test]
    fn test_missing_implants_for_locked_template() {
        let engine = fixture_engine();
        let mut pilot = skills(&[(3339, 5), (3309, 4)]);
        pilot.set(3318, 4);
        let dna = "17736:3057;4:19327;1:28744;2:4383;1:1978;1:12816_;100:46002_;1::";

        // HYBRID セットでは AMULET テンプレートを使えない
        let hybrid: Vec<TypeId> = AMULET_SET[..5].iter().chain(&[27097]).copied().collect();
        let decision = engine.evaluate(dna, &pilot, &hybrid, 0).unwrap();
        assert_eq!(
            decision.errors,
            vec!["Missing implants to fly Amulet fit".to_string()]
        );
        assert!(!decision.approved);

        let decision = engine.evaluate(dna, &pilot, &AMULET_SET, 0).unwrap();
        assert!(decision.errors.is_empty());
        assert!(decision.approved);

        // 完全一致でなければ案内しない
        let decision = engine
            .evaluate("17736:3057;4:19327;1:1978;1::", &pilot, &[], 0)
            .unwrap();
        assert!(decision.errors.is_empty());
    }

    #[test]
    fn test_usage_skill_errors() {
        let engine = fixture_engine();
        let dna = "17736:3057;4:19327;1:28744;2:4383;1:1978;1:12816_;100:46002_;1::";
        let decision = engine
            .evaluate(dna, &elite_nightmare_skills(), &AMULET_SET, 0)
            .unwrap();
        assert_eq!(
            decision.errors,
            vec!["Missing skills to online/use 'Tracking Computer II'".to_string()]
        );
        // 使用スキルの不足は承認を妨げない
        assert!(decision.approved);

        let decision = engine
            .evaluate("17740:3057;1::", &SkillLevels::new(), &[], 0)
            .unwrap();
        assert_eq!(
            decision.errors[0],
            "Missing skills to online/use 'Vindicator'"
        );
    }

    #[test]
    fn test_missing_slot_ten_tag() {
        let engine = fixture_engine();
        let implants: Vec<TypeId> = AMULET_SET.iter().chain(&EXTRA_SLOTS[..3]).copied().collect();
        let decision = engine
            .evaluate(ELITE_NIGHTMARE, &elite_nightmare_skills(), &implants, 0)
            .unwrap();
        assert!(decision.has_tag("NO-SLOT10"));
        assert!(!decision.has_tag("AMULET1-10"));
        assert!(decision.approved);

        let implants: Vec<TypeId> = AMULET_SET.iter().chain(&EXTRA_SLOTS).copied().collect();
        let decision = engine
            .evaluate(ELITE_NIGHTMARE, &elite_nightmare_skills(), &implants, 0)
            .unwrap();
        assert!(!decision.has_tag("NO-SLOT10"));
        assert!(decision.has_tag("AMULET1-10"));
    }

    #[test]
    fn test_required_implant_veto() {
        let engine = fixture_engine();
        let nestor_skills = skills(&[(3339, 3), (16069, 5)]);

        let decision = engine
            .evaluate(ELITE_NESTOR, &nestor_skills, &[], hours(1000))
            .unwrap();
        assert!(decision.has_tag("NO-EM-806"));
        assert!(!decision.approved);

        let decision = engine
            .evaluate(ELITE_NESTOR, &nestor_skills, &[22119], 0)
            .unwrap();
        // Nestor は gold が elite から補完されるため常に ELITE-GOLD
        assert_eq!(tags(&decision), vec![TAG_ELITE_GOLD]);
        assert!(decision.approved);
        assert_eq!(decision.category, "logi");
    }

    #[test]
    fn test_banned_module_error() {
        let engine = fixture_engine();
        let dna = "17736:3057;4:19327;1:28744;2:4383;1:33101;1::";
        let decision = engine
            .evaluate(dna, &elite_nightmare_skills(), &[], 0)
            .unwrap();
        assert!(
            decision
                .errors
                .contains(&"Fit contains banned module: Large Ancillary Armor Repairer".to_string())
        );
        assert!(!decision.approved);
    }

    #[test]
    fn test_unknown_ship_is_not_an_error() {
        let engine = fixture_engine();
        let decision = engine
            .evaluate("641:3057;4:99999;1::", &elite_nightmare_skills(), &[], hours(1000))
            .unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.category, "starter");
        assert_eq!(tags(&decision), vec![TAG_STARTER_SKILLS]);
        assert!(decision.fit_check.is_none());
    }

    #[test]
    fn test_invalid_dna_is_parse_error() {
        let engine = fixture_engine();
        assert!(matches!(
            engine.evaluate("nightmare", &SkillLevels::new(), &[], 0),
            Err(ParseError::InvalidHull(_))
        ));
    }

    #[test]
    fn test_extreme_counts_do_not_panic() {
        let engine = fixture_engine();
        let skills = elite_nightmare_skills();

        assert!(matches!(
            engine.evaluate("17736:3057;9223372036854775807::", &skills, &[], 0),
            Err(ParseError::InvalidCount(_))
        ));

        // デコードを経由しないロードアウトでもスコアは飽和する
        let mut loadout = Loadout::new(17736);
        loadout.modules.insert(3057, i64::MAX);
        loadout.modules.insert(1978, i64::MAX);
        loadout.cargo.insert(12816, i64::MAX);
        let decision = engine.evaluate_loadout(&loadout, &skills, &[], i64::MAX);
        assert!(!decision.approved);
        let fit_check = decision.fit_check.unwrap();
        assert_eq!(fit_check.extra[&3057], i64::MAX - 4);
        assert_eq!(fit_check.extra[&1978], i64::MAX);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let engine = fixture_engine();
        let skills = elite_nightmare_skills();
        let first = engine.evaluate(BASIC_NIGHTMARE, &skills, &[22119], 42).unwrap();
        let second = engine.evaluate(BASIC_NIGHTMARE, &skills, &[22119], 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_evaluation() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ComplianceEngine>();

        let engine = fixture_engine();
        let skills = elite_nightmare_skills();
        let expected = engine.evaluate(ELITE_NIGHTMARE, &skills, &[], 0).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| engine.evaluate(ELITE_NIGHTMARE, &skills, &[], 0).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_custom_fleet_hours() {
        let settings = EngineSettings {
            time_in_fleet_hours: TimeInFleetHours {
                basic: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = ComplianceEngine::build(&fixture_document(), &fixture_items(), settings).unwrap();
        let min_skills = skills(&[(3339, 4), (3309, 3)]);
        let decision = engine.evaluate(BASIC_NIGHTMARE, &min_skills, &[], 0).unwrap();
        assert!(decision.approved);
    }
}
