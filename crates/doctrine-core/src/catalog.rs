//! フィットテンプレートカタログ
//!
//! 宣言されたフィットを船体ごとに保持します。
//! 構築後に自己検証を行い、各テンプレートが自身のロードアウトに対して
//! 一意に最良一致となることを保証します。

use crate::dna::decode;
use crate::error::{DoctrineError, Result};
use crate::items::ItemLookup;
use crate::matcher::FitMatcher;
use crate::model::{DoctrineDocument, FitTemplate, TypeId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    /// 船体ID → 宣言順のテンプレート
    by_ship: BTreeMap<TypeId, Vec<FitTemplate>>,
}

impl TemplateCatalog {
    #[instrument(skip_all)]
    pub fn build(doc: &DoctrineDocument, items: &dyn ItemLookup) -> Result<Self> {
        let mut by_ship: BTreeMap<TypeId, Vec<FitTemplate>> = BTreeMap::new();
        let mut names = BTreeSet::new();

        for fit in &doc.fits {
            if !names.insert(fit.name.as_str()) {
                return Err(DoctrineError::DuplicateDeclaration(format!(
                    "fit '{}'",
                    fit.name
                )));
            }

            let loadout = decode(&fit.dna).map_err(|source| DoctrineError::TemplateDna {
                name: fit.name.clone(),
                source,
            })?;

            let ids = std::iter::once(&loadout.ship)
                .chain(loadout.modules.keys())
                .chain(loadout.cargo.keys());
            for &id in ids {
                if items.name_of(id).is_none() {
                    return Err(DoctrineError::ItemNotFound(format!(
                        "{} (fit '{}')",
                        id, fit.name
                    )));
                }
            }

            let template = FitTemplate::new(fit.name.clone(), loadout);
            debug!(
                name = %template.name,
                ship = template.loadout.ship,
                tier = ?template.tier,
                amulet = template.is_amulet,
                hybrid = template.is_hybrid,
                "Template loaded"
            );
            by_ship
                .entry(template.loadout.ship)
                .or_default()
                .push(template);
        }

        info!(templates = names.len(), ships = by_ship.len(), "Template catalog built");
        Ok(Self { by_ship })
    }

    /// 指定船体のテンプレート (宣言順)
    pub fn for_ship(&self, ship: TypeId) -> &[FitTemplate] {
        self.by_ship.get(&ship).map(|t| t.as_slice()).unwrap_or(&[])
    }

    pub fn templates(&self) -> impl Iterator<Item = &FitTemplate> {
        self.by_ship.values().flatten()
    }

    pub fn get(&self, name: &str) -> Option<&FitTemplate> {
        self.templates().find(|t| t.name == name)
    }

    pub fn ships(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.by_ship.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_ship.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ship.is_empty()
    }

    /// 各テンプレートのロードアウトを、そのテンプレートを選べるインプラント条件で評価し、
    /// 自身が fit/cargo とも満たし、かつ他のどの候補よりも厳密に高いスコアになることを確認
    #[instrument(skip_all)]
    pub fn self_check(&self, matcher: &FitMatcher) -> Result<()> {
        for templates in self.by_ship.values() {
            for (index, template) in templates.iter().enumerate() {
                let can_amulet = template.is_amulet;
                let can_hybrid = template.is_hybrid || template.is_amulet;

                let own = matcher.diff(&template.loadout, &template.loadout);
                if !own.fit_ok || !own.cargo_ok {
                    return Err(DoctrineError::TemplateSelfCheck {
                        name: template.name.clone(),
                        reason: format!(
                            "自身のロードアウトで不合格になります (fit_ok={}, cargo_ok={})",
                            own.fit_ok, own.cargo_ok
                        ),
                    });
                }

                for (other_index, other) in templates.iter().enumerate() {
                    if other_index == index
                        || !FitMatcher::is_candidate(other, can_amulet, can_hybrid)
                    {
                        continue;
                    }
                    let result = matcher.diff(&other.loadout, &template.loadout);
                    if result.score >= own.score {
                        return Err(DoctrineError::TemplateSelfCheck {
                            name: template.name.clone(),
                            reason: format!(
                                "'{}' のスコア {} が自身のスコア {} 以上です",
                                other.name, result.score, own.score
                            ),
                        });
                    }
                }
                debug!(name = %template.name, "Template self-check passed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CargoLeeway, FitDeclaration, TemplateTier};
    use crate::testing::{fixture_catalog, fixture_document, fixture_items};

    fn matcher(doc: &DoctrineDocument) -> FitMatcher {
        FitMatcher::build(doc, &fixture_items(), CargoLeeway::default()).unwrap()
    }

    fn fit(name: &str, dna: &str) -> FitDeclaration {
        FitDeclaration {
            name: name.to_string(),
            dna: dna.to_string(),
        }
    }

    #[test]
    fn test_catalog_groups_by_ship_in_order() {
        let catalog = fixture_catalog();
        assert_eq!(catalog.len(), 6);
        let names: Vec<&str> = catalog
            .for_ship(17736)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "ELITE Nightmare",
                "BASIC Nightmare",
                "STARTER Nightmare",
                "ELITE AMULET Nightmare"
            ]
        );
        assert!(catalog.for_ship(641).is_empty());
        assert_eq!(catalog.ships().collect::<Vec<_>>(), vec![17736, 33472]);
    }

    #[test]
    fn test_template_flags_from_names() {
        let catalog = fixture_catalog();
        let amulet = catalog.get("ELITE AMULET Nightmare").unwrap();
        assert_eq!(amulet.tier, TemplateTier::Elite);
        assert!(amulet.is_amulet);
        assert_eq!(
            catalog.get("STARTER Nightmare").unwrap().tier,
            TemplateTier::Starter
        );
    }

    #[test]
    fn test_fixture_passes_self_check() {
        let doc = fixture_document();
        let catalog = fixture_catalog();
        assert!(catalog.self_check(&matcher(&doc)).is_ok());
    }

    #[test]
    fn test_self_check_rejects_indistinguishable_templates() {
        let mut doc = fixture_document();
        // ELITE Nightmare と同じロードアウト
        doc.fits.push(fit(
            "ELITE Nightmare copy",
            "17736:3057;4:19327;1:28744;2:4383;1:12816_;100:46002_;1::",
        ));
        let catalog = TemplateCatalog::build(&doc, &fixture_items()).unwrap();
        let result = catalog.self_check(&matcher(&doc));
        assert!(matches!(
            result,
            Err(DoctrineError::TemplateSelfCheck { .. })
        ));
    }

    #[test]
    fn test_self_check_rejects_lateral_duplicate() {
        let mut doc = fixture_document();
        // Corpum は Centum と同等なので区別できない
        doc.fits.push(fit(
            "ELITE Corpum Nightmare",
            "17736:3057;4:19327;1:28748;2:4383;1:12816_;100:46002_;1::",
        ));
        let catalog = TemplateCatalog::build(&doc, &fixture_items()).unwrap();
        assert!(catalog.self_check(&matcher(&doc)).is_err());
    }

    #[test]
    fn test_amulet_template_is_not_candidate_for_plain_check() {
        let mut doc = fixture_document();
        doc.fits.retain(|f| f.name != "ELITE AMULET Nightmare");
        // AMULET 版が ELITE と同一でも、ELITE 側の候補には入らない
        doc.fits.push(fit(
            "AMULET Nightmare",
            "17736:3057;4:19327;1:28744;2:4383;1:1978;1:12816_;100:46002_;1::",
        ));
        let catalog = TemplateCatalog::build(&doc, &fixture_items()).unwrap();
        assert!(catalog.self_check(&matcher(&doc)).is_ok());
    }

    #[test]
    fn test_bad_dna_is_reported_with_name() {
        let mut doc = fixture_document();
        doc.fits.push(fit("Broken", "17736:abc;1::"));
        match TemplateCatalog::build(&doc, &fixture_items()) {
            Err(DoctrineError::TemplateDna { name, .. }) => assert_eq!(name, "Broken"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_item_in_template() {
        let mut doc = fixture_document();
        doc.fits.push(fit("Unknown", "17736:99999;1::"));
        assert!(matches!(
            TemplateCatalog::build(&doc, &fixture_items()),
            Err(DoctrineError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_fit_name() {
        let mut doc = fixture_document();
        doc.fits.push(fit("ELITE Nestor", "33472:3530;4::"));
        assert!(matches!(
            TemplateCatalog::build(&doc, &fixture_items()),
            Err(DoctrineError::DuplicateDeclaration(_))
        ));
    }
}
