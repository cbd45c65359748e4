//! テスト用の小さなドクトリン

use crate::catalog::TemplateCatalog;
use crate::engine::ComplianceEngine;
use crate::items::StaticItemDb;
use crate::model::{DoctrineDocument, EngineSettings};
use crate::parser::parse_doctrine_string;

pub const FIXTURE_KDL: &str = r#"
doctrine "fixture"

item 17736 "Nightmare" category="ship"
item 17740 "Vindicator" category="ship" {
    require 3336 1
}
item 33472 "Nestor" category="ship"
item 641 "Megathron" category="ship"

item 3025 "Mega Pulse Laser I"
item 3057 "Mega Pulse Laser II" parent=3025 meta=5
item 12076 "500MN Microwarpdrive I"
item 12084 "500MN Microwarpdrive II" parent=12076 meta=5
item 19325 "Core C-Type 500MN Microwarpdrive" parent=12076 meta=11
item 19327 "Core X-Type 500MN Microwarpdrive" parent=12076 meta=14
item 19335 "Gist X-Type 500MN Microwarpdrive" parent=12076 meta=14
item 47757 "Abyssal 500MN Microwarpdrive"
item 11269 "Multispectrum Energized Membrane II"
item 28746 "Centii A-Type Multispectrum Coating"
item 28744 "Centum A-Type Multispectrum Energized Membrane"
item 28748 "Corpum A-Type Multispectrum Energized Membrane"
item 4383 "Large Micro Jump Drive"
item 1978 "Tracking Computer II" {
    require 3318 4
}
item 33400 "Bastion Module I"
item 33101 "Large Ancillary Armor Repairer"
item 3520 "Large Remote Armor Repairer I" {
    attribute 84 400.0
}
item 3530 "Large Remote Armor Repairer II" parent=3520 meta=5 {
    attribute 84 500.0
}
item 2456 "Hobgoblin II" category="drone"
item 12816 "Conflagration L" category="charge"
item 28668 "Nanite Repair Paste" category="charge"
item 46001 "Agency 'Pyrolancea' DB3 Dose I" category="implant"
item 46002 "Agency 'Pyrolancea' DB5 Dose II" category="implant"

item 22806 "EM Armor Compensation" category="skill"
item 22807 "Explosive Armor Compensation" category="skill"
item 22808 "Kinetic Armor Compensation" category="skill"
item 22809 "Thermal Armor Compensation" category="skill"
item 3339 "Amarr Battleship" category="skill"
item 3309 "Large Energy Turret" category="skill"
item 3394 "Hull Upgrades" category="skill"
item 3392 "Mechanics" category="skill"
item 16069 "Remote Armor Repair Systems" category="skill"
item 3318 "Weapon Upgrades" category="skill"
item 3336 "Gallente Battleship" category="skill"

item 20499 "High-grade Amulet Alpha" category="implant"
item 20501 "High-grade Amulet Beta" category="implant"
item 20503 "High-grade Amulet Delta" category="implant"
item 20505 "High-grade Amulet Epsilon" category="implant"
item 20507 "High-grade Amulet Gamma" category="implant"
item 20509 "High-grade Amulet Omega" category="implant"
item 33516 "High-grade Ascendancy Alpha" category="implant"
item 33525 "High-grade Ascendancy Beta" category="implant"
item 33526 "High-grade Ascendancy Delta" category="implant"
item 33527 "High-grade Ascendancy Epsilon" category="implant"
item 33528 "High-grade Ascendancy Gamma" category="implant"
item 33529 "High-grade Ascendancy Omega" category="implant"
item 27097 "Eifyr and Co. 'Rogue' Warp Drive Speed WS-618" category="implant"
item 33393 "Ogdin's Eye Coordination Enhancer" category="implant"
item 27074 "Eifyr and Co. 'Gunslinger' Motion Prediction MR-706" category="implant"
item 22119 "Inherent Implants 'Noble' Repair Systems EM-806" category="implant"
item 27102 "Inherent Implants 'Lancer' Gunnery RF-906" category="implant"
item 27103 "Inherent Implants 'Lancer' Large Energy Turret LE-1006" category="implant"
item 27105 "Zainou 'Deadeye' Large Hybrid Turret LH-1006" category="implant"

alternatives {
    group {
        tier "Multispectrum Energized Membrane II"
        tier "Centii A-Type Multispectrum Coating"
        tier "Centum A-Type Multispectrum Energized Membrane" "Corpum A-Type Multispectrum Energized Membrane"
    }
}

no-downgrade {
    group {
        tier "Agency 'Pyrolancea' DB3 Dose I"
        tier "Agency 'Pyrolancea' DB5 Dose II"
    }
}

from-meta "Core X-Type 500MN Microwarpdrive" abyssal="Abyssal 500MN Microwarpdrive"
from-attribute attribute=84 {
    base "Large Remote Armor Repairer I"
}
accept-t1 "Mega Pulse Laser II"

identification "Large Micro Jump Drive"
banned "Large Ancillary Armor Repairer"
cargo-ignore "Nanite Repair Paste"
cargo-override detect="Agency 'Pyrolancea' DB5 Dose II" {
    remove "Agency 'Pyrolancea' DB5 Dose II"
    add "Agency 'Pyrolancea' DB3 Dose I" 1
}

fit "ELITE Nightmare" "17736:3057;4:19327;1:28744;2:4383;1:12816_;100:46002_;1::"
fit "BASIC Nightmare" "17736:3057;4:12084;1:28746;2:4383;1:12816_;100::"
fit "STARTER Nightmare" "17736:3025;4:12076;1:11269;2:12816_;50::"
fit "ELITE AMULET Nightmare" "17736:3057;4:19327;1:28744;2:4383;1:1978;1:12816_;100:46002_;1::"
fit "ELITE Nestor" "33472:3530;4:11269;2:4383;1::"
fit "BASIC Nestor" "33472:3520;4:11269;2:4383;1::"

skills "Nightmare" {
    skill "Amarr Battleship" min=4 elite=5
    skill "Large Energy Turret" min=3 elite=4 gold=5
}
skills "Nestor" {
    skill "Amarr Battleship" min=3
    skill "Remote Armor Repair Systems" min=4 elite=5
}

tank-floor "EM Armor Compensation" "Explosive Armor Compensation" "Kinetic Armor Compensation" "Thermal Armor Compensation"
require-skills module="Bastion Module I" {
    skill "Hull Upgrades" 5
    skill "Mechanics" 4
}

implant-set "HYBRID" {
    piece "High-grade Amulet Alpha" "High-grade Amulet Beta" "High-grade Amulet Delta"
    piece "High-grade Amulet Epsilon" "High-grade Amulet Gamma" "% WS-618"
    unlocks "hybrid"
}
implant-set "AMULET" {
    piece "High-grade Amulet Alpha" "High-grade Amulet Beta" "High-grade Amulet Delta"
    piece "High-grade Amulet Epsilon" "High-grade Amulet Gamma" "High-grade Amulet Omega"
    unlocks "amulet" "hybrid"
}
implant-set "WARPSPEED" {
    piece "High-grade Ascendancy Alpha" "High-grade Ascendancy Beta" "High-grade Ascendancy Delta"
    piece "High-grade Ascendancy Epsilon" "High-grade Ascendancy Gamma" "High-grade Ascendancy Omega"
}
implant-set "WARPSPEED" {
    piece "High-grade Ascendancy Alpha" "High-grade Ascendancy Beta" "High-grade Ascendancy Delta"
    piece "High-grade Ascendancy Epsilon" "High-grade Ascendancy Gamma" "% WS-618"
}

implant-slot 7 {
    accept "Ogdin's Eye %"
    accept "% MR-706"
}
implant-slot 8 {
    accept "% EM-806"
}
implant-slot 9 {
    accept "% RF-906"
    waive "Nestor"
}
implant-slot 10 {
    accept "% LE-1006" {
        ship "Nightmare"
    }
    accept "% LH-1006" {
        ship "Vindicator"
    }
    waive-unlisted
    missing-tag "NO-SLOT10"
}
required-implant "% EM-806" tag="NO-EM-806" {
    ship "Nestor"
}

category "logi" "Logistics"
category "sniper" "Sniper"
category "dps" "DPS"
category "starter" "Starter"
category-rule "Nestor" category="logi"
category-rule "Tracking Computer II" category="sniper"
category-rule "500MN Microwarpdrive I" category="dps" min-meta=11
default-category "starter"
protected-category "logi"
"#;

pub fn fixture_document() -> DoctrineDocument {
    parse_doctrine_string(FIXTURE_KDL).unwrap()
}

pub fn fixture_items() -> StaticItemDb {
    StaticItemDb::new(fixture_document().items).unwrap()
}

pub fn fixture_catalog() -> TemplateCatalog {
    TemplateCatalog::build(&fixture_document(), &fixture_items()).unwrap()
}

pub fn fixture_engine() -> ComplianceEngine {
    ComplianceEngine::build(&fixture_document(), &fixture_items(), EngineSettings::default())
        .unwrap()
}
