use assert_cmd::Command;
use std::path::PathBuf;

/// リポジトリ同梱のサンプルドクトリン
pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

/// サンプルドクトリンを参照する doctrine コマンド
#[allow(deprecated)]
pub fn doctrine() -> Command {
    let mut cmd = Command::cargo_bin("doctrine").unwrap();
    cmd.env_remove("DOCTRINE_ROOT")
        .env_remove("DOCTRINE_SETTINGS_PATH")
        .arg("--data")
        .arg(data_dir());
    cmd
}

/// 全テンプレートの elite しきい値を満たすスキル
pub const ELITE_SKILLS_JSON: &str = r#"{
    "Amarr Battleship": 5,
    "Large Energy Turret": 4,
    "Remote Armor Repair Systems": 5,
    "EM Armor Compensation": 4,
    "Explosive Armor Compensation": 4,
    "Kinetic Armor Compensation": 4,
    "Thermal Armor Compensation": 4
}"#;

pub const ELITE_NIGHTMARE: &str =
    "17736:3057;4:19327;1:28744;2:4383;1:12816_;100:46002_;1::";
