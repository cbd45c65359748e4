pub mod error;

pub use error::*;

use doctrine_core::EngineSettings;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 設定ファイルを直接指定する環境変数
pub const SETTINGS_ENV: &str = "DOCTRINE_SETTINGS_PATH";

const SETTINGS_FILE: &str = "doctrine.yaml";

/// ユーザー設定ディレクトリ (~/.config/doctrine) のパスを取得
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("doctrine"))
}

/// エンジン設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 DOCTRINE_SETTINGS_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: doctrine.yaml, .doctrine.yaml
/// 3. ./.doctrine/doctrine.yaml
/// 4. ~/.config/doctrine/doctrine.yaml (グローバル設定)
///
/// どこにもなければ `None` を返します。
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(settings_path) = std::env::var(SETTINGS_ENV) {
        let path = PathBuf::from(settings_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::SettingsFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    // 2-3. カレントディレクトリと ./.doctrine/
    let candidates = [
        current_dir.join(SETTINGS_FILE),
        current_dir.join(".doctrine.yaml"),
        current_dir.join(".doctrine").join(SETTINGS_FILE),
    ];
    if let Some(path) = candidates.into_iter().find(|p| p.exists()) {
        return Ok(Some(path));
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("doctrine").join(SETTINGS_FILE);
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// エンジン設定をロード (ファイルがなければデフォルト値)
pub fn load_settings() -> Result<EngineSettings> {
    match find_settings_file()? {
        Some(path) => load_settings_from(&path),
        None => {
            debug!("No settings file found, using defaults");
            Ok(EngineSettings::default())
        }
    }
}

/// 指定した YAML ファイルからエンジン設定をロード
///
/// 省略されたキーはデフォルト値になります。
pub fn load_settings_from(path: &Path) -> Result<EngineSettings> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(EngineSettings::default());
    }

    let settings: EngineSettings =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), "Loaded engine settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    /// 一時ディレクトリに移動して `f` を実行
    fn in_dir<F: FnOnce()>(dir: &Path, f: F) {
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        f();
        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("doctrine"));
    }

    #[test]
    fn test_load_settings_from_partial_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("doctrine.yaml");
        fs::write(
            &path,
            "time_in_fleet_hours:\n  elite: 200\ncargo_leeway:\n  missing_percent: 50\n",
        )
        .unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.time_in_fleet_hours.elite, 200);
        // 省略されたキーはデフォルト
        assert_eq!(settings.time_in_fleet_hours.basic, 50);
        assert_eq!(settings.cargo_leeway.missing_percent, 50);
        assert_eq!(settings.cargo_leeway.min_quantity, 10);
        assert_eq!(settings.tank_floor.default, 4);
    }

    #[test]
    fn test_load_settings_from_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("doctrine.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(load_settings_from(&path).unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_load_settings_from_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("doctrine.yaml");
        fs::write(&path, "tank_floor: [1, 2\n").unwrap();

        assert!(matches!(
            load_settings_from(&path),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_find_settings_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("doctrine.yaml"), "").unwrap();

        temp_env::with_var_unset(SETTINGS_ENV, || {
            in_dir(temp_dir.path(), || {
                let found = find_settings_file().unwrap().unwrap();
                assert!(found.ends_with("doctrine.yaml"));
            });
        });
    }

    #[test]
    #[serial]
    fn test_visible_file_priority_over_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("doctrine.yaml"), "").unwrap();
        fs::create_dir(temp_dir.path().join(".doctrine")).unwrap();
        fs::write(temp_dir.path().join(".doctrine/doctrine.yaml"), "").unwrap();

        temp_env::with_var_unset(SETTINGS_ENV, || {
            in_dir(temp_dir.path(), || {
                let found = find_settings_file().unwrap().unwrap();
                assert!(!found.to_string_lossy().contains(".doctrine/"));
            });
        });
    }

    #[test]
    #[serial]
    fn test_find_settings_file_in_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join(".doctrine")).unwrap();
        fs::write(temp_dir.path().join(".doctrine/doctrine.yaml"), "").unwrap();

        temp_env::with_var_unset(SETTINGS_ENV, || {
            in_dir(temp_dir.path(), || {
                let found = find_settings_file().unwrap().unwrap();
                assert!(found.ends_with(".doctrine/doctrine.yaml"));
            });
        });
    }

    #[test]
    #[serial]
    fn test_find_settings_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "tank_floor:\n  starter: 3\n").unwrap();

        temp_env::with_var(SETTINGS_ENV, Some(path.as_os_str()), || {
            assert_eq!(find_settings_file().unwrap(), Some(path.clone()));
            assert_eq!(load_settings().unwrap().tank_floor.starter, 3);
        });
    }

    #[test]
    #[serial]
    fn test_env_var_pointing_to_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.yaml");

        temp_env::with_var(SETTINGS_ENV, Some(path.as_os_str()), || {
            assert!(matches!(
                find_settings_file(),
                Err(ConfigError::SettingsFileNotFound(_))
            ));
        });
    }

    #[test]
    #[serial]
    fn test_load_settings_defaults_without_local_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        temp_env::with_var_unset(SETTINGS_ENV, || {
            in_dir(temp_dir.path(), || {
                // グローバル設定がある環境では内容に依存するため、ローカル候補のみ確認
                if let Some(found) = find_settings_file().unwrap() {
                    assert!(!found.starts_with(temp_dir.path()));
                } else {
                    assert_eq!(load_settings().unwrap(), EngineSettings::default());
                }
            });
        });
    }
}
