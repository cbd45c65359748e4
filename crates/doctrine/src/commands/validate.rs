use colored::Colorize;
use doctrine_core::ItemLookup;
use std::path::Path;

pub fn handle(data: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "ルールファイルを検証中...".blue());

    let root = match super::doctrine_root(data) {
        Ok(root) => root,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ ドクトリンルートが見つかりません".red().bold());
            eprintln!("  {}", e);
            eprintln!();
            eprintln!("doctrine.kdl が存在するディレクトリで実行するか --data を指定してください");
            std::process::exit(1);
        }
    };
    println!("ドクトリンルート: {}", root.display().to_string().cyan());

    let settings = doctrine_config::load_settings()?;

    match doctrine_core::load_doctrine_with_debug(&root, settings) {
        Ok(doctrine) => {
            println!("{}", "✓ ルールファイルは正常です！".green().bold());
            println!();
            println!("サマリー:");
            println!("  アイテム: {}個", doctrine.items.len());
            let catalog = doctrine.engine.catalog();
            println!("  テンプレート: {}個", catalog.len());
            for ship in catalog.ships() {
                let name = doctrine
                    .items
                    .name_of(ship)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", ship));
                if doctrine.engine.skills().has_requirements(ship) {
                    println!("    {}", name.cyan());
                } else {
                    // スキルプランがない船体は常に STARTER-SKILLS
                    println!("    {} {}", name.cyan(), "(スキルプラン未定義)".yellow());
                }
                for template in catalog.for_ship(ship) {
                    println!("      - {} ({:?})", template.name, template.tier);
                }
            }
            println!("  カテゴリ: {}個", doctrine.engine.categories().len());
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ ルールエラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
