use anyhow::Context;
use std::io::Read;
use std::path::Path;

pub fn handle(data: Option<&Path>, file: Option<&Path>) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("ファイルを読み込めません: {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let doctrine = super::load(data)?;
    for dna in doctrine_core::encode_all(&text, &doctrine.items)? {
        println!("{}", dna);
    }
    Ok(())
}
