use colored::Colorize;
use std::path::Path;

pub fn handle(data: Option<&Path>) -> anyhow::Result<()> {
    let doctrine = super::load(data)?;
    for category in doctrine.engine.categories() {
        println!("{}\t{}", category.id.cyan(), category.name);
    }
    Ok(())
}
