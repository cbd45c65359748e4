pub fn handle(dna: &str) -> anyhow::Result<()> {
    let loadout = doctrine_core::decode(dna)?;
    println!("{}", serde_json::to_string_pretty(&loadout)?);
    Ok(())
}
