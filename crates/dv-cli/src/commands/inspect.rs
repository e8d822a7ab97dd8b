use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use dv_core::SaveFile;

pub fn run(file: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let snapshot = SaveFile::open(&text).map_err(|e| e.to_string())?;

    let player = &snapshot.player;
    let dungeon = &snapshot.dungeon;
    let outcome = if snapshot.victory {
        "won".green().to_string()
    } else if player.is_dead() {
        "dead".red().to_string()
    } else {
        "in progress".to_string()
    };
    let pending = snapshot
        .pending_stairs
        .map_or_else(|| "none".to_string(), |d| format!("stairs {d}"));
    let boss = dungeon
        .boss()
        .map_or_else(|| "slain".to_string(), |b| format!("{} ({}/{} HP)", b.name, b.hp, b.max_hp));
    let visited = dungeon.rooms().filter(|r| r.visited).count();
    let total = dungeon.size() * dungeon.size() * dungeon.num_levels();

    println!("  {} {}\n", "Valid save:".bold(), file.display());

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Player".to_string(), player.name.clone()]);
    table.add_row(vec!["Level".to_string(), player.level.to_string()]);
    table.add_row(vec![
        "HP".to_string(),
        format!("{}/{}", player.hp(), player.max_hp()),
    ]);
    table.add_row(vec!["XP".to_string(), player.xp.to_string()]);
    table.add_row(vec!["Gold".to_string(), player.gold.to_string()]);
    table.add_row(vec!["Position".to_string(), player.position.to_string()]);
    table.add_row(vec!["Turn".to_string(), snapshot.turn.to_string()]);
    table.add_row(vec!["Pending".to_string(), pending]);
    table.add_row(vec!["Boss".to_string(), boss]);
    table.add_row(vec!["Explored".to_string(), format!("{visited}/{total} rooms")]);
    table.add_row(vec!["Outcome".to_string(), outcome]);
    println!("{table}");

    let z = player.position.z;
    println!("\n  Level {} of {}", z + 1, dungeon.num_levels());
    print!("{}", super::render_level(dungeon, z, Some(player.position)));

    Ok(())
}
