use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::SeedableRng;
use rand::rngs::StdRng;

use dv_core::{DungeonConfig, Position, RoomType};

pub fn run(seed: u64, size: usize, levels: usize, output: Option<&Path>) -> Result<(), String> {
    let config = DungeonConfig::default().with_size(size).with_levels(levels);
    let mut rng = StdRng::seed_from_u64(seed);
    let dungeon = dv_core::generate::generate(&config, &mut rng).map_err(|e| e.to_string())?;

    println!(
        "  {} {size}x{size} dungeon, {levels} level(s), seed {seed}\n",
        "Generated".bold()
    );

    for z in 0..dungeon.num_levels() {
        println!("  Level {}", z + 1);
        let start = (z == 0).then(Position::origin);
        print!("{}", super::render_level(&dungeon, z, start));
        println!();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Level", "Monsters", "Items", "NPCs", "Hazards", "Features"]);
    for z in 0..dungeon.num_levels() {
        let features: usize = dungeon.level(z).map(|room| room.features.len()).sum();
        let count = |t: RoomType| {
            dungeon
                .level(z)
                .filter(|room| room.room_type == t)
                .count()
                .to_string()
        };
        table.add_row(vec![
            (z + 1).to_string(),
            count(RoomType::Monster),
            count(RoomType::Item),
            count(RoomType::Npc),
            count(RoomType::Hazard),
            features.to_string(),
        ]);
    }
    println!("{table}");

    if let Some(boss) = dungeon.boss() {
        println!(
            "\n  Boss: {} at {} ({} HP)",
            boss.name.red(),
            dungeon.boss_position(),
            boss.max_hp
        );
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&dungeon).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
        println!("  Wrote {}", path.display());
    }

    Ok(())
}
