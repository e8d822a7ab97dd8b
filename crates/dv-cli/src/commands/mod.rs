pub mod generate;
pub mod inspect;
pub mod play;

use dv_core::{Dungeon, Room, RoomType};

/// Map glyph for a room.
fn glyph(room: &Room) -> char {
    match room.room_type {
        RoomType::Boss if room.monster.is_some() => 'B',
        RoomType::Boss => 'b',
        RoomType::StairsDown => '>',
        RoomType::StairsUp => '<',
        RoomType::Monster if room.monster.is_some() => 'M',
        RoomType::Item if !room.items.is_empty() => 'I',
        RoomType::Npc => 'N',
        RoomType::Hazard => 'H',
        _ => '.',
    }
}

/// Render one level as a grid of glyphs, marking `here` with `@`.
fn render_level(dungeon: &Dungeon, z: usize, here: Option<dv_core::Position>) -> String {
    let size = dungeon.size();
    let mut out = String::new();
    for (i, room) in dungeon.level(z).enumerate() {
        if i % size == 0 {
            out.push_str("  ");
        }
        let c = if Some(room.position) == here {
            '@'
        } else {
            glyph(room)
        };
        out.push(c);
        if i % size == size - 1 {
            out.push('\n');
        } else {
            out.push(' ');
        }
    }
    out
}
