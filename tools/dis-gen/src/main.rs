//! dis-gen: synthetic DIS binary stream generator and dump tool.
//!
//! Usage:
//!   dis-gen gen --output demo.bin --seed 42 --frames 20
//!   dis-gen dump demo.bin

use std::path::PathBuf;
use std::process;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use vanguard_dis::parser;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "gen" => cmd_gen(&args[2..]),
        "dump" => cmd_dump(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "dis-gen: VANGUARD synthetic DIS stream tool\n\
         \n\
         Commands:\n\
         \n\
         gen       Generate a synthetic binary PDU stream\n\
         \n\
           --output <path>    Output file path (required)\n\
           --seed <N>         RNG seed (default: 42)\n\
           --frames <N>       Number of timestamped frames (default: 20)\n\
           --friendly <N>     Friendly entity count (default: 3)\n\
           --hostile <N>      Hostile entity count (default: 3)\n\
         \n\
         dump      Parse a binary PDU stream and print its batches\n\
         \n\
         Examples:\n\
         \n\
           dis-gen gen --output demo.bin --seed 7 --frames 30\n\
           dis-gen dump demo.bin\n"
    );
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_flag<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    match flag_value(args, name) {
        Some(text) => text.parse().unwrap_or_else(|_| {
            eprintln!("Invalid value for {name}: {text}");
            process::exit(1);
        }),
        None => default,
    }
}

fn cmd_gen(args: &[String]) {
    let Some(output) = flag_value(args, "--output").map(PathBuf::from) else {
        eprintln!("gen requires --output <path>");
        process::exit(1);
    };
    let seed: u64 = parse_flag(args, "--seed", 42);
    let frames: usize = parse_flag(args, "--frames", 20);
    let friendly: usize = parse_flag(args, "--friendly", 3);
    let hostile: usize = parse_flag(args, "--hostile", 3);

    let stream = generate_stream(seed, frames, friendly, hostile);
    if let Err(err) = std::fs::write(&output, &stream) {
        eprintln!("Cannot write {}: {err}", output.display());
        process::exit(1);
    }
    println!(
        "Wrote {} bytes ({} frames, {} entities) to {}",
        stream.len(),
        frames,
        friendly + hostile,
        output.display()
    );
}

fn cmd_dump(args: &[String]) {
    let Some(path) = args.first().map(PathBuf::from) else {
        eprintln!("dump requires a file path");
        process::exit(1);
    };

    let batches = match parser::parse_file(&path) {
        Ok(batches) => batches,
        Err(err) => {
            eprintln!("Parse failed: {err}");
            process::exit(1);
        }
    };

    for batch in &batches {
        println!(
            "t={} entities={} fires={}",
            batch.timestamp_ms,
            batch.entity_updates.len(),
            batch.fire_events.len()
        );
        for entity in &batch.entity_updates {
            println!(
                "  entity id={} side={:?} type={:?} pos=({:.1},{:.1},{:.1}) speed={:.1} alive={}",
                entity.entity_id,
                entity.side,
                entity.unit_type,
                entity.pose.x,
                entity.pose.y,
                entity.pose.z,
                entity.speed_mps,
                entity.alive
            );
        }
        for fire in &batch.fire_events {
            println!(
                "  fire shooter={} target={} origin=({:.1},{:.1})",
                fire.shooter_id, fire.target_id, fire.origin.x, fire.origin.y
            );
        }
    }
    println!("batches={}", batches.len());
}

// ---- Stream synthesis ----

struct SimEntity {
    site: u16,
    entity: u16,
    force_id: u8,
    /// Land-domain category byte (0 armor, 4 artillery, 7 infantry).
    category: u8,
    x: f64,
    y: f64,
    alive: bool,
}

fn generate_stream(seed: u64, frames: usize, friendly: usize, hostile: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let categories = [0u8, 4, 7];

    let mut entities = Vec::new();
    for i in 0..friendly {
        entities.push(SimEntity {
            site: 1,
            entity: i as u16 + 1,
            force_id: 1,
            category: categories[i % categories.len()],
            x: rng.gen_range(0.0..400.0),
            y: rng.gen_range(0.0..400.0),
            alive: true,
        });
    }
    for i in 0..hostile {
        entities.push(SimEntity {
            site: 2,
            entity: i as u16 + 1,
            force_id: 2,
            category: categories[i % categories.len()],
            x: rng.gen_range(1_500.0..3_000.0),
            y: rng.gen_range(0.0..1_000.0),
            alive: true,
        });
    }

    let mut stream = Vec::new();
    for frame in 0..frames {
        let timestamp = 1_000 * (frame as u32 + 1);

        for e in &mut entities {
            if e.alive {
                e.x += rng.gen_range(-40.0..40.0);
                e.y += rng.gen_range(-40.0..40.0);
            }
            let vx = rng.gen_range(-6.0..6.0f32);
            let vy = rng.gen_range(-6.0..6.0f32);
            write_entity_pdu(&mut stream, timestamp, e, vx, vy);
        }

        // Occasional hostile artillery fire on a random friendly.
        if friendly > 0 && hostile > 0 && rng.gen_bool(0.3) {
            let shooter = &entities[friendly + rng.gen_range(0..hostile)];
            let target = &entities[rng.gen_range(0..friendly)];
            write_fire_pdu(&mut stream, timestamp, shooter, target);
        }

        // Late in the run, knock out one hostile so replay metrics see a loss.
        if frame == frames.saturating_sub(2) && hostile > 0 {
            entities[friendly].alive = false;
        }
    }

    stream
}

fn write_entity_pdu(stream: &mut Vec<u8>, timestamp: u32, e: &SimEntity, vx: f32, vy: f32) {
    write_header(stream, 1, timestamp, 88);
    stream.extend_from_slice(&e.site.to_be_bytes());
    stream.extend_from_slice(&1u16.to_be_bytes()); // application
    stream.extend_from_slice(&e.entity.to_be_bytes());
    stream.push(e.force_id);
    stream.push(0); // articulation count
    stream.extend_from_slice(&[1, 1, 0, 0, e.category, 0, 0, 0]); // entity type
    stream.extend_from_slice(&[0u8; 8]); // alternative entity type
    stream.extend_from_slice(&vx.to_be_bytes());
    stream.extend_from_slice(&vy.to_be_bytes());
    stream.extend_from_slice(&0.0f32.to_be_bytes());
    stream.extend_from_slice(&e.x.to_be_bytes());
    stream.extend_from_slice(&e.y.to_be_bytes());
    stream.extend_from_slice(&0.0f64.to_be_bytes());
    stream.extend_from_slice(&0.0f32.to_be_bytes()); // psi
    stream.extend_from_slice(&0.0f32.to_be_bytes()); // theta
    stream.extend_from_slice(&0.0f32.to_be_bytes()); // phi
    let appearance: u32 = if e.alive { 0 } else { 3 << 3 };
    stream.extend_from_slice(&appearance.to_be_bytes());
}

fn write_fire_pdu(stream: &mut Vec<u8>, timestamp: u32, shooter: &SimEntity, target: &SimEntity) {
    write_header(stream, 2, timestamp, 64);
    stream.extend_from_slice(&shooter.site.to_be_bytes());
    stream.extend_from_slice(&1u16.to_be_bytes());
    stream.extend_from_slice(&shooter.entity.to_be_bytes());
    stream.extend_from_slice(&target.site.to_be_bytes());
    stream.extend_from_slice(&1u16.to_be_bytes());
    stream.extend_from_slice(&target.entity.to_be_bytes());
    stream.extend_from_slice(&[0u8; 16]); // opaque munition block
    stream.extend_from_slice(&shooter.x.to_be_bytes());
    stream.extend_from_slice(&shooter.y.to_be_bytes());
    stream.extend_from_slice(&0.0f64.to_be_bytes());
}

fn write_header(stream: &mut Vec<u8>, pdu_type: u8, timestamp: u32, length: u16) {
    stream.push(7); // protocol version
    stream.push(1); // exercise id
    stream.push(pdu_type);
    stream.push(1); // protocol family
    stream.extend_from_slice(&timestamp.to_be_bytes());
    stream.extend_from_slice(&length.to_be_bytes());
    stream.extend_from_slice(&0u16.to_be_bytes()); // padding
}
