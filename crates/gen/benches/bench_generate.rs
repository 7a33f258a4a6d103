use std::hint::black_box;
use std::time::Instant;

use delve_common::GridCoord;
use delve_gen::{DungeonConfig, DungeonGenerator, PrefabSet, corridor_path};

fn generator(grid_size: u32, rooms: u32) -> DungeonGenerator {
    DungeonGenerator::new(
        DungeonConfig {
            grid_size,
            min_rooms: rooms,
            max_rooms: rooms,
            ..DungeonConfig::default()
        },
        PrefabSet::placeholders(),
    )
}

fn bench_generate(grid_size: u32, rooms: u32, iterations: usize) {
    let mut g = generator(grid_size, rooms);

    let start = Instant::now();
    for i in 0..iterations {
        let _ = black_box(g.generate_with_seed(black_box(i as u64)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  generate (grid {grid_size}, {rooms} rooms, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_regenerate_same_seed(grid_size: u32, rooms: u32, iterations: usize) {
    let mut g = generator(grid_size, rooms);
    let _ = g.generate_with_seed(7);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(g.generate_with_seed(black_box(7)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  regenerate (grid {grid_size}, {rooms} rooms, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_corridor_path(span: i32, iterations: usize) {
    let from = GridCoord::new(0, 0, 0);
    let to = GridCoord::new(span, span, span);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(corridor_path(black_box(from), black_box(to)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  corridor path (span {span}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Dungeon Generation Benchmarks ===\n");

    println!("Full pipeline:");
    bench_generate(5, 10, 1000);
    bench_generate(9, 30, 200);
    bench_generate(15, 100, 20);

    println!("\nRegeneration with teardown:");
    bench_regenerate_same_seed(5, 10, 1000);
    bench_regenerate_same_seed(9, 30, 200);

    println!("\nCorridor path:");
    bench_corridor_path(4, 100_000);
    bench_corridor_path(32, 10_000);

    println!("\n=== Done ===");
}
