use clap::Parser;
use clap::ValueEnum;
use perm_set::BlpSet;
use perm_set::IntSet;
use perm_set::LcfsSet;
use perm_set::LpSet;
use perm_set::RhSet;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Discipline {
    Lp,
    Rh,
    Lcfs,
    Blp,
}

#[derive(Parser, Debug)]
struct Args {
    /// Probing discipline to inspect.
    #[arg(short = 'd', long = "discipline", value_enum, default_value = "lp")]
    discipline: Discipline,

    #[arg(short = 'n', long = "max_entries", default_value_t = 1000)]
    max_entries: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.9)]
    load_factor: f64,

    /// Fraction of `max_entries` to actually insert.
    #[arg(short = 'f', long = "fill", default_value_t = 1.0)]
    fill: f64,
}

fn run<S: IntSet>(
    mut set: S,
    count: usize,
    histogram: impl Fn(&S) -> perm_set::ProbeHistogram,
    stats: impl Fn(&S) -> perm_set::DebugStats,
) {
    println!("cells: {}", set.capacity());
    for key in 1..=count as u32 {
        set.add(key).expect("table full before fill target");
    }
    println!(
        "inserted {} keys ({:.2}% of cells occupied)",
        set.len(),
        set.len() as f64 / set.capacity() as f64 * 100.0
    );
    histogram(&set).print();
    stats(&set).print();
}

fn main() {
    let args = Args::parse();
    let count = (args.max_entries as f64 * args.fill) as usize;

    println!(
        "{:?} table for {} entries at load factor {}",
        args.discipline, args.max_entries, args.load_factor
    );
    match args.discipline {
        Discipline::Lp => run(
            LpSet::new(args.max_entries, args.load_factor),
            count,
            LpSet::probe_histogram,
            LpSet::debug_stats,
        ),
        Discipline::Rh => run(
            RhSet::new(args.max_entries, args.load_factor),
            count,
            RhSet::probe_histogram,
            RhSet::debug_stats,
        ),
        Discipline::Lcfs => run(
            LcfsSet::new(args.max_entries, args.load_factor),
            count,
            LcfsSet::probe_histogram,
            LcfsSet::debug_stats,
        ),
        Discipline::Blp => run(
            BlpSet::new(args.max_entries, args.load_factor),
            count,
            BlpSet::probe_histogram,
            BlpSet::debug_stats,
        ),
    }
}
