//! Writes demo `gni.csv`, `lex.csv` and `pop.csv` in the Gapminder layout,
//! mixing the cell encodings the pipeline has to cope with.
//!
//! Usage: `generate_sample [output_dir]` (default `data`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const FIRST_YEAR: i32 = 1950;
const LAST_YEAR: i32 = 2020;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Country, income per capita in 1950, yearly growth, life expectancy in 1950, population in 1950.
const COUNTRIES: &[(&str, f64, f64, f64, f64)] = &[
    ("Argentina", 5_200.0, 0.012, 62.0, 17e6),
    ("Chile", 3_900.0, 0.025, 55.0, 6.1e6),
    ("China", 600.0, 0.065, 44.0, 550e6),
    ("Ghana", 1_100.0, 0.015, 42.0, 5e6),
    ("India", 800.0, 0.045, 37.0, 370e6),
    ("Japan", 2_900.0, 0.035, 60.0, 84e6),
    ("Norway", 9_800.0, 0.028, 72.0, 3.3e6),
    ("Peru", 2_700.0, 0.02, 44.0, 7.7e6),
];

/// `1.2k` / `3.4M` / `1.1B`, with a comma decimal now and then.
fn with_suffix(value: f64, rng: &mut SimpleRng) -> String {
    let (scaled, suffix) = if value >= 1e9 {
        (value / 1e9, "B")
    } else if value >= 1e6 {
        (value / 1e6, "M")
    } else {
        (value / 1e3, "k")
    };
    let text = format!("{scaled:.2}{suffix}");
    if rng.chance(0.05) {
        text.replace('.', ",")
    } else {
        text
    }
}

fn write_table(
    dir: &Path,
    file: &str,
    rng: &mut SimpleRng,
    cell: impl Fn(&(&str, f64, f64, f64, f64), i32, &mut SimpleRng) -> String,
) -> Result<PathBuf> {
    let path = dir.join(file);
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["country".to_string()];
    header.extend((FIRST_YEAR..=LAST_YEAR).map(|y| y.to_string()));
    writer.write_record(&header)?;

    for country in COUNTRIES {
        let mut row = vec![country.0.to_string()];
        for year in FIRST_YEAR..=LAST_YEAR {
            // occasional gaps for the forward fill
            if year > FIRST_YEAR && rng.chance(0.03) {
                row.push(String::new());
            } else {
                row.push(cell(country, year, rng));
            }
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(path)
}

fn main() -> Result<()> {
    env_logger::init();

    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let elapsed = |year: i32| f64::from(year - FIRST_YEAR);

    let gni = write_table(&dir, "gni.csv", &mut rng, |&(_, base, growth, _, _), year, rng| {
        let value = base * (1.0 + growth).powf(elapsed(year)) * (0.97 + 0.06 * rng.next_f64());
        with_suffix(value, rng)
    })?;

    let lex = write_table(&dir, "lex.csv", &mut rng, |&(_, _, _, base, _), year, rng| {
        let value = base + (84.0 - base) * (1.0 - (-elapsed(year) / 45.0).exp());
        let text = format!("{value:.1}");
        if rng.chance(0.05) {
            text.replace('.', ",")
        } else {
            text
        }
    })?;

    let pop = write_table(&dir, "pop.csv", &mut rng, |&(_, _, _, _, base), year, rng| {
        with_suffix(base * 1.015f64.powf(elapsed(year)), rng)
    })?;

    for path in [gni, lex, pop] {
        log::info!("Wrote {}", path.display());
    }
    println!(
        "Wrote {} countries × {} years to {}",
        COUNTRIES.len(),
        LAST_YEAR - FIRST_YEAR + 1,
        dir.display()
    );
    Ok(())
}
