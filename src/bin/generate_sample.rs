use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Site files written by this generator, with a base level per site for
/// (Conductivity µS/cm, NO3 mg/L, Temp °C, Turbidity NTU, Level m).
const SITES: [(&str, [f64; 5]); 10] = [
    ("Johnstone_river_coquette_point_joined.csv", [4200.0, 0.08, 26.5, 6.0, 1.4]),
    ("Johnstone_river_innisfail_joined.csv", [95.0, 0.12, 25.8, 4.5, 2.1]),
    ("Mulgrave_river_deeral_joined.csv", [70.0, 0.05, 24.9, 2.8, 1.7]),
    ("Pioneer_Dumbleton_joined.csv", [310.0, 0.35, 25.2, 8.5, 3.2]),
    ("Plane_ck_sucrogen_joined.csv", [520.0, 0.90, 26.0, 12.0, 0.9]),
    ("Proserpine_river_glen_isla_joined.csv", [260.0, 0.20, 25.5, 7.0, 1.1]),
    ("russell_river_east_russell_joined.csv", [60.0, 0.07, 24.6, 3.0, 2.4]),
    ("sandy_ck_homebush_joined.csv", [380.0, 0.65, 25.9, 10.0, 0.7]),
    ("sandy_ck_sorbellos_road_joined.csv", [350.0, 0.55, 25.7, 9.0, 0.8]),
    ("Tully_river_euramo_joined.csv", [55.0, 0.10, 24.8, 3.5, 4.0]),
];

const HEADER: [&str; 6] = ["Timestamp", "Conductivity", "NO3", "Temp", "Turbidity", "Level"];

const DAYS: i64 = 45;
/// Days by which the last site's record stops short of the others.
const STALE_LAG_DAYS: i64 = 60;
const MISSING_RATE: f64 = 0.03;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One synthetic reading; a small share of cells is left blank.
fn reading(rng: &mut SimpleRng, base: f64, hour_of_day: f64, rel_noise: f64) -> String {
    let diurnal = 1.0 + 0.05 * (2.0 * std::f64::consts::PI * hour_of_day / 24.0).sin();
    let value = (base * diurnal + rng.gauss(0.0, base * rel_noise)).max(0.0);
    if rng.next_f64() < MISSING_RATE {
        String::new()
    } else {
        format!("{value:.3}")
    }
}

fn write_site(
    path: &Path,
    base: &[f64; 5],
    end: NaiveDateTime,
    rng: &mut SimpleRng,
) -> Result<usize> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADER)?;

    let hours = DAYS * 24;
    let start = end - Duration::hours(hours - 1);
    for h in 0..hours {
        let ts = start + Duration::hours(h);
        let hour_of_day = (h % 24) as f64;
        let mut record = vec![ts.format("%Y-%m-%d %H:%M:%S").to_string()];
        for (i, &b) in base.iter().enumerate() {
            // Turbidity is the noisiest parameter.
            let noise = if i == 3 { 0.35 } else { 0.04 };
            record.push(reading(rng, b, hour_of_day, noise));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(hours as usize)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating data directory")?;

    let latest = NaiveDate::from_ymd_opt(2025, 6, 30)
        .and_then(|d| d.and_hms_opt(23, 0, 0))
        .context("invalid end timestamp")?;

    for (i, (file_name, base)) in SITES.iter().enumerate() {
        let end = if i == SITES.len() - 1 {
            latest - Duration::days(STALE_LAG_DAYS)
        } else {
            latest
        };
        let path = out_dir.join(file_name);
        let rows = write_site(&path, base, end, &mut rng)?;
        println!("Wrote {rows} rows to {}", path.display());
    }

    Ok(())
}
