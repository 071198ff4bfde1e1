use serde_json::json;

/// Pollutant columns written to the sample CSV, with (mean, spread) and the
/// linear weight used to derive a synthetic AQI.
const POLLUTANTS: [(&str, f64, f64, f64); 6] = [
    ("PM2.5", 60.0, 40.0, 1.10),
    ("PM10", 110.0, 60.0, 0.35),
    ("NO2", 30.0, 15.0, 0.40),
    ("SO2", 12.0, 8.0, 0.25),
    ("CO", 1.2, 0.8, 9.00),
    ("O3", 35.0, 20.0, 0.30),
];

const INTERCEPT: f64 = 5.0;

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

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let n_rows = 200;

    let csv_path = "sample_air_quality.csv";
    let mut writer = csv::Writer::from_path(csv_path)?;

    let mut header: Vec<&str> = POLLUTANTS.iter().map(|(name, ..)| *name).collect();
    header.push("AQI");
    writer.write_record(&header)?;

    for _ in 0..n_rows {
        let mut record = Vec::with_capacity(header.len());
        let mut aqi = INTERCEPT;
        for &(_, mean, spread, weight) in &POLLUTANTS {
            let value = round2(rng.gauss(mean, spread).max(0.0));
            aqi += weight * value;
            record.push(format!("{value:.2}"));
        }
        let aqi = (aqi + rng.gauss(0.0, 8.0)).max(0.0).round() as i64;
        record.push(aqi.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;

    let model_path = "air_quality_model.json";
    let artifact = json!({
        "format_version": 1,
        "name": "sample-linear",
        "model": {
            "kind": "linear",
            "features": POLLUTANTS.iter().map(|(name, ..)| *name).collect::<Vec<_>>(),
            "coefficients": POLLUTANTS.iter().map(|&(.., weight)| weight).collect::<Vec<_>>(),
            "intercept": INTERCEPT,
        }
    });
    std::fs::write(model_path, serde_json::to_string_pretty(&artifact)?)?;

    println!(
        "Wrote {n_rows} rows ({} pollutants) to {csv_path} and a matching model to {model_path}",
        POLLUTANTS.len()
    );
    Ok(())
}
