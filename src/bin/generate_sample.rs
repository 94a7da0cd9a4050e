use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated row, written with the Kaggle column names.
#[derive(Serialize)]
struct Passenger {
    #[serde(rename = "PassengerId")]
    id: i64,
    #[serde(rename = "Survived")]
    survived: i64,
    #[serde(rename = "Pclass")]
    pclass: i64,
    #[serde(rename = "Sex")]
    sex: &'static str,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "Fare")]
    fare: f64,
    #[serde(rename = "Embarked")]
    embarked: Option<&'static str>,
}

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<Passenger> {
    (0..n)
        .map(|i| {
            let pclass = match rng.next_f64() {
                p if p < 0.24 => 1,
                p if p < 0.45 => 2,
                _ => 3,
            };
            let sex = if rng.chance(0.35) { "female" } else { "male" };

            // ~20 % of ages are unknown, as in the real passenger list.
            let age = if rng.chance(0.2) {
                None
            } else {
                let mean = match pclass {
                    1 => 38.0,
                    2 => 30.0,
                    _ => 25.0,
                };
                Some(rng.gauss(mean, 13.0).clamp(0.42, 80.0).round())
            };

            let fare_base = match pclass {
                1 => 84.0,
                2 => 20.0,
                _ => 13.0,
            };
            let fare = (rng.gauss(fare_base, fare_base * 0.4).max(0.0) * 100.0).round() / 100.0;

            let embarked = match rng.next_f64() {
                p if p < 0.002 => None,
                p if p < 0.19 => Some("C"),
                p if p < 0.28 => Some("Q"),
                _ => Some("S"),
            };

            let mut p_survive: f64 = if sex == "female" { 0.74 } else { 0.19 };
            p_survive += match pclass {
                1 => 0.15,
                2 => 0.02,
                _ => -0.12,
            };
            if age.is_some_and(|a| a < 12.0) {
                p_survive += 0.2;
            }
            let survived = rng.chance(p_survive.clamp(0.02, 0.98));

            Passenger {
                id: i as i64 + 1,
                survived: survived as i64,
                pclass,
                sex,
                age,
                fare,
                embarked,
            }
        })
        .collect()
}

fn write_csv(path: &str, passengers: &[Passenger]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for p in passengers {
        writer.serialize(p)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, passengers: &[Passenger]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("PassengerId", DataType::Int64, false),
        Field::new("Survived", DataType::Int64, false),
        Field::new("Pclass", DataType::Int64, false),
        Field::new("Sex", DataType::Utf8, false),
        Field::new("Age", DataType::Float64, true),
        Field::new("Fare", DataType::Float64, false),
        Field::new("Embarked", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(passengers.iter().map(|p| p.id))),
            Arc::new(Int64Array::from_iter_values(passengers.iter().map(|p| p.survived))),
            Arc::new(Int64Array::from_iter_values(passengers.iter().map(|p| p.pclass))),
            Arc::new(StringArray::from_iter_values(passengers.iter().map(|p| p.sex))),
            Arc::new(passengers.iter().map(|p| p.age).collect::<Float64Array>()),
            Arc::new(Float64Array::from_iter_values(passengers.iter().map(|p| p.fare))),
            Arc::new(passengers.iter().map(|p| p.embarked).collect::<StringArray>()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let passengers = generate(891, &mut rng);

    write_csv("titanic.csv", &passengers)?;
    write_parquet("titanic.parquet", &passengers)?;

    let survived = passengers.iter().filter(|p| p.survived == 1).count();
    println!(
        "Wrote {} passengers ({survived} survivors) to titanic.csv and titanic.parquet",
        passengers.len()
    );
    Ok(())
}
