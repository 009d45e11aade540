// Writes a deterministic sample dataset (`data.csv` and `data.parquet`)
// with a handful of countries, a few zero years and one malformed cell.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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
}

/// (country, emissions in the first year, yearly growth rate)
const COUNTRIES: [(&str, f64, f64); 6] = [
    ("Argentina", 310.0, 0.012),
    ("Bangladesh", 95.0, 0.031),
    ("Canada", 610.0, 0.004),
    ("Denmark", 72.0, -0.018),
    ("Ethiopia", 48.0, 0.045),
    ("Fiji", 1.6, 0.022),
];
const FIRST_YEAR: i64 = 1990;
const LAST_YEAR: i64 = 2020;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut countries: Vec<&str> = Vec::new();
    let mut years: Vec<i64> = Vec::new();
    let mut emissions: Vec<f64> = Vec::new();

    for (country, start, growth) in COUNTRIES {
        for year in FIRST_YEAR..=LAST_YEAR {
            let t = (year - FIRST_YEAR) as f64;
            let trend = start * (1.0 + growth).powf(t);
            let noise = 1.0 + (rng.next_f64() - 0.5) * 0.08;
            // Early years of small countries are unreported.
            let value = if start < 50.0 && year < FIRST_YEAR + 3 {
                0.0
            } else {
                (trend * noise * 100.0).round() / 100.0
            };
            countries.push(country);
            years.push(year);
            emissions.push(value);
        }
    }

    // CSV, with one malformed emissions cell to exercise coercion.
    let csv_path = "data.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating data.csv")?;
    writer.write_record(["country", "year", "greenhouse_gas_emissions"])?;
    for (i, ((country, year), value)) in countries.iter().zip(&years).zip(&emissions).enumerate() {
        let cell = if i == 7 { "n/a".to_string() } else { value.to_string() };
        writer.write_record([country.to_string(), year.to_string(), cell])?;
    }
    writer.flush()?;

    // Parquet with the same rows.
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("greenhouse_gas_emissions", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(countries.clone())),
            Arc::new(Int64Array::from(years)),
            Arc::new(Float64Array::from(emissions)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "data.parquet";
    let file = std::fs::File::create(parquet_path).context("creating data.parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} observations for {} countries to {csv_path} and {parquet_path}",
        countries.len(),
        COUNTRIES.len()
    );
    Ok(())
}
