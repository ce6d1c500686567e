use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Reference compounds of the Sr–Mo–O system as (label, Sr, Mo, O) mole ratios.
const COMPOUNDS: &[(&str, f64, f64, f64)] = &[
    ("Sr", 1.0, 0.0, 0.0),
    ("Mo", 0.0, 1.0, 0.0),
    ("O2", 0.0, 0.0, 2.0),
    ("SrO", 1.0, 0.0, 1.0),
    ("SrO2", 1.0, 0.0, 2.0),
    ("MoO2", 0.0, 1.0, 2.0),
    ("MoO3", 0.0, 1.0, 3.0),
    ("SrMoO3", 1.0, 1.0, 3.0),
    ("SrMoO4", 1.0, 1.0, 4.0),
    ("Sr2MoO4", 2.0, 1.0, 4.0),
    ("Sr3MoO6", 3.0, 1.0, 6.0),
];

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

    /// Uniform in `[-spread, spread]`.
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * spread
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Stoichiometric compounds, then thin-film measurements in atomic percent
    // scattered around SrMoO3 and SrMoO4.
    let mut rows: Vec<(String, f64, f64, f64)> = COMPOUNDS
        .iter()
        .map(|&(label, sr, mo, o)| (label.to_string(), sr, mo, o))
        .collect();

    for (film, (sr, mo, o)) in [("Film A", (20.0, 20.0, 60.0)), ("Film B", (16.7, 16.7, 66.6))] {
        for _ in 0..6 {
            let d_sr = rng.jitter(1.5);
            let d_mo = rng.jitter(1.5);
            rows.push((film.to_string(), sr + d_sr, mo + d_mo, o - d_sr - d_mo));
        }
    }

    // CSV
    let csv_path = "sample_compositions.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record(["Compound", "Sr", "Mo", "O"])
        .expect("Failed to write CSV header");
    for (label, sr, mo, o) in &rows {
        writer
            .write_record([label.clone(), sr.to_string(), mo.to_string(), o.to_string()])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("Compound", DataType::Utf8, false),
        Field::new("Sr", DataType::Float64, false),
        Field::new("Mo", DataType::Float64, false),
        Field::new("O", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.0.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.3).collect::<Vec<_>>())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_compositions.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} rows ({} compounds) to {csv_path} and {parquet_path}",
        rows.len(),
        COMPOUNDS.len()
    );
}
