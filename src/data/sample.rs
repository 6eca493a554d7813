//! Synthetic listing generation for demos and smoke runs.
//!
//! Listings use the same CSV vocabulary as real input, so a generated file can
//! be passed straight to `advisor batch`. A non-zero `missing_rate` blanks
//! random cells to exercise defaulting.

use std::fs::File;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::fields;
use crate::error::AppError;

/// Price per square foot (lakhs) is drawn around this level.
const PPSF_MEAN: f64 = 0.09;
const PPSF_STD: f64 = 0.025;

const LOCATIONS: [(&str, &str); 6] = [
    ("Karnataka", "Bangalore"),
    ("Maharashtra", "Mumbai"),
    ("Maharashtra", "Pune"),
    ("Tamil Nadu", "Chennai"),
    ("Telangana", "Hyderabad"),
    ("Delhi", "New Delhi"),
];
const TRANSPORT: [&str; 3] = ["Low", "Medium", "High"];
const AMENITIES: [&str; 5] = ["Gym", "Pool", "Clubhouse", "Garden", "Playground"];
const PROPERTY_TYPES: [&str; 3] = ["Apartment", "Independent House", "Villa"];
const FURNISHED: [&str; 3] = ["Furnished", "Semi-furnished", "Unfurnished"];
const YES_NO: [&str; 2] = ["Yes", "No"];
const FACING: [&str; 4] = ["North", "South", "East", "West"];
const OWNER_TYPES: [&str; 3] = ["Owner", "Broker", "Builder"];
const AVAILABILITY: [&str; 2] = ["Ready_to_Move", "Under_Construction"];

pub const ID_COLUMN: &str = "Listing_Id";

/// Column order of generated files.
pub const SAMPLE_COLUMNS: [&str; 21] = [
    ID_COLUMN,
    fields::STATE,
    fields::CITY,
    fields::LOCALITY,
    fields::PROPERTY_TYPE,
    fields::BHK,
    fields::SIZE_IN_SQFT,
    fields::PRICE_IN_LAKHS,
    fields::YEAR_BUILT,
    fields::FURNISHED_STATUS,
    fields::FLOOR_NO,
    fields::TOTAL_FLOORS,
    fields::NEARBY_SCHOOLS,
    fields::NEARBY_HOSPITALS,
    fields::PUBLIC_TRANSPORT_ACCESSIBILITY,
    fields::PARKING_SPACE,
    fields::SECURITY,
    fields::AMENITIES,
    fields::FACING,
    fields::OWNER_TYPE,
    fields::AVAILABILITY_STATUS,
];

#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Probability that any non-id cell is left blank.
    pub missing_rate: f64,
    /// Latest construction year to generate.
    pub max_year: i32,
}

#[derive(Debug, Clone)]
pub struct ListingSample {
    pub rows: Vec<Vec<String>>,
}

pub fn generate_listings(config: &SampleConfig) -> Result<ListingSample, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(0.0..1.0).contains(&config.missing_rate) {
        return Err(AppError::new(2, "Missing rate must be in [0, 1)."));
    }
    if config.max_year < 1990 {
        return Err(AppError::new(2, "Max year must be >= 1990."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let ppsf_dist = Normal::new(PPSF_MEAN, PPSF_STD)
        .map_err(|e| AppError::new(4, format!("PPSF distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let (state, city) = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
        let size = rng.gen_range(10..=100) * 50;
        let bhk = ((f64::from(size) / 900.0).round() as i64).clamp(1, 5);
        let ppsf = ppsf_dist.sample(&mut rng).clamp(0.02, 0.3);
        let price = (f64::from(size) * ppsf).clamp(10.0, 500.0);
        let total_floors = rng.gen_range(1..=30);
        let floor_no = rng.gen_range(0..=total_floors);
        let amenities: Vec<&str> = AMENITIES.iter().copied().filter(|_| rng.gen_bool(0.4)).collect();

        let mut row = vec![
            format!("L-{:05}", i + 1),
            state.to_string(),
            city.to_string(),
            format!("Locality_{}", rng.gen_range(1..=50)),
            pick(&mut rng, &PROPERTY_TYPES),
            bhk.to_string(),
            size.to_string(),
            format!("{price:.2}"),
            rng.gen_range(1990..=config.max_year).to_string(),
            pick(&mut rng, &FURNISHED),
            floor_no.to_string(),
            total_floors.to_string(),
            rng.gen_range(0..=10).to_string(),
            rng.gen_range(0..=10).to_string(),
            pick(&mut rng, &TRANSPORT),
            pick(&mut rng, &YES_NO),
            pick(&mut rng, &YES_NO),
            amenities.join(","),
            pick(&mut rng, &FACING),
            pick(&mut rng, &OWNER_TYPES),
            pick(&mut rng, &AVAILABILITY),
        ];

        if config.missing_rate > 0.0 {
            for cell in row.iter_mut().skip(1) {
                if rng.gen_bool(config.missing_rate) {
                    cell.clear();
                }
            }
        }

        rows.push(row);
    }

    Ok(ListingSample { rows })
}

/// Write a generated sample as CSV.
pub fn write_sample_csv(path: &Path, sample: &ListingSample) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(SAMPLE_COLUMNS)
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;
    for row in &sample.rows {
        wtr.write_record(row)
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

fn pick(rng: &mut StdRng, options: &[&str]) -> String {
    options[rng.gen_range(0..options.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_listings;

    fn config(missing_rate: f64) -> SampleConfig {
        SampleConfig {
            count: 50,
            seed: 42,
            missing_rate,
            max_year: 2026,
        }
    }

    #[test]
    fn same_seed_same_sample() {
        let a = generate_listings(&config(0.1)).unwrap();
        let b = generate_listings(&config(0.1)).unwrap();
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.rows.len(), 50);
        assert!(a.rows.iter().all(|r| r.len() == SAMPLE_COLUMNS.len()));
    }

    #[test]
    fn complete_sample_has_plausible_values() {
        let sample = generate_listings(&config(0.0)).unwrap();
        for row in &sample.rows {
            let price: f64 = row[7].parse().unwrap();
            let floor: i64 = row[10].parse().unwrap();
            let total: i64 = row[11].parse().unwrap();
            assert!((10.0..=500.0).contains(&price));
            assert!(floor <= total);
            assert!(TRANSPORT.contains(&row[14].as_str()));
        }
    }

    #[test]
    fn written_sample_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");
        write_sample_csv(&path, &generate_listings(&config(0.2)).unwrap()).unwrap();

        let table = read_listings(&path).unwrap();
        assert_eq!(table.rows.len(), 50);
        assert!(table.row_errors.is_empty());
        assert_eq!(table.field_names[0], ID_COLUMN);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut bad = config(0.0);
        bad.count = 0;
        assert!(generate_listings(&bad).is_err());
        assert!(generate_listings(&config(1.0)).is_err());
    }
}
