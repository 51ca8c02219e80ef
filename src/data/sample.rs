//! Built-in sample dataset for the "use sample data" action: one year of
//! monthly sales for three products, with a localized date header.

use chrono::NaiveDate;
use polars::prelude::*;

const PRODUCT_1: [f64; 12] = [
    1000.0, 1200.0, 1100.0, 1300.0, 1250.0, 1400.0, 1350.0, 1500.0, 1450.0, 1600.0, 1550.0, 1700.0,
];
const PRODUCT_2: [f64; 12] = [
    1500.0, 1300.0, 1400.0, 1450.0, 1350.0, 1550.0, 1500.0, 1650.0, 1600.0, 1750.0, 1700.0, 1850.0,
];
const PRODUCT_3: [f64; 12] = [
    800.0, 900.0, 850.0, 950.0, 900.0, 1000.0, 950.0, 1050.0, 1000.0, 1100.0, 1050.0, 1150.0,
];

/// Build the sample frame: a date column plus three product columns.
pub fn sample_sales_data() -> PolarsResult<DataFrame> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
    let days: Vec<i32> = (1..=12)
        .map(|month| {
            let date = NaiveDate::from_ymd_opt(2020, month, 1).expect("valid sample date");
            date.signed_duration_since(epoch).num_days() as i32
        })
        .collect();

    DataFrame::new(vec![
        Column::new("Дата".into(), days).cast(&DataType::Date)?,
        Column::new("Продукт_1".into(), PRODUCT_1.to_vec()),
        Column::new("Продукт_2".into(), PRODUCT_2.to_vec()),
        Column::new("Продукт_3".into(), PRODUCT_3.to_vec()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_a_year_of_three_products() {
        let df = sample_sales_data().unwrap();
        assert_eq!(df.height(), 12);
        assert_eq!(df.width(), 4);
        assert_eq!(df.get_columns()[0].dtype(), &DataType::Date);
    }

    #[test]
    fn first_product_totals_match_the_fixture() {
        assert_eq!(PRODUCT_1.iter().sum::<f64>(), 16400.0);
        // Second product outsells the first in every month.
        for (a, b) in PRODUCT_1.iter().zip(&PRODUCT_2) {
            assert!(b > a);
        }
    }
}
