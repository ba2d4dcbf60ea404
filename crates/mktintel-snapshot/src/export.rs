use anyhow::Result;
use std::io::Write;
use tracing::debug;

use crate::schema::PriceSeries;

/// Write `prices` as CSV: a `Date` column followed by one column per asset label.
pub fn write_csv<W: Write>(prices: &PriceSeries, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["Date"];
    header.extend(prices.assets.iter().map(|asset| asset.label()));
    csv.write_record(&header)?;

    for (date, row) in prices.rows() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        record.extend(row.iter().map(|price| price.to_string()));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    debug!("wrote {} CSV rows", prices.len());
    Ok(())
}

pub fn to_csv_string(prices: &PriceSeries) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(prices, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
