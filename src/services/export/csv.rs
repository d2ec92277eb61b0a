use crate::services::executor::ResultSet;
use anyhow::Result;
use csv::Writer;

pub fn export_to_csv(result: &ResultSet) -> Result<String> {
    let mut wtr = Writer::from_writer(vec![]);

    // Header row
    wtr.write_record(&result.columns)?;

    // Every row, not just the preview; NULL becomes an empty field
    for row in &result.rows {
        let values: Vec<&str> = row
            .cells
            .iter()
            .map(|c| if c.is_null { "" } else { c.value.as_str() })
            .collect();
        wtr.write_record(&values)?;
    }

    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
