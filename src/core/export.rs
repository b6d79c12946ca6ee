use crate::domain::model::Student;
use crate::utils::error::Result;
use std::io::Write;

const HEADER: [&str; 7] = [
    "id",
    "firstName",
    "lastName",
    "stopNumber",
    "route",
    "active",
    "siblings",
];

/// Writes the roster as CSV, one row per student in roster order.
pub fn write_roster_csv<'a, W, I>(students: I, writer: W) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Student>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    let mut rows = 0;
    for student in students {
        let siblings: Vec<String> = student.siblings.iter().map(|id| id.to_string()).collect();
        csv_writer.write_record([
            student.id.to_string(),
            student.first_name.clone(),
            student.last_name.clone(),
            student.stop_number.clone(),
            student.route_type().to_string(),
            student.active.to_string(),
            siblings.join(";"),
        ])?;
        rows += 1;
    }

    csv_writer.flush()?;
    Ok(rows)
}
