use crate::models::customers::CustomerExport;

/// Column headers of the CSV export, in output order
pub const CSV_HEADERS: [&str; 7] = [
    "Full Name",
    "Email",
    "Contact Number",
    "Date of Birth",
    "State",
    "City",
    "Date of Registration",
];

/// Renders customers as CSV. Every cell is quoted; dates are `YYYY-MM-DD`.
pub fn customers_to_csv(customers: &[CustomerExport]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADERS.iter().map(|h| h.to_string()));

    for customer in customers {
        push_row(
            &mut out,
            [
                customer.full_name.clone(),
                customer.email.clone(),
                customer.contact_number.clone(),
                customer.date_of_birth.format("%Y-%m-%d").to_string(),
                customer.state.clone(),
                customer.city.clone(),
                customer.created_at.format("%Y-%m-%d").to_string(),
            ],
        );
    }

    out
}

fn push_row(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let row = cells
        .into_iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push('\n');
}
