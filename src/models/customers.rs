use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size for customer listings.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum page size a client can request.
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub date_of_birth: NaiveDate,
    pub profile_picture: Option<String>,
    pub state: String,
    pub city: String,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creator reference expanded from the accounts store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatorRef {
    pub id: Uuid,
    pub username: String,
}

/// Customer as returned by the API, with its creator expanded.
///
/// `created_by` is `null` when the referenced account no longer resolves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub date_of_birth: NaiveDate,
    pub profile_picture: Option<String>,
    pub state: String,
    pub city: String,
    pub is_active: bool,
    pub created_by: Option<CreatorRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerResponse {
    pub fn new(customer: Customer, created_by: Option<CreatorRef>) -> Self {
        Self {
            id: customer.id,
            full_name: customer.full_name,
            email: customer.email,
            contact_number: customer.contact_number,
            date_of_birth: customer.date_of_birth,
            profile_picture: customer.profile_picture,
            state: customer.state,
            city: customer.city,
            is_active: customer.is_active,
            created_by,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

/// Reduced projection used by the export endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerExport {
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub date_of_birth: NaiveDate,
    pub state: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerExport {
    fn from(customer: Customer) -> Self {
        Self {
            full_name: customer.full_name,
            email: customer.email,
            contact_number: customer.contact_number,
            date_of_birth: customer.date_of_birth,
            state: customer.state,
            city: customer.city,
            created_at: customer.created_at,
        }
    }
}

/// Raw customer fields as submitted in a multipart form, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

/// Validated and normalized customer fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerFields {
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub date_of_birth: NaiveDate,
    pub state: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub fields: CustomerFields,
    pub profile_picture: Option<String>,
    pub created_by: Uuid,
}

/// Full replacement of a customer's fields. `profile_picture: None` keeps the current image.
#[derive(Debug, Clone)]
pub struct CustomerChanges {
    pub fields: CustomerFields,
    pub profile_picture: Option<String>,
}

/// Query string of `GET /api/customers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCustomersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl ListCustomersQuery {
    /// Current page, at least 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, clamped between 1 and MAX_LIMIT.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn filter(&self) -> CustomerFilter {
        CustomerFilter::new(self.search.as_deref(), self.state.as_deref(), self.city.as_deref())
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::for_page(self.page(), self.limit())
    }
}

/// Output format of the export endpoint
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Query string of `GET /api/customers/export`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportCustomersQuery {
    pub search: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

impl ExportCustomersQuery {
    pub fn filter(&self) -> CustomerFilter {
        CustomerFilter::new(self.search.as_deref(), self.state.as_deref(), self.city.as_deref())
    }
}

/// Predicate over active customers. Every present term is a case-insensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    /// Matched against full name, email or contact number
    pub search: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl CustomerFilter {
    /// Trims each term; blank terms are dropped.
    pub fn new(search: Option<&str>, state: Option<&str>, city: Option<&str>) -> Self {
        fn term(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            search: term(search),
            state: term(state),
            city: term(city),
        }
    }

    /// Evaluates the predicate against a single record.
    pub fn matches(&self, customer: &Customer) -> bool {
        if !customer.is_active {
            return false;
        }

        if let Some(search) = &self.search {
            let hit = contains_ignore_case(&customer.full_name, search)
                || contains_ignore_case(&customer.email, search)
                || contains_ignore_case(&customer.contact_number, search);
            if !hit {
                return false;
            }
        }

        if let Some(state) = &self.state {
            if !contains_ignore_case(&customer.state, state) {
                return false;
            }
        }

        if let Some(city) = &self.city {
            if !contains_ignore_case(&customer.city, city) {
                return false;
            }
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Offset window of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: i64,
    pub take: i64,
}

impl PageWindow {
    pub fn for_page(page: i64, limit: i64) -> Self {
        Self {
            skip: (page - 1).saturating_mul(limit),
            take: limit,
        }
    }
}

/// Response body of `GET /api/customers`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPage {
    pub customers: Vec<CustomerResponse>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

/// Number of pages needed to show `total` records `limit` at a time.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}
