/**
 * Shared Types Module
 *
 * Tabs of the admin shell and the generic table every tab renders.
 */

use serde::Serialize;
use serde_json::Value;

/// Tab of the authenticated shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppTab {
    Dashboard,
    Directions,
    Schedule,
    Products,
    Bookings,
    Payments,
    Users,
    Settings,
}

impl AppTab {
    pub const ALL: [AppTab; 8] = [
        AppTab::Dashboard,
        AppTab::Directions,
        AppTab::Schedule,
        AppTab::Products,
        AppTab::Bookings,
        AppTab::Payments,
        AppTab::Users,
        AppTab::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AppTab::Dashboard => "Dashboard",
            AppTab::Directions => "Directions",
            AppTab::Schedule => "Schedule",
            AppTab::Products => "Products",
            AppTab::Bookings => "Bookings",
            AppTab::Payments => "Payments",
            AppTab::Users => "Users",
            AppTab::Settings => "Settings",
        }
    }
}

impl Default for AppTab {
    fn default() -> Self {
        AppTab::Dashboard
    }
}

/// Plain table shown by a tab
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabData {
    /// Table with one column per field of the first record.
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self, serde_json::Error> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let columns: Vec<String> = match values.first() {
            Some(Value::Object(first)) => first.keys().cloned().collect(),
            Some(_) => vec!["value".to_string()],
            None => Vec::new(),
        };

        let rows = values
            .iter()
            .map(|value| match value {
                Value::Object(map) => columns
                    .iter()
                    .map(|column| map.get(column).map(cell).unwrap_or_default())
                    .collect(),
                other => vec![cell(other)],
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Two-column key/value table
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            columns: vec!["Field".to_string(), "Value".to_string()],
            rows: pairs
                .into_iter()
                .map(|(k, v)| vec![k.into(), v.into()])
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => if *flag { "yes" } else { "no" }.to_string(),
        other => other.to_string(),
    }
}
