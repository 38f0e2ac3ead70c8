use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::client::MiteApi;
use crate::error::MiteError;

use super::{unwrap_resource, Adapter, ReadAdapter, WriteAdapter};

/// Time entries, read-write.
#[derive(Debug, Clone)]
pub struct TimeEntries {
    api: MiteApi,
}

impl TimeEntries {
    pub fn new(api: MiteApi) -> Self {
        Self { api }
    }

    /// Time entries matching every field set on `filter`.
    pub fn filtered(&self, filter: &TimeEntryFilter) -> Result<Value, MiteError> {
        let pairs = filter.to_query()?;
        let query: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let response = self.api.get("time_entries.json", &query)?;
        Ok(unwrap_resource(Self::KEY, response))
    }

    /// Summed groups of time entries, e.g. minutes per project and user.
    pub fn grouped(
        &self,
        group_by: &[GroupBy],
        filter: &TimeEntryFilter,
    ) -> Result<Value, MiteError> {
        let mut pairs = filter.to_query()?;
        if !group_by.is_empty() {
            let groups: Vec<&str> = group_by.iter().map(|g| g.as_str()).collect();
            pairs.push(("group_by".to_string(), groups.join(",")));
        }
        let query: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let response = self.api.get("time_entries.json", &query)?;
        Ok(unwrap_resource("time_entry_group", response))
    }
}

impl Adapter for TimeEntries {
    fn api(&self) -> &MiteApi {
        &self.api
    }
}

impl ReadAdapter for TimeEntries {
    const RESOURCE: &'static str = "time_entries";
    const KEY: &'static str = "time_entry";
}

impl WriteAdapter for TimeEntries {}

/// Query parameters for listing time entries. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeEntryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    /// Substring of the entry note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl TimeEntryFilter {
    /// Flatten the set fields into query pairs.
    pub fn to_query(&self) -> Result<Vec<(String, String)>, MiteError> {
        let value =
            serde_json::to_value(self).map_err(|e| MiteError::Serialization(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(MiteError::Serialization(
                "time entry filter is not an object".to_string(),
            ));
        };
        Ok(fields
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect())
    }
}

/// The `at` shorthand the service understands, or a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    Day(NaiveDate),
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRange::Today => write!(f, "today"),
            TimeRange::Yesterday => write!(f, "yesterday"),
            TimeRange::ThisWeek => write!(f, "this_week"),
            TimeRange::LastWeek => write!(f, "last_week"),
            TimeRange::ThisMonth => write!(f, "this_month"),
            TimeRange::LastMonth => write!(f, "last_month"),
            TimeRange::ThisYear => write!(f, "this_year"),
            TimeRange::LastYear => write!(f, "last_year"),
            TimeRange::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Grouping dimension for [`TimeEntries::grouped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Customer,
    Project,
    Service,
    User,
    Day,
    Week,
    Month,
    Year,
}

impl GroupBy {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::Customer => "customer",
            GroupBy::Project => "project",
            GroupBy::Service => "service",
            GroupBy::User => "user",
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
            GroupBy::Year => "year",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_sends_nothing() {
        assert!(TimeEntryFilter::default().to_query().unwrap().is_empty());
    }

    #[test]
    fn filter_flattens_set_fields() {
        let filter = TimeEntryFilter {
            project_id: Some(1),
            billable: Some(true),
            note: Some("spam".to_string()),
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        let query = filter.to_query().unwrap();
        assert!(query.contains(&("project_id".to_string(), "1".to_string())));
        assert!(query.contains(&("billable".to_string(), "true".to_string())));
        assert!(query.contains(&("note".to_string(), "spam".to_string())));
        assert!(query.contains(&("from".to_string(), "2024-01-01".to_string())));
        assert_eq!(query.len(), 4);
    }

    #[test]
    fn time_range_renders_shorthand_and_dates() {
        assert_eq!(TimeRange::LastWeek.to_string(), "last_week");
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(TimeRange::Day(day).to_string(), "2024-02-29");

        let filter = TimeEntryFilter {
            at: Some(TimeRange::ThisMonth),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query().unwrap(),
            vec![("at".to_string(), "this_month".to_string())]
        );
    }
}
