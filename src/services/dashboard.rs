use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::db::{Inquiry, InquiryStatus, Property, STATUS_FOR_RENT, STATUS_FOR_SALE};

pub const DEFAULT_CHART_MONTHS: u32 = 6;
pub const MAX_CHART_MONTHS: u32 = 24;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_properties: usize,
    pub for_sale: usize,
    pub for_rent: usize,
    pub sold: usize,
    pub featured: usize,
    pub total_inquiries: usize,
    pub new_inquiries: usize,
    pub subscribers: usize,
    /// Sum of prices of listings that are not sold.
    pub total_value: f64,
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// `YYYY-MM`
    pub month: String,
    /// Short month name, e.g. `Jan`.
    pub label: String,
    pub properties: usize,
    pub inquiries: usize,
}

pub fn compute_stats(
    properties: &[Property],
    inquiries: &[Inquiry],
    subscribers: usize,
) -> DashboardStats {
    let priced: Vec<f64> = properties
        .iter()
        .map(|p| p.price)
        .filter(|p| p.is_finite())
        .collect();
    let average_price = if priced.is_empty() {
        0.0
    } else {
        priced.iter().sum::<f64>() / priced.len() as f64
    };

    DashboardStats {
        total_properties: properties.len(),
        for_sale: properties.iter().filter(|p| p.has_status(STATUS_FOR_SALE)).count(),
        for_rent: properties.iter().filter(|p| p.has_status(STATUS_FOR_RENT)).count(),
        sold: properties.iter().filter(|p| p.is_sold()).count(),
        featured: properties.iter().filter(|p| p.featured).count(),
        total_inquiries: inquiries.len(),
        new_inquiries: inquiries
            .iter()
            .filter(|i| i.status == InquiryStatus::New)
            .count(),
        subscribers,
        total_value: properties
            .iter()
            .filter(|p| !p.is_sold() && p.price.is_finite())
            .map(|p| p.price)
            .sum(),
        average_price,
    }
}

/// Clamp a requested month count into `1..=MAX_CHART_MONTHS`.
pub fn chart_months(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_CHART_MONTHS)
        .clamp(1, MAX_CHART_MONTHS)
}

/// One bucket per calendar month (UTC), oldest first, ending with the month of `now`.
pub fn compute_chart(
    properties: &[Property],
    inquiries: &[Inquiry],
    months: u32,
    now: DateTime<Utc>,
) -> Vec<ChartPoint> {
    let mut buckets: Vec<(i32, u32)> = Vec::with_capacity(months as usize);
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..months {
        buckets.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    buckets.reverse();

    let in_bucket = |ts: Option<DateTime<Utc>>, (y, m): (i32, u32)| {
        ts.map_or(false, |t| t.year() == y && t.month() == m)
    };

    buckets
        .into_iter()
        .map(|bucket| {
            let label = NaiveDate::from_ymd_opt(bucket.0, bucket.1, 1)
                .map(|d| d.format("%b").to_string())
                .unwrap_or_default();
            ChartPoint {
                month: format!("{:04}-{:02}", bucket.0, bucket.1),
                label,
                properties: properties
                    .iter()
                    .filter(|p| in_bucket(p.listed_at(), bucket))
                    .count(),
                inquiries: inquiries.iter().filter(|i| in_bucket(i.date, bucket)).count(),
            }
        })
        .collect()
}
