//! Plain-text report of newly stored offers

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{self, Write};

use crate::domain::offer::JobOffer;

const RULE_WIDTH: usize = 50;

/// A report ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

/// Formats offers into an email-style subject and body
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailFormatter;

impl EmailFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Report stamped with the current local time
    pub fn format_now(&self, offers: &[JobOffer]) -> Report {
        self.format(offers, Local::now().naive_local())
    }

    pub fn format(&self, offers: &[JobOffer], now: NaiveDateTime) -> Report {
        Report {
            subject: self.subject(offers, now),
            body: self.body(offers, now),
        }
    }

    pub fn subject(&self, offers: &[JobOffer], now: NaiveDateTime) -> String {
        let date = now.format("%Y-%m-%d");
        if offers.is_empty() {
            format!("Job Scraper Report - No offers found ({date})")
        } else {
            format!(
                "Job Scraper Report - {} offers from {} sites ({date})",
                offers.len(),
                site_count(offers)
            )
        }
    }

    pub fn body(&self, offers: &[JobOffer], now: NaiveDateTime) -> String {
        let mut body = String::new();
        // writing into a String cannot fail
        write_body(&mut body, offers, now).ok();
        body
    }
}

fn write_body(out: &mut impl Write, offers: &[JobOffer], now: NaiveDateTime) -> fmt::Result {
    writeln!(out, "Job Offers Report - {}", now.format("%Y-%m-%d %H:%M"))?;
    writeln!(out)?;
    writeln!(out, "Total new offers found: {}", offers.len())?;

    if offers.is_empty() {
        return Ok(());
    }

    writeln!(out, "Sites scraped: {}", site_count(offers))?;
    writeln!(out, "Offers:")?;
    writeln!(out)?;

    for (i, offer) in offers.iter().enumerate() {
        writeln!(out, "OFFER #{}", i + 1)?;
        writeln!(out, "Position: {}", offer.title)?;
        let optional = [
            ("Company", &offer.company),
            ("Location", &offer.location),
            ("Salary", &offer.salary),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                writeln!(out, "{label}: {value}")?;
            }
        }
        writeln!(out, "Source: {}", offer.site_id)?;
        writeln!(out, "URL: {}", offer.url)?;
        if let Some(add_info) = &offer.add_info {
            writeln!(out, "Additional Info: {add_info}")?;
        }
        writeln!(out)?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(out)?;
    }

    Ok(())
}

fn site_count(offers: &[JobOffer]) -> usize {
    offers
        .iter()
        .map(|offer| offer.site_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}
