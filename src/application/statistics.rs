//! Statistics over stored offers
//!
//! Position types are assigned by keyword match on the title; salaries are
//! parsed from free text such as `"30,50 - 33 zł / godz. brutto"`.

use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::domain::offer::JobOffer;
use crate::domain::repositories::OfferStore;

static SALARY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[,.]\d+)?").expect("salary pattern is valid"));

/// Ordered keyword table for position classification
#[derive(Debug, Clone, Serialize)]
pub struct PositionKeywords {
    /// `(category, keywords)`; the first matching category wins
    pub categories: Vec<(String, Vec<String>)>,
    /// Bucket for titles no category matches
    pub other_label: String,
}

impl PositionKeywords {
    pub fn new(categories: Vec<(String, Vec<String>)>) -> Self {
        Self {
            categories,
            other_label: "Inne".to_string(),
        }
    }

    /// Category for one title
    pub fn classify(&self, title: &str) -> &str {
        let title = title.to_lowercase();
        self.categories
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| title.contains(&k.to_lowercase())))
            .map_or(self.other_label.as_str(), |(category, _)| category.as_str())
    }
}

impl Default for PositionKeywords {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                "Sprzedawca/Konsultant",
                &[
                    "sprzedawca", "sprzedawczyni", "konsultant", "doradca", "handlowiec",
                    "ambasador", "marki", "doradca klienta", "obsługa klienta",
                ],
            ),
            ("Recepcjonista", &["recepcjonista", "recepcjonistka", "recepcji", "recepcja"]),
            (
                "Gastronomia",
                &[
                    "kelner", "kelnerka", "barista", "barman", "sushi", "kucharz",
                    "restauracji", "kawiarnia", "lodziarnio", "bistro", "burgers",
                ],
            ),
            (
                "Medyczny",
                &[
                    "rejestrator medyczny", "rejestratorka medyczna", "medyczny", "medyczna",
                    "fizjoterapia", "sanepid",
                ],
            ),
            (
                "Asystent/Pomoc",
                &[
                    "asystent", "asystentka", "pomoc", "pomocnik", "pomocnica",
                    "asystent nauczyciela", "gym assistant",
                ],
            ),
            ("Księgowość/Biuro", &["księgowy", "księgowa", "biurowa", "biuro", "biurowy"]),
            ("Transport/Dostawa", &["dostawca", "kierowca", "podjazdowy", "transport", "dostawa"]),
            ("Lektor/Nauczyciel", &["lektor", "lektorka", "nauczyciel", "nauczycielka", "językowa"]),
            ("Specjalista", &["specjalista", "specialist", "depilacji", "wynajmu"]),
            ("Produkcja", &["produkcja", "pracownik produkcji", "production"]),
        ];

        Self::new(
            table
                .iter()
                .map(|(category, keywords)| {
                    (
                        (*category).to_string(),
                        keywords.iter().map(|k| (*k).to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

/// Salary figures over all offers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalaryStatistics {
    pub total_offers: usize,
    pub offers_with_salary: usize,
    pub offers_without_salary: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Representative value of a salary text: midpoint of a range or the single figure
pub fn parse_salary(text: &str) -> Option<f64> {
    let mut numbers = SALARY_NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', ".").parse::<f64>().ok());

    match (numbers.next(), numbers.next()) {
        (Some(low), Some(high)) => Some(f64::midpoint(low, high)),
        (Some(single), None) => Some(single),
        _ => None,
    }
}

/// Count offers per position category
pub fn position_type_counts(offers: &[JobOffer], keywords: &PositionKeywords) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for offer in offers {
        let category = keywords.classify(&offer.title);
        debug!("Offer '{}' classified as '{}'", offer.title, category);
        *counts.entry(category.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Salary statistics; offers with a blank salary count as without salary
pub fn salary_statistics(offers: &[JobOffer]) -> SalaryStatistics {
    let mut without_salary = 0;
    let mut salaries = Vec::new();

    for offer in offers {
        match offer.salary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => without_salary += 1,
            Some(text) => {
                if let Some(value) = parse_salary(text) {
                    salaries.push(value);
                }
            }
        }
    }

    let mut stats = SalaryStatistics {
        total_offers: offers.len(),
        offers_without_salary: without_salary,
        ..SalaryStatistics::default()
    };

    if salaries.is_empty() {
        warn!("No valid salary data found");
        return stats;
    }

    salaries.sort_by(f64::total_cmp);
    let n = salaries.len();
    let median = if n % 2 == 1 {
        salaries[n / 2]
    } else {
        f64::midpoint(salaries[n / 2 - 1], salaries[n / 2])
    };

    #[allow(clippy::cast_precision_loss)]
    let average = salaries.iter().sum::<f64>() / n as f64;

    stats.offers_with_salary = n;
    stats.average = round2(average);
    stats.min = salaries[0];
    stats.max = salaries[n - 1];
    stats.median = round2(median);
    stats
}

/// Statistics read straight from the offer store
pub struct StatisticsService {
    store: Arc<dyn OfferStore>,
    keywords: PositionKeywords,
}

impl StatisticsService {
    pub fn new(store: Arc<dyn OfferStore>) -> Self {
        Self::with_keywords(store, PositionKeywords::default())
    }

    pub fn with_keywords(store: Arc<dyn OfferStore>, keywords: PositionKeywords) -> Self {
        Self { store, keywords }
    }

    pub async fn position_type_counts(&self) -> Result<BTreeMap<String, usize>> {
        let offers = self.store.read_all().await?;
        let counts = position_type_counts(&offers, &self.keywords);
        info!("Position distribution over {} offers: {:?}", offers.len(), counts);
        Ok(counts)
    }

    pub async fn salary_statistics(&self) -> Result<SalaryStatistics> {
        let offers = self.store.read_all().await?;
        let stats = salary_statistics(&offers);
        info!("Salary analysis completed: {:?}", stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDatabase;
    use rstest::rstest;

    fn with_salary(title: &str, salary: Option<&str>) -> JobOffer {
        let offer = JobOffer::new(title, format!("https://x/{title}"), "olx");
        match salary {
            Some(s) => offer.with_salary(s),
            None => offer,
        }
    }

    #[rstest]
    #[case("30,50 - 33 zł / godz. brutto", Some(31.75))]
    #[case("4000 zł", Some(4000.0))]
    #[case("5 000 - 6 000 zł", Some(2.5))]
    #[case("do negocjacji", None)]
    fn salary_parsing(#[case] text: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_salary(text), expected);
    }

    #[rstest]
    #[case("Kelnerka w kawiarni", "Gastronomia")]
    #[case("DORADCA KLIENTA", "Sprzedawca/Konsultant")]
    #[case("Programista Rust", "Inne")]
    #[case("Asystentka biura", "Asystent/Pomoc")]
    fn default_classification(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(PositionKeywords::default().classify(title), expected);
    }

    #[test]
    fn counts_per_category() {
        let offers = [
            with_salary("Kelner", None),
            with_salary("Barista", None),
            with_salary("Kierowca kat. B", None),
            with_salary("Programista", None),
        ];
        let counts = position_type_counts(&offers, &PositionKeywords::default());
        assert_eq!(counts.get("Gastronomia"), Some(&2));
        assert_eq!(counts.get("Transport/Dostawa"), Some(&1));
        assert_eq!(counts.get("Inne"), Some(&1));
    }

    #[test]
    fn custom_other_label() {
        let mut keywords = PositionKeywords::new(vec![("IT".into(), vec!["rust".into()])]);
        keywords.other_label = "Other".into();
        let counts = position_type_counts(&[with_salary("Kelner", None)], &keywords);
        assert_eq!(counts.get("Other"), Some(&1));
    }

    #[test]
    fn salary_summary() {
        let offers = [
            with_salary("a", Some("30 - 40 zł/h")),
            with_salary("b", Some("20 zł/h")),
            with_salary("c", Some("10,5 zł/h")),
            with_salary("d", Some("  ")),
            with_salary("e", None),
            with_salary("f", Some("do uzgodnienia")),
        ];

        let stats = salary_statistics(&offers);
        assert_eq!(stats.total_offers, 6);
        assert_eq!(stats.offers_with_salary, 3);
        assert_eq!(stats.offers_without_salary, 2);
        assert_eq!(stats.min, 10.5);
        assert_eq!(stats.max, 35.0);
        assert_eq!(stats.median, 20.0);
        assert_eq!(stats.average, 21.83);
    }

    #[test]
    fn no_salaries_is_all_zero() {
        let stats = salary_statistics(&[with_salary("a", None)]);
        assert_eq!(stats.offers_with_salary, 0);
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.median, 0.0);
        assert_eq!(stats.total_offers, 1);
    }

    #[tokio::test]
    async fn service_reads_from_store() -> Result<()> {
        let db = TestDatabase::new().await?;
        let store: Arc<dyn OfferStore> = Arc::new(db.repository());
        store
            .insert_new(&[with_salary("Kelner", Some("25 zł/h")), with_salary("Lektor", None)])
            .await?;

        let service = StatisticsService::new(store);
        let counts = service.position_type_counts().await?;
        assert_eq!(counts.values().sum::<usize>(), 2);

        let stats = service.salary_statistics().await?;
        assert_eq!(stats.offers_with_salary, 1);
        assert_eq!(stats.average, 25.0);
        Ok(())
    }
}
