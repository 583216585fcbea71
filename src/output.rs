// src/output.rs

//! Presentation adapters.
//!
//! Thin collaborators over the assembled reports: a console table and a
//! CSV export. Column layout and display sorting live here; the pipeline
//! only guarantees the join and the selected-first order.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::pipeline::CardReport;

const COLUMNS: [&str; 7] = ["Card", "Set", "Condition", "Foil", "Price", "Store", "URL"];

/// Render all reports as a console table, one section per card.
pub fn render_table(reports: &[CardReport]) -> String {
    let mut out = String::new();

    for report in reports {
        let qty = if report.card.quantity > 1 {
            format!(" x{}", report.card.quantity)
        } else {
            String::new()
        };
        let _ = writeln!(out, "== {}{} ==", report.card.name, qty);

        for failure in &report.failures {
            let _ = writeln!(out, "  ! {} failed: {}", failure.store, failure.message);
        }

        if report.offers.is_empty() {
            let _ = writeln!(out, "  no offers");
            continue;
        }

        for offer in &report.offers {
            let marker = if report.selected.as_ref() == Some(offer) {
                "*"
            } else {
                " "
            };
            let foil = if offer.foil { "foil" } else { "    " };
            let stock = if offer.in_stock() { "" } else { " (out of stock)" };
            let _ = writeln!(
                out,
                "  {marker} ${:>7.2}  {:<18} {:<16} {foil}  {}{stock}",
                offer.price,
                offer.store,
                offer.condition.to_string(),
                offer.set,
            );
        }
    }

    let total: f64 = reports
        .iter()
        .filter_map(|r| r.selected.as_ref())
        .map(|o| o.price)
        .sum();
    let chosen = reports.iter().filter(|r| r.selected.is_some()).count();
    let _ = writeln!(
        out,
        "\n{chosen}/{} cards matched, selected total ${total:.2}",
        reports.len()
    );

    out
}

/// Write all offers to a CSV file, selected offers first per card.
pub async fn write_csv(reports: &[CardReport], path: impl AsRef<Path>) -> Result<()> {
    let mut out = String::new();
    let _ = writeln!(out, "{},Selected", COLUMNS.join(","));

    for report in reports {
        for offer in &report.offers {
            let selected = report.selected.as_ref() == Some(offer);
            let _ = writeln!(
                out,
                "{},{},{},{},{:.2},{},{},{}",
                csv_field(&offer.card_name),
                csv_field(&offer.set),
                offer.condition,
                offer.foil,
                offer.price,
                csv_field(&offer.store),
                csv_field(&offer.url),
                selected,
            );
        }
    }

    tokio::fs::write(path.as_ref(), out).await?;
    log::info!("Results written to {}", path.as_ref().display());
    Ok(())
}

/// Quote a CSV field when it contains a delimiter or quote.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, Offer, Quality};
    use crate::pipeline::assemble;
    use crate::strategy::Strategy;
    use tempfile::TempDir;

    fn report() -> CardReport {
        let card = Card::parse("Brainstorm").unwrap();
        let offers = vec![
            Offer {
                store: "A".to_string(),
                card_name: "Brainstorm".to_string(),
                set: "Ice Age".to_string(),
                condition: Quality::NearMint,
                foil: false,
                price: 2.0,
                availability: 1,
                url: "https://a.example/1".to_string(),
            },
            Offer {
                store: "B".to_string(),
                card_name: "Brainstorm".to_string(),
                set: "Masters, 25".to_string(),
                condition: Quality::Played,
                foil: true,
                price: 1.5,
                availability: 0,
                url: String::new(),
            },
        ];
        assemble(card, offers, Strategy::Cheapest, vec![])
    }

    #[test]
    fn table_marks_the_selected_offer() {
        let rendered = render_table(&[report()]);
        assert!(rendered.contains("== Brainstorm =="));
        assert!(rendered.contains("*"));
        assert!(rendered.contains("out of stock"));
        assert!(rendered.contains("1/1 cards matched"));
    }

    #[test]
    fn csv_fields_with_commas_are_quoted() {
        assert_eq!(csv_field("Masters, 25"), "\"Masters, 25\"");
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[tokio::test]
    async fn csv_export_has_header_and_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.csv");

        write_csv(&[report()], &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Card,Set,Condition,Foil,Price,Store,URL"));
        assert!(lines[1].ends_with("true"));
        assert!(lines[2].ends_with("false"));
    }
}
