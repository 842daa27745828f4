use regex::Regex;
use serde::Serialize;

use crate::document::Document;
use crate::error::Result;

// `|[[Name (disambiguation)|Name]] ||[[:ja:漢字|漢字]]（かな）`
const STATION_ROW_PATTERN: &str =
    r"\|\[\[(?:[^|]+\|)?([^\]]+)\]\]\s*\|\|\[\[:ja:[^|]+\|([^\]]+)\]\][(（]([^）)]+)[）)]";
const DISAMBIGUATION_PATTERN: &str = r"\s*[(（][^）)]*[）)].*";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Station {
    pub name: String,
    pub name_kana: String,
    pub name_en: String,
}

#[derive(Debug, Clone)]
pub struct StationExtractor {
    row: Regex,
    disambiguation: Regex,
}

impl StationExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            row: Regex::new(STATION_ROW_PATTERN)?,
            disambiguation: Regex::new(DISAMBIGUATION_PATTERN)?,
        })
    }

    /// Every station row of every page body, in document order.
    #[must_use]
    pub fn extract(&self, documents: &[Document]) -> Vec<Station> {
        documents
            .iter()
            .flat_map(|document| self.row.captures_iter(&document.body))
            .map(|captures| Station {
                name: captures[2].to_string(),
                name_kana: captures[3].to_string(),
                name_en: captures[1].to_string(),
            })
            .collect()
    }

    /// Drops bracketed qualifiers such as ` (Hokkaido)` and everything after them.
    #[must_use]
    pub fn remove_disambiguations(&self, stations: Vec<Station>) -> Vec<Station> {
        let strip = |value: &str| self.disambiguation.replace_all(value, "").into_owned();
        stations
            .into_iter()
            .map(|station| Station {
                name: strip(&station.name),
                name_kana: strip(&station.name_kana),
                name_en: strip(&station.name_en),
            })
            .collect()
    }

    /// Extract, normalise, sort and dedupe in one pass over the matched pages.
    #[must_use]
    pub fn stations(&self, documents: &[Document]) -> Vec<Station> {
        uniquify(self.remove_disambiguations(self.extract(documents)))
    }
}

/// Sorts by English name (then the Japanese fields) and drops exact duplicates.
#[must_use]
pub fn uniquify(mut stations: Vec<Station>) -> Vec<Station> {
    stations.sort_by(|left, right| {
        (&left.name_en, &left.name, &left.name_kana).cmp(&(
            &right.name_en,
            &right.name,
            &right.name_kana,
        ))
    });
    stations.dedup();
    stations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(name: &str, name_kana: &str, name_en: &str) -> Station {
        Station {
            name: name.to_string(),
            name_kana: name_kana.to_string(),
            name_en: name_en.to_string(),
        }
    }

    fn document(body: &str) -> Document {
        Document {
            id: 1,
            title: "List of railway stations in Japan: A".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn extracts_piped_and_plain_links() {
        let body = "\
{| class=\"wikitable\"
|-
|[[Abashiri Station|Abashiri]] ||[[:ja:網走駅|網走駅]]（あばしりえき）|| Hokkaido
|-
|[[Abiko Station]] ||[[:ja:我孫子駅|我孫子駅]](あびこえき)
|}";
        let extractor = StationExtractor::new().expect("compile");
        let stations = extractor.extract(&[document(body)]);
        assert_eq!(
            stations,
            vec![
                station("網走駅", "あばしりえき", "Abashiri"),
                station("我孫子駅", "あびこえき", "Abiko Station"),
            ]
        );
    }

    #[test]
    fn ignores_rows_without_japanese_link() {
        let extractor = StationExtractor::new().expect("compile");
        let stations = extractor.extract(&[document("|[[Somewhere]] || plain text (x)")]);
        assert!(stations.is_empty());
    }

    #[test]
    fn strips_ascii_and_full_width_qualifiers() {
        let extractor = StationExtractor::new().expect("compile");
        let stripped = extractor.remove_disambiguations(vec![station(
            "大谷駅（福岡県）",
            "おおたにえき",
            "Ōtani Station (Fukuoka) extra",
        )]);
        assert_eq!(stripped, vec![station("大谷駅", "おおたにえき", "Ōtani Station")]);
    }

    #[test]
    fn uniquify_sorts_by_english_name_and_dedupes() {
        let stations = vec![
            station("b", "b", "Beta"),
            station("a", "a", "Alpha"),
            station("b", "b", "Beta"),
            station("a2", "a2", "Alpha"),
        ];
        assert_eq!(
            uniquify(stations),
            vec![
                station("a", "a", "Alpha"),
                station("a2", "a2", "Alpha"),
                station("b", "b", "Beta"),
            ]
        );
    }
}
