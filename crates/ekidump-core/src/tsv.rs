use std::io::Write;

use crate::error::Result;
use crate::stations::Station;

const HEADER: [&str; 3] = ["name", "name_kana", "name_en"];

pub fn write_tsv<W: Write>(writer: W, stations: &[Station]) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    out.write_record(HEADER)?;
    for station in stations {
        out.write_record([
            station.name.as_str(),
            station.name_kana.as_str(),
            station.name_en.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_tab_separated_rows() {
        let stations = vec![Station {
            name: "網走駅".to_string(),
            name_kana: "あばしりえき".to_string(),
            name_en: "Abashiri".to_string(),
        }];
        let mut out = Vec::new();
        write_tsv(&mut out, &stations).expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "name\tname_kana\tname_en\n網走駅\tあばしりえき\tAbashiri\n"
        );
    }

    #[test]
    fn empty_input_still_writes_header() {
        let mut out = Vec::new();
        write_tsv(&mut out, &[]).expect("write");
        assert_eq!(out, b"name\tname_kana\tname_en\n");
    }

    #[test]
    fn quotes_fields_containing_tabs() {
        let stations = vec![Station {
            name: "a\tb".to_string(),
            name_kana: "c".to_string(),
            name_en: "d".to_string(),
        }];
        let mut out = Vec::new();
        write_tsv(&mut out, &stations).expect("write");
        assert!(String::from_utf8(out).expect("utf8").contains("\"a\tb\"\tc\td\n"));
    }
}
