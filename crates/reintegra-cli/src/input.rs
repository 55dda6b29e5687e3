//! Row assembly from a JSON file, stdin, and `--set KEY=VALUE` overrides.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, anyhow, ensure};
use reintegra_core::{AttributeRow, AttributeValue};

/// Read the base row (if any) and apply assignments in order.
pub fn read_row(input: Option<&Path>, assignments: &[String]) -> anyhow::Result<AttributeRow> {
    let mut row = match input {
        Some(path) if path == Path::new("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading row from stdin")?;
            parse_row(&text).context("parsing row from stdin")?
        }
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_row(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => AttributeRow::new(),
    };

    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        row.insert(&key, value);
    }
    Ok(row)
}

fn parse_row(text: &str) -> anyhow::Result<AttributeRow> {
    Ok(serde_json::from_str(text)?)
}

/// Split `KEY=VALUE`. Only the first `=` separates; the value is kept
/// verbatim apart from the conversions in [`parse_value`].
pub fn parse_assignment(s: &str) -> anyhow::Result<(String, AttributeValue)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {s:?}"))?;
    let key = key.trim();
    ensure!(!key.is_empty(), "empty attribute name in {s:?}");
    Ok((key.to_string(), parse_value(value)))
}

/// Integers become counts; empty and `null` become missing; anything else
/// is a category.
fn parse_value(s: &str) -> AttributeValue {
    if s.is_empty() || s == "null" {
        return AttributeValue::Missing;
    }
    match s.parse::<i64>() {
        Ok(n) => AttributeValue::Count(n),
        Err(_) => AttributeValue::Category(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_kinds() {
        assert_eq!(
            parse_assignment("Sex=Femenino").unwrap(),
            ("Sex".to_string(), AttributeValue::from("Femenino"))
        );
        assert_eq!(
            parse_assignment("NumChildren=-1").unwrap().1,
            AttributeValue::Count(-1)
        );
        assert_eq!(
            parse_assignment("HousingType=").unwrap().1,
            AttributeValue::Missing
        );
        assert_eq!(
            parse_assignment("HousingType=null").unwrap().1,
            AttributeValue::Missing
        );
    }

    #[test]
    fn value_keeps_spaces_and_equals() {
        let (_, v) = parse_assignment(
            "HousingTenure=Otra forma de tenencia  (posesión sin título, ocupante de hecho, propiedad colectiva, etc)",
        )
        .unwrap();
        assert_eq!(
            v.as_category(),
            Some("Otra forma de tenencia  (posesión sin título, ocupante de hecho, propiedad colectiva, etc)")
        );

        let (_, v) = parse_assignment("Note=a=b").unwrap();
        assert_eq!(v.as_category(), Some("a=b"));
    }

    #[test]
    fn malformed_assignments() {
        assert!(parse_assignment("Sex").is_err());
        assert!(parse_assignment(" =Femenino").is_err());
    }

    #[test]
    fn file_then_overrides() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("row.json");
        std::fs::write(
            &path,
            r#"{"Sexo": "Masculino", "OccupationalStatus": "Desocupados", "NumChildren": 2}"#,
        )
        .unwrap();

        let row = read_row(Some(path.as_path()), &["Sex=Femenino".to_string()]).unwrap();
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["Sex", "OccupationalStatus", "NumChildren"]
        );
        assert_eq!(row.get("Sex"), Some(&AttributeValue::from("Femenino")));
    }

    #[test]
    fn unreadable_file_has_context() {
        let err = read_row(Some(Path::new("/nonexistent/row.json")), &[]).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/row.json"));
    }
}
