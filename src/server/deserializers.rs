use serde::{Deserialize, Deserializer};

// clients send ids both as numbers and as numeric strings ("3")
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

/// An integer id that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "NumberOrString")]
pub struct Id(pub i64);

impl TryFrom<NumberOrString> for Id {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value {
            NumberOrString::Number(v) => Ok(Id(v)),
            NumberOrString::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Id)
                .map_err(|_| format!("Wrong value {s}, can not parse to i64")),
        }
    }
}

/// `?page=` falls back to the first page when the value is not an integer.
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().parse::<i64>().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Ids {
        ids: Vec<Id>,
    }

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        let parsed: Ids = serde_json::from_str(r#"{"ids": [16, "17", " 3 "]}"#).unwrap();
        assert_eq!(parsed.ids, vec![Id(16), Id(17), Id(3)]);
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        assert!(serde_json::from_str::<Ids>(r#"{"ids": ["seven"]}"#).is_err());
        assert!(serde_json::from_str::<Ids>(r#"{"ids": [true]}"#).is_err());
    }
}
