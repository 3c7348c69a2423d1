//! Schedule days, couples and the raw shapes the backend sends.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sequence identifier of a couple within a day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CoupleNumber {
    /// Regular numbered slot
    Slot(u32),
    /// Class hour, always placed between slots 3 and 4
    ClassHour,
    /// Any other label the backend sent, kept verbatim
    Label(String),
}

impl CoupleNumber {
    /// Parse the leading integer of a raw label, keeping the label otherwise.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
        match digits.parse::<u32>() {
            Ok(n) => CoupleNumber::Slot(n),
            Err(_) => CoupleNumber::Label(trimmed.to_string()),
        }
    }

    /// Ordering used for display: 1, 2, 3, class hour, 4, 5, ... then labels.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        fn rank(n: &CoupleNumber) -> (u8, u64) {
            match n {
                CoupleNumber::Slot(n) => (0, u64::from(*n) * 10),
                CoupleNumber::ClassHour => (0, 35),
                CoupleNumber::Label(_) => (1, 0),
            }
        }

        rank(self).cmp(&rank(other)).then_with(|| match (self, other) {
            (CoupleNumber::Label(a), CoupleNumber::Label(b)) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

impl fmt::Display for CoupleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoupleNumber::Slot(n) => write!(f, "{n}"),
            CoupleNumber::ClassHour => f.write_str("КЧ"),
            CoupleNumber::Label(label) => f.write_str(label),
        }
    }
}

/// One scheduled lesson slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Couple {
    pub number: CoupleNumber,
    pub time_start: String,
    pub time_end: String,
    pub title: String,
    pub teacher: String,
    pub cabinet: String,
    pub group: String,

    /// Counterpart group when two groups share the slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined: Option<String>,
}

/// Normalized schedule for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    /// Backend date key, kept as sent
    pub date: String,
    #[serde(default)]
    pub from_type: i64,
    #[serde(default)]
    pub corpus: i64,
    #[serde(default)]
    pub couples: Vec<Couple>,
}

/// Raw slot label: the backend sends either a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Number(i64),
    Text(String),
}

impl RawLabel {
    pub fn as_text(&self) -> String {
        match self {
            RawLabel::Number(n) => n.to_string(),
            RawLabel::Text(s) => s.clone(),
        }
    }
}

/// A couple exactly as the backend sends it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCouple {
    #[serde(default)]
    pub couple: Option<RawLabel>,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub time_end: Option<String>,
    #[serde(default)]
    pub lesson: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub cabinet: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub combined: Option<String>,
}

/// A day payload: either a detailed object or a bare list of couples.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDay {
    Detailed {
        #[serde(default, rename = "fromType", alias = "from_type")]
        from_type: Option<i64>,
        #[serde(default)]
        corpus: Option<i64>,
        #[serde(default)]
        couples: Vec<RawCouple>,
    },
    Couples(Vec<RawCouple>),
}

/// `/couples/{name}` response: days keyed by date string.
pub type RawSchedule = BTreeMap<String, RawDay>;

/// One teacher/cabinet/group variant within a lesson card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonVariant {
    pub teacher: String,
    pub cabinet: String,
    pub group: String,
    pub combined: Option<String>,
}

/// Couples sharing a (number, title) key, merged for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCard {
    pub number: CoupleNumber,
    pub title: String,
    pub time_start: String,
    pub time_end: String,
    pub variants: Vec<LessonVariant>,
}

/// Merge couples that share (number, title) and order them for display.
pub fn group_couples(couples: &[Couple]) -> Vec<LessonCard> {
    let mut cards: Vec<LessonCard> = Vec::new();

    for couple in couples {
        let variant = LessonVariant {
            teacher: couple.teacher.clone(),
            cabinet: couple.cabinet.clone(),
            group: couple.group.clone(),
            combined: couple.combined.clone(),
        };

        match cards
            .iter_mut()
            .find(|c| c.number == couple.number && c.title == couple.title)
        {
            Some(card) => {
                if !card.variants.contains(&variant) {
                    card.variants.push(variant);
                }
            }
            None => cards.push(LessonCard {
                number: couple.number.clone(),
                title: couple.title.clone(),
                time_start: couple.time_start.clone(),
                time_end: couple.time_end.clone(),
                variants: vec![variant],
            }),
        }
    }

    // Stable sort keeps backend order among equal ranks
    cards.sort_by(|a, b| a.number.display_cmp(&b.number));
    cards
}
