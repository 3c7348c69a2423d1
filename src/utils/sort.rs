// src/utils/sort.rs

//! Locale-aware ordering for directory names.
//!
//! Each character maps to a collation key: non-letters first, then
//! Cyrillic, then other scripts, matching the Russian locale's script order.
//! Letters are lowercased and `ё` folds onto `е`. Equal keys fall back to
//! code point order so every sort is total and deterministic.
//!
//! This is a primary-level approximation of the `ru` collation: there are
//! no secondary accent weights, and punctuation is not ignored.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::DirectoryKind;

fn fold(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    if lower == 'ё' { 'е' } else { lower }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{052F}')
}

/// Script group and folded character.
fn collation_key(c: char) -> (u8, char) {
    let folded = fold(c);
    if !c.is_alphabetic() {
        (0, folded)
    } else if is_cyrillic(folded) {
        (1, folded)
    } else {
        (2, folded)
    }
}

/// Case-insensitive comparison with no tie-break.
fn collate(a: &str, b: &str) -> Ordering {
    a.chars().map(collation_key).cmp(b.chars().map(collation_key))
}

/// Case-insensitive locale comparison.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collate(a, b).then_with(|| a.cmp(b))
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

/// Compare two digit runs by value without parsing (no overflow).
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Numeric-aware collation: digit runs compare by value.
fn collate_numeric(a: &str, b: &str) -> Ordering {
    let mut x = a.chars().peekable();
    let mut y = b.chars().peekable();

    loop {
        match (x.peek().copied(), y.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(c1), Some(c2)) if c1.is_ascii_digit() && c2.is_ascii_digit() => {
                let ord = cmp_digit_runs(&take_digits(&mut x), &take_digits(&mut y));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(c1), Some(c2)) => {
                let ord = collation_key(c1).cmp(&collation_key(c2));
                if ord != Ordering::Equal {
                    return ord;
                }
                x.next();
                y.next();
            }
        }
    }
}

/// Case-insensitive locale comparison with numeric awareness.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    collate_numeric(a, b).then_with(|| a.cmp(b))
}

fn letters_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\D*").expect("letters pattern is valid"))
}

fn numbers_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("numbers pattern is valid"))
}

/// Group name split into its letter prefix and embedded integers.
#[derive(Debug, PartialEq, Eq)]
pub struct GroupKey<'a> {
    pub letters: &'a str,
    pub numbers: Vec<u64>,
}

impl<'a> GroupKey<'a> {
    pub fn parse(name: &'a str) -> Self {
        let letters = letters_re().find(name).map_or("", |m| m.as_str());
        let numbers = numbers_re()
            .find_iter(name)
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .collect();
        Self { letters, numbers }
    }
}

/// Group order: letters, then embedded integers pairwise, then the whole
/// name numerically. A missing integer sorts before a present one.
pub fn compare_groups(a: &str, b: &str) -> Ordering {
    let ka = GroupKey::parse(a);
    let kb = GroupKey::parse(b);

    collate(ka.letters, kb.letters)
        .then_with(|| {
            let len = ka.numbers.len().max(kb.numbers.len());
            (0..len)
                .map(|i| match (ka.numbers.get(i), kb.numbers.get(i)) {
                    (Some(x), Some(y)) => x.cmp(y),
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| natural_cmp(a, b))
}

pub fn compare_teachers(a: &str, b: &str) -> Ordering {
    locale_cmp(a, b)
}

pub fn compare_cabinets(a: &str, b: &str) -> Ordering {
    natural_cmp(a, b)
}

/// Sort a directory list with the policy of its kind.
pub fn sort_directory(kind: DirectoryKind, names: &mut [String]) {
    let cmp: fn(&str, &str) -> Ordering = match kind {
        DirectoryKind::Groups => compare_groups,
        DirectoryKind::Teachers => compare_teachers,
        DirectoryKind::Cabinets => compare_cabinets,
    };
    names.sort_by(|a, b| cmp(a, b));
}
