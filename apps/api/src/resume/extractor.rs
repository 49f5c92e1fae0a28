//! Heuristic field extraction over plain resume text.
//!
//! Every field is derived independently. A field that cannot be found comes
//! back as `""` or `[]`; extraction itself never fails.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const MAX_LINKS: usize = 10;
const MAX_SKILLS: usize = 30;
const MAX_SKILL_CHARS: usize = 40;
const MAX_SUMMARY_CHARS: usize = 800;
const NAME_SCAN_LINES: usize = 10;
const HEADLINE_SCAN_LINES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResume {
    pub name: String,
    pub headline: String,
    pub email: String,
    pub phone: String,
    pub links: Vec<String>,
    pub location: String,
    pub skills: Vec<String>,
    pub summary: String,
    pub current_role: String,
    pub current_company: String,
    pub raw_text: String,
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d[\d \t().-]{5,}\d").expect("valid regex"));

static YEAR_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:19|20)\d{2}\s*[-–]\s*(?:19|20)\d{2}\b").expect("valid regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:https?://|www\.)[^\s<>()"']+|\b(?:linkedin\.com|github\.com)/[^\s<>()"']+"#,
    )
    .expect("valid regex")
});

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:key |core |technical |professional |work |career |relevant )?(?:skills|summary|profile|about me|experience|employment history|work history|education|qualifications|certifications?|projects|languages|interests|references|awards|publications|volunteering|contact|tools)\s*:?$",
    )
    .expect("valid regex")
});

static SKILLS_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:key |core |technical )?skills(?:\s*[:\-–]\s*(?P<rest>.*))?$")
        .expect("valid regex")
});

static SUMMARY_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:professional |career )?(?:summary|profile|about me)(?:\s*[:\-–]\s*(?P<rest>.*))?$",
    )
    .expect("valid regex")
});

static PLACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?i:new zealand|aotearoa|australia|united kingdom|united states|canada|singapore|ireland|india|auckland|wellington|christchurch|hamilton|tauranga|dunedin|sydney|melbourne|brisbane|perth|adelaide|canberra|london|manchester|remote)|NZ|AU|UK|USA|US)\b",
    )
    .expect("valid regex")
});

static ROLE_AT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<role>[A-Za-z][^@|\d]{1,80}?)\s+at\s+(?P<company>[^@|]{2,})$")
        .expect("valid regex")
});

static ROLE_DASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<role>[A-Za-z][^@|\d]{1,80}?)\s+[-–—]\s+(?P<company>[^@|]{2,})$")
        .expect("valid regex")
});

static TRAILING_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("valid regex"));

static DATE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\s,]*(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+)?(?:19|20)\d{2}\b.*$",
    )
    .expect("valid regex")
});

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-*•·▪◦‣–]+\s*").expect("valid regex"));

/// CRLF to LF, NBSP to space, whitespace collapsed per line, blank lines dropped.
pub fn normalise(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn extract_fields(raw: &str) -> ParsedResume {
    let text = normalise(raw);
    let lines: Vec<&str> = text.lines().collect();

    let name_index = find_name(&lines);
    let (current_role, current_company) = find_current_role(&lines);

    ParsedResume {
        name: name_index.map(|i| lines[i].to_string()).unwrap_or_default(),
        headline: name_index
            .and_then(|i| find_headline(&lines, i))
            .unwrap_or_default(),
        email: EMAIL_RE
            .find(&text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        phone: find_phone(&text).unwrap_or_default(),
        links: find_links(&text),
        location: find_location(&lines).unwrap_or_default(),
        skills: find_skills(&lines),
        summary: find_summary(&lines),
        current_role,
        current_company,
        raw_text: text.clone(),
    }
}

fn is_heading(line: &str) -> bool {
    if HEADING_RE.is_match(line) {
        return true;
    }
    line.ends_with(':') && !line.contains(',') && line.split_whitespace().count() <= 4
}

fn has_url(line: &str) -> bool {
    URL_RE.is_match(line)
}

fn has_phone(line: &str) -> bool {
    find_phone(line).is_some()
}

fn find_name(lines: &[&str]) -> Option<usize> {
    lines.iter().take(NAME_SCAN_LINES).position(|line| {
        line.split_whitespace().count() <= 6
            && line.chars().count() <= 60
            && line.chars().any(char::is_alphabetic)
            && !line.chars().any(|c| c.is_ascii_digit())
            && !line.contains('@')
            && !has_url(line)
            && !is_heading(line)
    })
}

fn find_headline(lines: &[&str], name_index: usize) -> Option<String> {
    lines
        .iter()
        .skip(name_index + 1)
        .take(HEADLINE_SCAN_LINES)
        .find(|line| {
            line.chars().count() <= 100
                && !line.contains('@')
                && !has_url(line)
                && !has_phone(line)
                && !is_heading(line)
        })
        .map(|line| line.to_string())
}

/// First run of 7 to 15 digits that reads like a phone number. Digits that
/// belong to a year range such as `2019 - 2021` do not count.
fn find_phone(text: &str) -> Option<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            let digits = YEAR_RANGE_RE
                .replace_all(candidate, "")
                .chars()
                .filter(char::is_ascii_digit)
                .count();
            (7..=15).contains(&digits)
        })
        .map(str::to_string)
}

fn find_links(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(text)
        .map(|m| {
            m.as_str()
                .trim_end_matches(['.', ',', ';', ':', ')', ']', '!', '?'])
                .to_string()
        })
        .filter(|link| !link.is_empty() && seen.insert(link.to_lowercase()))
        .take(MAX_LINKS)
        .collect()
}

fn find_location(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter(|line| !is_heading(line))
        .find(|line| PLACE_RE.is_match(line))
        .map(|line| {
            line.split(['|', '•'])
                .map(str::trim)
                .find(|segment| PLACE_RE.is_match(segment))
                .unwrap_or(*line)
                .to_string()
        })
}

/// Lines of the first section whose heading matches `heading`, including any
/// text placed on the heading line after a colon or dash.
fn section<'a>(lines: &[&'a str], heading: &Regex) -> Vec<&'a str> {
    let Some(start) = lines.iter().position(|line| heading.is_match(line)) else {
        return Vec::new();
    };

    let mut body = Vec::new();
    if let Some(rest) = heading
        .captures(lines[start])
        .and_then(|caps| caps.name("rest"))
        .map(|m| m.as_str().trim())
        .filter(|rest| !rest.is_empty())
    {
        body.push(rest);
    }
    body.extend(
        lines[start + 1..]
            .iter()
            .take_while(|line| !is_heading(line))
            .copied(),
    );
    body
}

fn find_skills(lines: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    section(lines, &SKILLS_HEADING_RE)
        .into_iter()
        .flat_map(|line| line.split([',', ';', '|', '•']))
        .map(|item| BULLET_RE.replace(item.trim(), "").trim().to_string())
        .filter(|item| !item.is_empty() && item.chars().count() <= MAX_SKILL_CHARS)
        .filter(|item| seen.insert(item.to_lowercase()))
        .take(MAX_SKILLS)
        .collect()
}

fn find_summary(lines: &[&str]) -> String {
    section(lines, &SUMMARY_HEADING_RE)
        .join(" ")
        .chars()
        .take(MAX_SUMMARY_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

fn clean_company(raw: &str) -> String {
    let without_paren = TRAILING_PAREN_RE.replace(raw, "");
    let without_dates = DATE_TAIL_RE.replace(&without_paren, "");
    TRAILING_PAREN_RE
        .replace(&without_dates, "")
        .trim()
        .trim_end_matches([',', '-', '–', '—'])
        .trim()
        .to_string()
}

fn find_current_role(lines: &[&str]) -> (String, String) {
    lines
        .iter()
        .filter(|line| !is_heading(line) && !has_url(line))
        .find_map(|line| {
            let caps = ROLE_AT_RE
                .captures(line)
                .or_else(|| ROLE_DASH_RE.captures(line))?;
            let role = caps.name("role")?.as_str().trim().to_string();
            let company = clean_company(caps.name("company")?.as_str());
            (!company.is_empty()).then_some((role, company))
        })
        .unwrap_or_default()
}
